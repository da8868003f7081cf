/*
 * Copyright (c) 2026 Ilya Shishov
 * Licensed under the MIT License.
 * See the LICENSE file in the project root for full license information.
 */

use std::process;

mod args;
mod error;
mod modes;
mod sock;
mod sockets;
#[cfg(test)]
mod test_helpers;

use crate::args::RelayArgs;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let mut command = RelayArgs::get_scenario();
    process::exit(command.execute());
}
