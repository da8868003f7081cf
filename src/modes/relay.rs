use derive_builder::Builder;

use crate::sock::{BUFLEN, DuplexRelay, RelaySummary};
use crate::sockets::Establisher;
use std::io::{self, Read, Write};

#[derive(Builder, Clone, Debug)]
pub struct RelayParams {
    #[builder(default = BUFLEN)]
    pub buffer_size: usize,
    /// Print a JSON transfer summary on stderr when done
    #[builder(default = false)]
    pub stats: bool,
    /// Turn pump failures into a failing exit code
    #[builder(default = false)]
    pub strict: bool,
}

pub struct RelayMode {
    establisher: Box<dyn Establisher>,
    params: RelayParams,
}

impl RelayMode {
    pub fn new(establisher: Box<dyn Establisher>, params: RelayParams) -> Self {
        Self {
            establisher,
            params,
        }
    }

    /// Establish the connection, relay it against `input`/`output` and return
    /// the exit code.
    pub fn run<I, O>(&self, input: I, output: O) -> i32
    where
        I: Read + Send,
        O: Write + Send,
    {
        let stream = match self.establisher.establish(&mut io::stderr()) {
            Ok(stream) => stream,
            Err(e) => {
                eprintln!("{e}");
                return 1;
            }
        };

        let summary = DuplexRelay::new(stream)
            .with_buffer_size(self.params.buffer_size)
            .run(input, output);
        self.finish(&summary)
    }

    fn finish(&self, summary: &RelaySummary) -> i32 {
        log::info!(
            "{}: sent {} bytes ({}), received {} bytes ({})",
            summary.peer,
            summary.sent,
            summary.upload,
            summary.received,
            summary.download
        );
        if self.params.stats {
            match serde_json::to_string(summary) {
                Ok(json) => eprintln!("{json}"),
                Err(e) => log::warn!("Cannot serialize relay summary: {e}"),
            }
        }
        if self.params.strict && summary.failed() {
            1
        } else {
            0
        }
    }
}

pub struct RelayModeCommand {
    mode: RelayMode,
}

impl RelayModeCommand {
    pub fn new(mode: RelayMode) -> Self {
        Self { mode }
    }
}

impl super::Command for RelayModeCommand {
    fn execute(&mut self) -> i32 {
        self.mode.run(io::stdin(), io::stdout())
    }
}
