use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::modes::relay::RelayParamsBuilderError;

/// Fatal failures while producing the single relayed connection.
#[derive(Error, Debug)]
pub enum EstablishError {
    /// `bind(2)` or `listen(2)` failed; std performs both in one call.
    #[error("Cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Accepting connection failed: {0}")]
    Accept(#[source] io::Error),

    #[error("Cannot resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("Unknown protocol for {host}: only IPv4 addresses are supported")]
    UnsupportedProtocol { host: String },

    #[error("All candidates of address {host}:{port} failed ({attempts} tried)")]
    AllCandidatesFailed {
        host: String,
        port: u16,
        attempts: usize,
    },
}

/// Command line values that parse individually but do not form a usable
/// configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Exactly one of --server or --connect is required")]
    NoMode,

    #[error("--bind is only valid in server mode")]
    BindWithoutServer,

    #[error("Relay parameters building failed: {0}")]
    Params(#[from] RelayParamsBuilderError),
}
