pub mod tcp_client;
pub mod tcp_server;

use crate::error::EstablishError;
use std::io::Write;
use std::net::TcpStream;

/// Produces the one connection a process relays.
pub trait Establisher {
    /// Block until a connection is available. User-facing progress goes to
    /// `diag`.
    fn establish(&self, diag: &mut dyn Write) -> Result<TcpStream, EstablishError>;
}
