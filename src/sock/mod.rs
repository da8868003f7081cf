pub mod pump;
pub mod relay;

pub use pump::{BUFLEN, Pump, PumpOutcome, PumpReport};
pub use relay::{DuplexRelay, RelaySummary};

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// A connected full-duplex byte stream whose directions can be shut down
/// independently.
///
/// Both pumps of a relay borrow the connection at the same time: one reads
/// through its half, the other writes through its half. Neither direction
/// needs a lock, so the halves are plain shared borrows.
pub trait Connection: Send + Sync {
    type Half<'a>: Read + Write
    where
        Self: 'a;

    /// Borrow the connection for reading or writing.
    fn half(&self) -> Self::Half<'_>;

    /// Shut down one or both directions without closing the handle.
    fn shutdown(&self, how: Shutdown) -> io::Result<()>;

    fn get_description(&self) -> String;
}

impl Connection for TcpStream {
    type Half<'a> = &'a TcpStream;

    fn half(&self) -> Self::Half<'_> {
        self
    }

    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        TcpStream::shutdown(self, how)
    }

    fn get_description(&self) -> String {
        match self.peer_addr() {
            Ok(addr) => format!("tcp peer {addr}"),
            Err(_) => "tcp peer (unknown)".to_string(),
        }
    }
}

#[cfg(unix)]
impl Connection for UnixStream {
    type Half<'a> = &'a UnixStream;

    fn half(&self) -> Self::Half<'_> {
        self
    }

    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        UnixStream::shutdown(self, how)
    }

    fn get_description(&self) -> String {
        match self.peer_addr() {
            Ok(addr) => match addr.as_pathname() {
                Some(path) => format!("unix peer {}", path.display()),
                None => "unix peer (unnamed)".to_string(),
            },
            Err(_) => "unix peer (unknown)".to_string(),
        }
    }
}
