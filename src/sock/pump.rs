use pretty_hex::PrettyHex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::{ErrorKind, Read, Write};

/// Default size of the per-pump transfer buffer.
pub const BUFLEN: usize = 65536;

/// How a pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// The source reported a clean end of stream.
    Done,
    /// Reading the source failed. Bytes already read were delivered.
    ReadError(ErrorKind),
    /// Writing (or flushing) the sink failed or stalled at zero bytes.
    WriteError(ErrorKind),
    /// The pump thread panicked.
    Aborted,
}

impl PumpOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, PumpOutcome::Done)
    }
}

impl fmt::Display for PumpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PumpOutcome::Done => write!(f, "done"),
            PumpOutcome::ReadError(kind) => write!(f, "read error: {kind}"),
            PumpOutcome::WriteError(kind) => write!(f, "write error: {kind}"),
            PumpOutcome::Aborted => write!(f, "aborted"),
        }
    }
}

impl Serialize for PumpOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpReport {
    /// Bytes accepted by the sink.
    pub bytes: u64,
    pub outcome: PumpOutcome,
}

/// Single-use unidirectional copier with a fixed-size buffer.
pub struct Pump {
    label: &'static str,
    buffer: Vec<u8>,
}

impl Pump {
    pub fn new(label: &'static str, buffer_size: usize) -> Self {
        Self {
            label,
            buffer: vec![0; buffer_size.max(1)],
        }
    }

    /// Copy `source` into `sink` until end of stream or the first failure.
    ///
    /// Every chunk is fully written and flushed before the next read. Partial
    /// writes are resumed, a write accepting zero bytes is a failure and
    /// nothing is retried except `Interrupted`.
    pub fn run<R: Read, W: Write>(self, mut source: R, mut sink: W) -> PumpReport {
        let Self { label, mut buffer } = self;
        let mut bytes: u64 = 0;

        let outcome = 'pump: loop {
            let size = match source.read(&mut buffer) {
                Ok(0) => break PumpOutcome::Done,
                Ok(size) => size,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::debug!("{label}: read failed: {e}");
                    break PumpOutcome::ReadError(e.kind());
                }
            };
            if log::log_enabled!(log::Level::Trace) {
                log::trace!("{label}: {size} bytes\n{}", buffer[..size].hex_dump());
            }

            let mut chunk = &buffer[..size];
            while !chunk.is_empty() {
                match sink.write(chunk) {
                    Ok(0) => {
                        log::debug!("{label}: sink accepted no bytes");
                        break 'pump PumpOutcome::WriteError(ErrorKind::WriteZero);
                    }
                    Ok(written) => {
                        bytes += written as u64;
                        chunk = &chunk[written..];
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        log::debug!("{label}: write failed: {e}");
                        break 'pump PumpOutcome::WriteError(e.kind());
                    }
                }
            }
            if let Err(e) = sink.flush() {
                log::debug!("{label}: flush failed: {e}");
                break PumpOutcome::WriteError(e.kind());
            }
        };

        log::debug!("{label}: finished after {bytes} bytes ({outcome})");
        PumpReport { bytes, outcome }
    }
}
