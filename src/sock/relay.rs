use super::{BUFLEN, Connection, Pump, PumpOutcome, PumpReport};
use serde::Serialize;
use std::io::{Read, Write};
use std::net::Shutdown;
use std::thread::{self, ScopedJoinHandle};

/// Result of one relay session.
#[derive(Debug, Clone, Serialize)]
pub struct RelaySummary {
    pub peer: String,
    /// Bytes moved from the local input to the connection.
    pub sent: u64,
    /// Bytes moved from the connection to the local output.
    pub received: u64,
    pub upload: PumpOutcome,
    pub download: PumpOutcome,
}

impl RelaySummary {
    pub fn failed(&self) -> bool {
        !self.upload.is_done() || !self.download.is_done()
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Upload,
    Download,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Upload => "upload",
            Direction::Download => "download",
        }
    }

    fn activity(self) -> &'static str {
        match self {
            Direction::Upload => "sending",
            Direction::Download => "receiving",
        }
    }

    /// The half of the connection this direction owns.
    fn half(self) -> Shutdown {
        match self {
            Direction::Upload => Shutdown::Write,
            Direction::Download => Shutdown::Read,
        }
    }
}

/// Shuttles bytes between a local input/output pair and one connection.
///
/// Upload (input to connection) and download (connection to output) run on
/// two threads. Each direction half-closes the connection as soon as its
/// pump finishes; the connection itself is closed only after both pumps
/// have been joined.
pub struct DuplexRelay<C: Connection> {
    conn: C,
    buffer_size: usize,
}

impl<C: Connection> DuplexRelay<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            buffer_size: BUFLEN,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn run<I, O>(self, input: I, output: O) -> RelaySummary
    where
        I: Read + Send,
        O: Write + Send,
    {
        let Self { conn, buffer_size } = self;
        let peer = conn.get_description();
        log::debug!("Relaying {peer}");

        let shared = &conn;
        let (upload, download) = thread::scope(|s| {
            let upload = s.spawn(move || {
                let report = Pump::new(Direction::Upload.label(), buffer_size)
                    .run(input, shared.half());
                finish_direction(shared, Direction::Upload, &report);
                report
            });
            let download = s.spawn(move || {
                let report = Pump::new(Direction::Download.label(), buffer_size)
                    .run(shared.half(), output);
                finish_direction(shared, Direction::Download, &report);
                report
            });
            (
                join_pump(upload, Direction::Upload),
                join_pump(download, Direction::Download),
            )
        });

        drop(conn);
        log::debug!("Connection closed: {peer}");

        RelaySummary {
            peer,
            sent: upload.bytes,
            received: download.bytes,
            upload: upload.outcome,
            download: download.outcome,
        }
    }
}

fn finish_direction<C: Connection>(conn: &C, dir: Direction, report: &PumpReport) {
    match report.outcome {
        PumpOutcome::Done => {}
        PumpOutcome::ReadError(kind) => eprintln!("Error in {}: {kind}", dir.activity()),
        // The sink is broken, leave the half untouched
        PumpOutcome::WriteError(kind) => {
            eprintln!("Error in {}: {kind}", dir.activity());
            return;
        }
        PumpOutcome::Aborted => return,
    }
    let how = dir.half();
    match conn.shutdown(how) {
        Ok(()) => log::debug!("{}: shut down {how:?} half", dir.label()),
        Err(e) => log::debug!("{}: shutdown {how:?} failed: {e}", dir.label()),
    }
}

fn join_pump(handle: ScopedJoinHandle<'_, PumpReport>, dir: Direction) -> PumpReport {
    handle.join().unwrap_or_else(|_| {
        eprintln!("Error in {}: pump thread panicked", dir.activity());
        PumpReport {
            bytes: 0,
            outcome: PumpOutcome::Aborted,
        }
    })
}
