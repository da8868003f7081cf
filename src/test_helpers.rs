use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};

/// A connected loopback TCP pair: (dialing side, accepted side).
pub fn loopback_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let local = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (remote, _) = listener.accept().unwrap();
    (local, remote)
}

/// A loopback port with nothing listening on it.
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Deterministic non-repeating-looking test payload.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Sink accepting at most `step` bytes per write call.
pub struct TrickleWriter {
    step: usize,
    pub data: Vec<u8>,
    pub flushes: usize,
}

impl TrickleWriter {
    pub fn new(step: usize) -> Self {
        Self {
            step,
            data: Vec::new(),
            flushes: 0,
        }
    }
}

impl Write for TrickleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.step);
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Sink that never makes progress.
pub struct ZeroWriter;

impl Write for ZeroWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Ok(0)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that breaks with `BrokenPipe` once `limit` bytes were accepted.
pub struct FailAfterWriter {
    limit: usize,
    pub data: Vec<u8>,
}

impl FailAfterWriter {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            data: Vec::new(),
        }
    }
}

impl Write for FailAfterWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.data.len();
        if room == 0 {
            return Err(io::Error::from(ErrorKind::BrokenPipe));
        }
        let n = buf.len().min(room);
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

enum Step {
    Data(Vec<u8>),
    Fail(ErrorKind),
}

/// Source replaying scripted chunks and errors, then end of stream.
pub struct FlakyReader {
    steps: VecDeque<Step>,
}

impl FlakyReader {
    pub fn new(data: Vec<u8>, error: ErrorKind) -> Self {
        let mut steps = VecDeque::new();
        if !data.is_empty() {
            steps.push_back(Step::Data(data));
        }
        steps.push_back(Step::Fail(error));
        Self { steps }
    }

    pub fn then(mut self, data: Vec<u8>) -> Self {
        self.steps.push_back(Step::Data(data));
        self
    }
}

impl Read for FlakyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.steps.pop_front() {
            None => Ok(0),
            Some(Step::Fail(kind)) => Err(io::Error::from(kind)),
            Some(Step::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.steps.push_front(Step::Data(data.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}
