use super::Establisher;
use crate::error::EstablishError;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream};

/// Default local address: every IPv4 interface.
pub fn default_ip_local() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

/// Server side: listens once and hands out exactly one accepted peer.
pub struct TcpServer {
    addr: SocketAddr,
}

impl TcpServer {
    pub fn new(ip_local: IpAddr, port_local: u16) -> Self {
        Self {
            addr: SocketAddr::new(ip_local, port_local),
        }
    }

    pub fn listen(&self) -> Result<TcpListener, EstablishError> {
        let listener = TcpListener::bind(self.addr).map_err(|source| EstablishError::Bind {
            addr: self.addr,
            source,
        })?;
        if let Ok(local) = listener.local_addr() {
            log::debug!("Listening on {local}");
        }
        Ok(listener)
    }

    /// Accept a single peer and stop listening.
    pub fn accept_one(listener: TcpListener) -> Result<TcpStream, EstablishError> {
        let (stream, peer) = listener.accept().map_err(EstablishError::Accept)?;
        drop(listener);
        log::debug!("Accepted {peer}, listener closed");
        Ok(stream)
    }
}

impl Establisher for TcpServer {
    fn establish(&self, _diag: &mut dyn Write) -> Result<TcpStream, EstablishError> {
        Self::accept_one(self.listen()?)
    }
}
