use super::Establisher;
use crate::error::EstablishError;
use std::io::{self, Write};
use std::net::{SocketAddr, SocketAddrV4, TcpStream, ToSocketAddrs};

/// Turns a host name into candidate addresses, in resolution order.
pub trait Resolver {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>>;
}

/// Resolver backed by the system name service.
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        Ok((host, port).to_socket_addrs()?.collect())
    }
}

/// Client side: dials each resolved IPv4 candidate until one answers.
pub struct TcpClient<R = SystemResolver> {
    host: String,
    port: u16,
    resolver: R,
}

impl TcpClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_resolver(host, port, SystemResolver)
    }
}

impl<R: Resolver> TcpClient<R> {
    pub fn with_resolver(host: impl Into<String>, port: u16, resolver: R) -> Self {
        Self {
            host: host.into(),
            port,
            resolver,
        }
    }

    /// Resolve the host and keep its IPv4 addresses.
    ///
    /// A host is treated as IPv4 when any IPv4 address comes back; other
    /// families are dropped. A host with no IPv4 address at all is refused
    /// before anything is dialed. This mirrors an IPv4-only host lookup.
    pub fn candidates(&self) -> Result<Vec<SocketAddrV4>, EstablishError> {
        let resolved = self
            .resolver
            .resolve(&self.host, self.port)
            .map_err(|source| EstablishError::Resolve {
                host: self.host.clone(),
                source,
            })?;
        log::debug!("{} resolved to {resolved:?}", self.host);

        let candidates: Vec<SocketAddrV4> = resolved
            .iter()
            .filter_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(*v4),
                SocketAddr::V6(_) => None,
            })
            .collect();
        if candidates.is_empty() && !resolved.is_empty() {
            return Err(EstablishError::UnsupportedProtocol {
                host: self.host.clone(),
            });
        }
        Ok(candidates)
    }

    pub fn connect(&self, diag: &mut dyn Write) -> Result<TcpStream, EstablishError> {
        let candidates = self.candidates()?;

        for candidate in &candidates {
            let _ = writeln!(diag, "Connecting to: {} ...", candidate.ip());
            match TcpStream::connect(candidate) {
                Ok(stream) => {
                    let _ = writeln!(diag, "Connected.");
                    return Ok(stream);
                }
                Err(e) => {
                    log::debug!("Connecting to {candidate} failed: {e}");
                    let _ = writeln!(diag, "Failed.");
                }
            }
        }

        Err(EstablishError::AllCandidatesFailed {
            host: self.host.clone(),
            port: self.port,
            attempts: candidates.len(),
        })
    }
}

impl<R: Resolver> Establisher for TcpClient<R> {
    fn establish(&self, diag: &mut dyn Write) -> Result<TcpStream, EstablishError> {
        self.connect(diag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::unused_port;
    use std::io::{ErrorKind, Read};
    use std::net::{Ipv4Addr, Ipv6Addr, TcpListener};
    use std::thread;

    struct StaticResolver(Vec<SocketAddr>);

    impl Resolver for StaticResolver {
        fn resolve(&self, _host: &str, _port: u16) -> io::Result<Vec<SocketAddr>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenResolver;

    impl Resolver for BrokenResolver {
        fn resolve(&self, _host: &str, _port: u16) -> io::Result<Vec<SocketAddr>> {
            Err(io::Error::new(ErrorKind::NotFound, "no such host"))
        }
    }

    fn v4(octet: u8, port: u16) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::new(127, 0, 0, octet), port))
    }

    fn v6(port: u16) -> SocketAddr {
        SocketAddr::from((Ipv6Addr::LOCALHOST, port))
    }

    #[test]
    fn keeps_ipv4_in_resolution_order() {
        let client = TcpClient::with_resolver(
            "multi",
            80,
            StaticResolver(vec![v4(3, 80), v6(80), v4(1, 80), v4(2, 80)]),
        );
        let ips: Vec<u8> = client
            .candidates()
            .unwrap()
            .iter()
            .map(|a| a.ip().octets()[3])
            .collect();
        assert_eq!(ips, [3, 1, 2]);
    }

    #[test]
    fn ipv6_only_host_is_unsupported() {
        let client = TcpClient::with_resolver("six", 80, StaticResolver(vec![v6(80)]));
        let mut diag = Vec::new();
        let err = client.connect(&mut diag).unwrap_err();
        assert!(matches!(err, EstablishError::UnsupportedProtocol { ref host } if host == "six"));
        assert!(diag.is_empty());
    }

    #[test]
    fn resolution_failure_is_fatal() {
        let client = TcpClient::with_resolver("nowhere", 80, BrokenResolver);
        let err = client.connect(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, EstablishError::Resolve { .. }));
    }

    #[test]
    fn every_candidate_is_tried_before_giving_up() {
        let port = unused_port();
        let client = TcpClient::with_resolver(
            "dead",
            port,
            StaticResolver(vec![v4(1, port), v4(1, port), v4(1, port)]),
        );
        let mut diag = Vec::new();
        let err = client.connect(&mut diag).unwrap_err();

        match err {
            EstablishError::AllCandidatesFailed { host, attempts, .. } => {
                assert_eq!(host, "dead");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        let diag = String::from_utf8(diag).unwrap();
        assert_eq!(diag.matches("Connecting to: 127.0.0.1 ...").count(), 3);
        assert_eq!(diag.matches("Failed.").count(), 3);
        assert!(!diag.contains("Connected."));
    }

    #[test]
    fn empty_resolution_fails_without_attempts() {
        let client = TcpClient::with_resolver("void", 80, StaticResolver(Vec::new()));
        let err = client.connect(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, EstablishError::AllCandidatesFailed { attempts: 0, .. }));
    }

    #[test]
    fn stops_at_first_answering_candidate() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let live = listener.local_addr().unwrap().port();
        let dead = unused_port();
        let server = thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();
            let mut got = String::new();
            peer.read_to_string(&mut got).unwrap();
            got
        });

        let client = TcpClient::with_resolver(
            "mixed",
            live,
            StaticResolver(vec![v4(1, dead), v4(1, live), v4(1, dead)]),
        );
        let mut diag = Vec::new();
        let mut stream = client.connect(&mut diag).unwrap();
        stream.write_all(b"hi").unwrap();
        drop(stream);
        assert_eq!(server.join().unwrap(), "hi");

        let diag = String::from_utf8(diag).unwrap();
        assert_eq!(
            diag,
            "Connecting to: 127.0.0.1 ...\nFailed.\nConnecting to: 127.0.0.1 ...\nConnected.\n"
        );
    }
}
