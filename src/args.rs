use crate::error::ConfigError;
use crate::modes::{
    Command,
    relay::{RelayMode, RelayModeCommand, RelayParams, RelayParamsBuilder},
};
use crate::sock::BUFLEN;
use crate::sockets::{
    Establisher,
    tcp_client::TcpClient,
    tcp_server::{TcpServer, default_ip_local},
};

use clap::{ArgGroup, Parser, builder::TypedValueParser};

use std::net::IpAddr;
use std::process;

const MAX_HOST_LEN: usize = 256;

/// Relay one TCP connection to stdin/stdout
#[derive(Parser, Debug)]
#[command(version, about)]
#[command(group(ArgGroup::new("mode").required(true).args(["server", "connect"])))]
pub struct RelayArgs {
    /// Listen on PORT and relay the first accepted connection
    #[arg(short, long, value_name = "PORT", value_parser = parse_port)]
    server: Option<u16>,
    /// Connect to HOST:PORT and relay the connection
    #[arg(short, long, value_name = "HOST:PORT", value_parser = parse_host_port)]
    connect: Option<HostPort>,
    /// Local address to listen on (server mode, all interfaces by default)
    #[arg(short, long, value_name = "IP", conflicts_with = "connect")]
    bind: Option<IpAddr>,
    /// Print a JSON transfer summary on stderr when the relay ends
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Exit with 1 when sending or receiving failed
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Transfer buffer size in bytes
    #[arg(long, hide = true, default_value_t = BUFLEN,
          value_parser = clap::value_parser!(u32).range(1..).map(|v| v as usize))]
    buffer_size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

fn parse_port(s: &str) -> Result<u16, String> {
    s.parse::<u16>()
        .map_err(|_| "Port number should be integer.".to_string())
}

fn parse_host_port(s: &str) -> Result<HostPort, String> {
    const SHAPE: &str = "Address should be hostname:port.";
    let (host, port) = s.split_once(':').ok_or(SHAPE)?;
    if host.is_empty() || host.len() > MAX_HOST_LEN {
        return Err(SHAPE.to_string());
    }
    let port = port.parse::<u16>().map_err(|_| SHAPE.to_string())?;
    Ok(HostPort {
        host: host.to_string(),
        port,
    })
}

/// What to do with the one connection of this process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Server { bind: IpAddr, port: u16 },
    Client { host: String, port: u16 },
}

impl Mode {
    pub fn establisher(&self) -> Box<dyn Establisher> {
        match self {
            Mode::Server { bind, port } => Box::new(TcpServer::new(*bind, *port)),
            Mode::Client { host, port } => Box::new(TcpClient::new(host.clone(), *port)),
        }
    }
}

/// Immutable configuration built once from the command line.
#[derive(Clone, Debug)]
pub struct Config {
    pub mode: Mode,
    pub relay: RelayParams,
}

impl RelayArgs {
    pub fn get_scenario() -> Box<dyn Command> {
        let args = Self::try_parse().unwrap_or_else(|e| {
            if !e.use_stderr() {
                // --help and --version
                e.exit()
            }
            let _ = e.print();
            process::exit(1)
        });
        let config = args.into_config().unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1)
        });
        log::debug!("{config:?}");

        Box::new(RelayModeCommand::new(RelayMode::new(
            config.mode.establisher(),
            config.relay,
        )))
    }

    pub fn into_config(self) -> Result<Config, ConfigError> {
        let mode = match (self.server, self.connect) {
            (Some(port), None) => Mode::Server {
                bind: self.bind.unwrap_or_else(default_ip_local),
                port,
            },
            (None, Some(_)) if self.bind.is_some() => return Err(ConfigError::BindWithoutServer),
            (None, Some(HostPort { host, port })) => Mode::Client { host, port },
            _ => return Err(ConfigError::NoMode),
        };
        let relay = RelayParamsBuilder::default()
            .buffer_size(self.buffer_size)
            .stats(self.stats)
            .strict(self.strict)
            .build()?;
        Ok(Config { mode, relay })
    }
}
