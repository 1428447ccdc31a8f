use std::fmt;
use std::path::PathBuf;

use crate::error::{ClientError, Result};

/// Port a plain-text daemon listens on when the address omits one.
pub const DEFAULT_TCP_PORT: u16 = 2375;

/// Where the daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Unix(PathBuf),
    /// `host:port`, resolved at connect time.
    Tcp(String),
}

impl Endpoint {
    /// Accepts `unix:///path`, `tcp://host[:port]` and `http://host[:port]`.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| ClientError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;

        match scheme {
            "unix" => {
                if rest.is_empty() {
                    return Err(invalid("empty socket path"));
                }
                Ok(Endpoint::Unix(PathBuf::from(rest)))
            }
            "tcp" | "http" => {
                let authority = rest.trim_end_matches('/');
                if authority.is_empty() {
                    return Err(invalid("empty host"));
                }
                if authority.contains('/') {
                    return Err(invalid("path components are not supported"));
                }
                match authority.rsplit_once(':') {
                    Some((host, port)) if !host.is_empty() => {
                        port.parse::<u16>().map_err(|_| invalid("bad port"))?;
                        Ok(Endpoint::Tcp(authority.to_string()))
                    }
                    Some(_) => Err(invalid("empty host")),
                    None => Ok(Endpoint::Tcp(format!("{}:{}", authority, DEFAULT_TCP_PORT))),
                }
            }
            "https" => Err(invalid("TLS endpoints are not supported")),
            _ => Err(invalid("unsupported scheme")),
        }
    }

    /// Value for the `Host` header.
    pub fn host_header(&self) -> &str {
        match self {
            Endpoint::Unix(_) => "localhost",
            Endpoint::Tcp(addr) => addr,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            Endpoint::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}
