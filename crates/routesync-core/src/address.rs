//! Router address normalization
//!
//! Accepts `host`, `host:port`, `[v6]` and `[v6]:port`. A missing or empty
//! port falls back to the RouterOS API default, 8728. Everything else that
//! fails to split is a connection error.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Default RouterOS API port (plain, non-TLS)
pub const DEFAULT_API_PORT: u16 = 8728;

/// A router endpoint with its port resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterAddress {
    host: String,
    port: u16,
}

impl RouterAddress {
    /// Parse and normalize an address string
    ///
    /// # Examples
    ///
    /// ```
    /// use routesync_core::RouterAddress;
    ///
    /// let addr = RouterAddress::parse("10.0.0.1").unwrap();
    /// assert_eq!(addr.port(), 8728);
    /// assert_eq!(addr.to_string(), "10.0.0.1:8728");
    /// ```
    pub fn parse(address: &str) -> Result<Self> {
        let address = address.trim();
        let (host, port) = split_host_port(address)?;

        if host.is_empty() {
            return Err(Error::connection(format!("missing host in address {:?}", address)));
        }
        if host.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(Error::connection(format!("invalid host in address {:?}", address)));
        }

        let port = match port {
            None | Some("") => DEFAULT_API_PORT,
            Some(p) => p
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| Error::connection(format!("invalid port {:?} in address {:?}", p, address)))?,
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Host name or IP literal, without brackets
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for RouterAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RouterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Split into host and optional port; `None` means the port was absent
fn split_host_port(address: &str) -> Result<(&str, Option<&str>)> {
    if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| Error::connection(format!("missing ']' in address {:?}", address)))?;
        return match tail {
            "" => Ok((host, None)),
            _ => match tail.strip_prefix(':') {
                Some(port) => Ok((host, Some(port))),
                None => Err(Error::connection(format!(
                    "unexpected characters after ']' in address {:?}",
                    address
                ))),
            },
        };
    }

    match address.rsplit_once(':') {
        None => Ok((address, None)),
        Some((host, _)) if host.contains(':') => Err(Error::connection(format!(
            "too many colons in address {:?}; use [host]:port for IPv6",
            address
        ))),
        Some((host, port)) => Ok((host, Some(port))),
    }
}
