//! Shared types module
//!
//! This module contains shared data types used throughout the application.

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;

use super::error::{RelayError, Result};

/// A validated host/port pair describing one side of the relay.
///
/// The host may be an IP address or a DNS name; resolution happens at dial
/// time. Construction rejects empty hosts and port 0, so an `Endpoint` held
/// anywhere in the program is always usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create a new endpoint, validating host and port
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into().trim().to_string();
        if host.is_empty() {
            return Err(RelayError::Config("Empty forward host".to_string()));
        }
        if port == 0 {
            return Err(RelayError::Config("Invalid port: 0".to_string()));
        }
        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parse a socket address
///
/// Tries direct parsing first, then falls back to DNS resolution via
/// `ToSocketAddrs` and takes the first resolved address.
pub fn parse_socket_addr(addr: &str) -> Result<SocketAddr> {
    if let Ok(socket_addr) = SocketAddr::from_str(addr) {
        return Ok(socket_addr);
    }

    match addr.to_socket_addrs() {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => Ok(addr),
            None => Err(RelayError::Config(format!("Failed to parse address: {}", addr))),
        },
        Err(e) => Err(RelayError::Config(format!("Failed to parse address {}: {}", addr, e))),
    }
}
