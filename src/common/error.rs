//! Error handling module
//!
//! This module defines the error types and result type aliases used in the application.

use thiserror::Error;
use std::io;
use std::net::SocketAddr;

/// Relay error type
///
/// Only configuration and bind failures are fatal at startup. Everything that
/// happens inside a running session (transfer errors, close failures) is
/// logged and contained there; it never surfaces through this type to the
/// accept loop.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Configuration error (malformed, missing or out-of-range values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The listen address could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: io::Error,
    },

    /// The forward target could not be reached for one client connection
    #[error("Failed to reach forward target {target}: {source}")]
    Dial {
        target: String,
        source: io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `RelayError`.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        // Test IO error conversion
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let relay_err: RelayError = io_err.into();

        match relay_err {
            RelayError::Io(_) => {}
            _ => panic!("Should convert to IO error"),
        }
    }

    #[test]
    fn test_error_display() {
        // Test error display
        let err = RelayError::Config("Invalid local port: 70000".to_string());
        let err_str = format!("{}", err);
        assert!(err_str.contains("Invalid local port"));

        let err = RelayError::Dial {
            target: "example.com:25565".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(format!("{}", err).contains("example.com:25565"));
    }
}
