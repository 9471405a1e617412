//! Common module
//!
//! This module contains shared types, errors, and utility functions used throughout the application.

pub mod error;
pub mod log;
pub mod types;

// Re-export commonly used types and functions
pub use error::{RelayError, Result};
pub use log::init_logger;
pub use types::{parse_socket_addr, Endpoint};
