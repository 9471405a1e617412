//! TCP Forward: transparent TCP relay to a fixed remote endpoint
//!
//! This library implements a transparent TCP relay. It listens on a local
//! port and, for every inbound connection, dials a fixed remote endpoint and
//! copies bytes bidirectionally until either side closes or errors. The
//! payload is treated as opaque bytes; there is no protocol awareness,
//! multiplexing, authentication or encryption.
//!
//! # Main features
//!
//! - One session per accepted client, isolated from every other session
//! - Two transfer pumps per session (one per direction) with prompt
//!   cross-direction stop propagation
//! - Idempotent, race-free teardown of both sockets
//! - YAML configuration with defaults written on first run
//!
//! # Example
//!
//! ```no_run
//! use tcpforward::{Endpoint, RelayServer, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let remote = Endpoint::new("127.0.0.1", 6000)?;
//!
//!     let server = RelayServer::bind(
//!         "0.0.0.0:25565".parse().unwrap(),
//!         remote,
//!         None, // unbounded sessions
//!     )
//!     .await?;
//!
//!     server.run().await
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod relay;

// Re-export commonly used structures and functions for convenience
pub use common::{parse_socket_addr, Endpoint, RelayError, Result};
pub use config::RelayConfig;
pub use relay::RelayServer;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
