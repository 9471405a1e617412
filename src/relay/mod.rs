//! Relay module
//!
//! This module implements the core functionality of the relay: the accept
//! loop, the per-connection session lifecycle, the paired transfer pumps and
//! the coordinated teardown protocol. The payload is opaque bytes; there is
//! no protocol awareness anywhere in here.

pub mod server;
pub mod session;
mod pump;

pub use server::RelayServer;
pub use session::{ActiveFlag, Session};
