//! Relay server module
//!
//! This module implements the top-level lifecycle of the relay: binding the
//! listener, running the accept loop, and managing the set of session tasks.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::common::{Endpoint, RelayError, Result};
use crate::{APP_NAME, VERSION};
use super::session::Session;

/// Relay server structure
///
/// Accepts client connections and forwards each one to the fixed remote
/// endpoint. Every connection runs as its own session task; sessions never
/// affect each other or the accept loop.
pub struct RelayServer {
    listener: TcpListener,
    remote: Endpoint,
    /// Optional cap on concurrent sessions. `None` preserves the original
    /// unbounded behavior; the bound exists so operators can opt into
    /// admission control under load.
    limit: Option<Arc<Semaphore>>,
}

impl RelayServer {
    /// Bind the listening socket.
    ///
    /// # Parameters
    ///
    /// * `listen_addr` - Local address to listen on
    /// * `remote` - Forward target for every accepted connection
    /// * `max_connections` - Optional concurrent-session cap (`None` = unbounded)
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Bind` if the address is unavailable. No other
    /// side effects have happened at that point.
    pub async fn bind(
        listen_addr: SocketAddr,
        remote: Endpoint,
        max_connections: Option<usize>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(listen_addr)
            .await
            .map_err(|source| RelayError::Bind {
                addr: listen_addr,
                source,
            })?;

        Ok(Self {
            listener,
            remote,
            limit: max_connections.map(|n| Arc::new(Semaphore::new(n))),
        })
    }

    /// The actually bound local address (useful when binding port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(RelayError::Io)
    }

    /// Run the accept loop until the listening socket fails terminally.
    ///
    /// Transient accept errors are logged and the loop continues; an error
    /// that means the listener itself is gone ends the loop, after which all
    /// in-flight sessions are drained before returning. There is no runtime
    /// stop command; process termination is the shutdown path.
    pub async fn run(&self) -> Result<()> {
        let local_addr = self.local_addr()?;

        info!("{} v{}", APP_NAME, VERSION);
        info!("Listening: {}", local_addr);
        info!("Forwarding: {}", self.remote);
        match &self.limit {
            Some(semaphore) => info!("Session limit: {}", semaphore.available_permits()),
            None => debug!("Session limit: unbounded"),
        }

        let mut sessions = JoinSet::new();

        loop {
            // Reap finished session tasks and surface panics.
            while let Some(result) = sessions.try_join_next() {
                if let Err(e) = result {
                    error!("Session task error: {}", e);
                }
            }

            // With a session cap configured, wait for a free slot before
            // accepting; the permit is held for the session lifetime.
            let permit = match &self.limit {
                Some(semaphore) => semaphore.clone().acquire_owned().await.ok(),
                None => None,
            };

            match self.listener.accept().await {
                Ok((client, client_addr)) => {
                    info!("Accepted connection from {}", client_addr);
                    let remote = self.remote.clone();
                    sessions.spawn(async move {
                        let _permit = permit;
                        // Session errors are contained and logged there.
                        let _ = Session::run(client, &remote).await;
                    });
                }
                Err(e) if is_transient_accept_error(&e) => {
                    warn!("Accept failed (retrying): {}", e);
                }
                Err(e) => {
                    error!("Listener no longer usable: {}", e);
                    break;
                }
            }
        }

        // Drain in-flight sessions.
        while let Some(result) = sessions.join_next().await {
            if let Err(e) = result {
                error!("Session task error: {}", e);
            }
        }

        Ok(())
    }
}

/// Accept errors that concern the accepted connection rather than the
/// listener itself; the loop retries on these.
fn is_transient_accept_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_reports_error_for_taken_port() {
        let first = RelayServer::bind(
            "127.0.0.1:0".parse().unwrap(),
            Endpoint::new("127.0.0.1", 9).unwrap(),
            None,
        )
        .await
        .unwrap();
        let taken = first.local_addr().unwrap();

        let second = RelayServer::bind(taken, Endpoint::new("127.0.0.1", 9).unwrap(), None).await;
        match second {
            Err(RelayError::Bind { addr, .. }) => assert_eq!(addr, taken),
            other => panic!("expected bind error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_transient_accept_error_classification() {
        let reset = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(is_transient_accept_error(&reset));

        let fatal = io::Error::new(io::ErrorKind::InvalidInput, "bad listener");
        assert!(!is_transient_accept_error(&fatal));
    }
}
