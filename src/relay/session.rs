//! Connection session module
//!
//! A session owns one accepted client connection and one dialed remote
//! connection, runs a transfer pump per direction, and guarantees that both
//! sockets are torn down exactly once no matter which side ends first.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::common::{Endpoint, RelayError, Result};
use super::pump::{pump, Direction};

/// Grace interval between shutting down a socket's write side and closing it,
/// letting in-flight data drain.
pub(crate) const TEARDOWN_GRACE: Duration = Duration::from_millis(200);

/// Coarse liveness-check interval for the supervision loop.
const SUPERVISE_INTERVAL: Duration = Duration::from_secs(1);

/// Shared active flag of one session.
///
/// Gates pump continuation and admits exactly one teardown execution. Built
/// on a `watch` channel: [`deactivate`](Self::deactivate) is an atomic
/// test-and-set (true to false, exactly once per session, never reset) and
/// the same operation wakes every pump blocked on a read via its subscribed
/// receiver, so the peer direction stops promptly instead of waiting for its
/// own next read to fail.
pub struct ActiveFlag {
    state: watch::Sender<bool>,
}

impl ActiveFlag {
    pub fn new() -> Self {
        let (state, _) = watch::channel(true);
        Self { state }
    }

    /// Whether the session is still active
    pub fn is_active(&self) -> bool {
        *self.state.borrow()
    }

    /// Receiver that resolves once the flag is cleared
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Clear the flag. Returns `true` only for the single caller that
    /// performed the true-to-false transition; concurrent callers observe the
    /// flag already cleared and get `false`.
    pub fn deactivate(&self) -> bool {
        self.state.send_if_modified(|active| std::mem::replace(active, false))
    }
}

impl Default for ActiveFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// One relayed connection pair
pub struct Session {
    client_addr: std::net::SocketAddr,
    remote_addr: std::net::SocketAddr,
    active: ActiveFlag,
    // Write halves live here so teardown can close them from any task. Each
    // destination has its own lock; a destination is only ever written by one
    // pump, so the lock serializes pump writes against teardown, not against
    // another writer.
    client_wr: Mutex<Option<OwnedWriteHalf>>,
    remote_wr: Mutex<Option<OwnedWriteHalf>>,
}

impl Session {
    /// Run a session for one accepted client connection.
    ///
    /// Dials the forward target, pairs the two sockets, runs both transfer
    /// pumps and supervises them until completion. Teardown runs on every
    /// exit path; when this returns, both sockets are closed.
    ///
    /// Dial failure is local to this session: the client stream is dropped
    /// (closed) and no retry is attempted.
    pub async fn run(client: TcpStream, remote: &Endpoint) -> Result<()> {
        let client_addr = client.peer_addr().map_err(RelayError::Io)?;

        let server = match TcpStream::connect((remote.host(), remote.port())).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(
                    "Failed to reach forward target {} for client {}: {}",
                    remote, client_addr, e
                );
                return Err(RelayError::Dial {
                    target: remote.to_string(),
                    source: e,
                });
            }
        };
        let remote_addr = server.peer_addr().map_err(RelayError::Io)?;

        // Interactive relay; disable Nagle on both legs.
        client.set_nodelay(true)?;
        server.set_nodelay(true)?;

        info!("Connection established {} <-> {}", client_addr, remote_addr);

        let (client_rd, client_wr) = client.into_split();
        let (server_rd, server_wr) = server.into_split();

        let session = Arc::new(Session {
            client_addr,
            remote_addr,
            active: ActiveFlag::new(),
            client_wr: Mutex::new(Some(client_wr)),
            remote_wr: Mutex::new(Some(server_wr)),
        });

        let up = tokio::spawn(pump(session.clone(), client_rd, Direction::ClientToRemote));
        let down = tokio::spawn(pump(session.clone(), server_rd, Direction::RemoteToClient));

        session.supervise(&up, &down).await;
        session.teardown().await;

        for handle in [up, down] {
            if let Err(e) = handle.await {
                error!("Connection error: forwarding task failed: {}", e);
            }
        }

        debug!("Session finished {} <-> {}", session.client_addr, session.remote_addr);
        Ok(())
    }

    /// Liveness check only: a pump self-terminates on EOF, error or flag
    /// clear; this loop just notices it at a coarse interval and lets `run`
    /// proceed to teardown.
    async fn supervise(&self, up: &JoinHandle<()>, down: &JoinHandle<()>) {
        while self.active.is_active() {
            if up.is_finished() || down.is_finished() {
                info!(
                    "Forwarding task terminated: {} <-> {}",
                    self.client_addr, self.remote_addr
                );
                return;
            }
            sleep(SUPERVISE_INTERVAL).await;
        }
    }

    pub(crate) fn active(&self) -> &ActiveFlag {
        &self.active
    }

    /// The write half a pump of the given direction targets
    pub(crate) fn writer(&self, direction: Direction) -> &Mutex<Option<OwnedWriteHalf>> {
        match direction {
            Direction::ClientToRemote => &self.remote_wr,
            Direction::RemoteToClient => &self.client_wr,
        }
    }

    /// Idempotent teardown of both sockets.
    ///
    /// Safe to invoke concurrently from both pump exit paths and from
    /// supervision: the flag's test-and-set admits exactly one caller to the
    /// close sequence, everyone else returns immediately. The admitted caller
    /// shuts down each write side (flush + FIN), waits the grace interval for
    /// in-flight data, then closes the half by dropping it. Failures are
    /// logged as close warnings and never propagated.
    pub(crate) async fn teardown(&self) {
        if !self.active.deactivate() {
            return;
        }

        for (label, slot) in [("client", &self.client_wr), ("remote", &self.remote_wr)] {
            let writer = slot.lock().await.take();
            if let Some(mut writer) = writer {
                if let Err(e) = writer.shutdown().await {
                    warn!("Close warning ({} side): {}", label, e);
                }
                sleep(TEARDOWN_GRACE).await;
            }
        }

        debug!("Connection closed: {} <-> {}", self.client_addr, self.remote_addr);
    }
}
