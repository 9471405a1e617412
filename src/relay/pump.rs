//! Transfer pump module
//!
//! A pump copies bytes from one socket's read side to the other socket's
//! write side until EOF, error, or the session's active flag is cleared.

use std::fmt;
use std::io;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use super::session::Session;

/// Fixed read buffer size per pump
pub(crate) const BUFFER_SIZE: usize = 4096;

/// Transfer direction, used to pick the destination writer and to label
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    ClientToRemote,
    RemoteToClient,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ClientToRemote => write!(f, "client->remote"),
            Direction::RemoteToClient => write!(f, "remote->client"),
        }
    }
}

/// Run one directional copy loop.
///
/// Reads are raced against the session's stop signal, so a pump blocked on a
/// quiet socket is woken as soon as the peer direction terminates instead of
/// waiting for its own next read. Every chunk is written under the
/// destination's write-side lock and flushed immediately; this is an
/// interactive relay, not a throughput-batched one.
///
/// Whichever way the loop ends, the pump's final act is the session teardown:
/// its test-and-set clears the flag (signalling the peer pump) and admits
/// exactly one close sequence.
pub(crate) async fn pump(session: Arc<Session>, mut src: OwnedReadHalf, direction: Direction) {
    let mut stop = session.active().subscribe();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    while session.active().is_active() {
        let n = tokio::select! {
            _ = stop.changed() => break,
            result = src.read(&mut buffer) => match result {
                Ok(0) => {
                    debug!("{}: source reached EOF", direction);
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    log_transfer_error(direction, &e);
                    break;
                }
            },
        };

        let mut guard = session.writer(direction).lock().await;
        let Some(writer) = guard.as_mut() else {
            // Destination already taken by teardown.
            break;
        };
        if let Err(e) = write_chunk(writer, &buffer[..n]).await {
            log_transfer_error(direction, &e);
            break;
        }
    }

    session.teardown().await;
}

async fn write_chunk(writer: &mut OwnedWriteHalf, chunk: &[u8]) -> io::Result<()> {
    writer.write_all(chunk).await?;
    writer.flush().await
}

fn log_transfer_error(direction: Direction, err: &io::Error) {
    if is_disconnect(err) {
        // Peer reset or socket already closed: a normal connection-end signal.
        info!("Safe closure ({}): {}", direction, err);
    } else {
        warn!("Transfer exception ({}): {:?}", direction, err.kind());
    }
}

/// Whether an I/O error means "socket no longer usable" rather than an
/// unexpected transfer failure.
fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof
    )
}
