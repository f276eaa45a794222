//! Per-connection handler: greeting, message routing, and teardown.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register with the hub → client receives `connected`
//!   2. Loop: write queued server messages, read client frames, apply them,
//!      and probe the peer with transport pings while it is quiet
//!   3. On close, error, or idle timeout → the guard disconnects from the hub
//!
//! Any inbound frame counts as activity, including the pong a browser
//! sends back for our ping, so only a peer that has stopped answering
//! altogether reaches the idle deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cardroom_protocol::{ClientMessage, Codec, PlayerId, ServerMessage};
use cardroom_session::Outbound;
use cardroom_transport::{Connection, Frame, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::CardroomError;
use crate::server::ServerState;

/// Reply to frames that do not decode as a known request.
const MALFORMED: &str = "malformed request";

/// Drop guard that removes a connection from the hub when the handler
/// exits, however it exits.
///
/// `Drop` is synchronous, so the async lock is taken in a spawned task.
/// `Hub::disconnect` is idempotent, so an early explicit cleanup and this
/// guard never double-notify anyone.
struct ConnectionGuard {
    player_id: PlayerId,
    state: Arc<ServerState>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.hub.lock().await.disconnect(player_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), CardroomError> {
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::debug!(%conn_id, %player_id, "handling new connection");

    // Register and arm the guard together: if registration fails there is
    // nothing to clean up. The handler keeps its own sender so replies it
    // produces itself share one queue with the hub's.
    let (replies, mut outbound) = mpsc::unbounded_channel();
    state.hub.lock().await.connect(player_id, replies.clone())?;
    let _guard = ConnectionGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let start = Instant::now();
    let mut deadline = time::Instant::now() + state.idle_timeout;
    let period = keepalive_period(state.idle_timeout);
    let mut keepalive = time::interval_at(time::Instant::now() + period, period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Queued replies go out before the next request is read.
            biased;

            queued = outbound.recv() => {
                let Some(message) = queued else { break };
                let bytes = state.codec.encode(&message)?;
                conn.send(&bytes).await?;
            }
            received = conn.recv() => {
                let frame = match received {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };
                deadline = time::Instant::now() + state.idle_timeout;
                if let Frame::Data(data) = frame {
                    dispatch(&state, &replies, player_id, &data, start).await?;
                }
            }
            _ = keepalive.tick() => {
                conn.ping().await?;
            }
            () = time::sleep_until(deadline) => {
                tracing::info!(%player_id, "connection timed out");
                break;
            }
        }
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(%player_id, error = %e, "close failed");
    }
    // _guard drops here → hub disconnect fires.
    Ok(())
}

/// Decodes one request and applies it.
///
/// Keep-alives and decode failures are answered from this task; everything
/// else goes through the hub. Either way the reply lands on the
/// connection's outbound queue.
async fn dispatch(
    state: &ServerState,
    replies: &Outbound,
    player_id: PlayerId,
    data: &[u8],
    start: Instant,
) -> Result<(), CardroomError> {
    let message: ClientMessage = match state.codec.decode(data) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "failed to decode request");
            let _ = replies.send(ServerMessage::LobbyError {
                message: MALFORMED.to_string(),
            });
            return Ok(());
        }
    };

    match message {
        ClientMessage::Ping { client_time } => {
            let _ = replies.send(ServerMessage::Pong {
                client_time,
                server_time: millis(start.elapsed()),
            });
        }
        other => {
            tracing::trace!(%player_id, request = ?other, "dispatching");
            state.hub.lock().await.handle(player_id, other);
        }
    }
    Ok(())
}

/// Two keep-alive pings per idle window.
fn keepalive_period(idle_timeout: Duration) -> Duration {
    (idle_timeout / 2).max(Duration::from_millis(1))
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
