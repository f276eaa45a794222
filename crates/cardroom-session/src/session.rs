//! Session types: the server's record of one live connection.

use std::time::Instant;

use cardroom_protocol::{PlayerId, ServerMessage};
use tokio::sync::mpsc;

/// Queue feeding a connection's writer. Sending never blocks, so the lobby
/// hub can enqueue a whole batch of replies and broadcasts while it holds
/// its lock.
pub type Outbound = mpsc::UnboundedSender<ServerMessage>;

/// One live connection.
#[derive(Debug, Clone)]
pub struct Session {
    /// Which connection this is.
    pub player_id: PlayerId,

    /// Where to put messages for this connection.
    pub outbound: Outbound,

    /// Passphrase of the lobby this connection currently belongs to.
    ///
    /// Non-owning: the lobby registry owns the lobby, this is only a
    /// lookup key and may be cleared from either side.
    pub lobby: Option<String>,

    /// When the connection was registered.
    pub connected_at: Instant,
}

impl Session {
    /// Creates a session that is not yet in any lobby.
    pub fn new(player_id: PlayerId, outbound: Outbound) -> Self {
        Self {
            player_id,
            outbound,
            lobby: None,
            connected_at: Instant::now(),
        }
    }

    /// Queues a message for this connection.
    ///
    /// Returns `false` if the connection's writer has already gone away;
    /// the message is dropped in that case.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbound.send(message).is_ok()
    }
}
