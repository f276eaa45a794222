//! Host relay: opaque game traffic between host and players.
//!
//! Once a lobby has started the server stops interpreting anything. The
//! host pushes state (to one player or to everyone else) and players push
//! actions back to the host, stamped with the seat they came from. None of
//! these payloads are inspected.

use cardroom_protocol::{Blob, PlayerId, ServerMessage};

use crate::{Hub, LobbyError, Outbox};

impl Hub {
    /// Host → one member.
    ///
    /// A target that is not (or no longer) in the host's lobby is dropped
    /// without telling anyone.
    pub fn relay_to_one(
        &self,
        origin: PlayerId,
        target: PlayerId,
        state: Blob,
    ) -> Result<Outbox, LobbyError> {
        let mut outbox = Outbox::new();
        let Some(lobby) = self.started_lobby_of(origin) else {
            tracing::debug!(%origin, "game_state ignored: no started lobby");
            return Ok(outbox);
        };
        if !lobby.is_host(origin) {
            return Err(LobbyError::NotHost);
        }
        if target == origin || !lobby.is_member(target) {
            tracing::debug!(%origin, %target, "game_state target not in lobby, dropped");
            return Ok(outbox);
        }
        outbox.send(target, ServerMessage::GameState { state });
        Ok(outbox)
    }

    /// Host → every other member.
    pub fn relay_to_group(
        &self,
        origin: PlayerId,
        state: Blob,
    ) -> Result<Outbox, LobbyError> {
        let mut outbox = Outbox::new();
        let Some(lobby) = self.started_lobby_of(origin) else {
            tracing::debug!(%origin, "game_state_all ignored: no started lobby");
            return Ok(outbox);
        };
        if !lobby.is_host(origin) {
            return Err(LobbyError::NotHost);
        }
        outbox.broadcast_except(lobby, &[origin], ServerMessage::GameState { state });
        Ok(outbox)
    }

    /// Member → host, tagged with the sender's current seat.
    pub fn relay_action_to_host(
        &self,
        origin: PlayerId,
        action: Blob,
    ) -> Result<Outbox, LobbyError> {
        let mut outbox = Outbox::new();
        let Some(lobby) = self.started_lobby_of(origin) else {
            tracing::debug!(%origin, "player_action ignored: no started lobby");
            return Ok(outbox);
        };
        let Some(seat) = lobby.seat_of(origin) else {
            return Ok(outbox);
        };
        outbox.send(lobby.host(), ServerMessage::PlayerAction { seat, action });
        Ok(outbox)
    }
}
