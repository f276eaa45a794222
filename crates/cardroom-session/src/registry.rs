//! The connection registry: every live connection and its lobby link.
//!
//! # Concurrency note
//!
//! `ConnectionRegistry` is a plain `HashMap` with no locking of its own.
//! It lives inside the lobby hub, and the hub is guarded by a single mutex
//! at the server level, so registry reads and lobby mutations always
//! happen under the same lock.

use std::collections::HashMap;

use cardroom_protocol::{PlayerId, ServerMessage};

use crate::{Outbound, Session, SessionError};

/// Tracks all live connections.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ set_lobby() ──→ clear_lobby() ──→ unregister()
///                    │                                  ▲
///                    └──────────(connection closes)─────┘
/// ```
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: HashMap<PlayerId, Session>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if the id is taken.
    pub fn register(
        &mut self,
        player_id: PlayerId,
        outbound: Outbound,
    ) -> Result<&Session, SessionError> {
        if self.sessions.contains_key(&player_id) {
            return Err(SessionError::AlreadyConnected(player_id));
        }
        tracing::debug!(%player_id, "connection registered");
        Ok(self
            .sessions
            .entry(player_id)
            .or_insert_with(|| Session::new(player_id, outbound)))
    }

    /// Removes a connection, returning its final session record.
    ///
    /// Returns `None` if it was never registered or is already gone, which
    /// makes repeated teardown harmless.
    pub fn unregister(&mut self, player_id: PlayerId) -> Option<Session> {
        let removed = self.sessions.remove(&player_id);
        if removed.is_some() {
            tracing::debug!(%player_id, "connection unregistered");
        }
        removed
    }

    /// Looks up a live connection.
    pub fn get(&self, player_id: PlayerId) -> Option<&Session> {
        self.sessions.get(&player_id)
    }

    /// Returns `true` if the connection is live.
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.sessions.contains_key(&player_id)
    }

    /// The passphrase of the lobby this connection is in, if any.
    pub fn lobby_of(&self, player_id: PlayerId) -> Option<&str> {
        self.sessions
            .get(&player_id)
            .and_then(|s| s.lobby.as_deref())
    }

    /// Points a connection at a lobby.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the connection is not live.
    pub fn set_lobby(
        &mut self,
        player_id: PlayerId,
        passphrase: &str,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        session.lobby = Some(passphrase.to_owned());
        Ok(())
    }

    /// Clears a connection's lobby link, returning the old passphrase.
    ///
    /// Unknown connections are ignored.
    pub fn clear_lobby(&mut self, player_id: PlayerId) -> Option<String> {
        self.sessions
            .get_mut(&player_id)
            .and_then(|s| s.lobby.take())
    }

    /// Queues a message for one connection.
    ///
    /// Messages to connections that are gone are dropped silently; there is
    /// no retry and no buffering for absent recipients.
    pub fn send(&self, player_id: PlayerId, message: ServerMessage) {
        match self.sessions.get(&player_id) {
            Some(session) => {
                if !session.send(message) {
                    tracing::debug!(%player_id, "writer gone, message dropped");
                }
            }
            None => {
                tracing::debug!(%player_id, "no such connection, message dropped");
            }
        }
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
