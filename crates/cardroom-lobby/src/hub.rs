//! The lobby hub: every lobby operation, applied atomically.
//!
//! `Hub` owns both registries (connections and lobbies) so a single
//! `&mut Hub` covers everything one operation can touch. The server
//! wraps it in one mutex and processes each inbound message to completion
//! under that lock; that is the whole concurrency story. Nothing in here
//! awaits or blocks.
//!
//! Each operation returns an [`Outbox`] rather than writing to sockets.
//! [`Hub::handle`] flushes it into the per-connection queues before
//! returning, so replies and broadcasts from one operation are enqueued
//! together and in order.

use cardroom_protocol::{ClientMessage, PlayerId, Seat, ServerMessage};
use cardroom_session::{ConnectionRegistry, Outbound, SessionError};

use crate::{Lobby, LobbyConfig, LobbyError, LobbyRegistry, Outbox};

/// Connection registry + lobby registry + the rules that tie them.
#[derive(Debug)]
pub struct Hub {
    connections: ConnectionRegistry,
    lobbies: LobbyRegistry,
    config: LobbyConfig,
}

impl Hub {
    /// Creates an empty hub.
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            connections: ConnectionRegistry::new(),
            lobbies: LobbyRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    pub fn lobbies(&self) -> &LobbyRegistry {
        &self.lobbies
    }

    /// Looks up a live lobby by passphrase.
    pub fn lobby(&self, passphrase: &str) -> Option<&Lobby> {
        self.lobbies.get(passphrase)
    }

    /// The lobby a connection currently sits in.
    pub fn lobby_of(&self, player_id: PlayerId) -> Option<&Lobby> {
        let passphrase = self.connections.lobby_of(player_id)?;
        self.lobbies.get(passphrase)
    }

    // =====================================================================
    // Connection lifecycle
    // =====================================================================

    /// Registers a new connection and greets it with its id.
    pub fn connect(
        &mut self,
        player_id: PlayerId,
        outbound: Outbound,
    ) -> Result<(), LobbyError> {
        self.connections.register(player_id, outbound)?;
        self.connections.send(
            player_id,
            ServerMessage::Connected {
                connection_id: player_id,
            },
        );
        tracing::info!(%player_id, "client connected");
        Ok(())
    }

    /// Tears a connection down: leaves its lobby (destroying it if this
    /// was the host) and unregisters it.
    ///
    /// Every way a connection can end funnels through here, and calling
    /// it again for the same id does nothing.
    pub fn disconnect(&mut self, player_id: PlayerId) {
        if !self.connections.contains(player_id) {
            return;
        }
        let outbox = self.leave_lobby(player_id);
        if let Some(session) = self.connections.unregister(player_id) {
            tracing::info!(
                %player_id,
                connected_secs = session.connected_at.elapsed().as_secs(),
                "client disconnected"
            );
        }
        outbox.flush(&self.connections);
    }

    /// Applies one client request and delivers the results.
    ///
    /// Refusals are reported to the requester as `lobby_error`; nothing
    /// else observes them.
    pub fn handle(&mut self, player_id: PlayerId, message: ClientMessage) {
        let result = match message {
            ClientMessage::CreateLobby {
                passphrase,
                player_name,
                ai_strategy,
            } => self.create_lobby(
                player_id,
                &passphrase,
                &player_name,
                ai_strategy.as_deref(),
            ),
            ClientMessage::JoinLobby {
                passphrase,
                player_name,
            } => self.join_lobby(player_id, &passphrase, &player_name),
            ClientMessage::LeaveLobby => Ok(self.leave_lobby(player_id)),
            ClientMessage::MoveSeat { target_seat } => {
                self.move_seat(player_id, target_seat)
            }
            ClientMessage::RequestSwap { target_seat } => {
                self.request_swap(player_id, target_seat)
            }
            ClientMessage::SwapResponse {
                accepted,
                from_seat,
            } => self.respond_swap(player_id, accepted, from_seat),
            ClientMessage::StartGame => self.start_game(player_id),
            ClientMessage::GameState {
                target_connection_id,
                state,
            } => self.relay_to_one(player_id, target_connection_id, state),
            ClientMessage::GameStateAll { state } => {
                self.relay_to_group(player_id, state)
            }
            ClientMessage::PlayerAction { action } => {
                self.relay_action_to_host(player_id, action)
            }
            // Keep-alives are answered by the connection handler.
            ClientMessage::Ping { .. } => Ok(Outbox::new()),
        };

        let outbox = result.unwrap_or_else(|e| {
            tracing::warn!(%player_id, error = %e, "request rejected");
            let mut outbox = Outbox::new();
            outbox.send(
                player_id,
                ServerMessage::LobbyError {
                    message: e.to_string(),
                },
            );
            outbox
        });
        outbox.flush(&self.connections);
    }

    // =====================================================================
    // Lobby operations
    // =====================================================================

    /// Opens a lobby with the requester as host in seat 0.
    pub fn create_lobby(
        &mut self,
        player_id: PlayerId,
        passphrase: &str,
        player_name: &str,
        ai_strategy: Option<&str>,
    ) -> Result<Outbox, LobbyError> {
        require("passphrase", passphrase)?;
        require("playerName", player_name)?;
        self.ensure_unseated(player_id)?;

        let ai_strategy = ai_strategy
            .filter(|s| !s.is_empty())
            .unwrap_or(self.config.default_ai_strategy.as_str())
            .to_owned();
        let lobby = self.lobbies.insert(Lobby::new(
            passphrase,
            player_id,
            player_name,
            ai_strategy,
        ))?;
        self.connections.set_lobby(player_id, passphrase)?;

        let mut outbox = Outbox::new();
        outbox.send(player_id, joined(lobby, player_id, Seat::FIRST));

        tracing::info!(passphrase, %player_id, player_name, "lobby created");
        Ok(outbox)
    }

    /// Seats the requester at the lowest free seat of an existing lobby.
    pub fn join_lobby(
        &mut self,
        player_id: PlayerId,
        passphrase: &str,
        player_name: &str,
    ) -> Result<Outbox, LobbyError> {
        require("passphrase", passphrase)?;
        require("playerName", player_name)?;
        self.ensure_unseated(player_id)?;

        let lobby = self
            .lobbies
            .get_mut(passphrase)
            .ok_or_else(|| LobbyError::LobbyNotFound(passphrase.to_owned()))?;
        let seat = lobby.add_player(player_id, player_name)?;
        self.connections.set_lobby(player_id, passphrase)?;

        let mut outbox = Outbox::new();
        outbox.send(player_id, joined(lobby, player_id, seat));
        outbox.broadcast_except(
            lobby,
            &[player_id],
            ServerMessage::LobbyUpdated {
                players: lobby.roster(),
            },
        );

        tracing::info!(passphrase, %player_id, player_name, %seat, "player joined");
        Ok(outbox)
    }

    /// Leaves the current lobby.
    ///
    /// A departing host destroys the lobby: it is removed from the
    /// registry, every remaining member is unlinked from it, and each gets
    /// one `host_disconnected`. A departing guest frees their seat and the
    /// rest receive `player_left`. Not being in a lobby is a no-op.
    pub fn leave_lobby(&mut self, player_id: PlayerId) -> Outbox {
        let mut outbox = Outbox::new();
        let Some(passphrase) = self.connections.clear_lobby(player_id) else {
            return outbox;
        };
        let Some(is_host) =
            self.lobbies.get(&passphrase).map(|l| l.is_host(player_id))
        else {
            return outbox;
        };

        if is_host {
            if let Some(lobby) = self.lobbies.remove(&passphrase) {
                for member in lobby.member_ids() {
                    if member != player_id {
                        self.connections.clear_lobby(member);
                    }
                }
                outbox.broadcast_except(
                    &lobby,
                    &[player_id],
                    ServerMessage::HostDisconnected,
                );
                tracing::info!(
                    %passphrase,
                    %player_id,
                    notified = outbox.len(),
                    "host left, lobby destroyed"
                );
            }
        } else if let Some(lobby) = self.lobbies.get_mut(&passphrase) {
            if let Some(left) = lobby.remove_player(player_id) {
                outbox.broadcast(
                    lobby,
                    ServerMessage::PlayerLeft {
                        players: lobby.roster(),
                        left_player_name: left.name.clone(),
                        left_seat: left.seat,
                    },
                );
                tracing::info!(
                    %passphrase,
                    %player_id,
                    name = %left.name,
                    seat = %left.seat,
                    "player left"
                );
            }
        }
        outbox
    }

    /// Moves the requester to an empty seat.
    pub fn move_seat(
        &mut self,
        player_id: PlayerId,
        target_seat: i64,
    ) -> Result<Outbox, LobbyError> {
        let Some(lobby) = self.open_lobby_mut(player_id) else {
            tracing::debug!(%player_id, "move_seat ignored: not in an open lobby");
            return Ok(Outbox::new());
        };
        let Some(target) = Seat::new(target_seat) else {
            tracing::debug!(%player_id, target_seat, "move_seat ignored: no such seat");
            return Ok(Outbox::new());
        };
        reseat(lobby, player_id, target)
    }

    /// Moves the requester to `target_seat` if it is empty; otherwise asks
    /// the occupant to trade. Asking records nothing: the lobby only
    /// changes if and when the occupant answers yes.
    pub fn request_swap(
        &mut self,
        player_id: PlayerId,
        target_seat: i64,
    ) -> Result<Outbox, LobbyError> {
        let Some(lobby) = self.open_lobby_mut(player_id) else {
            tracing::debug!(%player_id, "request_swap ignored: not in an open lobby");
            return Ok(Outbox::new());
        };
        let Some(target) = Seat::new(target_seat) else {
            tracing::debug!(%player_id, target_seat, "request_swap ignored: no such seat");
            return Ok(Outbox::new());
        };

        let occupant = lobby.occupant(target).map(|p| p.player_id);
        let Some(occupant) = occupant else {
            return reseat(lobby, player_id, target);
        };
        if occupant == player_id {
            return Ok(Outbox::new());
        }
        let Some(requester) = lobby.member(player_id) else {
            return Ok(Outbox::new());
        };

        let mut outbox = Outbox::new();
        outbox.send(
            occupant,
            ServerMessage::SwapRequest {
                from_name: requester.name.clone(),
                from_seat: requester.seat,
                target_seat: target,
            },
        );
        tracing::info!(
            passphrase = lobby.passphrase(),
            %player_id,
            %occupant,
            %target,
            "swap requested"
        );
        Ok(outbox)
    }

    /// Answers a swap proposal from whoever now sits at `from_seat`.
    ///
    /// If that seat is empty (the requester left) or invalid, the answer
    /// is dropped without a word to anyone.
    pub fn respond_swap(
        &mut self,
        player_id: PlayerId,
        accepted: bool,
        from_seat: i64,
    ) -> Result<Outbox, LobbyError> {
        let mut outbox = Outbox::new();
        let Some(lobby) = self.open_lobby_mut(player_id) else {
            tracing::debug!(%player_id, "swap_response ignored: not in an open lobby");
            return Ok(outbox);
        };
        let requester = Seat::new(from_seat)
            .and_then(|seat| lobby.occupant(seat))
            .map(|p| p.player_id)
            .filter(|requester| *requester != player_id);
        let Some(requester) = requester else {
            tracing::debug!(%player_id, from_seat, "swap_response for vacant seat dropped");
            return Ok(outbox);
        };

        if accepted {
            lobby.swap_seats(requester, player_id);
            let players = lobby.roster();
            for participant in [requester, player_id] {
                if let Some(seat) = lobby.seat_of(participant) {
                    outbox.send(
                        participant,
                        ServerMessage::SeatChanged {
                            my_seat: seat,
                            players: players.clone(),
                        },
                    );
                }
            }
            outbox.broadcast_except(
                lobby,
                &[requester, player_id],
                ServerMessage::LobbyUpdated { players },
            );
            tracing::info!(
                passphrase = lobby.passphrase(),
                %requester,
                responder = %player_id,
                "swap accepted"
            );
        } else {
            let by_name = lobby
                .member(player_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            outbox.send(requester, ServerMessage::SwapDeclined { by_name });
            tracing::info!(
                passphrase = lobby.passphrase(),
                %requester,
                responder = %player_id,
                "swap declined"
            );
        }
        Ok(outbox)
    }

    /// Host only: locks the roster and tells everyone play has begun.
    pub fn start_game(
        &mut self,
        player_id: PlayerId,
    ) -> Result<Outbox, LobbyError> {
        let mut outbox = Outbox::new();
        let Some(passphrase) = self.connections.lobby_of(player_id) else {
            return Ok(outbox);
        };
        let Some(lobby) = self.lobbies.get_mut(passphrase) else {
            return Ok(outbox);
        };
        if !lobby.is_host(player_id) {
            return Err(LobbyError::NotHost);
        }
        lobby.start()?;

        outbox.broadcast(
            lobby,
            ServerMessage::GameStarted {
                players: lobby.roster(),
                ai_strategy: lobby.ai_strategy().to_owned(),
            },
        );
        tracing::info!(
            passphrase = lobby.passphrase(),
            players = lobby.len(),
            "game started"
        );
        Ok(outbox)
    }

    // =====================================================================
    // Helpers
    // =====================================================================

    /// The requester's lobby, if it exists, has started, and still
    /// lists them.
    pub(crate) fn started_lobby_of(&self, player_id: PlayerId) -> Option<&Lobby> {
        self.lobby_of(player_id)
            .filter(|l| l.state().is_started() && l.is_member(player_id))
    }

    fn open_lobby_mut(&mut self, player_id: PlayerId) -> Option<&mut Lobby> {
        let passphrase = self.connections.lobby_of(player_id)?;
        self.lobbies
            .get_mut(passphrase)
            .filter(|l| l.state().is_open() && l.is_member(player_id))
    }

    fn ensure_unseated(&self, player_id: PlayerId) -> Result<(), LobbyError> {
        let session = self
            .connections
            .get(player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        match &session.lobby {
            Some(passphrase) => Err(LobbyError::AlreadyInLobby(passphrase.clone())),
            None => Ok(()),
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(LobbyConfig::default())
    }
}

/// Moves `player_id` to `target`: the mover hears `seat_changed` first,
/// then everyone else gets `lobby_updated`.
fn reseat(
    lobby: &mut Lobby,
    player_id: PlayerId,
    target: Seat,
) -> Result<Outbox, LobbyError> {
    let from = lobby.seat_of(player_id);
    lobby.move_player(player_id, target)?;

    let players = lobby.roster();
    let mut outbox = Outbox::new();
    outbox.send(
        player_id,
        ServerMessage::SeatChanged {
            my_seat: target,
            players: players.clone(),
        },
    );
    outbox.broadcast_except(
        lobby,
        &[player_id],
        ServerMessage::LobbyUpdated { players },
    );
    tracing::info!(
        passphrase = lobby.passphrase(),
        %player_id,
        from = ?from,
        to = %target,
        "seat moved"
    );
    Ok(outbox)
}

fn joined(lobby: &Lobby, player_id: PlayerId, seat: Seat) -> ServerMessage {
    ServerMessage::LobbyJoined {
        passphrase: lobby.passphrase().to_owned(),
        players: lobby.roster(),
        ai_strategy: lobby.ai_strategy().to_owned(),
        is_host: lobby.is_host(player_id),
        my_seat: seat,
    }
}

fn require(field: &'static str, value: &str) -> Result<(), LobbyError> {
    if value.is_empty() {
        Err(LobbyError::MissingField(field))
    } else {
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
