//! The lobby record: who sits where, who hosts, and whether play began.
//!
//! Everything here is plain data plus the seat rules. Notifying clients
//! is the hub's job; this module never sends anything.

use cardroom_protocol::{LobbyPlayer, PlayerId, SEAT_COUNT, Seat};

use crate::{LobbyError, LobbyState};

/// One player's place at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatAssignment {
    pub player_id: PlayerId,
    pub name: String,
    pub seat: Seat,
}

/// A named group of up to [`SEAT_COUNT`] connections.
///
/// Invariants, upheld by every mutating method:
/// - seats are unique within the lobby
/// - names are unique within the lobby (exact, case-sensitive match)
/// - at most `SEAT_COUNT` assignments
/// - the host is always seated
#[derive(Debug, Clone)]
pub struct Lobby {
    passphrase: String,
    host: PlayerId,
    /// Join order. Seat changes never reorder this.
    players: Vec<SeatAssignment>,
    ai_strategy: String,
    state: LobbyState,
}

impl Lobby {
    /// Creates an open lobby with the host in seat 0.
    pub fn new(
        passphrase: impl Into<String>,
        host: PlayerId,
        host_name: impl Into<String>,
        ai_strategy: impl Into<String>,
    ) -> Self {
        Self {
            passphrase: passphrase.into(),
            host,
            players: vec![SeatAssignment {
                player_id: host,
                name: host_name.into(),
                seat: Seat::FIRST,
            }],
            ai_strategy: ai_strategy.into(),
            state: LobbyState::Open,
        }
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    pub fn is_host(&self, player_id: PlayerId) -> bool {
        self.host == player_id
    }

    pub fn ai_strategy(&self) -> &str {
        &self.ai_strategy
    }

    pub fn state(&self) -> LobbyState {
        self.state
    }

    /// Seat assignments in join order.
    pub fn players(&self) -> &[SeatAssignment] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= usize::from(SEAT_COUNT)
    }

    /// Ids of every current member, in join order.
    pub fn member_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.player_id)
    }

    pub fn is_member(&self, player_id: PlayerId) -> bool {
        self.member(player_id).is_some()
    }

    /// The assignment held by `player_id`.
    pub fn member(&self, player_id: PlayerId) -> Option<&SeatAssignment> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn seat_of(&self, player_id: PlayerId) -> Option<Seat> {
        self.member(player_id).map(|p| p.seat)
    }

    /// The assignment sitting at `seat`.
    pub fn occupant(&self, seat: Seat) -> Option<&SeatAssignment> {
        self.players.iter().find(|p| p.seat == seat)
    }

    /// The smallest seat index nobody holds.
    pub fn lowest_free_seat(&self) -> Option<Seat> {
        Seat::all().find(|seat| self.occupant(*seat).is_none())
    }

    /// Exact, case-sensitive name check.
    pub fn name_taken(&self, name: &str) -> bool {
        self.players.iter().any(|p| p.name == name)
    }

    /// The roster as sent to clients.
    pub fn roster(&self) -> Vec<LobbyPlayer> {
        self.players
            .iter()
            .map(|p| LobbyPlayer {
                name: p.name.clone(),
                seat: p.seat,
                is_host: p.player_id == self.host,
                connection_id: p.player_id,
            })
            .collect()
    }

    // -- Mutations --------------------------------------------------------

    /// Seats a new player at the lowest free seat.
    ///
    /// Checks run in a fixed order: started, full, name collision.
    pub(crate) fn add_player(
        &mut self,
        player_id: PlayerId,
        name: &str,
    ) -> Result<Seat, LobbyError> {
        if self.state.is_started() {
            return Err(LobbyError::GameAlreadyStarted);
        }
        if self.is_full() {
            return Err(LobbyError::LobbyFull);
        }
        if self.name_taken(name) {
            return Err(LobbyError::NameTaken(name.to_owned()));
        }
        let seat = self.lowest_free_seat().ok_or(LobbyError::LobbyFull)?;

        self.players.push(SeatAssignment {
            player_id,
            name: name.to_owned(),
            seat,
        });
        Ok(seat)
    }

    /// Removes a player, freeing their seat.
    pub(crate) fn remove_player(
        &mut self,
        player_id: PlayerId,
    ) -> Option<SeatAssignment> {
        let index = self.players.iter().position(|p| p.player_id == player_id)?;
        Some(self.players.remove(index))
    }

    /// Moves a member to `target`.
    ///
    /// Moving to one's own seat succeeds and changes nothing.
    pub(crate) fn move_player(
        &mut self,
        player_id: PlayerId,
        target: Seat,
    ) -> Result<(), LobbyError> {
        if let Some(occupant) = self.occupant(target) {
            if occupant.player_id != player_id {
                return Err(LobbyError::SeatOccupied(target));
            }
        }
        if let Some(p) = self.players.iter_mut().find(|p| p.player_id == player_id)
        {
            p.seat = target;
        }
        Ok(())
    }

    /// Exchanges the seats of two members. Returns `false` (and changes
    /// nothing) unless both are present.
    pub(crate) fn swap_seats(&mut self, a: PlayerId, b: PlayerId) -> bool {
        let (Some(seat_a), Some(seat_b)) = (self.seat_of(a), self.seat_of(b))
        else {
            return false;
        };
        for p in &mut self.players {
            if p.player_id == a {
                p.seat = seat_b;
            } else if p.player_id == b {
                p.seat = seat_a;
            }
        }
        true
    }

    /// Advances Open → Started.
    pub(crate) fn start(&mut self) -> Result<(), LobbyError> {
        match self.state.next() {
            Some(next) => {
                self.state = next;
                Ok(())
            }
            None => Err(LobbyError::GameAlreadyStarted),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
