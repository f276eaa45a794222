//! Core protocol types for Cardroom's wire format.
//!
//! Every message is one JSON object with a `"type"` tag naming the event
//! in snake_case; the remaining fields use camelCase, matching what the
//! browser client emits:
//!
//! ```text
//! {"type":"join_lobby","passphrase":"XYZ","playerName":"Ada"}
//! {"type":"seat_changed","mySeat":2,"players":[...]}
//! ```

use serde::{Deserialize, Serialize};

use std::fmt;

/// Number of seats at a table. Seats are numbered `0..SEAT_COUNT`.
pub const SEAT_COUNT: u8 = 4;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifies one live connection to the lobby server.
///
/// The server derives it from the transport's connection id and hands it
/// to the client in the `connected` message and in every roster entry, so
/// the host can address `game_state` to a single guest.
///
/// `#[serde(transparent)]` keeps it a plain number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A turn-order slot at the table, always in `0..SEAT_COUNT`.
///
/// The only way to build one from untrusted input is [`Seat::new`], so a
/// `Seat` held anywhere in the server is valid by construction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Seat(u8);

impl Seat {
    /// Seat 0, where a lobby's creator sits.
    pub const FIRST: Seat = Seat(0);

    /// Validates a raw seat index as sent by a client.
    pub fn new(index: i64) -> Option<Self> {
        if (0..i64::from(SEAT_COUNT)).contains(&index) {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Returns the seat as a zero-based index.
    pub fn index(self) -> u8 {
        self.0
    }

    /// All seats, lowest first.
    pub fn all() -> impl Iterator<Item = Seat> {
        (0..SEAT_COUNT).map(Seat)
    }
}

impl TryFrom<i64> for Seat {
    type Error = String;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        Seat::new(index).ok_or_else(|| {
            format!("seat {index} is out of range (0-{})", SEAT_COUNT - 1)
        })
    }
}

impl From<Seat> for i64 {
    fn from(seat: Seat) -> Self {
        i64::from(seat.0)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Blob — opaque relay payload
// ---------------------------------------------------------------------------

/// An uninterpreted payload relayed between host and guests.
///
/// Game state and player actions are produced and consumed by the
/// client-side rule engine. The server carries whatever JSON value the
/// sender supplied and never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(serde_json::Value);

impl Blob {
    /// Wraps an arbitrary JSON value.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Unwraps the payload.
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for Blob {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Roster entry
// ---------------------------------------------------------------------------

/// One row of a lobby roster as clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyPlayer {
    pub name: String,
    pub seat: Seat,
    pub is_host: bool,
    pub connection_id: PlayerId,
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Requests a client can send.
///
/// Seat numbers arrive as plain integers and are validated by the lobby
/// layer, so an out-of-range seat produces a lobby error rather than a
/// decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Open a new lobby under `passphrase` and become its host.
    CreateLobby {
        passphrase: String,
        player_name: String,
        #[serde(default)]
        ai_strategy: Option<String>,
    },

    /// Take the lowest free seat in an existing lobby.
    JoinLobby {
        passphrase: String,
        player_name: String,
    },

    /// Leave the current lobby. A departing host destroys it.
    LeaveLobby,

    /// Move to an empty seat.
    MoveSeat { target_seat: i64 },

    /// Move to `target_seat`, or ask its occupant to trade seats.
    RequestSwap { target_seat: i64 },

    /// Answer a `swap_request` received from whoever sits at `from_seat`.
    SwapResponse { accepted: bool, from_seat: i64 },

    /// Host only: lock the roster and begin play.
    StartGame,

    /// Host only: forward `state` to one guest.
    GameState {
        target_connection_id: PlayerId,
        state: Blob,
    },

    /// Host only: forward `state` to every guest.
    GameStateAll { state: Blob },

    /// Forward `action` to the host, stamped with the sender's seat.
    PlayerAction { action: Blob },

    /// Keep-alive. Answered with `pong`.
    Ping { client_time: u64 },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// First message on every connection: the id other clients see.
    Connected { connection_id: PlayerId },

    /// Requester only: you created or joined a lobby.
    LobbyJoined {
        passphrase: String,
        players: Vec<LobbyPlayer>,
        ai_strategy: String,
        is_host: bool,
        my_seat: Seat,
    },

    /// Requester only: the request was rejected.
    LobbyError { message: String },

    /// Rest of the lobby: the roster changed.
    LobbyUpdated { players: Vec<LobbyPlayer> },

    /// The mover (or each swap participant): your new seat.
    SeatChanged {
        my_seat: Seat,
        players: Vec<LobbyPlayer>,
    },

    /// Targeted occupant: someone wants your seat.
    SwapRequest {
        from_name: String,
        from_seat: Seat,
        target_seat: Seat,
    },

    /// Original requester: the occupant said no.
    SwapDeclined { by_name: String },

    /// Entire lobby: play has begun with this roster.
    GameStarted {
        players: Vec<LobbyPlayer>,
        ai_strategy: String,
    },

    /// Relayed host state.
    GameState { state: Blob },

    /// Host only: a guest's action, tagged with the guest's seat.
    PlayerAction { seat: Seat, action: Blob },

    /// Entire lobby: the host is gone and the lobby no longer exists.
    HostDisconnected,

    /// Entire lobby: a guest left.
    PlayerLeft {
        players: Vec<LobbyPlayer>,
        left_player_name: String,
        left_seat: Seat,
    },

    /// Keep-alive reply.
    Pong { client_time: u64, server_time: u64 },
}

// =========================================================================
// Tests
// =========================================================================
