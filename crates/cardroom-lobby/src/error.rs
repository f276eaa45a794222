//! Error types for the lobby layer.
//!
//! The `Display` text of each variant is what the requesting client sees
//! in its `lobby_error` message.

use cardroom_protocol::{SEAT_COUNT, Seat};
use cardroom_session::SessionError;

/// A lobby request that was refused.
///
/// Every variant is recoverable: it is reported to the requester only and
/// leaves both the connection and all shared state untouched.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// `create_lobby` for a passphrase that already has a live lobby.
    #[error("A lobby with that passphrase already exists")]
    DuplicatePassphrase(String),

    /// No live lobby under this passphrase.
    #[error("No lobby found with that passphrase")]
    LobbyNotFound(String),

    /// The lobby has started; the roster is locked.
    #[error("Game has already started")]
    GameAlreadyStarted,

    /// All seats are taken.
    #[error("Lobby is full ({max} players max)", max = SEAT_COUNT)]
    LobbyFull,

    /// Another player in the lobby already uses this exact name.
    #[error("That name is already taken in this lobby")]
    NameTaken(String),

    /// The target seat belongs to someone else.
    #[error("Seat {0} is occupied")]
    SeatOccupied(Seat),

    /// The seat number is outside the table.
    ///
    /// Seat moves and swap requests naming such a seat are ignored rather
    /// than reported, so the hub never produces this.
    #[error("Seat {0} does not exist (seats are 0-{max})", max = SEAT_COUNT - 1)]
    InvalidSeatIndex(i64),

    /// A host-only request from someone else.
    #[error("Only the host can do that")]
    NotHost,

    /// `create_lobby`/`join_lobby` while still seated in another lobby.
    #[error("You are already in a lobby; leave it first")]
    AlreadyInLobby(String),

    /// A required text field was empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The requesting connection is not registered.
    #[error(transparent)]
    Session(#[from] SessionError),
}
