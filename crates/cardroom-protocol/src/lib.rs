//! Wire protocol for Cardroom.
//!
//! This crate defines what clients and the lobby server say to each other:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`LobbyPlayer`],
//!   [`Seat`], [`Blob`]) — the messages that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while decoding.
//!
//! The protocol layer knows nothing about lobbies or connections; it only
//! knows message shapes.
//!
//! ```text
//! Transport (frames) → Protocol (ClientMessage) → Lobby hub (state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    Blob, ClientMessage, LobbyPlayer, PlayerId, SEAT_COUNT, Seat,
    ServerMessage,
};
