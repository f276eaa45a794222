//! # Cardroom
//!
//! Lobby and relay server for four-seat online card games.
//!
//! Players meet in passphrase-named lobbies over WebSocket, pick seats,
//! and trade seats by mutual consent. Once the host starts the game the
//! server stops interpreting traffic and only relays it: the host's
//! browser runs the game and pushes state to the others, and their
//! actions come back to the host stamped with their seat.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardroom::prelude::*;
//!
//! # async fn demo() -> Result<(), CardroomError> {
//! let server = CardroomServer::builder()
//!     .bind("0.0.0.0:3001")
//!     .lobby_config(LobbyConfig::default())
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::CardroomError;
pub use server::{
    CardroomServer, CardroomServerBuilder, DEFAULT_BIND, DEFAULT_IDLE_TIMEOUT,
};

pub use cardroom_lobby as lobby;
pub use cardroom_protocol as protocol;
pub use cardroom_session as session;
pub use cardroom_transport as transport;

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{CardroomError, CardroomServer, CardroomServerBuilder};
    pub use cardroom_lobby::{LobbyConfig, LobbyError};
    pub use cardroom_protocol::{
        Blob, ClientMessage, Codec, JsonCodec, LobbyPlayer, PlayerId,
        SEAT_COUNT, Seat, ServerMessage,
    };
}
