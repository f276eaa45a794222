//! Lobby management for Cardroom.
//!
//! A lobby is a passphrase-named table of four seats. One connection hosts
//! it; up to three more join. Before play starts members can move to empty
//! seats or trade seats by mutual consent. After the host starts the game
//! the server only relays: host state out to players, player actions back
//! to the host.
//!
//! # Key types
//!
//! - [`Hub`] — applies every operation against both registries
//! - [`Lobby`] — seat assignments and lifecycle of one lobby
//! - [`LobbyRegistry`] — passphrase → lobby
//! - [`Outbox`] — ordered messages produced by one operation
//! - [`LobbyState`] — Open → Started
//! - [`LobbyConfig`] — defaults applied to new lobbies

mod broadcast;
mod config;
mod error;
mod hub;
mod lobby;
mod registry;
mod relay;

pub use broadcast::{Delivery, Outbox};
pub use config::{LobbyConfig, LobbyState};
pub use error::LobbyError;
pub use hub::Hub;
pub use lobby::{Lobby, SeatAssignment};
pub use registry::LobbyRegistry;
