//! Transport abstraction layer for Cardroom.
//!
//! Provides the [`Transport`] and [`Connection`] traits that the lobby
//! server is written against. The server only needs three things from a
//! transport: a persistent bidirectional channel per client, a stable
//! identifier for that channel, and a signal when the channel closes
//! (`recv` returning `Ok(None)` or an error).
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Opaque identifier for a live connection.
///
/// Identifiers are never reused within one process, so a stale identifier
/// held by a client can only ever miss, never hit a different connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// One inbound unit from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// An application payload.
    Data(Vec<u8>),
    /// Keep-alive traffic (ping or pong) with no payload for the application.
    Heartbeat,
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive frames.
///
/// `send` and `recv` may be awaited concurrently from the same task
/// (e.g. inside `tokio::select!`); implementations must not make one wait
/// on the other.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed. Transport
    /// keep-alive traffic is surfaced as [`Frame::Heartbeat`] so callers
    /// can count it as activity.
    async fn recv(&self) -> Result<Option<Frame>, Self::Error>;

    /// Sends a transport-level keep-alive probe. A live peer answers it
    /// without involving the application, and the answer arrives from
    /// `recv` as [`Frame::Heartbeat`].
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
