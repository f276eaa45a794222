//! Connection tracking for Cardroom.
//!
//! Every live client connection gets a [`Session`]: its identity, the
//! queue that carries server messages back to it, and a non-owning link
//! to the lobby it currently sits in, if any.
//!
//! # How it fits in the stack
//!
//! ```text
//! Lobby hub (above)   ← resolves "which lobby is this connection in?"
//!     ↕
//! Session layer (this crate)  ← who is connected, how to reach them
//!     ↕
//! Protocol layer (below)  ← PlayerId, ServerMessage
//! ```

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::ConnectionRegistry;
pub use session::{Outbound, Session};
