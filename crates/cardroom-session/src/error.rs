//! Error types for the session layer.

use cardroom_protocol::PlayerId;

/// Errors raised by the [`ConnectionRegistry`](crate::ConnectionRegistry).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No live connection is registered under this id.
    #[error("no connection registered for {0}")]
    NotFound(PlayerId),

    /// The id is already registered. Connection ids are never reused, so
    /// this indicates a bug in the caller.
    #[error("{0} is already registered")]
    AlreadyConnected(PlayerId),
}
