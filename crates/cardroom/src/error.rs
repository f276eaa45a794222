//! Unified error type for the Cardroom server.

use cardroom_lobby::LobbyError;
use cardroom_protocol::ProtocolError;
use cardroom_session::SessionError;
use cardroom_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `cardroom` crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum CardroomError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown or duplicate connection).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A lobby request that was refused.
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}
