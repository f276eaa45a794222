//! Lobby configuration and lifecycle state.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Settings shared by every lobby on a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// AI strategy label used when `create_lobby` does not name one.
    /// Opaque to the server; the host's rule engine interprets it.
    pub default_ai_strategy: String,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            default_ai_strategy: "Family".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// LobbyState
// ---------------------------------------------------------------------------

/// The lifecycle state of a lobby.
///
/// ```text
/// Open ──(host start_game)──→ Started
/// ```
///
/// - **Open**: accepting joins, seat moves, and swaps.
/// - **Started**: roster locked. The server only relays game traffic
///   between host and guests from here on. There is no way back.
///
/// Destruction is not a state: a lobby is removed from the registry the
/// moment its host leaves, whatever state it was in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LobbyState {
    #[default]
    Open,
    Started,
}

impl LobbyState {
    /// Returns `true` while the roster may still change.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` once play has begun.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }

    /// The state this one may advance to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Open => Some(Self::Started),
            Self::Started => None,
        }
    }
}

impl std::fmt::Display for LobbyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Started => write!(f, "Started"),
        }
    }
}
