//! The lobby registry: passphrase → lobby.

use std::collections::HashMap;

use crate::{Lobby, LobbyError};

/// All live lobbies, keyed by passphrase (case-sensitive).
///
/// At most one lobby exists per passphrase. A passphrase becomes free
/// again the moment its lobby is removed.
#[derive(Debug, Default)]
pub struct LobbyRegistry {
    lobbies: HashMap<String, Lobby>,
}

impl LobbyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new lobby under its passphrase.
    ///
    /// # Errors
    /// Returns [`LobbyError::DuplicatePassphrase`] if the passphrase is
    /// already in use; the existing lobby is left untouched.
    pub fn insert(&mut self, lobby: Lobby) -> Result<&mut Lobby, LobbyError> {
        use std::collections::hash_map::Entry;

        match self.lobbies.entry(lobby.passphrase().to_owned()) {
            Entry::Occupied(entry) => {
                Err(LobbyError::DuplicatePassphrase(entry.key().clone()))
            }
            Entry::Vacant(entry) => Ok(entry.insert(lobby)),
        }
    }

    pub fn get(&self, passphrase: &str) -> Option<&Lobby> {
        self.lobbies.get(passphrase)
    }

    pub fn get_mut(&mut self, passphrase: &str) -> Option<&mut Lobby> {
        self.lobbies.get_mut(passphrase)
    }

    /// Removes and returns a lobby.
    pub fn remove(&mut self, passphrase: &str) -> Option<Lobby> {
        self.lobbies.remove(passphrase)
    }

    pub fn contains(&self, passphrase: &str) -> bool {
        self.lobbies.contains_key(passphrase)
    }

    /// Number of live lobbies.
    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    /// Passphrases of every live lobby, in no particular order.
    pub fn passphrases(&self) -> impl Iterator<Item = &str> {
        self.lobbies.keys().map(String::as_str)
    }
}
