//! Broadcast layer: collects who gets what, in order.
//!
//! Lobby operations never write to connections directly. They fill an
//! [`Outbox`], resolving "the whole lobby" or "everyone but these two"
//! against the lobby's membership at that moment. The hub then flushes
//! the outbox in one go while still holding its lock, so a direct reply
//! queued before a broadcast is always delivered before it.

use cardroom_protocol::{PlayerId, ServerMessage};
use cardroom_session::ConnectionRegistry;

use crate::Lobby;

/// One message bound for one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: PlayerId,
    pub message: ServerMessage,
}

/// An ordered batch of deliveries produced by one operation.
#[derive(Debug, Default)]
pub struct Outbox {
    deliveries: Vec<Delivery>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a message for one connection.
    pub fn send(&mut self, to: PlayerId, message: ServerMessage) {
        self.deliveries.push(Delivery { to, message });
    }

    /// Queues a message for every current member of `lobby`.
    pub fn broadcast(&mut self, lobby: &Lobby, message: ServerMessage) {
        self.broadcast_except(lobby, &[], message);
    }

    /// Queues a message for every current member of `lobby` not listed in
    /// `excluded`.
    pub fn broadcast_except(
        &mut self,
        lobby: &Lobby,
        excluded: &[PlayerId],
        message: ServerMessage,
    ) {
        for member in lobby.member_ids() {
            if !excluded.contains(&member) {
                self.send(member, message.clone());
            }
        }
    }

    /// Deliveries in the order they were queued.
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Messages queued for one connection, in order.
    pub fn messages_for(&self, player_id: PlayerId) -> Vec<&ServerMessage> {
        self.deliveries
            .iter()
            .filter(|d| d.to == player_id)
            .map(|d| &d.message)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Hands every delivery to its connection's outbound queue.
    ///
    /// Recipients that have disconnected are skipped silently.
    pub fn flush(self, connections: &ConnectionRegistry) {
        for Delivery { to, message } in self.deliveries {
            connections.send(to, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardroom_protocol::Blob;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn table() -> Lobby {
        let mut lobby = Lobby::new("XYZ", pid(1), "Ada", "Family");
        lobby.add_player(pid(2), "Bo").unwrap();
        lobby.add_player(pid(3), "Cy").unwrap();
        lobby
    }

    #[test]
    fn test_broadcast_reaches_every_member_in_join_order() {
        let mut outbox = Outbox::new();

        outbox.broadcast(&table(), ServerMessage::HostDisconnected);

        let to: Vec<u64> = outbox.deliveries().iter().map(|d| d.to.0).collect();
        assert_eq!(to, vec![1, 2, 3]);
    }

    #[test]
    fn test_broadcast_except_skips_excluded() {
        let mut outbox = Outbox::new();

        outbox.broadcast_except(
            &table(),
            &[pid(1), pid(3)],
            ServerMessage::LobbyUpdated { players: vec![] },
        );

        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox.deliveries()[0].to, pid(2));
    }

    #[test]
    fn test_send_then_broadcast_keeps_queue_order() {
        let mut outbox = Outbox::new();
        let state = ServerMessage::GameState {
            state: Blob::new(serde_json::json!({ "trick": 3 })),
        };

        outbox.send(pid(2), state.clone());
        outbox.broadcast(&table(), ServerMessage::HostDisconnected);

        assert_eq!(
            outbox.messages_for(pid(2)),
            vec![&state, &ServerMessage::HostDisconnected]
        );
    }
}
