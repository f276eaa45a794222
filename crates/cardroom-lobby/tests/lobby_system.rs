//! End-to-end lobby behaviour through `Hub::handle`, observed from each
//! connection's outbound queue.

use std::collections::HashMap;

use cardroom_lobby::{Hub, LobbyConfig};
use cardroom_protocol::{
    Blob, ClientMessage, LobbyPlayer, PlayerId, Seat, ServerMessage,
};
use serde_json::json;
use tokio::sync::mpsc::{self, UnboundedReceiver};

// -------------------------------------------------------------------------
// Harness
// -------------------------------------------------------------------------

struct Table {
    hub: Hub,
    inboxes: HashMap<u64, UnboundedReceiver<ServerMessage>>,
}

impl Table {
    fn new() -> Self {
        Self {
            hub: Hub::new(LobbyConfig::default()),
            inboxes: HashMap::new(),
        }
    }

    /// Connects `id` and discards its `connected` greeting.
    fn connect(&mut self, id: u64) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.hub.connect(PlayerId(id), tx).unwrap();
        self.inboxes.insert(id, rx);
        assert!(matches!(
            self.drain(id)[..],
            [ServerMessage::Connected { .. }]
        ));
    }

    fn send(&mut self, id: u64, message: ClientMessage) {
        self.hub.handle(PlayerId(id), message);
    }

    fn create(&mut self, id: u64, passphrase: &str, name: &str) {
        self.send(
            id,
            ClientMessage::CreateLobby {
                passphrase: passphrase.into(),
                player_name: name.into(),
                ai_strategy: None,
            },
        );
    }

    fn join(&mut self, id: u64, passphrase: &str, name: &str) {
        self.send(
            id,
            ClientMessage::JoinLobby {
                passphrase: passphrase.into(),
                player_name: name.into(),
            },
        );
    }

    fn drain(&mut self, id: u64) -> Vec<ServerMessage> {
        let rx = self.inboxes.get_mut(&id).unwrap();
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    fn drain_all(&mut self) {
        let ids: Vec<u64> = self.inboxes.keys().copied().collect();
        for id in ids {
            self.drain(id);
        }
    }

    /// `(name, seat)` pairs of a lobby in join order.
    fn seats(&self, passphrase: &str) -> Vec<(String, u8)> {
        self.hub
            .lobby(passphrase)
            .unwrap()
            .players()
            .iter()
            .map(|p| (p.name.clone(), p.seat.index()))
            .collect()
    }
}

fn seat(i: i64) -> Seat {
    Seat::new(i).unwrap()
}

fn error_text(messages: &[ServerMessage]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::LobbyError { message } => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

/// Host "A" (1) plus guests "B" (2), "C" (3), "D" (4) in lobby "XYZ".
fn full_table() -> Table {
    let mut t = Table::new();
    for id in 1..=4 {
        t.connect(id);
    }
    t.create(1, "XYZ", "A");
    t.join(2, "XYZ", "B");
    t.join(3, "XYZ", "C");
    t.join(4, "XYZ", "D");
    t.drain_all();
    t
}

// -------------------------------------------------------------------------
// Create / join
// -------------------------------------------------------------------------

#[test]
fn test_create_lobby_host_gets_seat_zero() {
    let mut t = Table::new();
    t.connect(1);

    t.create(1, "XYZ", "A");

    assert_eq!(
        t.drain(1),
        vec![ServerMessage::LobbyJoined {
            passphrase: "XYZ".into(),
            players: vec![LobbyPlayer {
                name: "A".into(),
                seat: seat(0),
                is_host: true,
                connection_id: PlayerId(1),
            }],
            ai_strategy: "Family".into(),
            is_host: true,
            my_seat: seat(0),
        }]
    );
}

#[test]
fn test_join_lobby_fills_seats_in_order() {
    let t = full_table();

    assert_eq!(
        t.seats("XYZ"),
        vec![
            ("A".into(), 0),
            ("B".into(), 1),
            ("C".into(), 2),
            ("D".into(), 3)
        ]
    );
}

#[test]
fn test_join_lobby_fifth_player_rejected() {
    let mut t = full_table();
    t.connect(5);

    t.join(5, "XYZ", "E");

    assert_eq!(error_text(&t.drain(5)), vec!["Lobby is full (4 players max)"]);
    assert_eq!(t.hub.lobby("XYZ").unwrap().len(), 4);
    assert!(t.drain(1).is_empty());
}

#[test]
fn test_join_lobby_duplicate_name_rejected() {
    let mut t = Table::new();
    t.connect(1);
    t.connect(2);
    t.create(1, "XYZ", "A");
    t.drain_all();

    t.join(2, "XYZ", "A");

    assert_eq!(
        error_text(&t.drain(2)),
        vec!["That name is already taken in this lobby"]
    );
    assert!(t.drain(1).is_empty());
}

#[test]
fn test_join_lobby_existing_members_see_update() {
    let mut t = Table::new();
    for id in 1..=3 {
        t.connect(id);
    }
    t.create(1, "XYZ", "A");
    t.join(2, "XYZ", "B");
    t.drain_all();

    t.join(3, "XYZ", "C");

    for id in [1, 2] {
        let messages = t.drain(id);
        assert!(
            matches!(&messages[..], [ServerMessage::LobbyUpdated { players }] if players.len() == 3)
        );
    }
    assert!(matches!(
        t.drain(3)[..],
        [ServerMessage::LobbyJoined { is_host: false, .. }]
    ));
}

#[test]
fn test_create_lobby_passphrase_reusable_after_host_leaves() {
    let mut t = Table::new();
    t.connect(1);
    t.connect(2);
    t.create(1, "XYZ", "A");
    t.send(1, ClientMessage::LeaveLobby);
    t.drain_all();

    t.create(2, "XYZ", "B");

    assert!(matches!(
        t.drain(2)[..],
        [ServerMessage::LobbyJoined { is_host: true, .. }]
    ));
    assert_eq!(t.hub.lobby("XYZ").unwrap().host(), PlayerId(2));
}

// -------------------------------------------------------------------------
// Leaving
// -------------------------------------------------------------------------

#[test]
fn test_leave_lobby_guest_frees_seat_for_next_joiner() {
    let mut t = full_table();

    t.send(3, ClientMessage::LeaveLobby);

    assert_eq!(
        t.seats("XYZ"),
        vec![("A".into(), 0), ("B".into(), 1), ("D".into(), 3)]
    );
    for id in [1, 2, 4] {
        let messages = t.drain(id);
        assert!(matches!(
            &messages[..],
            [ServerMessage::PlayerLeft { left_player_name, left_seat, players }]
                if left_player_name == "C" && *left_seat == seat(2) && players.len() == 3
        ));
    }
    assert!(t.drain(3).is_empty());

    t.connect(5);
    t.join(5, "XYZ", "E");
    assert!(matches!(
        t.drain(5)[..],
        [ServerMessage::LobbyJoined { my_seat, .. }] if my_seat == seat(2)
    ));
}

#[test]
fn test_disconnect_host_destroys_lobby_once() {
    let mut t = Table::new();
    for id in 1..=3 {
        t.connect(id);
    }
    t.create(1, "XYZ", "A");
    t.join(2, "XYZ", "B");
    t.join(3, "XYZ", "C");
    t.drain_all();

    t.hub.disconnect(PlayerId(1));
    t.hub.disconnect(PlayerId(1));

    assert_eq!(t.drain(2), vec![ServerMessage::HostDisconnected]);
    assert_eq!(t.drain(3), vec![ServerMessage::HostDisconnected]);
    assert!(t.hub.lobby("XYZ").is_none());

    // Former members are free again and the passphrase is available.
    t.create(2, "XYZ", "B");
    assert!(matches!(
        t.drain(2)[..],
        [ServerMessage::LobbyJoined { is_host: true, .. }]
    ));
    t.send(3, ClientMessage::LeaveLobby);
    assert!(t.drain(3).is_empty());
}

#[test]
fn test_disconnect_guest_notifies_remaining() {
    let mut t = full_table();

    t.hub.disconnect(PlayerId(4));

    assert_eq!(t.hub.connections().len(), 3);
    for id in 1..=3 {
        assert!(matches!(
            t.drain(id)[..],
            [ServerMessage::PlayerLeft { .. }]
        ));
    }
}

// -------------------------------------------------------------------------
// Seats and swaps
// -------------------------------------------------------------------------

#[test]
fn test_move_seat_mover_hears_first() {
    let mut t = Table::new();
    t.connect(1);
    t.connect(2);
    t.create(1, "XYZ", "A");
    t.join(2, "XYZ", "B");
    t.drain_all();

    t.send(2, ClientMessage::MoveSeat { target_seat: 3 });

    assert!(matches!(
        t.drain(2)[..],
        [ServerMessage::SeatChanged { my_seat, .. }] if my_seat == seat(3)
    ));
    assert!(matches!(
        t.drain(1)[..],
        [ServerMessage::LobbyUpdated { .. }]
    ));
    assert_eq!(t.seats("XYZ"), vec![("A".into(), 0), ("B".into(), 3)]);
}

#[test]
fn test_move_seat_out_of_range_is_silent() {
    let mut t = full_table();

    t.send(2, ClientMessage::MoveSeat { target_seat: 4 });
    t.send(2, ClientMessage::RequestSwap { target_seat: -1 });

    for id in 1..=4 {
        assert!(t.drain(id).is_empty());
    }
    assert_eq!(t.seats("XYZ")[1], ("B".into(), 1));
}

#[test]
fn test_move_seat_occupied_rejected() {
    let mut t = full_table();

    t.send(2, ClientMessage::MoveSeat { target_seat: 0 });

    assert_eq!(error_text(&t.drain(2)), vec!["Seat 0 is occupied"]);
    assert!(t.drain(1).is_empty());
}

#[test]
fn test_swap_accepted_exchanges_only_the_pair() {
    let mut t = full_table();

    t.send(2, ClientMessage::RequestSwap { target_seat: 3 });
    assert_eq!(
        t.drain(4),
        vec![ServerMessage::SwapRequest {
            from_name: "B".into(),
            from_seat: seat(1),
            target_seat: seat(3),
        }]
    );
    assert_eq!(t.seats("XYZ")[1], ("B".into(), 1));

    t.send(
        4,
        ClientMessage::SwapResponse {
            accepted: true,
            from_seat: 1,
        },
    );

    assert_eq!(
        t.seats("XYZ"),
        vec![
            ("A".into(), 0),
            ("B".into(), 3),
            ("C".into(), 2),
            ("D".into(), 1)
        ]
    );
    assert!(matches!(
        t.drain(2)[..],
        [ServerMessage::SeatChanged { my_seat, .. }] if my_seat == seat(3)
    ));
    assert!(matches!(
        t.drain(4)[..],
        [ServerMessage::SeatChanged { my_seat, .. }] if my_seat == seat(1)
    ));
    for id in [1, 3] {
        assert!(matches!(
            t.drain(id)[..],
            [ServerMessage::LobbyUpdated { .. }]
        ));
    }
}

#[test]
fn test_swap_declined_notifies_only_requester() {
    let mut t = full_table();
    t.send(2, ClientMessage::RequestSwap { target_seat: 3 });
    t.drain_all();

    t.send(
        4,
        ClientMessage::SwapResponse {
            accepted: false,
            from_seat: 1,
        },
    );

    assert_eq!(
        t.drain(2),
        vec![ServerMessage::SwapDeclined {
            by_name: "D".into()
        }]
    );
    for id in [1, 3, 4] {
        assert!(t.drain(id).is_empty());
    }
    assert_eq!(t.seats("XYZ")[1], ("B".into(), 1));
}

#[test]
fn test_swap_response_after_requester_left_is_noop() {
    let mut t = full_table();
    t.send(2, ClientMessage::RequestSwap { target_seat: 3 });
    t.send(2, ClientMessage::LeaveLobby);
    t.drain_all();

    t.send(
        4,
        ClientMessage::SwapResponse {
            accepted: true,
            from_seat: 1,
        },
    );

    for id in [1, 3, 4] {
        assert!(t.drain(id).is_empty());
    }
    assert_eq!(
        t.seats("XYZ"),
        vec![("A".into(), 0), ("C".into(), 2), ("D".into(), 3)]
    );
}

#[test]
fn test_swap_request_to_empty_seat_moves_directly() {
    let mut t = full_table();
    t.send(3, ClientMessage::LeaveLobby);
    t.drain_all();

    t.send(4, ClientMessage::RequestSwap { target_seat: 2 });

    assert!(matches!(
        t.drain(4)[..],
        [ServerMessage::SeatChanged { my_seat, .. }] if my_seat == seat(2)
    ));
}

// -------------------------------------------------------------------------
// Started lobbies
// -------------------------------------------------------------------------

#[test]
fn test_start_game_locks_roster() {
    let mut t = full_table();
    t.send(3, ClientMessage::LeaveLobby);
    t.send(1, ClientMessage::StartGame);
    t.drain_all();

    t.connect(5);
    t.join(5, "XYZ", "E");
    t.send(2, ClientMessage::MoveSeat { target_seat: 2 });
    t.send(2, ClientMessage::RequestSwap { target_seat: 0 });

    assert_eq!(error_text(&t.drain(5)), vec!["Game has already started"]);
    assert!(t.drain(1).is_empty());
    assert!(t.drain(2).is_empty());
    assert_eq!(
        t.seats("XYZ"),
        vec![("A".into(), 0), ("B".into(), 1), ("D".into(), 3)]
    );
}

#[test]
fn test_start_game_broadcasts_to_everyone() {
    let mut t = full_table();

    t.send(1, ClientMessage::StartGame);

    for id in 1..=4 {
        assert!(matches!(
            &t.drain(id)[..],
            [ServerMessage::GameStarted { players, ai_strategy }]
                if players.len() == 4 && ai_strategy == "Family"
        ));
    }
}

#[test]
fn test_start_game_by_guest_rejected() {
    let mut t = full_table();

    t.send(2, ClientMessage::StartGame);

    assert_eq!(error_text(&t.drain(2)), vec!["Only the host can do that"]);
    assert!(t.hub.lobby("XYZ").unwrap().state().is_open());
}

#[test]
fn test_player_action_reaches_host_with_seat() {
    let mut t = full_table();
    t.send(1, ClientMessage::StartGame);
    t.drain_all();

    t.send(
        3,
        ClientMessage::PlayerAction {
            action: Blob::new(json!({"card": "7H"})),
        },
    );

    assert_eq!(
        t.drain(1),
        vec![ServerMessage::PlayerAction {
            seat: seat(2),
            action: Blob::new(json!({"card": "7H"})),
        }]
    );
    for id in 2..=4 {
        assert!(t.drain(id).is_empty());
    }
}

#[test]
fn test_game_state_all_skips_host() {
    let mut t = full_table();
    t.send(1, ClientMessage::StartGame);
    t.drain_all();

    t.send(
        1,
        ClientMessage::GameStateAll {
            state: Blob::new(json!({"turn": 0})),
        },
    );

    assert!(t.drain(1).is_empty());
    for id in 2..=4 {
        assert_eq!(
            t.drain(id),
            vec![ServerMessage::GameState {
                state: Blob::new(json!({"turn": 0}))
            }]
        );
    }
}

#[test]
fn test_game_state_to_departed_target_dropped() {
    let mut t = full_table();
    t.send(1, ClientMessage::StartGame);
    t.hub.disconnect(PlayerId(4));
    t.drain_all();

    t.send(
        1,
        ClientMessage::GameState {
            target_connection_id: PlayerId(4),
            state: Blob::new(json!("hand")),
        },
    );

    for id in 1..=3 {
        assert!(t.drain(id).is_empty());
    }
}

#[test]
fn test_host_disconnect_mid_game_ends_it() {
    let mut t = full_table();
    t.send(1, ClientMessage::StartGame);
    t.drain_all();

    t.hub.disconnect(PlayerId(1));

    for id in 2..=4 {
        assert_eq!(t.drain(id), vec![ServerMessage::HostDisconnected]);
    }
    assert!(t.hub.lobbies().is_empty());
}
