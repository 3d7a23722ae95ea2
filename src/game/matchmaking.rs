use log::{debug, info};

use crate::error::MatchError;
use crate::game::rooms::RoomRegistry;
use crate::models::{Player, Room, MAX_PLAYERS};

/// What happens to a full room when one of its players drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisconnectPolicy {
    /// The departed player keeps the seat; the opponent is only told.
    #[default]
    KeepSeat,
    /// The departed player is removed from the room.
    EvictSeat,
}

/// Result of a connection going away, one per room it sat in.
#[derive(Debug, Clone, PartialEq)]
pub enum DisconnectOutcome {
    /// The room had fewer than two players and has been removed.
    RoomClosed(Room),
    /// The room stays; `player` left and the others should be told.
    PlayerLeft { room: Room, player: Player },
}

/// Join policies on top of the room registry. All writes to the registry go
/// through here, and each join runs its check and its write under the same
/// `&mut self`, so two joins can never both take the last seat.
#[derive(Debug, Default)]
pub struct Matchmaker {
    registry: RoomRegistry,
    policy: DisconnectPolicy,
}

impl Matchmaker {
    pub fn new(policy: DisconnectPolicy) -> Self {
        Matchmaker {
            registry: RoomRegistry::new(),
            policy,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn create_room(&mut self, player: Player) -> String {
        let room_id = self.registry.create_room(player);
        info!("Created room {}", room_id);
        room_id
    }

    pub fn join_room(&mut self, room_id: &str, player: Player) -> Result<Room, MatchError> {
        let room = self
            .registry
            .get_room(room_id)
            .ok_or(MatchError::RoomNotFound)?;
        if room.players.is_empty() {
            return Err(MatchError::RoomEmpty);
        }
        if room.players.len() >= MAX_PLAYERS {
            return Err(MatchError::RoomFull);
        }

        let mut updated = room.clone();
        updated.players.push(player);
        self.registry.set_room(room_id, updated.clone())?;
        info!("Player {} joined room {}", updated.players[1].id, room_id);
        Ok(updated)
    }

    /// Join the oldest room that has exactly one player waiting.
    pub fn join_random_room(&mut self, player: Player) -> Result<Room, MatchError> {
        let room_id = self
            .registry
            .list_available_rooms()
            .into_iter()
            .find(|room| room.players.len() == 1)
            .map(|room| room.room_id.clone())
            .ok_or(MatchError::NoRoomAvailable)?;
        self.join_room(&room_id, player)
    }

    pub fn close_room(&mut self, room_id: &str) -> Option<Room> {
        let room = self.registry.remove_room(room_id);
        if room.is_some() {
            info!("Closed room {}", room_id);
        }
        room
    }

    /// Apply the disconnect policy to every room seating `socket_id`.
    pub fn handle_disconnect(&mut self, socket_id: &str) -> Vec<DisconnectOutcome> {
        let affected: Vec<(String, Player, usize)> = self
            .registry
            .list_rooms()
            .into_iter()
            .filter_map(|room| {
                room.player_on_connection(socket_id)
                    .map(|p| (room.room_id.clone(), p.clone(), room.players.len()))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(affected.len());
        for (room_id, player, seated) in affected {
            if seated < MAX_PLAYERS {
                if let Some(room) = self.registry.remove_room(&room_id) {
                    info!("Room {} closed after {} disconnected", room_id, player.id);
                    outcomes.push(DisconnectOutcome::RoomClosed(room));
                }
                continue;
            }

            if self.policy == DisconnectPolicy::EvictSeat {
                self.registry.remove_player(&room_id, &player.id);
                debug!("Evicted {} from room {}", player.id, room_id);
            }
            if let Some(room) = self.registry.get_room(&room_id) {
                outcomes.push(DisconnectOutcome::PlayerLeft {
                    room: room.clone(),
                    player,
                });
            }
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            socket_id: format!("sock-{}", id),
            username: id.to_string(),
            rating: 1200,
            image_url: None,
        }
    }

    fn room_ids(rooms: Vec<&Room>) -> Vec<String> {
        rooms.into_iter().map(|r| r.room_id.clone()).collect()
    }

    #[test]
    fn join_appends_after_creator() {
        let mut mm = Matchmaker::default();
        let room_id = mm.create_room(player("a"));

        let room = mm.join_room(&room_id, player("b")).unwrap();
        assert_eq!(room.players, vec![player("a"), player("b")]);
        assert_eq!(mm.registry().get_room(&room_id), Some(&room));
    }

    #[test]
    fn join_full_room_leaves_it_unchanged() {
        let mut mm = Matchmaker::default();
        let room_id = mm.create_room(player("a"));
        mm.join_room(&room_id, player("b")).unwrap();
        let before = mm.registry().get_room(&room_id).cloned();

        assert_eq!(mm.join_room(&room_id, player("c")), Err(MatchError::RoomFull));
        assert_eq!(mm.registry().get_room(&room_id).cloned(), before);
    }

    #[test]
    fn join_unknown_room() {
        let mut mm = Matchmaker::default();
        assert_eq!(mm.join_room("nope", player("a")), Err(MatchError::RoomNotFound));
    }

    #[test]
    fn join_empty_room() {
        let mut mm = Matchmaker::default();
        let room_id = mm.create_room(player("a"));
        mm.registry.remove_player(&room_id, "a");
        assert_eq!(mm.join_room(&room_id, player("b")), Err(MatchError::RoomEmpty));
    }

    #[test]
    fn random_join_takes_oldest_single_seat_room() {
        let mut mm = Matchmaker::default();
        let first = mm.create_room(player("a"));
        let second = mm.create_room(player("b"));

        let room = mm.join_random_room(player("c")).unwrap();
        assert_eq!(room.room_id, first);
        let room = mm.join_random_room(player("d")).unwrap();
        assert_eq!(room.room_id, second);
        assert_eq!(mm.join_random_room(player("e")), Err(MatchError::NoRoomAvailable));
    }

    #[test]
    fn random_join_ignores_empty_and_full_rooms() {
        let mut mm = Matchmaker::default();
        let empty = mm.create_room(player("a"));
        mm.registry.remove_player(&empty, "a");
        let full = mm.create_room(player("b"));
        mm.join_room(&full, player("c")).unwrap();

        assert_eq!(mm.join_random_room(player("d")), Err(MatchError::NoRoomAvailable));
    }

    #[test]
    fn rooms_never_exceed_two_players() {
        let mut mm = Matchmaker::default();
        let room_id = mm.create_room(player("a"));
        for id in ["b", "c", "d"] {
            let _ = mm.join_room(&room_id, player(id));
            let _ = mm.join_random_room(player(id));
        }
        assert!(mm.registry().list_rooms().iter().all(|r| r.players.len() <= MAX_PLAYERS));
    }

    #[test]
    fn close_room_removes_it() {
        let mut mm = Matchmaker::default();
        let room_id = mm.create_room(player("a"));
        assert!(mm.close_room(&room_id).is_some());
        assert!(mm.close_room(&room_id).is_none());
        assert!(mm.registry().get_room(&room_id).is_none());
    }

    #[test]
    fn disconnect_from_lone_room_closes_it() {
        let mut mm = Matchmaker::default();
        let room_id = mm.create_room(player("a"));
        let other = mm.create_room(player("b"));

        let outcomes = mm.handle_disconnect("sock-a");
        assert!(matches!(&outcomes[..], [DisconnectOutcome::RoomClosed(r)] if r.room_id == room_id));
        assert_eq!(room_ids(mm.registry().list_rooms()), vec![other]);
    }

    #[test]
    fn disconnect_from_full_room_keeps_the_seat() {
        let mut mm = Matchmaker::default();
        let room_id = mm.create_room(player("a"));
        mm.join_room(&room_id, player("b")).unwrap();

        let outcomes = mm.handle_disconnect("sock-b");
        match &outcomes[..] {
            [DisconnectOutcome::PlayerLeft { room, player: left }] => {
                assert_eq!(left.id, "b");
                assert_eq!(room.players.len(), 2);
            }
            other => panic!("unexpected outcomes: {:?}", other),
        }
        assert_eq!(mm.registry().get_room(&room_id).unwrap().players.len(), 2);
    }

    #[test]
    fn evict_policy_frees_the_seat() {
        let mut mm = Matchmaker::new(DisconnectPolicy::EvictSeat);
        let room_id = mm.create_room(player("a"));
        mm.join_room(&room_id, player("b")).unwrap();

        let outcomes = mm.handle_disconnect("sock-b");
        match &outcomes[..] {
            [DisconnectOutcome::PlayerLeft { room, .. }] => {
                assert_eq!(room.players, vec![player("a")]);
            }
            other => panic!("unexpected outcomes: {:?}", other),
        }
        let room = mm.join_random_room(player("c")).unwrap();
        assert_eq!(room.room_id, room_id);
    }

    #[test]
    fn disconnect_of_unknown_connection_does_nothing() {
        let mut mm = Matchmaker::default();
        mm.create_room(player("a"));
        assert!(mm.handle_disconnect("sock-z").is_empty());
        assert_eq!(mm.registry().len(), 1);
    }
}
