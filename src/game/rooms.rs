use std::collections::HashMap;
use uuid::Uuid;

use crate::error::MatchError;
use crate::models::{Player, Room, MAX_PLAYERS};

/// In-memory directory of rooms keyed by room id.
///
/// Creation order is remembered so every listing, and therefore random
/// matchmaking, is deterministic for a given set of rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    order: Vec<String>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_room(&mut self, player: Player) -> String {
        let room_id = Uuid::new_v4().to_string();
        self.order.push(room_id.clone());
        self.rooms
            .insert(room_id.clone(), Room::new(room_id.clone(), player));
        room_id
    }

    pub fn get_room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Insert or replace a room. Over-capacity rooms are refused.
    pub fn set_room(&mut self, room_id: &str, room: Room) -> Result<(), MatchError> {
        if room.players.len() > MAX_PLAYERS {
            return Err(MatchError::RoomFull);
        }
        if self.rooms.insert(room_id.to_string(), room).is_none() {
            self.order.push(room_id.to_string());
        }
        Ok(())
    }

    pub fn remove_player(&mut self, room_id: &str, player_id: &str) {
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.players.retain(|p| p.id != player_id);
        }
    }

    /// Rooms with a free seat, oldest first.
    pub fn list_available_rooms(&self) -> Vec<&Room> {
        self.iter().filter(|room| !room.is_full()).collect()
    }

    pub fn remove_room(&mut self, room_id: &str) -> Option<Room> {
        let room = self.rooms.remove(room_id)?;
        self.order.retain(|id| id != room_id);
        Some(room)
    }

    pub fn list_rooms(&self) -> Vec<&Room> {
        self.iter().collect()
    }

    pub fn find_room_by_player_id(&self, player_id: &str) -> Option<&Room> {
        self.iter().find(|room| room.has_player(player_id))
    }

    pub fn find_room_by_connection(&self, socket_id: &str) -> Option<&Room> {
        self.iter()
            .find(|room| room.player_on_connection(socket_id).is_some())
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &Room> + '_ {
        self.order.iter().filter_map(|id| self.rooms.get(id))
    }
}
