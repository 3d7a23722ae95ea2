use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Maximum number of players seated in a room.
pub const MAX_PLAYERS: usize = 2;

/// Profile a client announces about itself with the `user` message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A player seated in a room.
///
/// `socket_id` is the handle of the connection the player is currently
/// speaking through. It is only ever compared, and it is the one field that
/// may change after the player has been seated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub socket_id: String,
    pub username: String,
    pub rating: i32,
    pub image_url: Option<String>,
}

impl Player {
    pub fn from_profile(profile: &UserProfile, socket_id: &str) -> Self {
        Player {
            id: profile.id.clone(),
            socket_id: socket_id.to_string(),
            username: profile.name.clone(),
            rating: profile.rating,
            image_url: profile.image_url.clone(),
        }
    }

    /// A player who never sent a profile; the connection id doubles as player id.
    pub fn anonymous(socket_id: &str) -> Self {
        Player {
            id: socket_id.to_string(),
            socket_id: socket_id.to_string(),
            username: "anonymous".to_string(),
            rating: 0,
            image_url: None,
        }
    }

    pub fn refresh_connection(&mut self, socket_id: &str) {
        self.socket_id = socket_id.to_string();
    }
}

/// A match container holding at most [`MAX_PLAYERS`] players, in seating order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Room {
    pub room_id: String,
    pub players: Vec<Player>,
    pub created_at: SystemTime,
}

impl Room {
    pub fn new(room_id: String, first_player: Player) -> Self {
        Room {
            room_id,
            players: vec![first_player],
            created_at: SystemTime::now(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn player_on_connection(&self, socket_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.socket_id == socket_id)
    }
}
