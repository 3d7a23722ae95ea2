use actix::Message;
use serde::{Deserialize, Serialize};

use crate::game::Orientation;
use crate::models::{Player, Room, UserProfile};

/// Message sent from client to server
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ClientMessage {
    pub message_type: String,
    pub room_id: Option<String>,
    pub user: Option<UserProfile>,
    pub p1_id: Option<String>,
    pub p2_id: Option<String>,
    pub p1_orientation: Option<Orientation>,
    pub p2_orientation: Option<Orientation>,
    pub turn: Option<Orientation>,
    pub player_id: Option<String>,
    pub duration_ms: Option<u64>,
    /// Opaque move payload relayed to the opponent untouched.
    #[serde(rename = "move")]
    pub chess_move: Option<serde_json::Value>,
}

/// Message sent from server to client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServerMessage {
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<Player>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p1_time_remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2_time_remaining: Option<u64>,
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    pub chess_move: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerMessage {
    pub fn new(message_type: &str) -> Self {
        ServerMessage {
            message_type: message_type.to_string(),
            room_id: None,
            room: None,
            player: None,
            p1_time_remaining: None,
            p2_time_remaining: None,
            chess_move: None,
            error: None,
        }
    }

    pub fn error(room_id: Option<String>, error: impl ToString) -> Self {
        ServerMessage {
            room_id,
            error: Some(error.to_string()),
            ..Self::new("error")
        }
    }

    pub fn with_room(room_type: &str, room: Room) -> Self {
        ServerMessage {
            room_id: Some(room.room_id.clone()),
            room: Some(room),
            ..Self::new(room_type)
        }
    }
}

/// Message type for WebSocket communication
#[derive(Message)]
#[rtype(result = "()")]
pub struct ChessWebSocketMessage(pub String);
