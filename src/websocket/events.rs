use log::{info, warn};

use crate::error::{GatewayError, MatchError};
use crate::game::DisconnectOutcome;
use crate::models::{AppState, ClientMessage, Player, Room, ServerMessage, UserProfile};

/// Who an outbound message goes to.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipient {
    /// The connection that sent the request.
    Sender,
    /// Other connections, by connection id.
    Connections(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: Recipient,
    pub message: ServerMessage,
}

impl Outbound {
    pub fn reply(message: ServerMessage) -> Self {
        Outbound {
            to: Recipient::Sender,
            message,
        }
    }

    pub fn to_connections(ids: Vec<String>, message: ServerMessage) -> Self {
        Outbound {
            to: Recipient::Connections(ids),
            message,
        }
    }
}

/// Per-connection state kept by the gateway.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub id: String,
    pub user: Option<UserProfile>,
    pub room_id: Option<String>,
}

impl Connection {
    pub fn new(id: String) -> Self {
        Connection {
            id,
            user: None,
            room_id: None,
        }
    }

    /// The player this connection sits as; anonymous until a profile arrives.
    pub fn player(&self) -> Player {
        match &self.user {
            Some(profile) => Player::from_profile(profile, &self.id),
            None => Player::anonymous(&self.id),
        }
    }
}

/// Apply one client message to the shared state and return what has to be
/// sent where. Failures come back as an `error` reply to the sender.
pub fn handle_event(state: &AppState, conn: &mut Connection, mut msg: ClientMessage) -> Vec<Outbound> {
    let room_id = msg.room_id.clone().or_else(|| conn.room_id.clone());
    let message_type = std::mem::take(&mut msg.message_type);
    let result = match message_type.as_str() {
        "user" => handle_user(conn, msg),
        "create_room" => Ok(handle_create_room(state, conn)),
        "join_room" => handle_join_room(state, conn, msg),
        "join_random_room" => handle_join_random_room(state, conn),
        "start_timers" => handle_start_timers(state, msg),
        "get_time_remaining" => handle_get_time_remaining(state, msg),
        "switch_turn" => handle_switch_turn(state, msg),
        "set_room_duration" => handle_set_room_duration(state, msg),
        "move" => handle_move(state, conn, msg),
        "close_room" => handle_close_room(state, conn, msg),
        other => Err(GatewayError::UnknownMessage(other.to_string())),
    };

    result.unwrap_or_else(|e| {
        warn!("Rejected request from {}: {}", conn.id, e);
        vec![Outbound::reply(ServerMessage::error(room_id, e))]
    })
}

/// Tear down whatever the closed connection was part of.
pub fn handle_disconnect(state: &AppState, connection_id: &str) -> Vec<Outbound> {
    let outcomes = state.matchmaker().handle_disconnect(connection_id);

    let mut outbound = Vec::new();
    for outcome in outcomes {
        match outcome {
            DisconnectOutcome::RoomClosed(room) => {
                state.timers().clear_timers(&room.room_id);
            }
            DisconnectOutcome::PlayerLeft { room, player } => {
                info!("Player {} disconnected from room {}", player.id, room.room_id);
                let message = ServerMessage {
                    player: Some(player),
                    ..ServerMessage::with_room("player_disconnected", room.clone())
                };
                outbound.push(Outbound::to_connections(others_in(&room, connection_id), message));
            }
        }
    }
    outbound
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, GatewayError> {
    value.ok_or(GatewayError::MissingField(field))
}

/// Timers are only kept for rooms the registry knows about.
fn ensure_room(state: &AppState, room_id: &str) -> Result<(), GatewayError> {
    match state.matchmaker().registry().get_room(room_id) {
        Some(_) => Ok(()),
        None => Err(MatchError::RoomNotFound.into()),
    }
}

fn others_in(room: &Room, connection_id: &str) -> Vec<String> {
    room.players
        .iter()
        .filter(|p| p.socket_id != connection_id)
        .map(|p| p.socket_id.clone())
        .collect()
}

fn handle_user(conn: &mut Connection, msg: ClientMessage) -> Result<Vec<Outbound>, GatewayError> {
    conn.user = Some(required(msg.user, "user")?);
    Ok(Vec::new())
}

fn handle_create_room(state: &AppState, conn: &mut Connection) -> Vec<Outbound> {
    let room_id = state.matchmaker().create_room(conn.player());
    conn.room_id = Some(room_id.clone());
    vec![Outbound::reply(ServerMessage {
        room_id: Some(room_id),
        ..ServerMessage::new("room_created")
    })]
}

fn joined(conn: &mut Connection, room: Room) -> Vec<Outbound> {
    conn.room_id = Some(room.room_id.clone());
    let others = others_in(&room, &conn.id);
    vec![
        Outbound::reply(ServerMessage::with_room("room_joined", room.clone())),
        Outbound::to_connections(others, ServerMessage::with_room("opponent_joined", room)),
    ]
}

fn handle_join_room(
    state: &AppState,
    conn: &mut Connection,
    msg: ClientMessage,
) -> Result<Vec<Outbound>, GatewayError> {
    let room_id = required(msg.room_id, "room_id")?;
    let room = state.matchmaker().join_room(&room_id, conn.player())?;
    Ok(joined(conn, room))
}

fn handle_join_random_room(
    state: &AppState,
    conn: &mut Connection,
) -> Result<Vec<Outbound>, GatewayError> {
    let room = state.matchmaker().join_random_room(conn.player())?;
    Ok(joined(conn, room))
}

fn handle_start_timers(state: &AppState, msg: ClientMessage) -> Result<Vec<Outbound>, GatewayError> {
    let room_id = required(msg.room_id, "room_id")?;
    let p1 = required(msg.p1_id, "p1_id")?;
    let p2 = required(msg.p2_id, "p2_id")?;
    let p1_orientation = required(msg.p1_orientation, "p1_orientation")?;
    let p2_orientation = required(msg.p2_orientation, "p2_orientation")?;
    ensure_room(state, &room_id)?;

    let mut timers = state.timers();
    let duration_ms = msg
        .duration_ms
        .or_else(|| timers.room_duration(&room_id))
        .unwrap_or(state.config.turn_duration_ms);
    timers.start_timers(&room_id, &p1, &p2, p1_orientation, p2_orientation, duration_ms)?;

    Ok(vec![Outbound::reply(ServerMessage {
        room_id: Some(room_id),
        ..ServerMessage::new("timers_started")
    })])
}

fn handle_get_time_remaining(
    state: &AppState,
    msg: ClientMessage,
) -> Result<Vec<Outbound>, GatewayError> {
    let room_id = required(msg.room_id, "room_id")?;
    let p1 = required(msg.p1_id, "p1_id")?;
    let p2 = required(msg.p2_id, "p2_id")?;
    let turn = required(msg.turn, "turn")?;

    let timers = state.timers();
    let (p1_left, p2_left) = if state.config.strict_clock {
        timers.try_time_remaining(&room_id, &p1, &p2, turn)?
    } else {
        timers.get_time_remaining(&room_id, &p1, &p2, turn)
    };

    Ok(vec![Outbound::reply(ServerMessage {
        room_id: Some(room_id),
        p1_time_remaining: Some(p1_left),
        p2_time_remaining: Some(p2_left),
        ..ServerMessage::new("time_remaining")
    })])
}

fn handle_switch_turn(state: &AppState, msg: ClientMessage) -> Result<Vec<Outbound>, GatewayError> {
    let room_id = required(msg.room_id, "room_id")?;
    let player_id = required(msg.player_id, "player_id")?;

    let mut timers = state.timers();
    if state.config.strict_clock {
        timers.try_switch_turn(&room_id, &player_id)?;
    } else {
        timers.switch_turn(&room_id, &player_id);
    }
    Ok(Vec::new())
}

fn handle_set_room_duration(
    state: &AppState,
    msg: ClientMessage,
) -> Result<Vec<Outbound>, GatewayError> {
    let room_id = required(msg.room_id, "room_id")?;
    let duration_ms = required(msg.duration_ms, "duration_ms")?;
    ensure_room(state, &room_id)?;
    state.timers().set_room_duration(&room_id, duration_ms);
    Ok(Vec::new())
}

fn handle_move(
    state: &AppState,
    conn: &Connection,
    msg: ClientMessage,
) -> Result<Vec<Outbound>, GatewayError> {
    let room_id = required(msg.room_id, "room_id")?;
    let chess_move = required(msg.chess_move, "move")?;

    let others = match state.matchmaker().registry().get_room(&room_id) {
        Some(room) => others_in(room, &conn.id),
        None => return Err(MatchError::RoomNotFound.into()),
    };
    Ok(vec![Outbound::to_connections(
        others,
        ServerMessage {
            room_id: Some(room_id),
            chess_move: Some(chess_move),
            ..ServerMessage::new("move")
        },
    )])
}

fn handle_close_room(
    state: &AppState,
    conn: &mut Connection,
    msg: ClientMessage,
) -> Result<Vec<Outbound>, GatewayError> {
    let room_id = required(msg.room_id, "room_id")?;
    let closed = state.matchmaker().close_room(&room_id);
    state.timers().clear_timers(&room_id);
    if conn.room_id.as_deref() == Some(room_id.as_str()) {
        conn.room_id = None;
    }

    let others = closed
        .map(|room| others_in(&room, &conn.id))
        .unwrap_or_default();
    Ok(vec![Outbound::to_connections(
        others,
        ServerMessage {
            room_id: Some(room_id),
            ..ServerMessage::new("room_closed")
        },
    )])
}
