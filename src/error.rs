use thiserror::Error;

/// Errors returned to a player trying to get into a room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("room does not exist!")]
    RoomNotFound,
    #[error("room is empty")]
    RoomEmpty,
    #[error("room is full")]
    RoomFull,
    #[error("No room available to join")]
    NoRoomAvailable,
}

/// Errors raised by the strict clock operations and by invalid timer pairings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("no timers running for room {0}")]
    TimerNotFound(String),
    #[error("no timer for player {0}")]
    PlayerNotFound(String),
    #[error("invalid timer pairing: {0}")]
    InvalidPairing(&'static str),
}

/// Why the gateway refused a client message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Unknown message type: {0}")]
    UnknownMessage(String),
}
