//! Room matchmaking and turn clocks for two-player chess matches, with a thin
//! actix WebSocket gateway in front of them.

pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod routes;
pub mod websocket;

pub use config::ServerConfig;
pub use error::{ClockError, GatewayError, MatchError};
