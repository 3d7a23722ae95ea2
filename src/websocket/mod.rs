pub mod events;
pub mod handler;

pub use events::{handle_disconnect, handle_event, Connection, Outbound, Recipient};
pub use handler::{ws_index, ChessWebSocket};
