pub mod clock;
pub mod matchmaking;
pub mod rooms;
pub mod timers;

pub use clock::{Clock, ManualClock, Orientation, SystemClock};
pub use matchmaking::{DisconnectOutcome, DisconnectPolicy, Matchmaker};
pub use rooms::RoomRegistry;
pub use timers::{PlayerTimer, RoomTimer, TimerService, DEFAULT_TURN_DURATION_MS};
