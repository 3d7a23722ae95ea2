use log::{debug, info};
use std::collections::HashMap;
use std::time::Instant;

use crate::error::ClockError;
use crate::game::clock::{Clock, Orientation, SystemClock};

/// Turn allotment used when nobody configured one: 30 seconds.
pub const DEFAULT_TURN_DURATION_MS: u64 = 30_000;

/// Per-player timing state inside a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTimer {
    pub orientation: Orientation,
    pub start_time: Instant,
    pub last_move_time: Instant,
}

/// Timing state for one room. Both players share `duration_ms`, the time
/// allotted for a single turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTimer {
    pub players: HashMap<String, PlayerTimer>,
    pub duration_ms: u64,
}

impl RoomTimer {
    fn shell(duration_ms: u64) -> Self {
        RoomTimer {
            players: HashMap::new(),
            duration_ms,
        }
    }

    /// Whole seconds left for `player`, never negative. Only the side to move
    /// loses time; the other side is frozen at the full allotment.
    fn seconds_left(&self, player: &PlayerTimer, turn: Orientation, now: Instant) -> u64 {
        if player.orientation != turn {
            return self.duration_ms / 1000;
        }
        let elapsed = now.saturating_duration_since(player.last_move_time).as_millis();
        let elapsed = u64::try_from(elapsed).unwrap_or(u64::MAX);
        self.duration_ms.saturating_sub(elapsed) / 1000
    }
}

/// Owns every room's turn clock.
///
/// Lookups that miss degrade softly (no-op, `(0, 0)`); the `try_*` variants
/// report the miss as a [`ClockError`] instead.
pub struct TimerService<C: Clock = SystemClock> {
    clock: C,
    room_timers: HashMap<String, RoomTimer>,
}

impl TimerService<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TimerService<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimerService<C> {
    pub fn with_clock(clock: C) -> Self {
        TimerService {
            clock,
            room_timers: HashMap::new(),
        }
    }

    /// Start (or restart) both clocks of a room. An empty room id is ignored.
    pub fn start_timers(
        &mut self,
        room_id: &str,
        player_a: &str,
        player_b: &str,
        orientation_a: Orientation,
        orientation_b: Orientation,
        duration_ms: u64,
    ) -> Result<(), ClockError> {
        if room_id.is_empty() {
            return Ok(());
        }
        if player_a == player_b {
            return Err(ClockError::InvalidPairing("both timers belong to the same player"));
        }
        if orientation_a == orientation_b {
            return Err(ClockError::InvalidPairing("both players have the same orientation"));
        }

        let now = self.clock.now();
        let timer = |orientation| PlayerTimer {
            orientation,
            start_time: now,
            last_move_time: now,
        };
        let mut players = HashMap::with_capacity(2);
        players.insert(player_a.to_string(), timer(orientation_a));
        players.insert(player_b.to_string(), timer(orientation_b));

        self.room_timers
            .insert(room_id.to_string(), RoomTimer { players, duration_ms });
        info!("Started timers for room {} ({} ms per turn)", room_id, duration_ms);
        Ok(())
    }

    /// Seconds left for `(player_a, player_b)` with `turn` to move; `(0, 0)`
    /// when the room or either player has no timer.
    pub fn get_time_remaining(
        &self,
        room_id: &str,
        player_a: &str,
        player_b: &str,
        turn: Orientation,
    ) -> (u64, u64) {
        self.try_time_remaining(room_id, player_a, player_b, turn)
            .unwrap_or((0, 0))
    }

    pub fn try_time_remaining(
        &self,
        room_id: &str,
        player_a: &str,
        player_b: &str,
        turn: Orientation,
    ) -> Result<(u64, u64), ClockError> {
        let room = self
            .room_timers
            .get(room_id)
            .ok_or_else(|| ClockError::TimerNotFound(room_id.to_string()))?;
        let a = room
            .players
            .get(player_a)
            .ok_or_else(|| ClockError::PlayerNotFound(player_a.to_string()))?;
        let b = room
            .players
            .get(player_b)
            .ok_or_else(|| ClockError::PlayerNotFound(player_b.to_string()))?;

        let now = self.clock.now();
        Ok((room.seconds_left(a, turn, now), room.seconds_left(b, turn, now)))
    }

    /// Restart the turn clock of `player_id`. Silently ignored if unknown.
    pub fn switch_turn(&mut self, room_id: &str, player_id: &str) {
        if let Err(e) = self.try_switch_turn(room_id, player_id) {
            debug!("switch_turn ignored: {}", e);
        }
    }

    pub fn try_switch_turn(&mut self, room_id: &str, player_id: &str) -> Result<(), ClockError> {
        let now = self.clock.now();
        let room = self
            .room_timers
            .get_mut(room_id)
            .ok_or_else(|| ClockError::TimerNotFound(room_id.to_string()))?;
        let player = room
            .players
            .get_mut(player_id)
            .ok_or_else(|| ClockError::PlayerNotFound(player_id.to_string()))?;
        player.last_move_time = now;
        Ok(())
    }

    /// Set the shared turn allotment, creating a player-less timer if the
    /// room has none yet.
    pub fn set_room_duration(&mut self, room_id: &str, duration_ms: u64) {
        self.room_timers
            .entry(room_id.to_string())
            .and_modify(|room| room.duration_ms = duration_ms)
            .or_insert_with(|| RoomTimer::shell(duration_ms));
    }

    pub fn room_duration(&self, room_id: &str) -> Option<u64> {
        self.room_timers.get(room_id).map(|room| room.duration_ms)
    }

    pub fn get_timers_by_room_id(&self, room_id: &str) -> Option<&RoomTimer> {
        self.room_timers.get(room_id)
    }

    pub fn clear_timers(&mut self, room_id: &str) {
        if self.room_timers.remove(room_id).is_some() {
            info!("Cleared timers for room {}", room_id);
        }
    }

    pub fn timer_count(&self) -> usize {
        self.room_timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::clock::ManualClock;
    use std::time::Duration;

    const ROOM: &str = "room-1";

    fn started() -> (TimerService<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut timers = TimerService::with_clock(clock.clone());
        timers
            .start_timers(ROOM, "a", "b", Orientation::White, Orientation::Black, 30_000)
            .unwrap();
        (timers, clock)
    }

    #[test]
    fn fresh_timers_report_full_duration() {
        let (timers, _) = started();
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (30, 30));
    }

    #[test]
    fn only_the_side_to_move_loses_time() {
        let (timers, clock) = started();
        clock.advance(Duration::from_millis(5_000));
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (25, 30));
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::Black), (30, 25));
    }

    #[test]
    fn remaining_time_is_floored() {
        let (timers, clock) = started();
        clock.advance(Duration::from_millis(5_500));
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (24, 30));
    }

    #[test]
    fn overrun_clamps_to_zero() {
        let (timers, clock) = started();
        clock.advance(Duration::from_secs(45));
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (0, 30));
    }

    #[test]
    fn long_overrun_stays_at_zero() {
        let (timers, clock) = started();
        clock.advance(Duration::from_secs(365 * 24 * 3600));
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (0, 30));
    }

    #[test]
    fn switch_turn_resets_the_mover() {
        let (mut timers, clock) = started();
        clock.advance(Duration::from_millis(12_000));
        timers.switch_turn(ROOM, "a");
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (30, 30));

        clock.advance(Duration::from_millis(2_000));
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (28, 30));
    }

    #[test]
    fn missing_room_reports_zero() {
        let timers = TimerService::with_clock(ManualClock::new());
        assert_eq!(timers.get_time_remaining("nope", "a", "b", Orientation::White), (0, 0));
    }

    #[test]
    fn missing_player_reports_zero() {
        let (timers, _) = started();
        assert_eq!(timers.get_time_remaining(ROOM, "a", "z", Orientation::White), (0, 0));
    }

    #[test]
    fn switch_turn_on_unknown_entities_is_a_noop() {
        let (mut timers, _) = started();
        let before = timers.get_timers_by_room_id(ROOM).cloned();
        timers.switch_turn("nope", "a");
        timers.switch_turn(ROOM, "z");
        assert_eq!(timers.get_timers_by_room_id(ROOM).cloned(), before);
    }

    #[test]
    fn strict_variants_report_misses() {
        let (mut timers, _) = started();
        assert_eq!(
            timers.try_switch_turn("nope", "a"),
            Err(ClockError::TimerNotFound("nope".to_string()))
        );
        assert_eq!(
            timers.try_switch_turn(ROOM, "z"),
            Err(ClockError::PlayerNotFound("z".to_string()))
        );
        assert_eq!(
            timers.try_time_remaining(ROOM, "a", "z", Orientation::White),
            Err(ClockError::PlayerNotFound("z".to_string()))
        );
        assert!(timers.try_switch_turn(ROOM, "b").is_ok());
    }

    #[test]
    fn empty_room_id_is_ignored() {
        let mut timers = TimerService::with_clock(ManualClock::new());
        timers
            .start_timers("", "a", "b", Orientation::White, Orientation::Black, 30_000)
            .unwrap();
        assert_eq!(timers.timer_count(), 0);
    }

    #[test]
    fn invalid_pairings_are_rejected() {
        let mut timers = TimerService::with_clock(ManualClock::new());
        assert!(matches!(
            timers.start_timers(ROOM, "a", "a", Orientation::White, Orientation::Black, 1),
            Err(ClockError::InvalidPairing(_))
        ));
        assert!(matches!(
            timers.start_timers(ROOM, "a", "b", Orientation::Black, Orientation::Black, 1),
            Err(ClockError::InvalidPairing(_))
        ));
        assert!(timers.get_timers_by_room_id(ROOM).is_none());
    }

    #[test]
    fn duration_shell_before_start() {
        let mut timers = TimerService::with_clock(ManualClock::new());
        timers.set_room_duration(ROOM, 60_000);

        let shell = timers.get_timers_by_room_id(ROOM).unwrap();
        assert!(shell.players.is_empty());
        assert_eq!(shell.duration_ms, 60_000);
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (0, 0));

        timers
            .start_timers(ROOM, "a", "b", Orientation::White, Orientation::Black, 60_000)
            .unwrap();
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::Black), (60, 60));
    }

    #[test]
    fn set_duration_after_start_keeps_players() {
        let (mut timers, _) = started();
        timers.set_room_duration(ROOM, 10_000);
        assert_eq!(timers.room_duration(ROOM), Some(10_000));
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (10, 10));
    }

    #[test]
    fn restart_overwrites_previous_timers() {
        let (mut timers, clock) = started();
        clock.advance(Duration::from_secs(10));
        timers
            .start_timers(ROOM, "c", "d", Orientation::Black, Orientation::White, 20_000)
            .unwrap();
        let room = timers.get_timers_by_room_id(ROOM).unwrap();
        assert_eq!(room.players.len(), 2);
        assert!(room.players.contains_key("c") && !room.players.contains_key("a"));
        assert_eq!(timers.get_time_remaining(ROOM, "c", "d", Orientation::Black), (20, 20));
    }

    #[test]
    fn clear_removes_room_timer() {
        let (mut timers, _) = started();
        timers.clear_timers(ROOM);
        timers.clear_timers(ROOM);
        assert!(timers.get_timers_by_room_id(ROOM).is_none());
        assert_eq!(timers.get_time_remaining(ROOM, "a", "b", Orientation::White), (0, 0));
    }
}
