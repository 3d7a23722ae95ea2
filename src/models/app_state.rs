use actix::Addr;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::ServerConfig;
use crate::game::{Matchmaker, TimerService};
use crate::websocket::ChessWebSocket;

/// Application state shared between connections
pub struct AppState {
    pub matchmaker: Mutex<Matchmaker>,
    pub timers: Mutex<TimerService>,
    pub sessions: Mutex<HashMap<String, Addr<ChessWebSocket>>>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        AppState {
            matchmaker: Mutex::new(Matchmaker::new(config.disconnect_policy)),
            timers: Mutex::new(TimerService::new()),
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    // Poisoned locks are recovered, not propagated.
    pub fn matchmaker(&self) -> MutexGuard<'_, Matchmaker> {
        self.matchmaker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn timers(&self) -> MutexGuard<'_, TimerService> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sessions(&self) -> MutexGuard<'_, HashMap<String, Addr<ChessWebSocket>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
