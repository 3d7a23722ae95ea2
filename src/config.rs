use std::env;
use std::io;
use std::str::FromStr;

use crate::game::{DisconnectPolicy, DEFAULT_TURN_DURATION_MS};

/// Server settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Turn allotment handed to rooms that never set their own.
    pub turn_duration_ms: u64,
    /// Report clock lookups that miss instead of ignoring them.
    pub strict_clock: bool,
    pub disconnect_policy: DisconnectPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            turn_duration_ms: DEFAULT_TURN_DURATION_MS,
            strict_clock: false,
            disconnect_policy: DisconnectPolicy::KeepSeat,
        }
    }
}

impl ServerConfig {
    /// Load from `HOST`, `PORT`, `TURN_DURATION_MS`, `STRICT_CLOCK` and
    /// `EVICT_ON_DISCONNECT`, after picking up a `.env` file if present.
    pub fn from_env() -> io::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> io::Result<Self> {
        let defaults = ServerConfig::default();
        let evict: bool = parse(&lookup, "EVICT_ON_DISCONNECT", false)?;
        Ok(ServerConfig {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "PORT", defaults.port)?,
            turn_duration_ms: parse(&lookup, "TURN_DURATION_MS", defaults.turn_duration_ms)?,
            strict_clock: parse(&lookup, "STRICT_CLOCK", defaults.strict_clock)?,
            disconnect_policy: if evict {
                DisconnectPolicy::EvictSeat
            } else {
                DisconnectPolicy::KeepSeat
            },
        })
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> io::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid value {:?} for {}: {}", raw, key, e),
            )
        }),
    }
}
