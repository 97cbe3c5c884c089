//! Runtime configuration for the session server
//!
//! Defaults reproduce the fixed constants from the `shared` crate; the
//! binary lets them be overridden from the command line.

use shared::{
    DEFAULT_PORT, ENDPOINT_PATH, IDLE_TIMEOUT_SECS, SWEEP_INTERVAL_SECS, TICK_INTERVAL_MS,
};
use std::time::Duration;

/// Capacity of each session's inbound event queue
pub const EVENT_QUEUE_CAPACITY: usize = 64;
/// Capacity of each connection's outbound frame queue
pub const OUTBOUND_QUEUE_CAPACITY: usize = 32;

/// Timing parameters shared by every session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Period of the simulation loop
    pub tick_interval: Duration,
    /// How long a created session may wait for its second player
    pub idle_timeout: Duration,
    /// How often the reaper sweeps the registry
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            idle_timeout: Duration::from_secs(IDLE_TIMEOUT_SECS),
            sweep_interval: Duration::from_secs(SWEEP_INTERVAL_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Only upgrade requests for this path are accepted
    pub path: String,
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            path: ENDPOINT_PATH.to_string(),
            session: SessionConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_config() {
        let config = SessionConfig::default();
        assert_eq!(config.tick_interval, Duration::from_millis(16));
        assert_eq!(config.idle_timeout, Duration::from_secs(300));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 9000,
            ..ServerConfig::default()
        };
        assert_eq!(config.address(), "0.0.0.0:9000");
        assert_eq!(config.path, "/connect");
    }

    #[test]
    fn test_tick_rate_is_roughly_sixty_hertz() {
        let hz = 1000.0 / SessionConfig::default().tick_interval.as_millis() as f64;
        assert!((60.0..=64.0).contains(&hz));
    }
}
