//! Server configuration from environment.

use skytrail_core::config::{DEFAULT_MAX_POINTS, DEFAULT_POLL_INTERVAL_MS};
use skytrail_core::{TrackerConfig, TrackerError};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Base URL of the flight-state backend
    pub backend_url: String,
    pub poll_interval_ms: u64,
    pub max_points: usize,
    /// Per-request timeout for position fetches
    pub source_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            backend_url: "http://localhost:8000".to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_points: DEFAULT_MAX_POINTS,
            source_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("SKYTRAIL_PORT").unwrap_or(defaults.server_port),
            backend_url: env::var("SKYTRAIL_BACKEND_URL").unwrap_or(defaults.backend_url),
            poll_interval_ms: env_parse("SKYTRAIL_POLL_INTERVAL_MS")
                .unwrap_or(defaults.poll_interval_ms),
            max_points: env_parse("SKYTRAIL_MAX_POINTS").unwrap_or(defaults.max_points),
            source_timeout_secs: env_parse("SKYTRAIL_SOURCE_TIMEOUT_SECS")
                .unwrap_or(defaults.source_timeout_secs),
        }
    }

    /// Validated tracker settings.
    pub fn tracker_config(&self) -> Result<TrackerConfig, TrackerError> {
        TrackerConfig::new(self.poll_interval_ms, self.max_points)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
