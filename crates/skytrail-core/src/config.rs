//! Tracker configuration.

use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default poll interval, matched to the upstream state cache lifetime.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 45_000;
/// Default upper bound on waypoints kept per trajectory.
pub const DEFAULT_MAX_POINTS: usize = 1000;

/// Construction-time settings for a tracker instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Interval between position polls in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum waypoints retained per trajectory (oldest evicted first)
    pub max_points: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl TrackerConfig {
    pub fn new(poll_interval_ms: u64, max_points: usize) -> Result<Self> {
        let config = Self {
            poll_interval_ms,
            max_points,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(TrackerError::InvalidConfig(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_points == 0 {
            return Err(TrackerError::InvalidConfig(
                "max_points must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
