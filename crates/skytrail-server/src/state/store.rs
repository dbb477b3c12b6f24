//! Application state owning the trajectory tracker.

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::source::{HttpPositionSource, PositionSource};
use crate::tracker::TrajectoryTracker;

/// Application state shared by all request handlers.
pub struct AppState {
    tracker: TrajectoryTracker,
    config: Config,
}

impl AppState {
    /// Build state backed by the HTTP position source from `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let source = HttpPositionSource::new(config.backend_url.clone(), config.source_timeout())?;
        Self::with_source(config, Arc::new(source))
    }

    /// Build state around any position source.
    ///
    /// No update callback is installed; the tracker logs each append itself.
    pub fn with_source(config: Config, source: Arc<dyn PositionSource>) -> Result<Self> {
        let tracker = TrajectoryTracker::new(config.tracker_config()?, source);
        Ok(Self { tracker, config })
    }

    pub fn tracker(&self) -> &TrajectoryTracker {
        &self.tracker
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use futures::future::{BoxFuture, FutureExt};
    use skytrail_core::{Position, PositionSnapshot, WaypointMetadata};

    struct NoData;

    impl PositionSource for NoData {
        fn fetch<'a>(
            &'a self,
            _id: &'a str,
        ) -> BoxFuture<'a, Result<Option<PositionSnapshot>, SourceError>> {
            async { Ok::<_, SourceError>(None) }.boxed()
        }
    }

    #[test]
    fn tracker_appends_without_update_callback() {
        let state = AppState::with_source(Config::default(), Arc::new(NoData)).unwrap();
        assert!(!state.tracker().has_update_callback());

        let tracker = state.tracker();
        for i in 0..3 {
            tracker.add_position("a1b2c3", Position::new(1.0, i as f64), WaypointMetadata::default());
        }
        assert_eq!(tracker.waypoint_count("a1b2c3"), 3);
    }

    #[test]
    fn invalid_tracker_config_is_rejected() {
        let config = Config {
            max_points: 0,
            ..Config::default()
        };
        assert!(AppState::with_source(config, Arc::new(NoData)).is_err());
    }
}
