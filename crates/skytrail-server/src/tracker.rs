//! Per-aircraft polling sessions and in-memory trajectory storage.
//!
//! Each tracked id owns one background task that polls the position source
//! at a fixed interval and appends new samples to that id's trajectory.
//! Trajectories outlive their sessions: stopping only cancels future polls.

use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use skytrail_core::{
    AppendOutcome, GeoJsonFeature, GeoJsonFeatureCollection, Position, PositionSnapshot,
    Trajectory, TrajectoryExport, TrajectoryStatistics, TrackerConfig, Waypoint,
    WaypointMetadata,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::source::PositionSource;

/// Called after every stored waypoint with the id, the new waypoint and a
/// copy of the whole trajectory in chronological order.
pub type UpdateCallback = Arc<dyn Fn(&str, &Waypoint, &[Waypoint]) + Send + Sync>;

/// Tracking state of one id, as shown to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStatus {
    pub id: String,
    pub tracking: bool,
    pub waypoint_count: usize,
}

struct PollingSession {
    generation: u64,
    /// `None` while the initial fetch is still running
    handle: Option<JoinHandle<()>>,
}

impl PollingSession {
    fn abort(&self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// Removes a session reserved by `start_tracking` if the call is dropped
/// before the poll loop is armed.
struct PendingSession<'a> {
    sessions: &'a DashMap<String, PollingSession>,
    id: &'a str,
    generation: u64,
    armed: bool,
}

impl Drop for PendingSession<'_> {
    fn drop(&mut self) {
        if !self.armed {
            self.sessions
                .remove_if(self.id, |_, session| session.generation == self.generation);
        }
    }
}

struct TrackerInner {
    config: TrackerConfig,
    source: Arc<dyn PositionSource>,
    trajectories: DashMap<String, Trajectory>,
    sessions: DashMap<String, PollingSession>,
    next_generation: AtomicU64,
    on_update: Option<UpdateCallback>,
}

impl Drop for TrackerInner {
    fn drop(&mut self) {
        for entry in self.sessions.iter() {
            entry.value().abort();
        }
    }
}

/// Cheaply cloneable handle to a tracker instance.
#[derive(Clone)]
pub struct TrajectoryTracker {
    inner: Arc<TrackerInner>,
}

impl TrajectoryTracker {
    pub fn new(config: TrackerConfig, source: Arc<dyn PositionSource>) -> Self {
        Self::build(config, source, None)
    }

    pub fn with_update_callback(
        config: TrackerConfig,
        source: Arc<dyn PositionSource>,
        on_update: UpdateCallback,
    ) -> Self {
        Self::build(config, source, Some(on_update))
    }

    fn build(
        config: TrackerConfig,
        source: Arc<dyn PositionSource>,
        on_update: Option<UpdateCallback>,
    ) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                config,
                source,
                trajectories: DashMap::new(),
                sessions: DashMap::new(),
                next_generation: AtomicU64::new(1),
                on_update,
            }),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    pub fn has_update_callback(&self) -> bool {
        self.inner.on_update.is_some()
    }

    /// Start polling `id`.
    ///
    /// Any existing session for `id` is stopped first. The session counts as
    /// tracking from the moment this is called. One position update runs
    /// before this returns; the recurring poll fires one full interval later
    /// and then at every interval. A `stop_tracking` issued while the initial
    /// fetch is in flight wins: its sample is discarded and no poll loop is
    /// armed.
    pub async fn start_tracking(&self, id: &str) {
        self.stop_tracking(id);

        self.inner
            .trajectories
            .entry(id.to_string())
            .or_insert_with(|| Trajectory::new(self.inner.config.max_points));

        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);
        let displaced = self.inner.sessions.insert(
            id.to_string(),
            PollingSession {
                generation,
                handle: None,
            },
        );
        if let Some(previous) = displaced {
            previous.abort();
        }
        let mut pending = PendingSession {
            sessions: &self.inner.sessions,
            id,
            generation,
            armed: false,
        };

        self.inner.update_position(id, generation).await;

        // The map guard must be gone before `pending` can drop.
        let armed = match self.inner.sessions.get_mut(id) {
            Some(mut session) if session.generation == generation => {
                session.handle = Some(tokio::spawn(run_session(
                    Arc::downgrade(&self.inner),
                    id.to_string(),
                    generation,
                    self.inner.config.poll_interval(),
                )));
                true
            }
            _ => false,
        };
        pending.armed = armed;
        if !armed {
            tracing::debug!(aircraft = %id, "Stopped before the first poll");
            return;
        }

        tracing::info!(
            aircraft = %id,
            interval_ms = self.inner.config.poll_interval_ms,
            "Started tracking"
        );
    }

    /// Stop polling `id`. Its trajectory is kept. Returns false if `id` was
    /// not being tracked.
    pub fn stop_tracking(&self, id: &str) -> bool {
        match self.inner.sessions.remove(id) {
            Some((_, session)) => {
                session.abort();
                tracing::info!(aircraft = %id, "Stopped tracking");
                true
            }
            None => false,
        }
    }

    /// Stop every session. Returns how many were active.
    pub fn stop_all_tracking(&self) -> usize {
        let ids: Vec<String> = self
            .inner
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.iter().filter(|id| self.stop_tracking(id)).count()
    }

    /// Record a sample for `id`.
    ///
    /// A sample at exactly the last stored position is dropped. The
    /// waypoint is stamped with the current time.
    pub fn add_position(
        &self,
        id: &str,
        position: Position,
        metadata: WaypointMetadata,
    ) -> AppendOutcome {
        self.inner.add_position(id, position, metadata)
    }

    pub fn trajectory(&self, id: &str) -> Vec<Waypoint> {
        self.inner
            .trajectories
            .get(id)
            .map(|t| t.to_vec())
            .unwrap_or_default()
    }

    pub fn waypoint_count(&self, id: &str) -> usize {
        self.inner.trajectories.get(id).map_or(0, |t| t.len())
    }

    /// Ids that have a stored trajectory, tracked or not, sorted.
    pub fn tracked_entities(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inner
            .trajectories
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn is_tracking(&self, id: &str) -> bool {
        self.inner.sessions.contains_key(id)
    }

    pub fn active_session_count(&self) -> usize {
        self.inner.sessions.len()
    }

    /// Status of every id that has a trajectory or an active session.
    pub fn tracking_overview(&self) -> Vec<TrackingStatus> {
        let mut ids = self.tracked_entities();
        for entry in self.inner.sessions.iter() {
            if !ids.contains(entry.key()) {
                ids.push(entry.key().clone());
            }
        }
        ids.sort();

        ids.into_iter()
            .map(|id| TrackingStatus {
                tracking: self.is_tracking(&id),
                waypoint_count: self.waypoint_count(&id),
                id,
            })
            .collect()
    }

    /// `None` when `id` has no waypoints.
    pub fn statistics(&self, id: &str) -> Option<TrajectoryStatistics> {
        let trajectory = self.inner.trajectories.get(id)?;
        TrajectoryStatistics::from_waypoints(id, trajectory.iter())
    }

    pub fn all_statistics(&self) -> Vec<TrajectoryStatistics> {
        self.tracked_entities()
            .iter()
            .filter_map(|id| self.statistics(id))
            .collect()
    }

    pub fn export_geojson(&self, id: &str) -> GeoJsonFeature {
        GeoJsonFeature::from_waypoints(id, &self.trajectory(id))
    }

    pub fn export_all_geojson(&self) -> GeoJsonFeatureCollection {
        let features = self
            .tracked_entities()
            .iter()
            .map(|id| self.export_geojson(id))
            .collect();
        GeoJsonFeatureCollection::new(features)
    }

    pub fn export_json(&self, id: &str) -> TrajectoryExport {
        TrajectoryExport::new(id, self.trajectory(id), Utc::now())
    }

    /// Drop the stored waypoints for `id`. An active session keeps polling
    /// and starts a fresh trajectory on its next sample.
    pub fn clear_trajectory(&self, id: &str) -> bool {
        let removed = self.inner.trajectories.remove(id).is_some();
        if removed {
            tracing::info!(aircraft = %id, "Cleared trajectory");
        }
        removed
    }

    pub fn clear_all_trajectories(&self) {
        self.inner.trajectories.clear();
        tracing::info!("Cleared all trajectories");
    }
}

impl TrackerInner {
    fn is_current_session(&self, id: &str, generation: u64) -> bool {
        self.sessions
            .get(id)
            .is_some_and(|session| session.generation == generation)
    }

    /// One poll: fetch and append. Failures and empty answers are logged and
    /// leave the trajectory untouched. The sample is discarded unless
    /// `generation` is still the active session for `id`.
    async fn update_position(&self, id: &str, generation: u64) {
        let Some(snapshot) = self.fetch(id).await else {
            return;
        };

        if !self.is_current_session(id, generation) {
            tracing::debug!(aircraft = %id, "Discarding sample from stopped session");
            return;
        }

        self.add_position(id, snapshot.position, snapshot.metadata);
    }

    async fn fetch(&self, id: &str) -> Option<PositionSnapshot> {
        match self.source.fetch(id).await {
            Ok(Some(snapshot)) => Some(snapshot),
            Ok(None) => {
                tracing::warn!(aircraft = %id, "No position data found");
                None
            }
            Err(e) => {
                tracing::error!(aircraft = %id, error = %e, "Error updating position");
                None
            }
        }
    }

    fn add_position(&self, id: &str, position: Position, metadata: WaypointMetadata) -> AppendOutcome {
        let waypoint = Waypoint::new(Utc::now(), position, metadata);

        // The map guard must be released before the callback runs.
        let (outcome, count, snapshot) = {
            let mut trajectory = self
                .trajectories
                .entry(id.to_string())
                .or_insert_with(|| Trajectory::new(self.config.max_points));
            let outcome = trajectory.push(waypoint.clone());
            let snapshot = (outcome.is_appended() && self.on_update.is_some())
                .then(|| trajectory.to_vec());
            (outcome, trajectory.len(), snapshot)
        };

        match &outcome {
            AppendOutcome::Duplicate => {
                tracing::debug!(aircraft = %id, "Position unchanged, skipping duplicate");
            }
            AppendOutcome::Appended { .. } => {
                tracing::debug!(
                    aircraft = %id,
                    waypoint = count,
                    lat = position.lat,
                    lon = position.lon,
                    "Added waypoint"
                );
            }
        }

        if let (Some(callback), Some(points)) = (&self.on_update, snapshot) {
            callback(id, &waypoint, &points);
        }

        outcome
    }
}

/// Recurring poll loop for one session.
///
/// Holds only a weak reference so a dropped tracker ends its sessions.
/// Polls for one id never overlap: the next tick is awaited only after the
/// previous fetch has finished.
async fn run_session(
    tracker: Weak<TrackerInner>,
    id: String,
    generation: u64,
    period: std::time::Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(inner) = tracker.upgrade() else {
            break;
        };
        if !inner.is_current_session(&id, generation) {
            break;
        }
        inner.update_position(&id, generation).await;
    }
}
