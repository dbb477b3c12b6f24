//! Aggregates derived from a trajectory.

use crate::models::{Position, Waypoint};
use crate::spatial::{haversine_distance_km, initial_bearing_deg};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Max/min/mean over the samples that define a value, plus the latest value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub avg: Option<f64>,
    /// Value on the most recent waypoint
    pub current: Option<f64>,
}

#[derive(Debug, Default)]
struct MetricAccumulator {
    max: Option<f64>,
    min: Option<f64>,
    sum: f64,
    samples: usize,
}

impl MetricAccumulator {
    fn observe(&mut self, value: Option<f64>) {
        let Some(value) = value else {
            return;
        };
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.sum += value;
        self.samples += 1;
    }

    fn finish(self, current: Option<f64>) -> MetricSummary {
        let avg = (self.samples > 0).then(|| self.sum / self.samples as f64);
        MetricSummary {
            max: self.max,
            min: self.min,
            avg,
            current,
        }
    }
}

/// Summary of a non-empty trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStatistics {
    pub id: String,
    pub label: Option<String>,
    pub waypoint_count: usize,
    /// Last minus first capture time
    pub tracking_duration_ms: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub altitude: MetricSummary,
    pub velocity: MetricSummary,
    pub distance_traveled_km: f64,
    pub current_position: Position,
    /// Bearing of the last segment
    pub current_track_deg: Option<f64>,
    pub on_ground: Option<bool>,
}

impl TrajectoryStatistics {
    /// Derive statistics from waypoints in chronological order.
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_waypoints<'a, I>(id: &str, waypoints: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Waypoint>,
    {
        let mut iter = waypoints.into_iter();
        let first = iter.next()?;

        let mut altitude = MetricAccumulator::default();
        let mut velocity = MetricAccumulator::default();
        altitude.observe(first.altitude);
        velocity.observe(first.ground_speed);

        let mut count = 1;
        let mut distance = 0.0;
        let mut prev = first;
        let mut last_segment: Option<(Position, Position)> = None;

        for waypoint in iter {
            count += 1;
            altitude.observe(waypoint.altitude);
            velocity.observe(waypoint.ground_speed);
            distance += haversine_distance_km(
                prev.position.lat,
                prev.position.lon,
                waypoint.position.lat,
                waypoint.position.lon,
            );
            last_segment = Some((prev.position, waypoint.position));
            prev = waypoint;
        }

        let last = prev;
        Some(Self {
            id: id.to_string(),
            label: last.label.clone(),
            waypoint_count: count,
            tracking_duration_ms: last.timestamp_ms() - first.timestamp_ms(),
            start_time: first.captured_at,
            end_time: last.captured_at,
            altitude: altitude.finish(last.altitude),
            velocity: velocity.finish(last.ground_speed),
            distance_traveled_km: distance,
            current_position: last.position,
            current_track_deg: last_segment.map(|(from, to)| initial_bearing_deg(&from, &to)),
            on_ground: last.on_ground,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WaypointMetadata;
    use chrono::{Duration, TimeZone};

    fn waypoint(offset_s: i64, lat: f64, lon: f64, altitude: Option<f64>, speed: Option<f64>) -> Waypoint {
        let base = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        Waypoint::new(
            base + Duration::seconds(offset_s),
            Position::new(lat, lon),
            WaypointMetadata {
                altitude,
                ground_speed: speed,
                ..Default::default()
            },
        )
    }

    #[test]
    fn empty_trajectory_has_no_statistics() {
        let waypoints: Vec<Waypoint> = Vec::new();
        assert!(TrajectoryStatistics::from_waypoints("abc123", &waypoints).is_none());
    }

    #[test]
    fn single_waypoint_has_zero_distance() {
        let waypoints = vec![waypoint(0, 33.0, -84.0, Some(1000.0), Some(200.0))];
        let stats = TrajectoryStatistics::from_waypoints("abc123", &waypoints).unwrap();

        assert_eq!(stats.waypoint_count, 1);
        assert_eq!(stats.distance_traveled_km, 0.0);
        assert_eq!(stats.tracking_duration_ms, 0);
        assert_eq!(stats.current_track_deg, None);
        assert_eq!(stats.altitude.avg, Some(1000.0));
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let waypoints = vec![
            waypoint(0, 0.0, 0.0, None, None),
            waypoint(45, 0.0, 1.0, None, None),
        ];
        let stats = TrajectoryStatistics::from_waypoints("eq", &waypoints).unwrap();

        assert!((stats.distance_traveled_km - 111.19).abs() < 0.01);
        assert_eq!(stats.tracking_duration_ms, 45_000);
        assert_eq!(stats.current_position, Position::new(0.0, 1.0));
        assert!((stats.current_track_deg.unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn aggregates_skip_undefined_values() {
        let waypoints = vec![
            waypoint(0, 33.0, -84.0, Some(1000.0), Some(100.0)),
            waypoint(45, 33.1, -84.0, None, Some(300.0)),
            waypoint(90, 33.2, -84.0, Some(3000.0), None),
        ];
        let stats = TrajectoryStatistics::from_waypoints("abc123", &waypoints).unwrap();

        assert_eq!(stats.altitude.max, Some(3000.0));
        assert_eq!(stats.altitude.min, Some(1000.0));
        assert_eq!(stats.altitude.avg, Some(2000.0));
        assert_eq!(stats.altitude.current, Some(3000.0));

        assert_eq!(stats.velocity.max, Some(300.0));
        assert_eq!(stats.velocity.min, Some(100.0));
        assert_eq!(stats.velocity.avg, Some(200.0));
        assert_eq!(stats.velocity.current, None);
    }

    #[test]
    fn zero_altitude_counts_as_defined() {
        let waypoints = vec![
            waypoint(0, 33.0, -84.0, Some(0.0), None),
            waypoint(45, 33.1, -84.0, Some(600.0), None),
        ];
        let stats = TrajectoryStatistics::from_waypoints("abc123", &waypoints).unwrap();

        assert_eq!(stats.altitude.min, Some(0.0));
        assert_eq!(stats.altitude.avg, Some(300.0));
    }

    #[test]
    fn no_defined_values_give_empty_summary() {
        let waypoints = vec![waypoint(0, 33.0, -84.0, None, None)];
        let stats = TrajectoryStatistics::from_waypoints("abc123", &waypoints).unwrap();
        assert_eq!(stats.velocity, MetricSummary::default());
    }
}
