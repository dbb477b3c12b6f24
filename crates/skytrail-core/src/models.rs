//! Core data models for trajectory tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic position in degrees.
///
/// Equality is exact on both coordinates; this is what trajectory
/// de-duplication compares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Optional flight metadata attached to a position sample.
///
/// Units are whatever the position source reports; they are carried through
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaypointMetadata {
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub ground_speed: Option<f64>,
    #[serde(default)]
    pub vertical_rate: Option<f64>,
    #[serde(default)]
    pub on_ground: Option<bool>,
    /// Display string, usually the callsign
    #[serde(default)]
    pub label: Option<String>,
}

/// One observation returned by a position source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub position: Position,
    #[serde(flatten)]
    pub metadata: WaypointMetadata,
}

impl PositionSnapshot {
    pub fn new(position: Position, metadata: WaypointMetadata) -> Self {
        Self { position, metadata }
    }
}

/// A timestamped sample stored in a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub captured_at: DateTime<Utc>,
    pub position: Position,
    pub altitude: Option<f64>,
    pub heading: Option<f64>,
    pub ground_speed: Option<f64>,
    pub vertical_rate: Option<f64>,
    pub on_ground: Option<bool>,
    pub label: Option<String>,
}

impl Waypoint {
    pub fn new(captured_at: DateTime<Utc>, position: Position, metadata: WaypointMetadata) -> Self {
        Self {
            captured_at,
            position,
            altitude: metadata.altitude,
            heading: metadata.heading,
            ground_speed: metadata.ground_speed,
            vertical_rate: metadata.vertical_rate,
            on_ground: metadata.on_ground,
            label: metadata.label,
        }
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> i64 {
        self.captured_at.timestamp_millis()
    }
}
