//! GeoJSON (RFC 7946) and flat JSON export of trajectories.

use crate::models::Waypoint;
use crate::statistics::TrajectoryStatistics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NO_DATA_MESSAGE: &str = "No trajectory data available";

/// GeoJSON geometry. Only line strings are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Positions as `[longitude, latitude, altitude]`
    LineString { coordinates: Vec<[f64; 3]> },
}

impl Geometry {
    pub fn coordinates(&self) -> &[[f64; 3]] {
        match self {
            Geometry::LineString { coordinates } => coordinates,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub waypoint_count: usize,
    /// Milliseconds between first and last waypoint
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A single trajectory as a GeoJSON Feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct GeoJsonFeature {
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl GeoJsonFeature {
    /// Build a LineString feature from waypoints in chronological order.
    ///
    /// An empty trajectory produces empty coordinates and an explanatory
    /// `message` property.
    pub fn from_waypoints(id: &str, waypoints: &[Waypoint]) -> Self {
        let Some(stats) = TrajectoryStatistics::from_waypoints(id, waypoints) else {
            return Self {
                geometry: Geometry::LineString {
                    coordinates: Vec::new(),
                },
                properties: FeatureProperties {
                    id: id.to_string(),
                    message: Some(NO_DATA_MESSAGE.to_string()),
                    ..Default::default()
                },
            };
        };

        let coordinates = waypoints
            .iter()
            .map(|wp| [wp.position.lon, wp.position.lat, wp.altitude.unwrap_or(0.0)])
            .collect();

        Self {
            geometry: Geometry::LineString { coordinates },
            properties: FeatureProperties {
                id: stats.id,
                label: stats.label,
                waypoint_count: stats.waypoint_count,
                duration: stats.tracking_duration_ms,
                start_time: Some(stats.start_time.timestamp_millis()),
                end_time: Some(stats.end_time.timestamp_millis()),
                max_altitude: stats.altitude.max,
                min_altitude: stats.altitude.min,
                avg_altitude: stats.altitude.avg,
                max_velocity: stats.velocity.max,
                min_velocity: stats.velocity.min,
                avg_velocity: stats.velocity.avg,
                distance_km: Some(stats.distance_traveled_km),
                message: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub total_entities: usize,
    pub total_waypoints: usize,
}

/// Every trajectory as one GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct GeoJsonFeatureCollection {
    pub features: Vec<GeoJsonFeature>,
    pub metadata: CollectionMetadata,
}

impl GeoJsonFeatureCollection {
    pub fn new(features: Vec<GeoJsonFeature>) -> Self {
        let metadata = CollectionMetadata {
            total_entities: features.len(),
            total_waypoints: features.iter().map(|f| f.properties.waypoint_count).sum(),
        };
        Self { features, metadata }
    }
}

/// Flat export document offered for download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryExport {
    pub id: String,
    pub trajectory: Vec<Waypoint>,
    pub statistics: Option<TrajectoryStatistics>,
    /// Serialized as RFC 3339
    pub exported_at: DateTime<Utc>,
}

impl TrajectoryExport {
    pub fn new(id: &str, trajectory: Vec<Waypoint>, exported_at: DateTime<Utc>) -> Self {
        let statistics = TrajectoryStatistics::from_waypoints(id, &trajectory);
        Self {
            id: id.to_string(),
            trajectory,
            statistics,
            exported_at,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// File name used when a trajectory export is saved, e.g.
/// `trajectory_a1b2c3_1700000000000.json`.
pub fn download_file_name(id: &str, extension: &str, at: DateTime<Utc>) -> String {
    format!("trajectory_{}_{}.{}", id, at.timestamp_millis(), extension)
}
