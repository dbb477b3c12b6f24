//! Skytrail SDK - trajectory tracking client library
//!
//! Wraps the Skytrail server's REST API for starting and stopping aircraft
//! tracking and for pulling trajectories, statistics and exports.

pub mod client;

pub use client::{AddPositionResponse, SkytrailClient, TrackingStatus};
pub use skytrail_core::{
    GeoJsonFeature, GeoJsonFeatureCollection, Position, PositionSnapshot, TrajectoryExport,
    TrajectoryStatistics, Waypoint, WaypointMetadata,
};
