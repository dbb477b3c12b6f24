pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod spatial;
pub mod statistics;
pub mod trajectory;

pub use config::TrackerConfig;
pub use error::TrackerError;
pub use export::{
    download_file_name, GeoJsonFeature, GeoJsonFeatureCollection, TrajectoryExport,
};
pub use models::{Position, PositionSnapshot, Waypoint, WaypointMetadata};
pub use spatial::{haversine_distance_km, initial_bearing_deg, path_distance_km};
pub use statistics::{MetricSummary, TrajectoryStatistics};
pub use trajectory::{AppendOutcome, Trajectory};
