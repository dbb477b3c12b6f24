//! Shared library surface for the trajectory server and its tests.

pub mod api;
pub mod config;
pub mod source;
pub mod state;
pub mod tracker;

pub use source::{HttpPositionSource, PositionSource, SourceError};
pub use tracker::{TrackingStatus, TrajectoryTracker, UpdateCallback};
