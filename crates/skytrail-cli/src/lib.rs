//! Skytrail CLI - command line tools for the trajectory tracker.
//!
//! Binaries:
//! - track: start tracking aircraft and print live statistics
//! - export_trajectory: save a trajectory as JSON or GeoJSON

pub mod export;
pub mod report;

pub use export::{ExportFormat, ExportFormatError};
pub use report::summary_line;
