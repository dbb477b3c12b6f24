//! Export format selection and file output.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use skytrail_core::download_file_name;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name used in file names when every trajectory is exported at once.
pub const ALL_ENTITIES: &str = "all";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportFormatError {
    #[error("unsupported export format: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Flat waypoint list with statistics
    Json,
    /// RFC 7946 LineString feature(s)
    GeoJson,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::GeoJson => "geojson",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "geojson" => Ok(ExportFormat::GeoJson),
            _ => Err(ExportFormatError::Unsupported(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where an export lands when no explicit output path is given.
///
/// `dir` defaults to the working directory; `id` of `None` means all entities.
pub fn default_output_path(
    dir: Option<&Path>,
    id: Option<&str>,
    format: ExportFormat,
    at: DateTime<Utc>,
) -> PathBuf {
    let name = download_file_name(id.unwrap_or(ALL_ENTITIES), format.extension(), at);
    match dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Pretty-print `document` and write it to `path`.
pub fn write_document<T: Serialize>(path: &Path, document: &T) -> anyhow::Result<usize> {
    let body = serde_json::to_string_pretty(document)?;
    std::fs::write(path, &body)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(body.len())
}
