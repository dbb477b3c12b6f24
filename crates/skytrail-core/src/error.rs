use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors raised for invalid tracker setup.
///
/// Missing data, unknown ids and upstream fetch failures are not errors at
/// this level; queries return empty values instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),
}
