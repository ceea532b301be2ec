//! Error types for the forcing workspace.

use thiserror::Error;

use crate::time::TimeParseError;

/// Result type alias using ForcingError.
pub type ForcingResult<T> = Result<T, ForcingError>;

/// Primary error type shared by the regridding engine and its I/O seams.
#[derive(Debug, Error)]
pub enum ForcingError {
    // === Input Errors ===
    #[error("Incorrect structure found: {found}, wanted {expected}")]
    StructureMismatch { found: String, expected: String },

    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("Invalid array shape: {0}")]
    InvalidShape(String),

    #[error("Shape mismatch for '{name}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        name: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // === Data Errors ===
    #[error("No record for time {target} in {file}")]
    TimeNotFound { file: String, target: i64 },

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("Failed to write data: {0}")]
    DataWriteError(String),

    #[error("Projection error: {0}")]
    ProjectionError(String),
}

impl ForcingError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        name: impl Into<String>,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Whether the error comes from malformed inputs rather than failed I/O.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ForcingError::StructureMismatch { .. }
                | ForcingError::InvalidMesh(_)
                | ForcingError::InvalidShape(_)
                | ForcingError::ShapeMismatch { .. }
                | ForcingError::InvalidTime(_)
                | ForcingError::ConfigError(_)
        )
    }
}

impl From<std::io::Error> for ForcingError {
    fn from(err: std::io::Error) -> Self {
        ForcingError::DataReadError(err.to_string())
    }
}

impl From<TimeParseError> for ForcingError {
    fn from(err: TimeParseError) -> Self {
        ForcingError::InvalidTime(err.to_string())
    }
}
