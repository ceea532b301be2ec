//! Error types for coordinate transforms.

use forcing_common::ForcingError;
use thiserror::Error;

/// Result type for projection operations.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised while building a coordinate transform.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// Coordinate axis unusable for a regular grid
    #[error("invalid coordinate axis '{name}': {reason}")]
    InvalidAxis { name: String, reason: String },

    /// Latitude profile unusable as a radial lookup table
    #[error("invalid radial latitude profile: {0}")]
    InvalidProfile(String),

    /// Grid centre lies outside the coordinate field
    #[error("grid centre ({i}, {j}) outside coordinate field of shape {shape:?}")]
    CenterOutOfBounds { i: usize, j: usize, shape: (usize, usize) },
}

impl ProjectionError {
    pub fn invalid_axis(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAxis {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<ProjectionError> for ForcingError {
    fn from(err: ProjectionError) -> Self {
        ForcingError::ProjectionError(err.to_string())
    }
}
