//! Error types for grid processing.

use forcing_common::ForcingError;
use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while resampling onto the target mesh.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Array does not have the shape its grid describes.
    #[error("{name} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Coordinate transform could not be built.
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Shared data model rejected a derived array.
    #[error(transparent)]
    Forcing(#[from] ForcingError),
}

impl GridProcessorError {
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
}

impl From<GridProcessorError> for ForcingError {
    fn from(err: GridProcessorError) -> Self {
        match err {
            GridProcessorError::ShapeMismatch {
                name,
                expected,
                actual,
            } => ForcingError::shape_mismatch(name, expected, actual),
            GridProcessorError::Projection(err) => err.into(),
            GridProcessorError::Forcing(err) => err,
        }
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
