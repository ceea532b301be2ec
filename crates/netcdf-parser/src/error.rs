//! Error types for NetCDF reading and writing.

use forcing_common::ForcingError;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF access.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the netcdf library while reading
    #[error("NetCDF error in {file}: {source}")]
    Library {
        file: String,
        #[source]
        source: netcdf::Error,
    },

    /// Missing required group, variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Mesh file holds a different structure type
    #[error("Incorrect structure found: {found}, wanted {expected}")]
    StructureMismatch { found: String, expected: String },

    /// Failure while writing an output file
    #[error("Failed to write {file}: {reason}")]
    WriteFailed { file: String, reason: String },

    /// Data model rejected what was read
    #[error(transparent)]
    Forcing(#[from] ForcingError),
}

impl NetCdfError {
    /// Wrap a library error with the file it concerns.
    pub fn library(file: impl Into<String>, source: netcdf::Error) -> Self {
        Self::Library {
            file: file.into(),
            source,
        }
    }

    /// Create a MissingData error.
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingData(what.into())
    }

    /// Create a WriteFailed error.
    pub fn write_failed(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::WriteFailed {
            file: file.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<NetCdfError> for ForcingError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::StructureMismatch { found, expected } => {
                ForcingError::StructureMismatch { found, expected }
            }
            NetCdfError::MissingData(what) => ForcingError::MissingData(what),
            NetCdfError::WriteFailed { .. } => ForcingError::DataWriteError(err.to_string()),
            NetCdfError::Forcing(inner) => inner,
            other => ForcingError::DataReadError(other.to_string()),
        }
    }
}
