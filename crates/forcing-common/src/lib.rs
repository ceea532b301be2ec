//! Common types and utilities shared across the forcing regridder workspace.

pub mod error;
pub mod grid;
pub mod io;
pub mod naming;
pub mod time;

pub use error::{ForcingError, ForcingResult};
pub use grid::{Array2D, ElementGrid, TargetMesh};
pub use io::{ForcingSink, MemorySink, SourceReader};
pub use time::{parse_iso_date, TimeAxis, TimeConvention, TimeParseError};
