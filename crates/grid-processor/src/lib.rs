//! Regridding engine: bilinear resampling of source fields onto the
//! element centres of a target mesh.
//!
//! # Architecture
//!
//! ```text
//! TargetMesh (nodes)
//!      │
//!      ▼
//! elementize() ──► ElementGrid (centres)
//!                       │
//!                       ▼
//!          fractional_indices(transform)
//!                       │
//!                       ▼
//!   source slice ──► resample / resample_missing ──► Array2D (x, y)
//! ```
//!
//! Everything here is a pure function over arrays; reading and writing
//! files happens elsewhere.
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{elementize, regrid_regular};
//! use projection::RegularLonLat;
//!
//! let elements = elementize(&mesh)?;
//! let grid = RegularLonLat::from_axes(&lons, &lats)?;
//! let pressure = regrid_regular(&msl, &grid, &elements)?;
//! ```

pub mod elements;
pub mod error;
pub mod resample;
pub mod types;

// Re-export commonly used types at crate root
pub use elements::elementize;
pub use error::{GridProcessorError, Result};
pub use resample::{
    bilinear, bilinear_missing, bilinear_weights, extend_periodic, fractional_indices,
    latitude_fit_rms, regrid_polar, regrid_regular, resample, resample_missing, BilinearWeights,
};
pub use types::FractionalIndices;
