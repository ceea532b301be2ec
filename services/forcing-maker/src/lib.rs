//! Grid matched forcing files for a sea-ice model.
//!
//! Regrids hourly ERA5 atmospheric fields and daily TOPAZ4 ocean fields
//! onto the element centres of a model mesh, writing one forcing file per
//! product.

pub mod config;
pub mod fields;
pub mod pipeline;

pub use config::ForcingConfig;
pub use fields::{FieldSource, FieldSpec};
pub use pipeline::{run_era5, run_topaz4, RunSummary};
