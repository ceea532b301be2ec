//! NetCDF-4 access for the forcing regridder.
//!
//! Three kinds of files pass through this crate:
//!
//! - **Restart files**, from which [`read_target_mesh`] takes the node mesh
//!   of a `parametric_rectangular` structure.
//! - **Source products** (ERA5 hourly, TOPAZ4 daily), read one 2-D record at
//!   a time through [`NetCdfSourceReader`].
//! - **Forcing output**, written step by step through [`NetCdfForcingWriter`].
//!
//! # Implementation Notes
//!
//! Reading and writing go through the `netcdf` crate, which links the system
//! netCDF and HDF5 libraries (libnetcdf-dev, libhdf5-dev). HDF5's own error
//! printing is silenced with [`silence_hdf5_errors`] before the first access.

mod error;
mod mesh;
mod native;
mod source;
mod writer;

pub use error::{NetCdfError, NetCdfResult};
pub use mesh::{read_target_mesh, PARAMETRIC_RECTANGULAR};
pub use native::silence_hdf5_errors;
pub use source::NetCdfSourceReader;
pub use writer::NetCdfForcingWriter;
