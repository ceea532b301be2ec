//! Source and output file naming.
//!
//! Source file names are a pure function of the product prefix, the field
//! and a representative timestamp: ERA5 ships one file per field and year,
//! TOPAZ4 one file per month holding every field.

use crate::error::ForcingResult;
use crate::time::year_month;

/// Default product prefix of ERA5 source files.
pub const ERA5_PRODUCT: &str = "ERA5";

/// Default product prefix of TOPAZ4 daily source files.
pub const TOPAZ4_PRODUCT: &str = "TP4DAILY";

/// Product name used for the TOPAZ4 output file.
pub const TOPAZ4_OUTPUT_PRODUCT: &str = "TOPAZ4";

/// `{product}_{field}_y{year}.nc`
pub fn era5_source_file_name(product: &str, field: &str, unix_seconds: i64) -> ForcingResult<String> {
    let (year, _) = year_month(unix_seconds)?;
    Ok(format!("{}_{}_y{}.nc", product, field, year))
}

/// `{product}{year}{month:02}_3m.nc`
pub fn topaz4_source_file_name(product: &str, unix_seconds: i64) -> ForcingResult<String> {
    let (year, month) = year_month(unix_seconds)?;
    Ok(format!("{}{}{:02}_3m.nc", product, year, month))
}

/// `{product}_{start}_{stop}.nc`
pub fn output_file_name(product: &str, start: &str, stop: &str) -> String {
    format!("{}_{}_{}.nc", product, start, stop)
}
