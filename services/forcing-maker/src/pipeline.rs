//! Field driver.
//!
//! For every output field and time step: name the source file, find the
//! record matching the step, read the slice, regrid it onto the element
//! centres and hand it to the sink.
//!
//! ```text
//! TimeAxis ──► steps (index, unix, product time)
//!                 │
//!   FieldSpec ──► file name ──► record lookup ──► SourceReader::slice
//!                                                        │
//!                                   SourceGrid::regrid ◄─┘
//!                                          │
//!                                          ▼
//!                                ForcingSink::write_slice
//! ```

use forcing_common::naming::{era5_source_file_name, topaz4_source_file_name};
use forcing_common::time::HOURS_PER_DAY;
use forcing_common::{
    Array2D, ElementGrid, ForcingError, ForcingResult, ForcingSink, SourceReader, TimeAxis,
};
use grid_processor::{latitude_fit_rms, regrid_polar, regrid_regular};
use projection::{PolarGrid, RadialProfile, RegularLonLat};
use tracing::{debug, info, instrument, warn};

use crate::config::{Era5Config, Topaz4Config};
use crate::fields::{first_source_variable, FieldSource, FieldSpec};

/// What a finished run wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub product: String,
    pub fields: usize,
    pub steps: usize,
    /// RMS error of the source latitude regridded onto the elements, for
    /// curvilinear sources
    pub latitude_rms: Option<f64>,
}

/// One output time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Position on the output time axis
    pub index: usize,
    /// Unix seconds stored on the output time axis
    pub unix: i64,
    /// Step time in the source product's own convention (hours)
    pub target: i64,
}

/// Hourly ERA5 steps: one per hour of the axis.
pub fn era5_steps(times: &TimeAxis) -> Vec<Step> {
    (0..times.len())
        .map(|t| Step {
            index: t,
            unix: times.unix_seconds()[t],
            target: times.era5_hours()[t],
        })
        .collect()
}

/// Daily TOPAZ4 steps: one per whole day, taken at the day's first hour.
pub fn topaz4_steps(times: &TimeAxis) -> Vec<Step> {
    times
        .daily_indices()
        .enumerate()
        .map(|(day, hour)| Step {
            index: day,
            unix: times.unix_seconds()[hour],
            target: times.topaz4_hours()[hour],
        })
        .collect()
}

/// Record of an hourly file holding `target`.
pub fn hourly_record(first: i64, target: i64) -> i64 {
    target - first
}

/// Record of a daily file nearest to `target`.
pub fn daily_record(first: i64, target: i64) -> i64 {
    let day = HOURS_PER_DAY as i64;
    (target - first + day / 2).div_euclid(day)
}

/// Source product layout: file naming and record cadence.
#[derive(Debug, Clone, Copy)]
enum Product<'a> {
    /// One file per variable and year, hourly records
    Era5 { prefix: &'a str },
    /// One file per month holding every variable, daily records
    Topaz4 { prefix: &'a str },
}

impl Product<'_> {
    fn file_name(&self, variable: &str, unix: i64) -> ForcingResult<String> {
        match self {
            Product::Era5 { prefix } => era5_source_file_name(prefix, variable, unix),
            Product::Topaz4 { prefix } => topaz4_source_file_name(prefix, unix),
        }
    }

    fn record(&self, first: i64, target: i64) -> i64 {
        match self {
            Product::Era5 { .. } => hourly_record(first, target),
            Product::Topaz4 { .. } => daily_record(first, target),
        }
    }
}

/// Source grid and how slices on it are regridded.
enum SourceGrid {
    Regular(RegularLonLat),
    Polar { grid: PolarGrid, missing: f64 },
}

impl SourceGrid {
    fn regrid(&self, data: &Array2D, elements: &ElementGrid) -> ForcingResult<Array2D> {
        match self {
            SourceGrid::Regular(grid) => Ok(regrid_regular(data, grid, elements)?),
            SourceGrid::Polar { grid, missing } => {
                Ok(regrid_polar(data, grid, elements, *missing))
            }
        }
    }
}

/// Locate the record of `file` matching `target`.
fn find_record<R>(
    reader: &mut R,
    product: Product<'_>,
    file: &str,
    target: i64,
) -> ForcingResult<usize>
where
    R: SourceReader + ?Sized,
{
    let times = reader.time_axis(file)?;
    let not_found = || ForcingError::TimeNotFound {
        file: file.to_string(),
        target,
    };

    let first = times.first().ok_or_else(not_found)?.round() as i64;
    let record = product.record(first, target);
    let record = usize::try_from(record).map_err(|_| not_found())?;
    if record >= times.len() {
        return Err(not_found());
    }
    debug!(file, target, record, "Located time record");
    Ok(record)
}

/// Read `variable` at `step` and regrid it.
fn regrid_variable<R>(
    reader: &mut R,
    product: Product<'_>,
    grid: &SourceGrid,
    elements: &ElementGrid,
    variable: &str,
    step: &Step,
) -> ForcingResult<Array2D>
where
    R: SourceReader + ?Sized,
{
    let file = product.file_name(variable, step.unix)?;
    let record = find_record(reader, product, &file, step.target)?;
    let data = reader.slice(&file, variable, record)?;
    grid.regrid(&data, elements)
}

/// Write coordinates, field declarations and output times.
fn prepare<S>(
    sink: &mut S,
    elements: &ElementGrid,
    fields: &[FieldSpec],
    steps: &[Step],
) -> ForcingResult<()>
where
    S: ForcingSink + ?Sized,
{
    sink.write_coordinates(elements)?;
    for field in fields {
        sink.declare_field(&field.name)?;
    }
    for step in steps {
        sink.write_time(step.index, step.unix)?;
    }
    Ok(())
}

/// Write every field at every step.
fn write_fields<R, S>(
    reader: &mut R,
    sink: &mut S,
    product: Product<'_>,
    grid: &SourceGrid,
    elements: &ElementGrid,
    fields: &[FieldSpec],
    steps: &[Step],
) -> ForcingResult<()>
where
    R: SourceReader + ?Sized,
    S: ForcingSink + ?Sized,
{
    let (nx, ny) = elements.shape();

    for field in fields {
        debug!(field = %field.name, source = ?field.source, "Writing field");
        for step in steps {
            let slice = match &field.source {
                FieldSource::Variable { name } => {
                    regrid_variable(reader, product, grid, elements, name, step)?
                }
                FieldSource::WindSpeed { u, v } => {
                    let u = regrid_variable(reader, product, grid, elements, u, step)?;
                    let v = regrid_variable(reader, product, grid, elements, v, step)?;
                    u.zip_map(&v, f64::hypot)?
                }
                FieldSource::Zero => Array2D::zeros(nx, ny),
            };
            sink.write_slice(&field.name, step.index, &slice)?;
        }
    }
    Ok(())
}

/// Write the hourly atmospheric forcing file.
#[instrument(skip_all, fields(product = %config.product, steps = times.len()))]
pub fn run_era5<R, S>(
    reader: &mut R,
    sink: &mut S,
    elements: &ElementGrid,
    times: &TimeAxis,
    config: &Era5Config,
) -> ForcingResult<RunSummary>
where
    R: SourceReader + ?Sized,
    S: ForcingSink + ?Sized,
{
    let product = Product::Era5 {
        prefix: &config.product,
    };
    let steps = era5_steps(times);
    prepare(sink, elements, &config.fields, &steps)?;

    if let Some(first) = steps.first() {
        let variable = first_source_variable(&config.fields).ok_or_else(|| {
            ForcingError::ConfigError("ERA5 fields read no source variable".to_string())
        })?;
        let file = era5_source_file_name(&config.product, variable, first.unix)?;
        let lons = reader.axis(&file, "longitude")?;
        let lats = reader.axis(&file, "latitude")?;
        let grid = RegularLonLat::from_axes(&lons, &lats)?;
        info!(
            file = %file,
            nlon = grid.nlon,
            nlat = grid.nlat,
            "Loaded ERA5 grid"
        );

        write_fields(
            reader,
            sink,
            product,
            &SourceGrid::Regular(grid),
            elements,
            &config.fields,
            &steps,
        )?;
    } else {
        warn!("Empty time range, ERA5 file has no steps");
    }

    sink.finalize()?;
    info!(fields = config.fields.len(), steps = steps.len(), "ERA5 forcing complete");
    Ok(RunSummary {
        product: config.product.clone(),
        fields: config.fields.len(),
        steps: steps.len(),
        latitude_rms: None,
    })
}

/// Write the daily ocean forcing file.
#[instrument(skip_all, fields(product = %config.product, days = times.days()))]
pub fn run_topaz4<R, S>(
    reader: &mut R,
    sink: &mut S,
    elements: &ElementGrid,
    times: &TimeAxis,
    config: &Topaz4Config,
) -> ForcingResult<RunSummary>
where
    R: SourceReader + ?Sized,
    S: ForcingSink + ?Sized,
{
    let product = Product::Topaz4 {
        prefix: &config.product,
    };
    let steps = topaz4_steps(times);
    prepare(sink, elements, &config.fields, &steps)?;

    let mut latitude_rms = None;
    if let Some(first) = steps.first() {
        let file = topaz4_source_file_name(&config.product, first.unix)?;
        let source_lat = reader.coordinates(&file, "latitude")?;
        let profile = RadialProfile::from_coordinates(&source_lat, &config.grid)?;
        let grid = PolarGrid::new(config.grid, profile);

        let rms = latitude_fit_rms(&source_lat, &grid, elements)?;
        info!(
            file = %file,
            profile_len = grid.profile().len(),
            latitude_rms = rms,
            "Loaded TOPAZ4 grid"
        );
        latitude_rms = Some(rms);

        let grid = SourceGrid::Polar {
            grid,
            missing: config.missing_value,
        };
        write_fields(reader, sink, product, &grid, elements, &config.fields, &steps)?;
    } else {
        warn!(hours = times.len(), "Less than one day requested, TOPAZ4 file has no steps");
    }

    sink.finalize()?;
    info!(fields = config.fields.len(), days = steps.len(), "TOPAZ4 forcing complete");
    Ok(RunSummary {
        product: config.output_product.clone(),
        fields: config.fields.len(),
        steps: steps.len(),
        latitude_rms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forcing_common::parse_iso_date;
    use test_utils::fixtures::dates;

    fn axis(range: (&str, &str)) -> TimeAxis {
        TimeAxis::hourly(
            parse_iso_date(range.0).unwrap(),
            parse_iso_date(range.1).unwrap(),
        )
    }

    #[test]
    fn test_era5_steps_are_hourly() {
        let times = axis(dates::TWO_DAYS);
        let steps = era5_steps(&times);
        assert_eq!(steps.len(), 48);
        assert_eq!(steps[1].unix - steps[0].unix, 3600);
        assert_eq!(steps[1].target - steps[0].target, 1);
        assert_eq!(steps[47].index, 47);
    }

    #[test]
    fn test_steps_include_leap_day() {
        let times = axis(dates::LEAP_DAY);
        let leap_day = forcing_common::time::unix_seconds(parse_iso_date("2012-02-29").unwrap());
        let hourly = era5_steps(&times);
        assert_eq!(hourly.len(), 48);
        assert_eq!(hourly[24].unix, leap_day);
        let daily = topaz4_steps(&times);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[1].unix, leap_day);
    }

    #[test]
    fn test_topaz4_steps_are_daily() {
        let times = axis(dates::TWO_DAYS);
        let steps = topaz4_steps(&times);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].index, 1);
        assert_eq!(steps[1].unix, times.unix_seconds()[24]);
        assert_eq!(steps[1].target, times.topaz4_hours()[24]);
    }

    #[test]
    fn test_daily_record_rounds_to_nearest_day() {
        // Records at noon, target at midnight of the same day
        assert_eq!(daily_record(12, 0), 0);
        assert_eq!(daily_record(12, 24), 1);
        // Records at midnight
        assert_eq!(daily_record(0, 48), 2);
        assert_eq!(daily_record(0, 11), 0);
        assert_eq!(daily_record(0, 12), 1);
        // Before the first record
        assert_eq!(daily_record(48, 0), -2);
    }

    #[test]
    fn test_hourly_record() {
        assert_eq!(hourly_record(1_000, 1_005), 5);
        assert_eq!(hourly_record(1_000, 999), -1);
    }
}
