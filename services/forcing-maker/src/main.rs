//! Forcing maker.
//!
//! Reads the target mesh from a restart file and writes
//! `ERA5_{start}_{stop}.nc` and `TOPAZ4_{start}_{stop}.nc` regridded onto
//! its elements.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use forcing_common::naming::output_file_name;
use forcing_common::time::unix_seconds;
use forcing_common::{parse_iso_date, ForcingError, TimeAxis};
use forcing_maker::pipeline::{run_era5, run_topaz4, RunSummary};
use forcing_maker::ForcingConfig;
use grid_processor::elementize;
use netcdf_parser::{read_target_mesh, silence_hdf5_errors, NetCdfForcingWriter, NetCdfSourceReader};

#[derive(Parser, Debug)]
#[command(name = "forcing-maker")]
#[command(about = "Create grid matched forcing files from ERA5 and TOPAZ4")]
struct Args {
    /// A restart file containing the target grid
    #[arg(short, long)]
    file: PathBuf,

    /// ISO start date of the forcing (inclusive)
    #[arg(long)]
    start: String,

    /// ISO stop date of the forcing (exclusive)
    #[arg(long)]
    stop: String,

    /// Configuration file path
    #[arg(short, long, env = "FORCING_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the source files
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Directory for the forcing files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Do not write the ERA5 file
    #[arg(long)]
    skip_era5: bool,

    /// Do not write the TOPAZ4 file
    #[arg(long)]
    skip_topaz4: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);
    silence_hdf5_errors();

    let start = parse_iso_date(&args.start).context("Invalid --start date")?;
    let stop = parse_iso_date(&args.stop).context("Invalid --stop date")?;

    let mut config = ForcingConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.source_dir {
        config.paths.source_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.paths.output_dir = dir;
    }
    if args.skip_era5 {
        config.era5.enabled = false;
    }
    if args.skip_topaz4 {
        config.topaz4.enabled = false;
    }
    config.validate().context("Invalid configuration")?;

    info!(
        mesh = %args.file.display(),
        start = %start,
        stop = %stop,
        source_dir = %config.paths.source_dir.display(),
        output_dir = %config.paths.output_dir.display(),
        "Starting forcing maker"
    );

    let mesh = read_target_mesh(&args.file)
        .map_err(ForcingError::from)
        .map_err(|err| {
            if err.is_precondition() {
                error!(
                    mesh = %args.file.display(),
                    error = %err,
                    "Restart file cannot be used as a target mesh"
                );
            }
            err
        })
        .with_context(|| format!("Failed to read target mesh from {}", args.file.display()))?;
    let elements = elementize(&mesh).context("Failed to compute element centres")?;

    let times = TimeAxis::hourly(start, stop);
    if times.is_empty() {
        warn!("Stop date is not after start date, writing empty forcing files");
    }

    if config.era5.enabled {
        let path = output_path(&config.paths.output_dir, &config.era5.product, start, stop);
        let mut reader = NetCdfSourceReader::new(&config.paths.source_dir);
        let mut writer = NetCdfForcingWriter::create(&path, unix_seconds(start))
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let summary = run_era5(&mut reader, &mut writer, &elements, &times, &config.era5)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        report(&path, &summary);
    }

    if config.topaz4.enabled {
        let path = output_path(
            &config.paths.output_dir,
            &config.topaz4.output_product,
            start,
            stop,
        );
        let mut reader = NetCdfSourceReader::new(&config.paths.source_dir)
            .with_missing_value(config.topaz4.missing_value);
        let mut writer = NetCdfForcingWriter::create(&path, unix_seconds(start))
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let summary = run_topaz4(&mut reader, &mut writer, &elements, &times, &config.topaz4)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        report(&path, &summary);
    }

    info!(nx = elements.nx(), ny = elements.ny(), "Forcing maker finished");
    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn output_path(dir: &Path, product: &str, start: NaiveDate, stop: NaiveDate) -> PathBuf {
    let start = start.format("%Y-%m-%d").to_string();
    let stop = stop.format("%Y-%m-%d").to_string();
    dir.join(output_file_name(product, &start, &stop))
}

fn report(path: &Path, summary: &RunSummary) {
    info!(
        file = %path.display(),
        product = %summary.product,
        fields = summary.fields,
        steps = summary.steps,
        latitude_rms = ?summary.latitude_rms,
        "Wrote forcing file"
    );
}
