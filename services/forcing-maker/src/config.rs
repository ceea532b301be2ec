//! Forcing maker configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! environment variables, then command-line flags (applied by the binary).
//! YAML content supports `${VAR}` and `${VAR:-default}` substitution.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use forcing_common::naming::{ERA5_PRODUCT, TOPAZ4_OUTPUT_PRODUCT, TOPAZ4_PRODUCT};
use projection::PolarGridConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fields::{default_era5_fields, default_topaz4_fields, first_source_variable, FieldSpec};

/// Missing-value sentinel of TOPAZ4 land cells.
pub const TOPAZ4_MISSING_VALUE: f64 = -32767.0;

/// Environment variable overriding [`PathsConfig::source_dir`].
pub const ENV_SOURCE_DIR: &str = "FORCING_SOURCE_DIR";
/// Environment variable overriding [`PathsConfig::output_dir`].
pub const ENV_OUTPUT_DIR: &str = "FORCING_OUTPUT_DIR";
/// Environment variable overriding [`Topaz4Config::missing_value`].
pub const ENV_TOPAZ_MISSING: &str = "FORCING_TOPAZ_MISSING";

/// Top-level forcing maker configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForcingConfig {
    pub era5: Era5Config,
    pub topaz4: Topaz4Config,
    pub paths: PathsConfig,
}

/// Atmospheric forcing from ERA5 hourly files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Era5Config {
    pub enabled: bool,
    /// Prefix of source and output file names
    pub product: String,
    pub fields: Vec<FieldSpec>,
}

impl Default for Era5Config {
    fn default() -> Self {
        Self {
            enabled: true,
            product: ERA5_PRODUCT.to_string(),
            fields: default_era5_fields(),
        }
    }
}

/// Ocean forcing from TOPAZ4 daily files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topaz4Config {
    pub enabled: bool,
    /// Prefix of the monthly source files
    pub product: String,
    /// Prefix of the output file
    pub output_product: String,
    /// Sentinel marking land cells in the source and in the output
    pub missing_value: f64,
    pub grid: PolarGridConfig,
    pub fields: Vec<FieldSpec>,
}

impl Default for Topaz4Config {
    fn default() -> Self {
        Self {
            enabled: true,
            product: TOPAZ4_PRODUCT.to_string(),
            output_product: TOPAZ4_OUTPUT_PRODUCT.to_string(),
            missing_value: TOPAZ4_MISSING_VALUE,
            grid: PolarGridConfig::topaz4(),
            fields: default_topaz4_fields(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the ERA5 and TOPAZ4 source files
    pub source_dir: PathBuf,
    /// Directory the forcing files are written to
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ForcingConfig {
    /// Defaults, overlaid with `path` if given, then with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse a YAML file with environment variable substitution.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path.as_ref()))
    }

    /// Parse YAML content with environment variable substitution.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content, |name| env::var(name).ok())?;
        let config: ForcingConfig =
            serde_yaml::from_str(&expanded).context("Failed to parse config YAML")?;
        Ok(config)
    }

    /// Apply `FORCING_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Apply `FORCING_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SOURCE_DIR) {
            debug!(source_dir = %dir, "Source directory from environment");
            self.paths.source_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            debug!(output_dir = %dir, "Output directory from environment");
            self.paths.output_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(ENV_TOPAZ_MISSING) {
            self.topaz4.missing_value = value
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {}", ENV_TOPAZ_MISSING, value))?;
        }
        Ok(())
    }

    /// Reject configurations that cannot produce a forcing file.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.era5.enabled || self.topaz4.enabled,
            "Both ERA5 and TOPAZ4 are disabled; nothing to do"
        );

        if self.era5.enabled {
            anyhow::ensure!(!self.era5.product.is_empty(), "ERA5 product cannot be empty");
            validate_fields("era5", &self.era5.fields)?;
        }

        if self.topaz4.enabled {
            let topaz4 = &self.topaz4;
            anyhow::ensure!(!topaz4.product.is_empty(), "TOPAZ4 product cannot be empty");
            anyhow::ensure!(
                !topaz4.output_product.is_empty(),
                "TOPAZ4 output product cannot be empty"
            );
            anyhow::ensure!(
                topaz4.missing_value.is_finite(),
                "TOPAZ4 missing value must be finite, got {}",
                topaz4.missing_value
            );
            anyhow::ensure!(
                topaz4.grid.angular_scale.is_finite() && topaz4.grid.angular_scale > 0.0,
                "TOPAZ4 grid scale must be positive, got {}",
                topaz4.grid.angular_scale
            );
            anyhow::ensure!(
                topaz4.grid.center.0 >= 0.0 && topaz4.grid.center.1 >= 0.0,
                "TOPAZ4 grid centre must have non-negative indices, got {:?}",
                topaz4.grid.center
            );
            validate_fields("topaz4", &topaz4.fields)?;
        }

        Ok(())
    }
}

fn validate_fields(section: &str, fields: &[FieldSpec]) -> Result<()> {
    anyhow::ensure!(!fields.is_empty(), "{}.fields cannot be empty", section);
    anyhow::ensure!(
        first_source_variable(fields).is_some(),
        "{}.fields must read at least one source variable",
        section
    );

    for (k, field) in fields.iter().enumerate() {
        anyhow::ensure!(
            !field.name.is_empty(),
            "{}.fields[{}] has an empty name",
            section,
            k
        );
        anyhow::ensure!(
            field.source.variables().iter().all(|v| !v.is_empty()),
            "{}.fields[{}] ({}) names an empty source variable",
            section,
            k,
            field.name
        );
        anyhow::ensure!(
            !fields[..k].iter().any(|other| other.name == field.name),
            "{}.fields has duplicate field {}",
            section,
            field.name
        );
    }
    Ok(())
}

/// Expand `${VAR}` and `${VAR:-default}` in `content` using `lookup`.
fn expand_env_vars<F>(content: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .with_context(|| format!("Unclosed variable substitution: ${{{}", after))?;
        let expr = &after[..end];

        let value = match expr.split_once(":-") {
            Some((name, default)) => lookup(name.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string()),
            None => lookup(expr.trim())
                .with_context(|| format!("Environment variable {} not set", expr))?,
        };
        result.push_str(&value);
        rest = &after[end + 1..];
    }
    result.push_str(rest);

    Ok(result)
}
