//! Output field tables: which source variables feed which output field.

use serde::{Deserialize, Serialize};

/// Where the values of one output field come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSource {
    /// A single source variable, regridded as is
    Variable { name: String },
    /// Speed `hypot(u, v)` of two regridded wind components
    WindSpeed { u: String, v: String },
    /// No source; written as zeros
    Zero,
}

impl FieldSource {
    /// Source variables read for this field.
    pub fn variables(&self) -> Vec<&str> {
        match self {
            FieldSource::Variable { name } => vec![name.as_str()],
            FieldSource::WindSpeed { u, v } => vec![u.as_str(), v.as_str()],
            FieldSource::Zero => Vec::new(),
        }
    }
}

/// One output field and its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub source: FieldSource,
}

impl FieldSpec {
    pub fn variable(name: &str, variable: &str) -> Self {
        Self {
            name: name.to_string(),
            source: FieldSource::Variable {
                name: variable.to_string(),
            },
        }
    }

    pub fn wind_speed(name: &str, u: &str, v: &str) -> Self {
        Self {
            name: name.to_string(),
            source: FieldSource::WindSpeed {
                u: u.to_string(),
                v: v.to_string(),
            },
        }
    }

    pub fn zero(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: FieldSource::Zero,
        }
    }
}

/// Atmospheric fields of the ERA5 forcing file.
pub fn default_era5_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::variable("dew2m", "d2m"),
        FieldSpec::variable("lw_in", "msdwlwrf"),
        FieldSpec::variable("sw_in", "msdwswrf"),
        FieldSpec::variable("pair", "msl"),
        FieldSpec::variable("tair", "t2m"),
        FieldSpec::wind_speed("windspeed", "u10", "v10"),
    ]
}

/// Ocean fields of the TOPAZ4 forcing file. Currents are not taken from
/// the source and stay at rest.
pub fn default_topaz4_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::variable("mld", "mlp"),
        FieldSpec::variable("sss", "salinity"),
        FieldSpec::variable("sst", "temperature"),
        FieldSpec::zero("u"),
        FieldSpec::zero("v"),
    ]
}

/// First source variable named by `fields`, used to locate the source grid.
pub fn first_source_variable(fields: &[FieldSpec]) -> Option<&str> {
    fields
        .iter()
        .flat_map(|field| field.source.variables())
        .next()
}
