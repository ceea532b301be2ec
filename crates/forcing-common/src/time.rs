//! Time axis reconciliation between the Unix, ERA5 and TOPAZ4 epochs.
//!
//! Every conversion goes through the proleptic Gregorian UTC calendar
//! without leap seconds, so the epoch offsets and the requested range
//! are always computed the same way.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const SECONDS_PER_HOUR: i64 = 3600;

/// Stride of the daily ocean product on the hourly axis.
pub const HOURS_PER_DAY: usize = 24;

/// Epoch convention used by a time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeConvention {
    /// Seconds since 1970-01-01T00:00:00Z
    Unix,
    /// Hours since 1900-01-01T00:00:00Z
    Era5,
    /// Hours since 1950-01-01T00:00:00Z
    Topaz4,
}

impl TimeConvention {
    /// Calendar date of the convention's time origin.
    pub fn epoch(&self) -> NaiveDate {
        let (year, month, day) = match self {
            TimeConvention::Unix => (1970, 1, 1),
            TimeConvention::Era5 => (1900, 1, 1),
            TimeConvention::Topaz4 => (1950, 1, 1),
        };
        NaiveDate::from_ymd_opt(year, month, day).expect("epoch dates are valid calendar dates")
    }

    /// Hour count of the epoch relative to 1970-01-01T00:00:00Z.
    pub fn hours_from_unix(&self) -> i64 {
        unix_hours(self.epoch())
    }

    /// CF-style units string.
    pub fn units(&self) -> &'static str {
        match self {
            TimeConvention::Unix => "seconds since 1970-01-01T00:00:00Z",
            TimeConvention::Era5 => "hours since 1900-01-01T00:00:00Z",
            TimeConvention::Topaz4 => "hours since 1950-01-01T00:00:00Z",
        }
    }
}

/// Seconds since the Unix epoch of UTC midnight on `date`.
pub fn unix_seconds(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
        .timestamp()
}

/// Whole hours since the Unix epoch of UTC midnight on `date`.
pub fn unix_hours(date: NaiveDate) -> i64 {
    unix_seconds(date).div_euclid(SECONDS_PER_HOUR)
}

/// Three parallel hourly time coordinates covering `[start, stop)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAxis {
    unix_seconds: Vec<i64>,
    era5_hours: Vec<i64>,
    topaz4_hours: Vec<i64>,
}

impl TimeAxis {
    /// Build the hourly axis from an inclusive start date to an exclusive
    /// stop date. A stop date not after the start yields an empty axis.
    pub fn hourly(start: NaiveDate, stop: NaiveDate) -> Self {
        let start_hour = unix_hours(start);
        let stop_hour = unix_hours(stop);

        let era5_offset = TimeConvention::Era5.hours_from_unix();
        let topaz4_offset = TimeConvention::Topaz4.hours_from_unix();

        let hours: Vec<i64> = (start_hour..stop_hour).collect();

        Self {
            unix_seconds: hours.iter().map(|h| h * SECONDS_PER_HOUR).collect(),
            era5_hours: hours.iter().map(|h| h - era5_offset).collect(),
            topaz4_hours: hours.iter().map(|h| h - topaz4_offset).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.unix_seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unix_seconds.is_empty()
    }

    pub fn unix_seconds(&self) -> &[i64] {
        &self.unix_seconds
    }

    pub fn era5_hours(&self) -> &[i64] {
        &self.era5_hours
    }

    pub fn topaz4_hours(&self) -> &[i64] {
        &self.topaz4_hours
    }

    /// Value of step `index` in the given convention (seconds for Unix,
    /// hours otherwise).
    pub fn value(&self, convention: TimeConvention, index: usize) -> i64 {
        match convention {
            TimeConvention::Unix => self.unix_seconds[index],
            TimeConvention::Era5 => self.era5_hours[index],
            TimeConvention::Topaz4 => self.topaz4_hours[index],
        }
    }

    /// Hour indices that start each whole day of the axis.
    pub fn daily_indices(&self) -> impl Iterator<Item = usize> {
        (0..self.len() / HOURS_PER_DAY).map(|day| day * HOURS_PER_DAY)
    }

    /// Number of whole days covered by the axis.
    pub fn days(&self) -> usize {
        self.len() / HOURS_PER_DAY
    }
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, TimeParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))
}

fn to_datetime(unix_seconds: i64) -> Result<DateTime<Utc>, TimeParseError> {
    Utc.timestamp_opt(unix_seconds, 0)
        .single()
        .ok_or(TimeParseError::OutOfRange(unix_seconds))
}

/// Render a Unix timestamp as `%Y-%m-%dT%H:%M:%SZ`.
pub fn format_timestamp(unix_seconds: i64) -> Result<String, TimeParseError> {
    Ok(to_datetime(unix_seconds)?
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string())
}

/// Calendar year and month of a Unix timestamp.
pub fn year_month(unix_seconds: i64) -> Result<(i32, u32), TimeParseError> {
    let dt = to_datetime(unix_seconds)?;
    Ok((dt.year(), dt.month()))
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid date format (expected YYYY-MM-DD): {0}")]
    InvalidFormat(String),

    #[error("Timestamp out of range: {0}")]
    OutOfRange(i64),
}
