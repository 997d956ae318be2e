//! Time-unit parsing for half-lives and decay durations.
//!
//! The nuclide tables write half-lives as a number followed by a unit,
//! e.g. `"3912 d"`, `"4.48 h"`, `"10.76y"`. Whitespace between the number
//! and the unit is ignored.

use std::fmt;
use std::str::FromStr;

use crate::constants::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE, SECONDS_PER_YEAR};
use crate::error::DataError;

/// Units accepted in half-life and duration strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Years,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    /// Length of one unit in seconds.
    pub fn seconds(self) -> f64 {
        match self {
            Self::Years => SECONDS_PER_YEAR,
            Self::Days => SECONDS_PER_DAY,
            Self::Hours => SECONDS_PER_HOUR,
            Self::Minutes => SECONDS_PER_MINUTE,
            Self::Seconds => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Years => "y",
            Self::Days => "d",
            Self::Hours => "h",
            Self::Minutes => "m",
            Self::Seconds => "s",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "y" => Ok(Self::Years),
            "d" => Ok(Self::Days),
            "hr" | "h" => Ok(Self::Hours),
            "m" => Ok(Self::Minutes),
            "s" => Ok(Self::Seconds),
            other => Err(DataError::UnknownUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Split `"4.48 h"` into `("4.48", "h")`, with whitespace removed from the unit.
fn split_quantity(input: &str) -> (&str, String) {
    let trimmed = input.trim();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    // Optional exponent, only when digits follow: "1.2e5 s".
    if end > 0 && end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    let unit: String = trimmed[end..].chars().filter(|c| !c.is_whitespace()).collect();
    (&trimmed[..end], unit)
}

/// Parse a half-life string into seconds.
///
/// Both the number and the unit are required.
pub fn parse_half_life(input: &str) -> Result<f64, DataError> {
    let invalid = || DataError::InvalidHalfLife(input.to_string());
    let (number, unit) = split_quantity(input);
    let value: f64 = number.parse().map_err(|_| invalid())?;
    let unit: TimeUnit = unit.parse().map_err(|_| invalid())?;
    Ok(value * unit.seconds())
}

/// Parse a decay duration into seconds. A bare number means seconds.
pub fn parse_duration(input: &str) -> Result<f64, DataError> {
    if let Ok(seconds) = input.trim().parse::<f64>() {
        return Ok(seconds);
    }
    parse_half_life(input)
}
