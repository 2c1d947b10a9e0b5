//! # Wire Duration Parsing
//!
//! Durations travel on the wire as strings (e.g. `"30s"`, `"-1h45m"`) and are
//! held internally as signed nanosecond counts. The grammar matches the
//! original daemon's duration strings: a sequence of `<number><unit>` pairs
//! with an optional leading sign, where `unit` is one of `ns, us, ms, s, m,
//! h`. `std::time::Duration` cannot represent a negative value, so a small
//! signed wrapper is used instead; negative durations are accepted (they
//! round-trip) even though no field in the data model currently produces one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration as StdDuration;

use crate::error::SyncError;

/// A signed, nanosecond-precision duration that round-trips through its wire
/// string representation exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WireDuration {
    nanos: i64,
}

impl WireDuration {
    pub const ZERO: Self = Self { nanos: 0 };

    #[must_use]
    pub fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    #[must_use]
    pub fn as_nanos(self) -> i64 {
        self.nanos
    }

    /// Convert to `std::time::Duration`, saturating negative values to zero.
    #[must_use]
    pub fn to_std(self) -> StdDuration {
        if self.nanos <= 0 {
            StdDuration::ZERO
        } else {
            StdDuration::from_nanos(self.nanos as u64)
        }
    }

    #[must_use]
    pub fn from_std(d: StdDuration) -> Self {
        Self {
            nanos: d.as_nanos().min(i64::MAX as u128) as i64,
        }
    }
}

impl Default for WireDuration {
    fn default() -> Self {
        Self::ZERO
    }
}

const UNITS: &[(&str, i64)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

/// Parse a duration string using the `ns|us|ms|s|m|h` suffix grammar.
///
/// # Errors
/// Returns `SyncError::BadRequest` if the string is empty, has no valid
/// unit, or contains a malformed numeric segment.
pub fn parse_duration(input: &str) -> Result<WireDuration, SyncError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SyncError::bad_request("duration string is empty"));
    }

    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if rest == "0" {
        return Ok(WireDuration::ZERO);
    }

    let mut total: i128 = 0;
    let mut cursor = rest;
    let mut consumed_any = false;

    while !cursor.is_empty() {
        let digits_end = cursor
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| {
                SyncError::bad_request(format!("duration {input:?} is missing a unit"))
            })?;

        if digits_end == 0 {
            return Err(SyncError::bad_request(format!(
                "duration {input:?} has a unit with no preceding number"
            )));
        }

        let number_str = &cursor[..digits_end];
        let number: f64 = number_str
            .parse()
            .map_err(|_| SyncError::bad_request(format!("duration {input:?} has an invalid number segment '{number_str}'")))?;

        cursor = &cursor[digits_end..];

        let unit_len = UNITS
            .iter()
            .filter(|(u, _)| cursor.starts_with(u))
            .map(|(u, _)| u.len())
            .max()
            .ok_or_else(|| {
                SyncError::bad_request(format!("duration {input:?} has an unrecognized unit"))
            })?;

        let unit_str = &cursor[..unit_len];
        let (_, multiplier) = UNITS.iter().find(|(u, _)| *u == unit_str).unwrap();

        total += (number * *multiplier as f64) as i128;
        cursor = &cursor[unit_len..];
        consumed_any = true;
    }

    if !consumed_any {
        return Err(SyncError::bad_request(format!(
            "duration {input:?} could not be parsed"
        )));
    }

    if negative {
        total = -total;
    }

    if total > i64::MAX as i128 || total < i64::MIN as i128 {
        return Err(SyncError::bad_request(format!(
            "duration {input:?} overflows supported range"
        )));
    }

    Ok(WireDuration::from_nanos(total as i64))
}

impl fmt::Display for WireDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos == 0 {
            return write!(f, "0s");
        }

        let negative = self.nanos < 0;
        let mut remaining = self.nanos.unsigned_abs();
        if negative {
            write!(f, "-")?;
        }

        if remaining < 1_000 {
            return write!(f, "{remaining}ns");
        }

        let hours = remaining / (3_600 * 1_000_000_000);
        remaining %= 3_600 * 1_000_000_000;
        let minutes = remaining / (60 * 1_000_000_000);
        remaining %= 60 * 1_000_000_000;
        let seconds = remaining as f64 / 1_000_000_000.0;

        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        if seconds.fract().abs() < f64::EPSILON {
            write!(f, "{}s", seconds as i64)
        } else {
            write!(f, "{seconds}s")
        }
    }
}

impl TryFrom<String> for WireDuration {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_duration(&value)
    }
}

impl From<WireDuration> for String {
    fn from(value: WireDuration) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_seconds() {
        let d = parse_duration("30s").unwrap();
        assert_eq!(d.as_nanos(), 30_000_000_000);
    }

    #[test]
    fn parses_zero_seconds() {
        let d = parse_duration("0s").unwrap();
        assert_eq!(d, WireDuration::ZERO);
        assert_eq!(d.to_string(), "0s");
    }

    #[test]
    fn parses_negative_seconds_and_round_trips() {
        let d = parse_duration("-1s").unwrap();
        assert_eq!(d.as_nanos(), -1_000_000_000);
        assert_eq!(d.to_string(), "-1s");
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_duration("abc").unwrap_err();
        assert_eq!(err.category(), "bad-request");
    }

    #[test]
    fn rejects_empty_string() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("   ").is_err());
    }

    #[test]
    fn parses_compound_duration() {
        let d = parse_duration("2h45m").unwrap();
        assert_eq!(d.as_nanos(), (2 * 3600 + 45 * 60) * 1_000_000_000);
    }

    #[test]
    fn parses_ns_us_ms() {
        assert_eq!(parse_duration("500ns").unwrap().as_nanos(), 500);
        assert_eq!(parse_duration("500us").unwrap().as_nanos(), 500_000);
        assert_eq!(parse_duration("500ms").unwrap().as_nanos(), 500_000_000);
    }

    #[test]
    fn rejects_number_without_unit() {
        assert!(parse_duration("30").is_err());
    }

    #[test]
    fn to_std_saturates_negative_to_zero() {
        let d = parse_duration("-1s").unwrap();
        assert_eq!(d.to_std(), StdDuration::ZERO);
    }
}
