//! Time units and bucket sizes for analysing logged data.
//!
//! Bucket sizes are written as a decimal count followed by a unit suffix,
//! e.g. `"10ms"` or `"250us"`. A bare suffix means one of that unit
//! (`"s"` = one second) and a bare number means nanoseconds.

use std::fmt;

use crate::error::{ArgumentError, Result};

const NANOS_PER_US: u64 = 1_000;
const NANOS_PER_MS: u64 = 1_000_000;
const NANOS_PER_S: u64 = 1_000_000_000;

/// A display unit for durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Nanoseconds.
    Nanos,
    /// Microseconds.
    Micros,
    /// Milliseconds.
    Millis,
    /// Seconds.
    Seconds,
}

impl TimeUnit {
    /// Length of one unit in nanoseconds.
    pub fn nanos(self) -> u64 {
        match self {
            Self::Nanos => 1,
            Self::Micros => NANOS_PER_US,
            Self::Millis => NANOS_PER_MS,
            Self::Seconds => NANOS_PER_S,
        }
    }

    /// Short suffix used when parsing and printing.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Nanos => "ns",
            Self::Micros => "us",
            Self::Millis => "ms",
            Self::Seconds => "s",
        }
    }

    /// Parses a unit suffix. The empty string is nanoseconds.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::UnknownUnit`] for anything else.
    pub fn parse(unit: &str) -> Result<Self> {
        match unit {
            "" | "ns" => Ok(Self::Nanos),
            "us" => Ok(Self::Micros),
            "ms" => Ok(Self::Millis),
            "s" => Ok(Self::Seconds),
            other => Err(ArgumentError::UnknownUnit {
                unit: other.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Nanoseconds in one `unit`.
///
/// # Errors
///
/// Returns [`ArgumentError::UnknownUnit`] if `unit` is not one of `ns`,
/// `us`, `ms`, `s` or empty.
pub fn unit_nanos(unit: &str) -> Result<u64> {
    TimeUnit::parse(unit).map(TimeUnit::nanos)
}

/// Parses a bucket size such as `"10ms"` into nanoseconds.
///
/// # Errors
///
/// Returns [`ArgumentError::MalformedBucket`] for an empty string or a
/// count that overflows, and [`ArgumentError::UnknownUnit`] for an
/// unrecognised suffix.
pub fn bucket_nanos(bucket: &str) -> Result<u64> {
    let malformed = || ArgumentError::MalformedBucket {
        bucket: bucket.to_string(),
    };

    if bucket.is_empty() {
        return Err(malformed().into());
    }

    let split = bucket
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(bucket.len());
    let (digits, suffix) = bucket.split_at(split);

    let count = if digits.is_empty() {
        1
    } else {
        digits.parse::<u64>().map_err(|_| malformed())?
    };

    count
        .checked_mul(unit_nanos(suffix)?)
        .ok_or_else(|| malformed().into())
}

/// Checks that a bucket can be displayed in whole units.
///
/// # Errors
///
/// Returns [`ArgumentError::BucketUnitMismatch`] if the bucket is zero or
/// not a multiple of `unit_nanos`.
pub fn validate_bucket_units(bucket_nanos: u64, unit_nanos: u64) -> Result<()> {
    if bucket_nanos == 0 || unit_nanos == 0 || bucket_nanos % unit_nanos != 0 {
        return Err(ArgumentError::BucketUnitMismatch {
            bucket_nanos,
            unit_nanos,
        }
        .into());
    }
    Ok(())
}

/// Picks the largest unit in which `nanos` is at least one.
pub fn autoscale(nanos: f64) -> TimeUnit {
    let value = nanos.abs();
    if value < NANOS_PER_US as f64 {
        TimeUnit::Nanos
    } else if value < NANOS_PER_MS as f64 {
        TimeUnit::Micros
    } else if value < NANOS_PER_S as f64 {
        TimeUnit::Millis
    } else {
        TimeUnit::Seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;

    #[test]
    fn test_unit_nanos() {
        assert_eq!(unit_nanos("").unwrap(), 1);
        assert_eq!(unit_nanos("ns").unwrap(), 1);
        assert_eq!(unit_nanos("us").unwrap(), 1_000);
        assert_eq!(unit_nanos("ms").unwrap(), 1_000_000);
        assert_eq!(unit_nanos("s").unwrap(), 1_000_000_000);
        assert!(matches!(
            unit_nanos("min").unwrap_err(),
            LogError::InvalidArgument(ArgumentError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_bucket_nanos() {
        assert_eq!(bucket_nanos("10ms").unwrap(), 10_000_000);
        assert_eq!(bucket_nanos("250us").unwrap(), 250_000);
        assert_eq!(bucket_nanos("s").unwrap(), 1_000_000_000);
        assert_eq!(bucket_nanos("42").unwrap(), 42);

        assert!(matches!(
            bucket_nanos("").unwrap_err(),
            LogError::InvalidArgument(ArgumentError::MalformedBucket { .. })
        ));
        assert!(matches!(
            bucket_nanos("99999999999999999999s").unwrap_err(),
            LogError::InvalidArgument(ArgumentError::MalformedBucket { .. })
        ));
        assert!(matches!(
            bucket_nanos("10 ms").unwrap_err(),
            LogError::InvalidArgument(ArgumentError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_validate_bucket_units() {
        validate_bucket_units(10_000_000, 1_000_000).unwrap();
        validate_bucket_units(1_000, 1).unwrap();
        assert!(validate_bucket_units(0, 1).is_err());
        assert!(validate_bucket_units(1_500, 1_000).is_err());
        assert!(validate_bucket_units(500, 1_000).is_err());
    }

    #[test]
    fn test_autoscale() {
        assert_eq!(autoscale(0.0), TimeUnit::Nanos);
        assert_eq!(autoscale(999.0), TimeUnit::Nanos);
        assert_eq!(autoscale(1_000.0), TimeUnit::Micros);
        assert_eq!(autoscale(-2_500_000.0), TimeUnit::Millis);
        assert_eq!(autoscale(3e12), TimeUnit::Seconds);
        assert_eq!(autoscale(3e12).to_string(), "s");
    }
}
