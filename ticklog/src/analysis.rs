//! Offline analysis of logged records.
//!
//! Each function consumes any iterator of [`Record`]s, typically
//! [`DataReader::iter`](crate::DataReader::iter), so the caller chooses which
//! series to include.
//!
//! Records logged with [`DataLogger::finish`](crate::DataLogger::finish) hold
//! `(start, elapsed)` pairs, which is the shape these summaries assume:
//! `when` is a point in time and `data` a duration in nanoseconds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::Record;
use crate::units::validate_bucket_units;

/// One point of a derived curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Bucket boundary in nanoseconds.
    pub x: u64,
    /// Value at that boundary.
    pub y: f64,
}

/// Summary statistics over the `data` field of a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of records.
    pub points: u64,
    /// Time covered, from the earliest `when` to the latest `when + data`.
    pub nanos: u64,
    /// Mean of `data`.
    pub mean: f64,
    /// Sample standard deviation of `data` (0 for fewer than two points).
    pub stdev: f64,
    /// Sample variance of `data` (0 for fewer than two points).
    pub variance: f64,
}

impl Summary {
    /// Records per second over the covered time, or 0 if it is empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn throughput(&self) -> f64 {
        if self.nanos == 0 {
            return 0.0;
        }
        self.points as f64 * 1e9 / self.nanos as f64
    }
}

/// Computes [`Summary`] statistics in a single pass (Welford's method).
#[allow(clippy::cast_precision_loss)]
pub fn summarize<I>(records: I) -> Summary
where
    I: IntoIterator<Item = Record>,
{
    let mut start = u64::MAX;
    let mut end = 0u64;
    let mut n = 0u64;
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;

    for record in records {
        start = start.min(record.when);
        end = end.max(record.when.saturating_add(record.data));

        n += 1;
        let x = record.data as f64;
        let delta = x - mean;
        mean += delta / n as f64;
        m2 += delta * (x - mean);
    }

    if n == 0 {
        return Summary::default();
    }

    let variance = if n > 1 { m2 / (n - 1) as f64 } else { 0.0 };

    Summary {
        points: n,
        nanos: end - start,
        mean,
        stdev: variance.sqrt(),
        variance,
    }
}

/// Cumulative distribution of `data` values.
///
/// Point `i` sits at `x = i * bucket` and holds the percentage of records
/// whose `data` is at most `x`. The curve starts at 0 and ends at the first
/// boundary covering the largest value, where `y` is 100. Empty input gives
/// an empty curve.
///
/// # Errors
///
/// Returns [`ArgumentError::BucketUnitMismatch`](crate::ArgumentError::BucketUnitMismatch)
/// if `bucket` is zero.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn cdf<I>(records: I, bucket: u64) -> Result<Vec<DataPoint>>
where
    I: IntoIterator<Item = Record>,
{
    validate_bucket_units(bucket, 1)?;

    let mut counts: Vec<u64> = Vec::new();
    let mut total = 0u64;

    for record in records {
        let idx = record.data.div_ceil(bucket) as usize;
        if idx >= counts.len() {
            counts.resize(idx + 1, 0);
        }
        counts[idx] += 1;
        total += 1;
    }

    let mut running = 0u64;
    let mut x = 0u64;
    let points = counts
        .into_iter()
        .map(|count| {
            running += count;
            let point = DataPoint {
                x,
                y: 100.0 * running as f64 / total as f64,
            };
            x = x.saturating_add(bucket);
            point
        })
        .collect();

    Ok(points)
}

/// Records per `when` bucket, densely filled.
///
/// Buckets are aligned to multiples of `bucket`. The result has one point
/// per bucket from the first occupied to the last, empty buckets included,
/// with `x` relative to the first bucket.
///
/// # Errors
///
/// Returns [`ArgumentError::BucketUnitMismatch`](crate::ArgumentError::BucketUnitMismatch)
/// if `bucket` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn timeseries<I>(records: I, bucket: u64) -> Result<Vec<DataPoint>>
where
    I: IntoIterator<Item = Record>,
{
    validate_bucket_units(bucket, 1)?;

    let mut buckets: BTreeMap<u64, u64> = BTreeMap::new();
    for record in records {
        let start = record.when - record.when % bucket;
        *buckets.entry(start).or_default() += 1;
    }

    let (Some((&first, _)), Some((&last, _))) =
        (buckets.first_key_value(), buckets.last_key_value())
    else {
        return Ok(Vec::new());
    };

    let mut points = Vec::new();
    let mut at = first;
    loop {
        points.push(DataPoint {
            x: at - first,
            y: buckets.get(&at).copied().unwrap_or(0) as f64,
        });
        if at >= last {
            break;
        }
        at += bucket;
    }

    Ok(points)
}
