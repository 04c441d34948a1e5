//! Deterministic decimation of the record stream.
//!
//! Each logger carries a [`Scaler`] built from its [`ScaleFactors`]. The
//! timestamp and the data component are decimated independently:
//!
//! - Call `k` (0-based, counted since the logger was created) keeps a
//!   component verbatim when `k % scale == 0`.
//! - Every other call coarsens the component to the nearest multiple of the
//!   scale factor, rounding halves up. If rounding up would overflow `u64`
//!   the value is rounded down instead.
//!
//! All arithmetic is integer arithmetic, so there is no per-record drift.
//! A factor of 1 builds no decimator at all: the component passes straight
//! through. Reserved series are never data-scaled, although their calls
//! still advance the data counter.

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::error::{ArgumentError, Result};
use crate::record::Record;

/// The pair of construction-time scale factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScaleFactors {
    /// Scale factor for timestamps.
    pub when_scale: u64,
    /// Scale factor for data values.
    pub data_scale: u64,
}

impl ScaleFactors {
    /// No reduction on either component.
    pub const IDENTITY: Self = Self {
        when_scale: 1,
        data_scale: 1,
    };

    /// Creates validated scale factors.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::ZeroScale`] if either factor is zero.
    pub fn new(when_scale: u64, data_scale: u64) -> Result<Self> {
        let factors = Self {
            when_scale,
            data_scale,
        };
        factors.validate()?;
        Ok(factors)
    }

    /// Checks that both factors are at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::ZeroScale`] naming the offending component.
    pub fn validate(&self) -> Result<()> {
        if self.when_scale == 0 {
            return Err(ArgumentError::ZeroScale { component: "when" }.into());
        }
        if self.data_scale == 0 {
            return Err(ArgumentError::ZeroScale { component: "data" }.into());
        }
        Ok(())
    }

    /// Returns `true` if neither component is reduced.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Counter-driven decimator for one record component.
#[derive(Debug, Clone)]
struct Decimator {
    factor: NonZeroU64,
    seen: u64,
}

impl Decimator {
    /// Builds a decimator, or `None` for the pass-through factor 1.
    fn for_factor(factor: u64) -> Option<Self> {
        NonZeroU64::new(factor)
            .filter(|f| f.get() > 1)
            .map(|factor| Self { factor, seen: 0 })
    }

    /// Advances the counter and returns whether this call keeps full resolution.
    #[inline]
    fn tick(&mut self) -> bool {
        let exact = self.seen % self.factor.get() == 0;
        self.seen = self.seen.wrapping_add(1);
        exact
    }

    #[inline]
    fn apply(&mut self, value: u64, exempt: bool) -> u64 {
        let exact = self.tick();
        if exact || exempt {
            value
        } else {
            coarsen(value, self.factor.get())
        }
    }
}

/// Rounds `value` to the nearest multiple of `factor`, halves up.
///
/// Falls back to rounding down when the upper multiple does not fit in `u64`.
#[inline]
pub fn coarsen(value: u64, factor: u64) -> u64 {
    if factor <= 1 {
        return value;
    }

    let quotient = value / factor;
    let remainder = value % factor;
    let lower = quotient * factor;

    if remainder >= factor - remainder {
        lower.checked_add(factor).unwrap_or(lower)
    } else {
        lower
    }
}

/// Applies the construction-time decimation policy to each record.
#[derive(Debug, Clone)]
pub struct Scaler {
    factors: ScaleFactors,
    when: Option<Decimator>,
    data: Option<Decimator>,
}

impl Scaler {
    /// Creates a scaler with fresh counters.
    pub fn new(factors: ScaleFactors) -> Self {
        Self {
            factors,
            when: Decimator::for_factor(factors.when_scale),
            data: Decimator::for_factor(factors.data_scale),
        }
    }

    /// Returns the factors this scaler was built from.
    pub fn factors(&self) -> ScaleFactors {
        self.factors
    }

    /// Returns `true` when both components pass straight through.
    pub fn is_pass_through(&self) -> bool {
        self.when.is_none() && self.data.is_none()
    }

    /// Applies the policy to one record.
    ///
    /// Never drops a record: the result is either the input verbatim or the
    /// input with one or both components coarsened.
    #[inline]
    pub fn apply(&mut self, record: Record) -> Record {
        if self.is_pass_through() {
            return record;
        }

        let mut out = record;
        if let Some(when) = self.when.as_mut() {
            out.when = when.apply(record.when, false);
        }
        if let Some(data) = self.data.as_mut() {
            out.data = data.apply(record.data, record.is_reserved());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SERIES_RU_MAXRSS;

    #[test]
    fn test_zero_factors_rejected() {
        let err = ScaleFactors::new(0, 1).unwrap_err();
        assert!(err.to_string().contains("when scale"));

        let err = ScaleFactors::new(1, 0).unwrap_err();
        assert!(err.to_string().contains("data scale"));

        assert!(ScaleFactors::new(1, 1).unwrap().is_identity());
    }

    #[test]
    fn test_coarsen_rounds_to_nearest_multiple() {
        assert_eq!(coarsen(0, 10), 0);
        assert_eq!(coarsen(4, 10), 0);
        assert_eq!(coarsen(5, 10), 10);
        assert_eq!(coarsen(14, 10), 10);
        assert_eq!(coarsen(15, 10), 20);
        assert_eq!(coarsen(1234, 1), 1234);
        assert_eq!(coarsen(7, 3), 6);
        assert_eq!(coarsen(8, 3), 9);
    }

    #[test]
    fn test_coarsen_near_overflow_rounds_down() {
        let factor = 1_000u64;
        let value = u64::MAX;
        let result = coarsen(value, factor);
        assert_eq!(result % factor, 0);
        assert!(result <= value);
    }

    #[test]
    fn test_identity_is_pass_through() {
        let mut scaler = Scaler::new(ScaleFactors::IDENTITY);
        assert!(scaler.is_pass_through());

        for i in 0..100u64 {
            let record = Record::new(3, i * 7 + 1, i * 13 + 5);
            assert_eq!(scaler.apply(record), record);
        }
    }

    #[test]
    fn test_every_nth_call_keeps_full_timestamp() {
        let mut scaler = Scaler::new(ScaleFactors::new(4, 1).unwrap());

        let exact: Vec<bool> = (0..12u64)
            .map(|i| {
                let record = Record::new(1, 1_000 + i * 10 + 1, i);
                scaler.apply(record).when == record.when
            })
            .collect();

        // when values end in 1, so coarsening to a multiple of 4 always changes them
        assert_eq!(
            exact,
            vec![true, false, false, false, true, false, false, false, true, false, false, false]
        );
    }

    #[test]
    fn test_components_scale_independently() {
        let mut scaler = Scaler::new(ScaleFactors::new(1, 100).unwrap());

        let first = scaler.apply(Record::new(1, 12_345, 1_049));
        let second = scaler.apply(Record::new(1, 12_346, 1_049));

        assert_eq!(first, Record::new(1, 12_345, 1_049));
        assert_eq!(second, Record::new(1, 12_346, 1_000));
    }

    #[test]
    fn test_reserved_series_data_is_never_scaled() {
        let mut scaler = Scaler::new(ScaleFactors::new(1, 1_000).unwrap());

        // consume the exact slot
        scaler.apply(Record::new(1, 0, 0));
        let reserved = scaler.apply(Record::new(SERIES_RU_MAXRSS, 5, 123_456_789));
        let user = scaler.apply(Record::new(1, 5, 123_456_789));

        assert_eq!(reserved.data, 123_456_789);
        assert_eq!(user.data, 123_457_000);
    }
}
