//! Timestamp sources for `record_now` and timing spans.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Where `record_now` takes its timestamps from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockSource {
    /// Wall-clock nanoseconds since the Unix epoch.
    ///
    /// Not monotonic: if the system clock is stepped backwards, timestamps
    /// go backwards too.
    #[default]
    WallClock,

    /// Wall-clock time sampled once at creation, advanced by a monotonic clock.
    ///
    /// Timestamps never go backwards but drift from the system clock if it
    /// is adjusted while the logger is open.
    Monotonic,
}

/// A clock instance bound to a logger.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    source: ClockSource,
    anchor_ns: u64,
    anchor: Instant,
}

impl Clock {
    /// Creates a clock for the given source.
    pub fn new(source: ClockSource) -> Self {
        Self {
            source,
            anchor_ns: wallclock_ns(),
            anchor: Instant::now(),
        }
    }

    /// The configured source.
    pub fn source(&self) -> ClockSource {
        self.source
    }

    /// Current time in nanoseconds.
    #[inline]
    pub fn now_ns(&self) -> u64 {
        match self.source {
            ClockSource::WallClock => wallclock_ns(),
            ClockSource::Monotonic => {
                let elapsed = u64::try_from(self.anchor.elapsed().as_nanos()).unwrap_or(u64::MAX);
                self.anchor_ns.saturating_add(elapsed)
            }
        }
    }
}

/// Wall-clock nanoseconds since the Unix epoch, 0 if the clock reads earlier.
#[inline]
pub fn wallclock_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallclock_is_after_2020() {
        assert!(wallclock_ns() > 1_577_836_800_000_000_000);
    }

    #[test]
    fn test_monotonic_never_goes_backwards() {
        let clock = Clock::new(ClockSource::Monotonic);
        let mut prev = clock.now_ns();
        for _ in 0..1_000 {
            let now = clock.now_ns();
            assert!(now >= prev);
            prev = now;
        }
    }

    #[test]
    fn test_clock_source_serde_names() {
        assert_eq!(
            serde_json::to_string(&ClockSource::Monotonic).unwrap(),
            "\"monotonic\""
        );
        assert_eq!(
            serde_json::from_str::<ClockSource>("\"wall_clock\"").unwrap(),
            ClockSource::WallClock
        );
    }
}
