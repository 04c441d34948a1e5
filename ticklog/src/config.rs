//! Logger configuration.
//!
//! [`LoggerConfig`] is fixed at creation time and constant for the logger's
//! lifetime. It can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "when_scale": 1000,
//!   "data_scale": 1,
//!   "buffer_capacity": 65536,
//!   "sync": "every_flush",
//!   "clock": "monotonic"
//! }
//! ```
//!
//! Omitted fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::ClockSource;
use crate::error::{ArgumentError, ConfigError, Result};
use crate::scale::ScaleFactors;

/// Records buffered before an implicit flush.
pub const DEFAULT_BUFFER_CAPACITY: usize = 65_536;

/// When written data is forced to stable storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// fsync once, when the logger is flushed and destroyed.
    #[default]
    OnClose,

    /// fsync after every flush, implicit or explicit (safest, slowest).
    EveryFlush,
}

/// Construction-time settings for a [`DataLogger`](crate::DataLogger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Timestamp scale factor (1 = keep every timestamp verbatim).
    pub when_scale: u64,

    /// Data scale factor (1 = keep every value verbatim).
    pub data_scale: u64,

    /// Records held in memory before an implicit flush.
    ///
    /// `None` disables implicit flushes entirely; records are only written
    /// by an explicit flush or at close.
    pub buffer_capacity: Option<usize>,

    /// Durability policy.
    pub sync: SyncPolicy,

    /// Source of `record_now` timestamps.
    pub clock: ClockSource,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            when_scale: 1,
            data_scale: 1,
            buffer_capacity: Some(DEFAULT_BUFFER_CAPACITY),
            sync: SyncPolicy::default(),
            clock: ClockSource::default(),
        }
    }
}

impl LoggerConfig {
    /// Creates a default config with the given scale factors.
    pub fn new(when_scale: u64, data_scale: u64) -> Self {
        Self {
            when_scale,
            data_scale,
            ..Self::default()
        }
    }

    /// Sets the implicit flush threshold (`None` = unbounded).
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: Option<usize>) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets the durability policy.
    #[must_use]
    pub fn sync(mut self, sync: SyncPolicy) -> Self {
        self.sync = sync;
        self
    }

    /// Sets the clock source.
    #[must_use]
    pub fn clock(mut self, clock: ClockSource) -> Self {
        self.clock = clock;
        self
    }

    /// The scale factors as a pair.
    pub fn scale(&self) -> ScaleFactors {
        ScaleFactors {
            when_scale: self.when_scale,
            data_scale: self.data_scale,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::ZeroScale`] for a zero scale factor and
    /// [`ArgumentError::ZeroCapacity`] for `Some(0)` buffer capacity.
    pub fn validate(&self) -> Result<()> {
        self.scale().validate()?;

        if self.buffer_capacity == Some(0) {
            return Err(ArgumentError::ZeroCapacity.into());
        }

        Ok(())
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the validation
    /// errors of [`LoggerConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise
    /// the errors of [`LoggerConfig::from_json_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }
}
