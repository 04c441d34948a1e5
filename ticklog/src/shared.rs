//! A lockable, clonable handle to one logger.
//!
//! [`DataLogger`] is single-owner and consumes itself on close, so misuse
//! after close is a compile error. When a logger must be reached from
//! several threads, [`SharedLogger`] serializes access behind a
//! `parking_lot::Mutex` and turns use after close into a runtime
//! [`LogError::UseAfterClose`].

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::LoggerConfig;
use crate::error::{LogError, Result};
use crate::logger::DataLogger;

/// Thread-safe handle to a [`DataLogger`].
///
/// Clones refer to the same logger. Records from different threads are
/// written in the order the lock was acquired.
#[derive(Debug, Clone)]
pub struct SharedLogger {
    inner: Arc<Mutex<Option<DataLogger>>>,
}

impl SharedLogger {
    /// Wraps an existing logger.
    pub fn new(logger: DataLogger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(logger))),
        }
    }

    /// Creates a logger and wraps it.
    ///
    /// # Errors
    ///
    /// Same as [`DataLogger::create`].
    pub fn create<P: AsRef<Path>>(output: P, when_scale: u64, data_scale: u64) -> Result<Self> {
        DataLogger::create(output, when_scale, data_scale).map(Self::new)
    }

    /// Creates a logger from a full configuration and wraps it.
    ///
    /// # Errors
    ///
    /// Same as [`DataLogger::with_config`].
    pub fn with_config<P: AsRef<Path>>(output: P, config: LoggerConfig) -> Result<Self> {
        DataLogger::with_config(output, config).map(Self::new)
    }

    /// See [`DataLogger::record`].
    ///
    /// # Errors
    ///
    /// Returns [`LogError::UseAfterClose`] once the logger has been
    /// destroyed through any clone of this handle.
    pub fn record(&self, series: u32, when: u64, data: u64) -> Result<()> {
        self.with_logger(|logger| logger.record(series, when, data))
    }

    /// See [`DataLogger::record_now`].
    ///
    /// # Errors
    ///
    /// Returns [`LogError::UseAfterClose`] after close.
    pub fn record_now(&self, series: u32, data: u64) -> Result<()> {
        self.with_logger(|logger| logger.record_now(series, data))
    }

    /// See [`DataLogger::flush`].
    ///
    /// # Errors
    ///
    /// Returns [`LogError::UseAfterClose`] after close.
    pub fn flush(&self) -> Result<()> {
        self.with_logger(DataLogger::flush)
    }

    /// Flushes and destroys the shared logger.
    ///
    /// The logger is taken out of the handle before the final flush, so it is
    /// destroyed even if this returns an I/O error.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::UseAfterClose`] if already destroyed, or the
    /// errors of [`DataLogger::flush_and_destroy`].
    pub fn flush_and_destroy(&self) -> Result<()> {
        let logger = self.inner.lock().take().ok_or(LogError::UseAfterClose)?;
        logger.flush_and_destroy()
    }

    /// Returns `true` once the logger has been destroyed.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().is_none()
    }

    fn with_logger<T>(&self, f: impl FnOnce(&mut DataLogger) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.lock();
        let logger = guard.as_mut().ok_or(LogError::UseAfterClose)?;
        f(logger)
    }
}

impl From<DataLogger> for SharedLogger {
    fn from(logger: DataLogger) -> Self {
        Self::new(logger)
    }
}
