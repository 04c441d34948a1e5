//! The data logger façade.
//!
//! A [`DataLogger`] owns one [`Writer`], one [`Buffer`] and one [`Scaler`].
//! Every accepted record passes through the scaler, lands in the buffer, and
//! reaches the output either when the buffer fills up, on an explicit
//! [`DataLogger::flush`], or in [`DataLogger::flush_and_destroy`].
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ticklog::DataLogger;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut logger = DataLogger::create("latency.tkl", 1, 1)?;
//!
//! logger.record(1, 100, 5)?;
//! logger.record(2, 200, 6)?;
//!
//! let span = logger.start(3);
//! // ... timed work ...
//! logger.finish(span)?;
//!
//! logger.flush_and_destroy()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! `DataLogger` requires `&mut self` for every mutation, so sharing one
//! across threads needs external locking. [`SharedLogger`](crate::SharedLogger)
//! provides that lock. Independent loggers writing to distinct files need no
//! coordination.

use std::path::Path;

use tracing::warn;

use crate::buffer::Buffer;
use crate::clock::Clock;
use crate::config::LoggerConfig;
use crate::error::Result;
use crate::record::Record;
use crate::scale::{ScaleFactors, Scaler};
use crate::writer::Writer;

/// A section being timed, created by [`DataLogger::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a span records nothing until passed to `finish`"]
pub struct Span {
    series: u32,
    start_ns: u64,
}

impl Span {
    /// Series the elapsed time will be recorded under.
    pub fn series(&self) -> u32 {
        self.series
    }

    /// Clock reading when the span started.
    pub fn start_ns(&self) -> u64 {
        self.start_ns
    }
}

/// A single-file, buffered record logger.
///
/// Created with [`DataLogger::create`] or [`DataLogger::with_config`] and
/// torn down with [`DataLogger::flush_and_destroy`], which consumes the
/// logger. Dropping a logger without calling it discards any buffered
/// records (a warning is logged).
#[derive(Debug)]
pub struct DataLogger {
    writer: Writer,
    buffer: Buffer,
    scaler: Scaler,
    clock: Clock,
    config: LoggerConfig,
    /// Records accepted since creation.
    accepted: u64,
}

impl DataLogger {
    /// Creates a logger writing to `output` with the default configuration
    /// and the given scale factors.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidArgument`](crate::LogError::InvalidArgument)
    /// if either scale factor is zero or `output` is malformed, without
    /// touching the filesystem. Returns [`LogError::Io`](crate::LogError::Io)
    /// if the output cannot be created.
    pub fn create<P: AsRef<Path>>(output: P, when_scale: u64, data_scale: u64) -> Result<Self> {
        Self::with_config(output, LoggerConfig::new(when_scale, data_scale))
    }

    /// Creates a logger from a full configuration.
    ///
    /// # Errors
    ///
    /// Same as [`DataLogger::create`], plus
    /// [`ArgumentError::ZeroCapacity`](crate::ArgumentError::ZeroCapacity)
    /// for a zero buffer capacity.
    pub fn with_config<P: AsRef<Path>>(output: P, config: LoggerConfig) -> Result<Self> {
        // Validate before opening so a rejected config leaves no file behind.
        config.validate()?;

        let scale = config.scale();
        let writer = Writer::create(output, scale, config.sync)?;

        Ok(Self {
            writer,
            buffer: Buffer::new(config.buffer_capacity),
            scaler: Scaler::new(scale),
            clock: Clock::new(config.clock),
            config,
            accepted: 0,
        })
    }

    /// Records one sample.
    ///
    /// The record is scaled and buffered. If that fills the buffer, the
    /// buffer is flushed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`](crate::LogError::Io) if an implicit flush
    /// fails. The record stays buffered, along with everything before it,
    /// and the next call retries the flush.
    #[inline]
    pub fn record(&mut self, series: u32, when: u64, data: u64) -> Result<()> {
        let record = self.scaler.apply(Record::new(series, when, data));
        self.accepted += 1;

        if self.buffer.push(record) {
            self.flush()?;
        }
        Ok(())
    }

    /// Records one sample stamped with the logger's clock.
    ///
    /// With the default wall clock the timestamps are not monotonic; pass
    /// `when` explicitly through [`DataLogger::record`] when ordering matters,
    /// or configure [`ClockSource::Monotonic`](crate::ClockSource::Monotonic).
    ///
    /// # Errors
    ///
    /// Same as [`DataLogger::record`].
    #[inline]
    pub fn record_now(&mut self, series: u32, data: u64) -> Result<()> {
        let when = self.clock.now_ns();
        self.record(series, when, data)
    }

    /// Records a batch of samples in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failed implicit flush and returns its error. The
    /// records up to and including the one that triggered the flush are
    /// buffered; the rest of the batch is not.
    pub fn record_batch(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.record(record.series, record.when, record.data)?;
        }
        Ok(())
    }

    /// Starts timing a section under `series`.
    pub fn start(&self, series: u32) -> Span {
        Span {
            series,
            start_ns: self.clock.now_ns(),
        }
    }

    /// Records the time elapsed since `span` started.
    ///
    /// The record is `(series, start, elapsed)` in nanoseconds.
    ///
    /// # Errors
    ///
    /// Same as [`DataLogger::record`].
    pub fn finish(&mut self, span: Span) -> Result<()> {
        let elapsed = self.clock.now_ns().saturating_sub(span.start_ns);
        self.record(span.series, span.start_ns, elapsed)
    }

    /// Records the process's resource usage under the reserved series.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::ResourceUsage`](crate::LogError::ResourceUsage)
    /// if the counters cannot be sampled, or the errors of
    /// [`DataLogger::record`].
    #[cfg(unix)]
    pub fn record_rusage(&mut self, when: u64) -> Result<()> {
        let usage = crate::rusage::ResourceUsage::sample()
            .map_err(crate::error::LogError::ResourceUsage)?;
        self.record_batch(&usage.records(when))
    }

    /// Writes every buffered record to the output.
    ///
    /// Flushing an empty buffer writes nothing, so repeated flushes never
    /// duplicate records. The first flush also writes the file header.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`](crate::LogError::Io) if the write fails. The
    /// buffer is left unchanged, so the flush can be retried.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.write_batch(self.buffer.records())?;
        self.buffer.clear();
        Ok(())
    }

    /// Flushes all buffered records, syncs and closes the output.
    ///
    /// Consumes the logger: it is gone whether or not this succeeds. Each
    /// step is attempted once, and the first error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`](crate::LogError::Io) if the final write, the
    /// fsync or the close fails. Records that could not be written are lost.
    pub fn flush_and_destroy(self) -> Result<()> {
        let Self {
            mut writer,
            mut buffer,
            ..
        } = self;

        let flushed = writer.write_batch(buffer.records());
        if let Err(e) = &flushed {
            warn!(
                path = %writer.path().display(),
                records = buffer.len(),
                error = %e,
                "final flush failed; discarding buffered records"
            );
        }
        buffer.clear();

        let closed = writer.close();
        flushed?;
        closed
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        self.writer.path()
    }

    /// Scale factors fixed at creation.
    pub fn scale(&self) -> ScaleFactors {
        self.scaler.factors()
    }

    /// The configuration the logger was created with.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Records accepted but not yet written.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Records written to the output so far.
    pub fn records_written(&self) -> u64 {
        self.writer.records_written()
    }

    /// Records accepted since creation.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }
}
