//! # ticklog
//!
//! Crash-safe, high-throughput event and metric logger.
//!
//! ticklog records `(series, when, data)` samples from running systems
//! (benchmarks, servers, control loops) into a single append-only file.
//! Samples are batched in memory, optionally decimated at construction-time
//! scale factors, and written as fixed-size records in arrival order.
//!
//! ## Key Properties
//!
//! - Allocation-free record path once the buffer has grown
//! - Bounded memory: the buffer flushes itself when it reaches capacity
//! - All-or-nothing batch writes; a crash can tear at most the last record
//! - Deterministic integer decimation, no per-record floating point
//! - No background threads
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ticklog::{DataLogger, DataReader, SeriesFilter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut logger = DataLogger::create("run.tkl", 1, 1)?;
//! logger.record(1, 100, 5)?;
//! logger.record_now(2, 6)?;
//! logger.flush_and_destroy()?;
//!
//! let reader = DataReader::open("run.tkl")?;
//! for record in reader.iter(SeriesFilter::User) {
//!     println!("{} {} {}", record.series, record.when, record.data);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`DataLogger`] — Owns the buffer, scaler and writer for one output file
//! - [`SharedLogger`] — Mutex-guarded handle for sharing a logger across threads
//! - [`DataReader`] — Memory-mapped reader for finished files
//! - [`LoggerConfig`] — Scale factors, buffer capacity, sync policy, clock
//!
//! ## Modules
//!
//! - [`logger`] — Logger lifecycle, record, flush
//! - [`shared`] — Thread-safe shared handle
//! - [`scale`] — Decimation policy
//! - [`buffer`] — In-memory batching
//! - [`writer`] — Batch serialization and durability
//! - [`format`] — On-disk header layout
//! - [`record`] — Record type and encoding
//! - [`reader`] — Reading files back
//! - [`analysis`] — Summary, CDF and timeseries over records
//! - [`units`] — Time units and bucket sizes
//! - [`rusage`] — Process resource counters (unix)
//! - [`config`] — Logger configuration
//! - [`clock`] — Timestamp sources
//! - [`error`] — Error types

pub mod analysis;
pub mod buffer;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod logger;
pub mod reader;
pub mod record;
#[cfg(unix)]
pub mod rusage;
pub mod scale;
pub mod shared;
pub mod units;
pub mod writer;

// Re-export primary API types at crate root for convenience.
pub use analysis::{DataPoint, Summary};
pub use clock::ClockSource;
pub use config::{LoggerConfig, SyncPolicy};
pub use error::{ArgumentError, ConfigError, FormatError, LogError, OutputError, Result};
pub use logger::{DataLogger, Span};
pub use reader::{DataReader, SeriesFilter};
pub use record::Record;
pub use scale::ScaleFactors;
pub use shared::SharedLogger;
