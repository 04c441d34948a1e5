//! Error types for the ticklog data logger.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for all ticklog operations.
///
/// Every fallible operation reports its failure synchronously through this
/// enum. Nothing is retried internally.
#[derive(Error, Debug)]
pub enum LogError {
    /// An argument or configuration value was rejected before any I/O happened.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    /// The output destination could not be opened, written, synced or closed.
    #[error("output I/O error: {0}")]
    Io(#[from] OutputError),

    /// The logger behind a shared handle has already been flushed and destroyed.
    #[error("logger has already been flushed and destroyed")]
    UseAfterClose,

    /// A log file did not have the expected on-disk layout.
    #[error("log format error: {0}")]
    Format(#[from] FormatError),

    /// A configuration file could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The process resource counters could not be sampled.
    #[error("failed to sample resource usage: {0}")]
    ResourceUsage(#[source] std::io::Error),
}

impl LogError {
    /// Returns the host error number when the failure originated from the OS.
    ///
    /// This is the `errno` value reported by the failing system call.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Io(err) => err.source_io().raw_os_error(),
            Self::Config(ConfigError::Read { source, .. }) | Self::ResourceUsage(source) => {
                source.raw_os_error()
            }
            _ => None,
        }
    }

    /// Returns `true` if this error is [`LogError::UseAfterClose`].
    pub fn is_use_after_close(&self) -> bool {
        matches!(self, Self::UseAfterClose)
    }
}

/// Arguments rejected before touching the output destination.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// A scale factor of zero was supplied.
    #[error("{component} scale factor must be at least 1")]
    ZeroScale {
        /// Which component the factor applies to (`"when"` or `"data"`).
        component: &'static str,
    },

    /// The output identifier was empty or otherwise unusable.
    #[error("malformed output identifier '{output}': {reason}")]
    MalformedOutput {
        /// The rejected identifier.
        output: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A bounded buffer was configured with room for zero records.
    #[error("buffer capacity must be at least 1 record")]
    ZeroCapacity,

    /// A time unit string was not recognised.
    #[error("unknown time unit '{unit}' (expected ns, us, ms or s)")]
    UnknownUnit {
        /// The rejected unit string.
        unit: String,
    },

    /// A bucket size string could not be parsed.
    #[error("malformed bucket size '{bucket}'")]
    MalformedBucket {
        /// The rejected bucket string.
        bucket: String,
    },

    /// A bucket size is zero or not a whole multiple of the display unit.
    #[error("bucket of {bucket_nanos}ns is not a positive multiple of {unit_nanos}ns")]
    BucketUnitMismatch {
        /// Bucket size in nanoseconds.
        bucket_nanos: u64,
        /// Unit size in nanoseconds.
        unit_nanos: u64,
    },
}

/// Failures of the output destination.
#[derive(Error, Debug)]
pub enum OutputError {
    /// The destination could not be opened or created.
    #[error("failed to open '{}': {source}", path.display())]
    Open {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A batch could not be written.
    #[error("failed to write '{}' at offset {offset}: {source}", path.display())]
    Write {
        /// The destination path.
        path: PathBuf,
        /// Byte offset at which the batch was being appended.
        offset: u64,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Written data could not be made durable.
    #[error("failed to sync '{}' to disk: {source}", path.display())]
    Sync {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The destination could not be closed cleanly.
    #[error("failed to close '{}': {source}", path.display())]
    Close {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A log file could not be opened or inspected for reading.
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        /// The file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A log file could not be memory mapped.
    #[error("memory mapping failed for '{}': {source}", path.display())]
    Map {
        /// The file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl OutputError {
    fn source_io(&self) -> &std::io::Error {
        match self {
            Self::Open { source, .. }
            | Self::Write { source, .. }
            | Self::Sync { source, .. }
            | Self::Close { source, .. }
            | Self::Read { source, .. }
            | Self::Map { source, .. } => source,
        }
    }
}

/// A log file that does not match the expected layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The file is shorter than the fixed header.
    #[error("'{path}' has no header ({len} bytes, need {needed})")]
    MissingHeader {
        /// The file path.
        path: String,
        /// Actual file length.
        len: u64,
        /// Header length.
        needed: u64,
    },

    /// The file does not start with the ticklog magic bytes.
    #[error("'{path}' has invalid magic bytes {found:?}")]
    BadMagic {
        /// The file path.
        path: String,
        /// The bytes found instead.
        found: [u8; 4],
    },

    /// The file was written by an unknown format version.
    #[error("'{path}' has unsupported format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// The file path.
        path: String,
        /// Version found in the header.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },

    /// The header records a scale factor of zero.
    #[error("'{path}' records a zero scale factor")]
    ZeroScale {
        /// The file path.
        path: String,
    },
}

/// Errors loading a [`LoggerConfig`](crate::config::LoggerConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Type alias for `Result<T, LogError>`.
pub type Result<T> = std::result::Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_os_error_surfaces_errno() {
        let err: LogError = OutputError::Open {
            path: PathBuf::from("/nope/out.tkl"),
            source: std::io::Error::from_raw_os_error(2),
        }
        .into();

        assert_eq!(err.raw_os_error(), Some(2));
        assert!(err.to_string().contains("/nope/out.tkl"));
    }

    #[test]
    fn test_non_io_errors_have_no_errno() {
        let err: LogError = ArgumentError::ZeroScale { component: "when" }.into();
        assert_eq!(err.raw_os_error(), None);
        assert_eq!(
            err.to_string(),
            "invalid argument: when scale factor must be at least 1"
        );

        assert!(LogError::UseAfterClose.is_use_after_close());
    }
}
