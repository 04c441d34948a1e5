//! Read-only access to a finished (or crashed) log file.
//!
//! The file is memory-mapped and records are decoded lazily. A trailing
//! fragment shorter than one record, which can only come from a crash in
//! the middle of a write, is ignored and reported through
//! [`DataReader::torn_bytes`].

use std::fs::File;
use std::path::{Path, PathBuf};
use std::slice::ChunksExact;

use memmap2::Mmap;
use tracing::{debug, warn};

use crate::error::{FormatError, OutputError, Result};
use crate::format::{FileHeader, HEADER_SIZE};
use crate::record::{RECORD_SIZE, Record};
use crate::scale::ScaleFactors;

/// Which series an iteration yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeriesFilter {
    /// Every series except the reserved resource-usage series.
    #[default]
    User,
    /// Every record.
    All,
    /// Only the given series.
    Only(u32),
}

impl SeriesFilter {
    /// Returns `true` if `series` passes the filter.
    #[inline]
    pub fn matches(&self, series: u32) -> bool {
        match self {
            Self::User => !crate::record::is_reserved_series(series),
            Self::All => true,
            Self::Only(id) => *id == series,
        }
    }
}

/// A memory-mapped log file.
#[derive(Debug)]
pub struct DataReader {
    path: PathBuf,
    mmap: Mmap,
    header: FileHeader,
    torn_bytes: usize,
}

impl DataReader {
    /// Opens and validates a log file.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Read`] or [`OutputError::Map`] if the file
    /// cannot be opened or mapped, and [`FormatError`] if the header is
    /// missing or invalid.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let read_err = |e| OutputError::Read {
            path: path.to_path_buf(),
            source: e,
        };

        let file = File::open(path).map_err(read_err)?;
        let len = file.metadata().map_err(read_err)?.len();

        // Empty files cannot be mapped on every platform, and a file without
        // a full header is unreadable anyway.
        if len < HEADER_SIZE as u64 {
            return Err(FormatError::MissingHeader {
                path: path.display().to_string(),
                len,
                needed: HEADER_SIZE as u64,
            }
            .into());
        }

        // SAFETY: The map is read-only. Log files are append-only, so a
        // concurrent writer can only extend the file past the mapped length;
        // it never rewrites bytes we have mapped.
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| OutputError::Map {
                path: path.to_path_buf(),
                source: e,
            })?
        };

        let header = FileHeader::decode(&mmap, &path.display().to_string())?;
        let torn_bytes = (mmap.len() - HEADER_SIZE) % RECORD_SIZE;
        if torn_bytes > 0 {
            warn!(
                path = %path.display(),
                torn_bytes,
                "ignoring partial record at end of file"
            );
        }

        let reader = Self {
            path: path.to_path_buf(),
            mmap,
            header,
            torn_bytes,
        };
        debug!(path = %path.display(), records = reader.len(), "opened log for reading");
        Ok(reader)
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scale factors the file was written with.
    pub fn scale(&self) -> ScaleFactors {
        self.header.scale
    }

    /// Timestamp scale factor.
    pub fn when_scale(&self) -> u64 {
        self.header.scale.when_scale
    }

    /// Data scale factor.
    pub fn data_scale(&self) -> u64 {
        self.header.scale.data_scale
    }

    /// Number of complete records in the file, all series included.
    pub fn len(&self) -> usize {
        (self.mmap.len() - HEADER_SIZE) / RECORD_SIZE
    }

    /// Returns `true` if the file holds no complete record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the partial record at the tail, if any.
    pub fn torn_bytes(&self) -> usize {
        self.torn_bytes
    }

    /// Iterates over the records that pass `filter`, in file order.
    pub fn iter(&self, filter: SeriesFilter) -> Records<'_> {
        Records {
            chunks: self.mmap[HEADER_SIZE..].chunks_exact(RECORD_SIZE),
            filter,
        }
    }

    /// Collects every record, reserved series included.
    pub fn records(&self) -> Vec<Record> {
        self.iter(SeriesFilter::All).collect()
    }
}

/// Iterator over the records of a [`DataReader`].
#[derive(Debug, Clone)]
pub struct Records<'a> {
    chunks: ChunksExact<'a, u8>,
    filter: SeriesFilter,
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        for chunk in self.chunks.by_ref() {
            let bytes: &[u8; RECORD_SIZE] = chunk.try_into().ok()?;
            let record = Record::decode(bytes);
            if self.filter.matches(record.series) {
                return Some(record);
            }
        }
        None
    }
}
