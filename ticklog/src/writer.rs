//! Serialization of record batches into the output file.
//!
//! The writer owns the output file from creation until [`Writer::close`].
//! Each call to [`Writer::write_batch`] appends one contiguous run of
//! fixed-size records. A batch is all-or-nothing from the caller's point of
//! view: if the write (or the fsync demanded by [`SyncPolicy::EveryFlush`])
//! fails, the file is truncated back to the last committed length so no
//! partial record is left behind, and the error is returned without retrying.
//!
//! The file header is emitted together with the first batch, so a file that
//! was created but never flushed is empty.

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::SyncPolicy;
use crate::error::{ArgumentError, OutputError, Result};
use crate::format::{FileHeader, HEADER_SIZE};
use crate::record::{RECORD_SIZE, Record};
use crate::scale::ScaleFactors;

/// Append-only writer for one output file.
#[derive(Debug)]
pub struct Writer {
    file: File,
    path: PathBuf,
    header: FileHeader,
    sync: SyncPolicy,
    /// Length of the file up to the end of the last successful batch.
    committed: u64,
    records_written: u64,
    /// Reused encoding scratch space.
    scratch: Vec<u8>,
}

impl Writer {
    /// Creates (or truncates) the output file.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::MalformedOutput`] for an empty path or one
    /// containing a NUL byte, and [`OutputError::Open`] if the file cannot be
    /// created.
    pub fn create<P: AsRef<Path>>(path: P, scale: ScaleFactors, sync: SyncPolicy) -> Result<Self> {
        let path = path.as_ref();
        validate_output(path)?;

        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)
            .map_err(|e| OutputError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;

        debug!(
            path = %path.display(),
            when_scale = scale.when_scale,
            data_scale = scale.data_scale,
            "opened output"
        );

        Ok(Self {
            file,
            path: path.to_path_buf(),
            header: FileHeader::new(scale),
            sync,
            committed: 0,
            records_written: 0,
            scratch: Vec::new(),
        })
    }

    /// Appends a batch of records in order.
    ///
    /// An empty batch writes nothing once the header is on disk, so repeated
    /// flushes never duplicate data.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Write`] or [`OutputError::Sync`]. In both cases
    /// the file has been rolled back to its previous length (best effort) and
    /// none of `records` counts as written.
    pub fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        let needs_header = self.committed == 0;
        if records.is_empty() && !needs_header {
            return Ok(());
        }

        self.scratch.clear();
        self.scratch
            .reserve(HEADER_SIZE + records.len() * RECORD_SIZE);
        if needs_header {
            self.scratch.extend_from_slice(&self.header.encode());
        }
        for record in records {
            record.encode_into(&mut self.scratch);
        }

        let offset = self.committed;
        if let Err(e) = self.file.write_all(&self.scratch) {
            self.rollback();
            return Err(OutputError::Write {
                path: self.path.clone(),
                offset,
                source: e,
            }
            .into());
        }

        if self.sync == SyncPolicy::EveryFlush
            && let Err(e) = self.file.sync_data()
        {
            self.rollback();
            return Err(OutputError::Sync {
                path: self.path.clone(),
                source: e,
            }
            .into());
        }

        self.committed += self.scratch.len() as u64;
        self.records_written += records.len() as u64;

        debug!(
            path = %self.path.display(),
            records = records.len(),
            bytes = self.scratch.len(),
            offset,
            "flushed batch"
        );

        Ok(())
    }

    /// Forces all written data to stable storage and closes the file.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Sync`] if the final fsync fails and
    /// [`OutputError::Close`] if the descriptor cannot be closed. The file is
    /// released either way.
    pub fn close(self) -> Result<()> {
        let Self {
            file,
            path,
            committed,
            records_written,
            ..
        } = self;

        let synced = file.sync_all().map_err(|e| OutputError::Sync {
            path: path.clone(),
            source: e,
        });
        let closed = close_file(file).map_err(|e| OutputError::Close {
            path: path.clone(),
            source: e,
        });

        synced?;
        closed?;

        info!(
            path = %path.display(),
            records = records_written,
            bytes = committed,
            "closed output"
        );

        Ok(())
    }

    /// Path of the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes committed to the file so far, header included.
    pub fn bytes_written(&self) -> u64 {
        self.committed
    }

    /// Records committed to the file so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Truncates the file back to the last committed length.
    fn rollback(&mut self) {
        let committed = self.committed;
        let result = self
            .file
            .set_len(committed)
            .and_then(|()| self.file.seek(SeekFrom::Start(committed)).map(|_| ()));

        match result {
            Ok(()) => warn!(
                path = %self.path.display(),
                offset = committed,
                "write failed, rolled back to last committed batch"
            ),
            Err(e) => warn!(
                path = %self.path.display(),
                offset = committed,
                error = %e,
                "write failed and rollback failed; tail of file may hold a partial record"
            ),
        }
    }
}

/// Rejects output identifiers that can never name a file.
fn validate_output(path: &Path) -> Result<()> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return Err(ArgumentError::MalformedOutput {
            output: String::new(),
            reason: "output path is empty",
        }
        .into());
    }
    if text.contains('\0') {
        return Err(ArgumentError::MalformedOutput {
            output: text.replace('\0', "\\0"),
            reason: "output path contains a NUL byte",
        }
        .into());
    }
    Ok(())
}

#[cfg(unix)]
fn close_file(file: File) -> io::Result<()> {
    use std::os::fd::IntoRawFd;

    let fd = file.into_raw_fd();
    // SAFETY: `into_raw_fd` released ownership of `fd` to us, so it is open
    // and closed exactly once here.
    let rc = unsafe { libc::close(fd) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogError;
    use tempfile::tempdir;

    #[test]
    fn test_header_written_with_first_batch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.tkl");
        let mut writer = Writer::create(&path, ScaleFactors::IDENTITY, SyncPolicy::OnClose).unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);

        writer.write_batch(&[Record::new(1, 100, 5)]).unwrap();
        assert_eq!(writer.bytes_written(), (HEADER_SIZE + RECORD_SIZE) as u64);
        assert_eq!(writer.records_written(), 1);

        writer.close().unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + RECORD_SIZE);
        assert_eq!(&bytes[0..4], b"TKLG");
    }

    #[test]
    fn test_empty_batch_is_noop_after_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.tkl");
        let mut writer =
            Writer::create(&path, ScaleFactors::IDENTITY, SyncPolicy::EveryFlush).unwrap();

        writer.write_batch(&[]).unwrap();
        assert_eq!(writer.bytes_written(), HEADER_SIZE as u64);

        writer.write_batch(&[]).unwrap();
        writer.write_batch(&[]).unwrap();
        assert_eq!(writer.bytes_written(), HEADER_SIZE as u64);
        assert_eq!(writer.records_written(), 0);
        writer.close().unwrap();
    }

    #[test]
    fn test_rejects_malformed_output() {
        let err = Writer::create("", ScaleFactors::IDENTITY, SyncPolicy::OnClose).unwrap_err();
        assert!(matches!(
            err,
            LogError::InvalidArgument(ArgumentError::MalformedOutput { .. })
        ));

        let err =
            Writer::create("bad\0name", ScaleFactors::IDENTITY, SyncPolicy::OnClose).unwrap_err();
        assert!(matches!(
            err,
            LogError::InvalidArgument(ArgumentError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn test_open_failure_reports_errno() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.tkl");

        let err = Writer::create(&path, ScaleFactors::IDENTITY, SyncPolicy::OnClose).unwrap_err();
        assert!(matches!(err, LogError::Io(OutputError::Open { .. })));
        assert!(err.raw_os_error().is_some());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_failure_is_reported_without_commit() {
        // /dev/full accepts opens but fails every write with ENOSPC.
        let mut writer =
            Writer::create("/dev/full", ScaleFactors::IDENTITY, SyncPolicy::OnClose).unwrap();

        let err = writer.write_batch(&[Record::new(1, 2, 3)]).unwrap_err();
        assert!(matches!(err, LogError::Io(OutputError::Write { offset: 0, .. })));
        assert_eq!(err.raw_os_error(), Some(libc::ENOSPC));
        assert_eq!(writer.bytes_written(), 0);
        assert_eq!(writer.records_written(), 0);
    }
}
