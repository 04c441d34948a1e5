//! The atomic unit of logged data and its fixed on-disk encoding.
//!
//! A [`Record`] is a `(series, when, data)` triple. The series id is an
//! opaque grouping tag; the logger never validates it, except that ids with
//! the [`RESERVED_SERIES_MASK`] bits set belong to the built-in resource
//! series and are exempt from data scaling.
//!
//! # Encoding
//!
//! ```text
//! [0..4)    series  u32 LE
//! [4..12)   when    u64 LE
//! [12..20)  data    u64 LE
//! ```

/// Size of an encoded record in bytes.
pub const RECORD_SIZE: usize = 20;

/// Series ids with all of these bits set are reserved for built-in series.
pub const RESERVED_SERIES_MASK: u32 = 0xffff_0000;

/// One timestamped sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Record {
    /// Opaque series identifier.
    pub series: u32,
    /// Timestamp, normally nanoseconds since the Unix epoch.
    pub when: u64,
    /// The sample value.
    pub data: u64,
}

impl Record {
    /// Creates a record.
    #[inline]
    pub const fn new(series: u32, when: u64, data: u64) -> Self {
        Self { series, when, data }
    }

    /// Returns `true` if the series id falls in the reserved range.
    #[inline]
    pub const fn is_reserved(&self) -> bool {
        is_reserved_series(self.series)
    }

    /// Appends the fixed-layout encoding of this record to `buf`.
    #[inline]
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.series.to_le_bytes());
        buf.extend_from_slice(&self.when.to_le_bytes());
        buf.extend_from_slice(&self.data.to_le_bytes());
    }

    /// Decodes a record from exactly [`RECORD_SIZE`] bytes.
    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        let mut series = [0u8; 4];
        let mut when = [0u8; 8];
        let mut data = [0u8; 8];
        series.copy_from_slice(&bytes[0..4]);
        when.copy_from_slice(&bytes[4..12]);
        data.copy_from_slice(&bytes[12..20]);

        Self {
            series: u32::from_le_bytes(series),
            when: u64::from_le_bytes(when),
            data: u64::from_le_bytes(data),
        }
    }
}

/// Returns `true` if `series` falls in the reserved range.
#[inline]
pub const fn is_reserved_series(series: u32) -> bool {
    series & RESERVED_SERIES_MASK == RESERVED_SERIES_MASK
}

// Built-in resource usage series (see `DataLogger::record_rusage`).

/// User CPU time, microseconds.
pub const SERIES_RU_UTIME: u32 = 0xffff_0000;
/// System CPU time, microseconds.
pub const SERIES_RU_STIME: u32 = 0xffff_0001;
/// Maximum resident set size.
pub const SERIES_RU_MAXRSS: u32 = 0xffff_0002;
/// Integral shared memory size.
pub const SERIES_RU_IXRSS: u32 = 0xffff_0003;
/// Integral unshared data size.
pub const SERIES_RU_IDRSS: u32 = 0xffff_0004;
/// Integral unshared stack size.
pub const SERIES_RU_ISRSS: u32 = 0xffff_0005;
/// Minor page faults.
pub const SERIES_RU_MINFLT: u32 = 0xffff_0006;
/// Major page faults.
pub const SERIES_RU_MAJFLT: u32 = 0xffff_0007;
/// Swaps.
pub const SERIES_RU_NSWAP: u32 = 0xffff_0008;
/// Block input operations.
pub const SERIES_RU_INBLOCK: u32 = 0xffff_0009;
/// Block output operations.
pub const SERIES_RU_OUBLOCK: u32 = 0xffff_000a;
/// IPC messages sent.
pub const SERIES_RU_MSGSND: u32 = 0xffff_000b;
/// IPC messages received.
pub const SERIES_RU_MSGRCV: u32 = 0xffff_000c;
/// Signals received.
pub const SERIES_RU_NSIGNALS: u32 = 0xffff_000d;
/// Voluntary context switches.
pub const SERIES_RU_NVCSW: u32 = 0xffff_000e;
/// Involuntary context switches.
pub const SERIES_RU_NIVCSW: u32 = 0xffff_000f;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_layout_is_little_endian() {
        let mut buf = Vec::new();
        Record::new(0x0102_0304, 0x10, 0x20).encode_into(&mut buf);

        assert_eq!(buf.len(), RECORD_SIZE);
        assert_eq!(&buf[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(buf[4], 0x10);
        assert_eq!(buf[12], 0x20);
    }

    #[test]
    fn test_decode_extremes() {
        let record = Record::new(u32::MAX, u64::MAX, 0);
        let mut buf = Vec::new();
        record.encode_into(&mut buf);

        let bytes: [u8; RECORD_SIZE] = buf.as_slice().try_into().unwrap();
        assert_eq!(Record::decode(&bytes), record);
    }

    #[test]
    fn test_reserved_range() {
        assert!(is_reserved_series(SERIES_RU_UTIME));
        assert!(is_reserved_series(SERIES_RU_NIVCSW));
        assert!(is_reserved_series(u32::MAX));
        assert!(!is_reserved_series(0xfffe_ffff));
        assert!(!Record::new(1, 0, 0).is_reserved());
    }
}
