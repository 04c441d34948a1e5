//! In-memory batching of records awaiting a write.

use tracing::warn;

use crate::record::Record;

/// Upper bound on the records allocated up front.
const INITIAL_ALLOCATION: usize = 4096;

/// Append-only, ordered batch of pending records.
///
/// The buffer only tracks whether its capacity threshold has been reached;
/// the owning logger decides when to drain it through the writer. It is
/// cleared only after a successful write, so a failed flush leaves every
/// pending record in place for a retry.
///
/// Not thread-safe: all access goes through `&mut self`.
///
/// Dropping a buffer that still holds records loses them; this is logged
/// as a warning rather than recovered.
#[derive(Debug)]
pub struct Buffer {
    records: Vec<Record>,
    capacity: Option<usize>,
}

impl Buffer {
    /// Creates an empty buffer.
    ///
    /// `capacity` is the number of records that triggers an implicit flush,
    /// or `None` for a buffer that only drains when asked.
    pub fn new(capacity: Option<usize>) -> Self {
        let initial = capacity.map_or(INITIAL_ALLOCATION, |cap| cap.min(INITIAL_ALLOCATION));
        Self {
            records: Vec::with_capacity(initial),
            capacity,
        }
    }

    /// Appends a record, returning `true` once the threshold is reached.
    #[inline]
    pub fn push(&mut self, record: Record) -> bool {
        self.records.push(record);
        self.is_full()
    }

    /// Returns `true` if the buffer has reached its threshold.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.records.len() >= cap)
    }

    /// Pending records in arrival order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of pending records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The configured threshold.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Drops all pending records, keeping the allocation.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if !self.records.is_empty() {
            warn!(
                records = self.records.len(),
                "logger dropped without flush_and_destroy; buffered records discarded"
            );
        }
    }
}
