//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`HunkId`] allocation.
static HUNK_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a hunk.
///
/// Allocated from a monotonic atomic counter via [`HunkId::next`].
/// Every allocation carries the ID of the hunk it came from, so an
/// allocation can never resolve against a different hunk, even one
/// that happens to reuse the same address range after a release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HunkId(u64);

impl HunkId {
    /// Allocate a fresh, unique ID.
    ///
    /// Each call returns a new ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(HUNK_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hunk#{}", self.0)
    }
}
