//! Shared record of finalized hunks.
//!
//! The engine's allocator kept a single global count of open hunks. A
//! [`HunkLedger`] is that count made explicit: the owner creates one,
//! attaches it to the hunks it wants tracked through
//! [`HunkConfig::with_ledger`](crate::HunkConfig::with_ledger), and reads
//! it back for diagnostics. A hunk is entered when it is finalized by
//! `end` and removed when it is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use hunk_core::HunkId;

/// Cloneable handle to a shared table of live, finalized hunks.
///
/// Clones share the same table. Entries keep insertion order, so
/// [`entries`](Self::entries) lists hunks in the order they were ended.
#[derive(Clone, Debug, Default)]
pub struct HunkLedger {
    inner: Arc<Mutex<IndexMap<HunkId, usize>>>,
}

impl HunkLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<HunkId, usize>> {
        // Entries are plain integers, so a poisoned table is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `hunk` as finalized with `committed` bytes.
    ///
    /// Recording the same hunk again updates its size without changing
    /// the open count.
    pub(crate) fn record(&self, hunk: HunkId, committed: usize) {
        self.lock().insert(hunk, committed);
    }

    /// Remove `hunk`, returning its recorded size if it was present.
    pub(crate) fn remove(&self, hunk: HunkId) -> Option<usize> {
        self.lock().shift_remove(&hunk)
    }

    /// Number of finalized hunks that have not been released.
    pub fn open_count(&self) -> usize {
        self.lock().len()
    }

    /// Sum of committed bytes across open hunks.
    pub fn committed_bytes(&self) -> usize {
        self.lock().values().sum()
    }

    /// Whether `hunk` is currently recorded as open.
    pub fn contains(&self, hunk: HunkId) -> bool {
        self.lock().contains_key(&hunk)
    }

    /// Snapshot of `(hunk, committed bytes)` pairs in finalization order.
    pub fn entries(&self) -> Vec<(HunkId, usize)> {
        self.lock().iter().map(|(&id, &size)| (id, size)).collect()
    }
}
