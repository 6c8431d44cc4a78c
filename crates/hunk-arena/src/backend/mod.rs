//! The real backing stores a hunk can be built on.
//!
//! Each backend owns at most one reservation at a time and is owned by
//! exactly one [`Hunk`](crate::Hunk). [`for_kind`] picks one at
//! construction time from a [`BackendKind`].

mod os_heap;
mod plain_heap;
mod reserve_commit;

pub use os_heap::OsHeapBackend;
pub use plain_heap::PlainHeapBackend;
pub use reserve_commit::ReserveCommitBackend;

use hunk_core::{BackendKind, HunkError, VirtualMemoryBackend};

/// Construct the built-in backend for `kind`.
///
/// [`BackendKind::Custom`] has no built-in implementation; pass a custom
/// backend to [`Hunk::with_backend`](crate::Hunk::with_backend) instead.
pub fn for_kind(kind: BackendKind) -> Result<Box<dyn VirtualMemoryBackend>, HunkError> {
    match kind {
        BackendKind::ReserveCommit => Ok(Box::new(ReserveCommitBackend::new())),
        BackendKind::OsHeap => Ok(Box::new(OsHeapBackend::new())),
        BackendKind::PlainHeap => Ok(Box::new(PlainHeapBackend::new())),
        BackendKind::Custom => Err(HunkError::InvalidConfig {
            reason: "custom backends must be passed to Hunk::with_backend".into(),
        }),
    }
}
