//! Hunk: reservation-based arena allocation for real-time engines.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Hunk sub-crates. For most users, adding `hunk` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use hunk::prelude::*;
//!
//! let ledger = HunkLedger::new();
//! let config = HunkConfig::new(BackendKind::ReserveCommit).with_ledger(ledger.clone());
//!
//! // Reserve 1 MiB of address space; nothing is committed yet.
//! let mut model = Hunk::begin(1 << 20, &config).unwrap();
//! let _header = model.alloc(10).unwrap();
//! let verts = model.alloc(40).unwrap();
//! assert_eq!(verts.offset(), 32);
//! model.get_mut(&verts).unwrap()[0] = 1;
//!
//! // Finalize: memory stays live, the ledger counts it as open.
//! assert_eq!(model.end(), 96);
//! assert_eq!(ledger.open_count(), 1);
//!
//! // Release the whole reservation.
//! let mut slot = Some(model);
//! Hunk::free_slot(&mut slot);
//! Hunk::free_slot(&mut slot); // already cleared: no-op
//! assert_eq!(ledger.open_count(), 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `hunk-arena` | `Hunk`, `HunkConfig`, `HunkLedger`, backends |
//! | [`types`] | `hunk-core` | IDs, errors, `VirtualMemoryBackend`, rounding |
//! | [`sys`] | `hunk-sys` | clock, directory search, string primitives |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Hunks, configuration, ledger and the built-in backends (`hunk-arena`).
pub use hunk_arena as arena;

/// Core types, traits and helpers (`hunk-core`).
///
/// Implement [`types::VirtualMemoryBackend`] here to plug a custom
/// backing store into [`arena::Hunk::with_backend`].
pub use hunk_core as types;

/// Platform shim: clock, directory search, string primitives (`hunk-sys`).
pub use hunk_sys as sys;

/// Common imports for typical usage.
///
/// ```rust
/// use hunk::prelude::*;
/// ```
pub mod prelude {
    // Arena
    pub use hunk_arena::{Allocation, Hunk, HunkConfig, HunkLedger, HunkState, OrFatal};

    // Core types and errors
    pub use hunk_core::{round_up_32, BackendKind, FailureKind, HunkError, HunkId};

    // Platform shim
    pub use hunk_sys::{milliseconds, AttributeFilter, FileAttributes, Finder};
}
