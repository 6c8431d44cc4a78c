//! Reservation-based bump arenas ("hunks") with incremental commit.
//!
//! A [`Hunk`] reserves a contiguous address range once, carves
//! allocations out of it sequentially, and gives the whole range back
//! in one call. There is no per-allocation free. This crate is the only
//! one in the workspace that talks to the operating system's memory
//! manager, and it keeps every `unsafe` block in the modules that must.
//!
//! # Architecture
//!
//! ```text
//! Hunk (owner-confined, !Send)
//! ├── Box<dyn VirtualMemoryBackend>
//! │   ├── ReserveCommitBackend (mmap PROT_NONE + mprotect / VirtualAlloc)
//! │   ├── OsHeapBackend        (lazily-backed mapping / private Win32 heap)
//! │   └── PlainHeapBackend     (one zeroed block from the global allocator)
//! ├── reserved / committed     (high-water mark, never decreases)
//! └── Option<HunkLedger>       (shared record of finalized, live hunks)
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! begin ──▶ Reserved ──alloc──▶ Committing ──end──▶ Finalized
//!              │                    │                   │
//!              └──────── free / drop ───────────────────┴──▶ Released
//! ```
//!
//! # Example
//!
//! ```
//! use hunk_arena::{Hunk, HunkConfig};
//!
//! let mut hunk = Hunk::begin(1024, &HunkConfig::default()).unwrap();
//! let a = hunk.alloc(10).unwrap();
//! let b = hunk.alloc(40).unwrap();
//! assert_eq!((a.offset(), b.offset()), (0, 32));
//! hunk.get_mut(&b).unwrap()[0] = 7;
//! assert_eq!(hunk.end(), 96);
//! hunk.free();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod backend;
pub mod config;
pub mod fatal;
pub mod handle;
pub mod hunk;
pub mod ledger;
mod raw;

// Public re-exports for the primary API surface.
pub use backend::{OsHeapBackend, PlainHeapBackend, ReserveCommitBackend};
pub use config::HunkConfig;
pub use fatal::OrFatal;
pub use handle::Allocation;
pub use hunk::{Hunk, HunkState};
pub use hunk_core::{BackendKind, FailureKind, HunkError, HunkId, VirtualMemoryBackend};
pub use ledger::HunkLedger;
