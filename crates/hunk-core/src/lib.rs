//! Core types and traits for the Hunk arena allocator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions shared by the rest of the workspace: hunk IDs,
//! error types, alignment helpers, and the [`VirtualMemoryBackend`]
//! trait that every backing store implements.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod align;
pub mod backend;
pub mod error;
pub mod id;

pub use align::{round_up, round_up_32, CACHE_LINE};
pub use backend::{BackendKind, VirtualMemoryBackend};
pub use error::{FailureKind, HunkError};
pub use id::HunkId;
