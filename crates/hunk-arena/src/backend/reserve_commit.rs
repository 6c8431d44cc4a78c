//! Reserve address space up front, commit pages as the hunk grows.

#![allow(unsafe_code)]

use std::io;
use std::ptr::NonNull;

use hunk_core::{BackendKind, VirtualMemoryBackend};

use crate::raw;

/// Reserves with no access rights and commits the prefix from the base
/// to the high-water mark on every allocation.
///
/// The whole prefix is re-committed each time rather than just the new
/// tail. Commits happen on load paths, not per frame, and committing an
/// already committed page is a no-op for the OS.
#[derive(Debug, Default)]
pub struct ReserveCommitBackend {
    _private: (),
}

impl ReserveCommitBackend {
    /// Create a backend with no reservation.
    pub fn new() -> Self {
        Self::default()
    }
}

// SAFETY: reservations come straight from mmap/VirtualAlloc, so they are
// page aligned, private to us, and zero-filled once committed. Committing
// an already committed page keeps its contents.
unsafe impl VirtualMemoryBackend for ReserveCommitBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ReserveCommit
    }

    fn reserve(&mut self, size: usize) -> io::Result<NonNull<u8>> {
        raw::reserve(size)
    }

    unsafe fn commit(&mut self, base: NonNull<u8>, len: usize) -> io::Result<()> {
        // SAFETY: forwarded from the trait contract.
        unsafe { raw::commit(base, len) }
    }

    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) -> io::Result<()> {
        // SAFETY: forwarded from the trait contract.
        unsafe { raw::release(base, size) }
    }
}
