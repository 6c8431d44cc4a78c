//! Let the operating system back the whole range lazily.

#![allow(unsafe_code)]

use std::io;
use std::ptr::NonNull;

use hunk_core::{BackendKind, VirtualMemoryBackend};

use crate::raw::{self, HeapBlock};

/// Takes the whole range from the OS in one block that is usable
/// immediately: a read-write anonymous mapping on Unix (pages are backed
/// on first touch) or a private heap on Windows. Commits are no-ops.
#[derive(Debug, Default)]
pub struct OsHeapBackend {
    block: Option<HeapBlock>,
}

impl OsHeapBackend {
    /// Create a backend with no reservation.
    pub fn new() -> Self {
        Self::default()
    }
}

// SAFETY: the block is private to this backend, starts on a cache line
// (page-aligned mapping on Unix, padded heap block on Windows), and is
// zero-filled and read-write for its whole length from the start.
unsafe impl VirtualMemoryBackend for OsHeapBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::OsHeap
    }

    fn reserve(&mut self, size: usize) -> io::Result<NonNull<u8>> {
        if self.block.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "os-heap backend already holds a reservation",
            ));
        }
        let (base, block) = raw::heap_reserve(size)?;
        self.block = Some(block);
        Ok(base)
    }

    unsafe fn commit(&mut self, _base: NonNull<u8>, _len: usize) -> io::Result<()> {
        Ok(())
    }

    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) -> io::Result<()> {
        let block = self.block.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "os-heap backend holds no reservation")
        })?;
        // SAFETY: forwarded from the trait contract; `block` is the one
        // created alongside `base`.
        unsafe { raw::heap_release(base, size, block) }
    }
}
