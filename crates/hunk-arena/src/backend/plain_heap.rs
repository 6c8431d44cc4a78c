//! One zeroed block from the global allocator.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::io;
use std::ptr::NonNull;

use hunk_core::{BackendKind, VirtualMemoryBackend, CACHE_LINE};

/// Allocates the full reservation eagerly with the global allocator.
///
/// Useful where virtual memory is unavailable or when running under
/// Miri. Commits are no-ops.
#[derive(Debug, Default)]
pub struct PlainHeapBackend {
    _private: (),
}

impl PlainHeapBackend {
    /// Create a backend with no reservation.
    pub fn new() -> Self {
        Self::default()
    }

    fn layout(size: usize) -> io::Result<Layout> {
        Layout::from_size_align(size, CACHE_LINE)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }
}

// SAFETY: alloc_zeroed hands back a unique, CACHE_LINE-aligned, zeroed
// block that stays valid until the matching dealloc in `release`.
unsafe impl VirtualMemoryBackend for PlainHeapBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::PlainHeap
    }

    fn reserve(&mut self, size: usize) -> io::Result<NonNull<u8>> {
        if size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "zero-sized heap reservation",
            ));
        }
        let layout = Self::layout(size)?;
        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(ptr).ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))
    }

    unsafe fn commit(&mut self, _base: NonNull<u8>, _len: usize) -> io::Result<()> {
        Ok(())
    }

    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) -> io::Result<()> {
        let layout = Self::layout(size)?;
        // SAFETY: the caller passes back the pointer and size from
        // `reserve`, so `layout` matches the original allocation.
        unsafe { alloc::dealloc(base.as_ptr(), layout) };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_is_aligned_and_zeroed() {
        let mut backend = PlainHeapBackend::new();
        let base = backend.reserve(256).unwrap();
        assert_eq!(base.as_ptr() as usize % CACHE_LINE, 0);
        // SAFETY: reserve returned 256 initialized bytes.
        let bytes = unsafe { std::slice::from_raw_parts(base.as_ptr(), 256) };
        assert!(bytes.iter().all(|&b| b == 0));
        // SAFETY: `bytes` is dead; base/size match the reservation.
        unsafe { backend.release(base, 256).unwrap() };
    }

    #[test]
    fn zero_size_reserve_is_an_error() {
        let mut backend = PlainHeapBackend::new();
        let err = backend.reserve(0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
