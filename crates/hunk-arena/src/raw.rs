//! Low-level primitives for arena memory operations.
//!
//! Thin wrappers over the platform's virtual-memory calls. Each function
//! converts the OS failure convention (null, `MAP_FAILED`, `-1`, `FALSE`)
//! into an [`io::Error`] carrying the last OS error code. Every `unsafe`
//! block has a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::io;
use std::ptr::NonNull;

fn non_null(ptr: *mut u8) -> io::Result<NonNull<u8>> {
    NonNull::new(ptr).ok_or_else(io::Error::last_os_error)
}

/// Advance `ptr` to the next multiple of `align`, a power of two.
///
/// # Safety
///
/// At least `align - 1` bytes of the same allocation must follow `ptr`.
#[cfg_attr(not(windows), allow(dead_code))]
unsafe fn align_up(ptr: NonNull<u8>, align: usize) -> NonNull<u8> {
    debug_assert!(align.is_power_of_two());
    let pad = ptr.as_ptr().addr().wrapping_neg() & (align - 1);
    // SAFETY: `pad < align`, and the caller guarantees that many bytes.
    unsafe { ptr.add(pad) }
}

#[cfg(unix)]
mod imp {
    use super::*;
    use libc::{c_void, MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_NONE, PROT_READ, PROT_WRITE};
    use std::ptr;

    fn map(size: usize, prot: libc::c_int) -> io::Result<NonNull<u8>> {
        // SAFETY: an anonymous private mapping with a null hint has no
        // preconditions beyond valid flag values.
        let ptr = unsafe { libc::mmap(ptr::null_mut(), size, prot, MAP_PRIVATE | MAP_ANONYMOUS, -1, 0) };
        if ptr == MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        non_null(ptr.cast())
    }

    pub(crate) fn reserve(size: usize) -> io::Result<NonNull<u8>> {
        map(size, PROT_NONE)
    }

    /// # Safety
    ///
    /// `[base, base + len)` must lie inside a mapping returned by [`reserve`].
    pub(crate) unsafe fn commit(base: NonNull<u8>, len: usize) -> io::Result<()> {
        // SAFETY: the caller guarantees the range is part of our mapping;
        // mprotect does not move or free anything.
        let rc = unsafe { libc::mprotect(base.as_ptr().cast::<c_void>(), len, PROT_READ | PROT_WRITE) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// # Safety
    ///
    /// `base` and `size` must describe a whole mapping from [`reserve`]
    /// or [`heap_reserve`] with no live references into it.
    pub(crate) unsafe fn release(base: NonNull<u8>, size: usize) -> io::Result<()> {
        // SAFETY: guaranteed by the caller.
        let rc = unsafe { libc::munmap(base.as_ptr().cast::<c_void>(), size) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Handle for an OS-managed block. Unix has nothing beyond the mapping.
    #[derive(Debug)]
    pub(crate) struct HeapBlock;

    pub(crate) fn heap_reserve(size: usize) -> io::Result<(NonNull<u8>, HeapBlock)> {
        // Readable and writable from the start; the kernel backs pages
        // on first touch, so there is nothing to commit.
        map(size, PROT_READ | PROT_WRITE).map(|ptr| (ptr, HeapBlock))
    }

    /// # Safety
    ///
    /// As for [`release`].
    pub(crate) unsafe fn heap_release(base: NonNull<u8>, size: usize, _block: HeapBlock) -> io::Result<()> {
        // SAFETY: guaranteed by the caller.
        unsafe { release(base, size) }
    }
}

#[cfg(windows)]
mod imp {
    use super::*;
    use hunk_core::CACHE_LINE;
    use std::ffi::c_void;
    use std::ptr;
    use windows_sys::Win32::Foundation::HANDLE;
    use windows_sys::Win32::System::Memory::{
        HeapAlloc, HeapCreate, HeapDestroy, VirtualAlloc, VirtualFree, HEAP_NO_SERIALIZE,
        HEAP_ZERO_MEMORY, MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_NOACCESS, PAGE_READWRITE,
    };

    pub(crate) fn reserve(size: usize) -> io::Result<NonNull<u8>> {
        // SAFETY: a null address asks the system to pick the range.
        let ptr = unsafe { VirtualAlloc(ptr::null(), size, MEM_RESERVE, PAGE_NOACCESS) };
        non_null(ptr.cast())
    }

    /// # Safety
    ///
    /// `[base, base + len)` must lie inside a reservation from [`reserve`].
    pub(crate) unsafe fn commit(base: NonNull<u8>, len: usize) -> io::Result<()> {
        // SAFETY: the caller guarantees the range is reserved by us.
        // Re-committing committed pages leaves their contents untouched.
        let ptr = unsafe { VirtualAlloc(base.as_ptr().cast::<c_void>(), len, MEM_COMMIT, PAGE_READWRITE) };
        non_null(ptr.cast()).map(|_| ())
    }

    /// # Safety
    ///
    /// `base` must be the start of a reservation from [`reserve`] with
    /// no live references into it.
    pub(crate) unsafe fn release(base: NonNull<u8>, _size: usize) -> io::Result<()> {
        // SAFETY: guaranteed by the caller. MEM_RELEASE requires size 0.
        let ok = unsafe { VirtualFree(base.as_ptr().cast::<c_void>(), 0, MEM_RELEASE) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// A private Win32 heap holding exactly one block.
    #[derive(Debug)]
    pub(crate) struct HeapBlock(HANDLE);

    pub(crate) fn heap_reserve(size: usize) -> io::Result<(NonNull<u8>, HeapBlock)> {
        // HeapAlloc only guarantees MEMORY_ALLOCATION_ALIGNMENT (16 on x64),
        // so the block is padded and the base moved to a cache line.
        let padded = size
            .checked_add(CACHE_LINE - 1)
            .ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))?;
        // SAFETY: a growable private heap (maximum size 0) has no preconditions.
        let heap = unsafe { HeapCreate(HEAP_NO_SERIALIZE, 0, 0) };
        if heap.is_null() {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `heap` was just created and is not shared.
        let ptr = unsafe { HeapAlloc(heap, HEAP_ZERO_MEMORY, padded) };
        match NonNull::new(ptr.cast::<u8>()) {
            // SAFETY: `padded` leaves CACHE_LINE - 1 bytes after `ptr`.
            Some(ptr) => Ok((unsafe { align_up(ptr, CACHE_LINE) }, HeapBlock(heap))),
            None => {
                // HeapAlloc does not set the last error.
                // SAFETY: nothing was allocated from `heap`.
                unsafe { HeapDestroy(heap) };
                Err(io::Error::from(io::ErrorKind::OutOfMemory))
            }
        }
    }

    /// # Safety
    ///
    /// `block` must own the heap `base` was allocated from, with no live
    /// references into it. `base` may sit inside the block; destroying the
    /// heap frees it regardless.
    pub(crate) unsafe fn heap_release(_base: NonNull<u8>, _size: usize, block: HeapBlock) -> io::Result<()> {
        // SAFETY: destroying the heap frees every block in it at once.
        let ok = unsafe { HeapDestroy(block.0) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

pub(crate) use imp::{commit, heap_release, heap_reserve, release, reserve, HeapBlock};

#[cfg(test)]
mod align_tests {
    use super::*;

    #[test]
    fn align_up_stays_within_padding() {
        let mut buf = [0u8; 96];
        let start = NonNull::from(&mut buf).cast::<u8>();
        for skew in 0..32 {
            // SAFETY: `skew < 32` leaves at least 64 bytes of `buf` after `p`.
            let p = unsafe { start.add(skew) };
            // SAFETY: as above, 31 bytes of padding are available.
            let aligned = unsafe { align_up(p, 32) };
            let pad = aligned.as_ptr().addr() - p.as_ptr().addr();
            assert_eq!(aligned.as_ptr().addr() % 32, 0, "skew {skew}");
            assert!(pad < 32, "skew {skew}");
        }
    }

    #[test]
    fn align_up_keeps_aligned_pointers() {
        let mut buf = [0u64; 8];
        let p = NonNull::from(&mut buf).cast::<u8>();
        // SAFETY: 63 bytes follow `p`.
        assert_eq!(unsafe { align_up(p, 8) }, p);
    }
}
