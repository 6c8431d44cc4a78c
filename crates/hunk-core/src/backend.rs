//! The virtual-memory capability a hunk is built on.
//!
//! A hunk never talks to the operating system directly. It asks a
//! [`VirtualMemoryBackend`] to reserve an address range once, to commit
//! a growing prefix of that range as allocations arrive, and to release
//! the whole range when the hunk goes away. The backend is chosen when
//! the hunk is constructed, which lets tests substitute an in-memory
//! fake for the real OS calls.

use std::fmt;
use std::io;
use std::ptr::NonNull;

/// Which backing store a hunk draws its memory from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Reserve address space up front and commit pages on demand.
    #[default]
    ReserveCommit,
    /// Let the operating system's heap or lazily-backed mapping supply
    /// the whole range; commits are free.
    OsHeap,
    /// A single zeroed block from the Rust global allocator.
    PlainHeap,
    /// A test or custom backend outside this workspace.
    Custom,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReserveCommit => "reserve-commit",
            Self::OsHeap => "os-heap",
            Self::PlainHeap => "plain-heap",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Reserve, commit and release a contiguous address range.
///
/// # Safety
///
/// Implementors promise that:
///
/// - [`reserve`](Self::reserve) returns a pointer to `size` bytes of
///   address space, aligned to at least 32 bytes, that nothing else
///   uses until it is passed to [`release`](Self::release).
/// - after [`commit`](Self::commit) returns `Ok(())` for `len` bytes,
///   the range `[base, base + len)` is readable, writable and
///   initialized, and every byte not yet written through the hunk is
///   zero. Committing an already-committed prefix again must not
///   modify its contents.
///
/// The hunk relies on these guarantees to hand out `&mut [u8]` views
/// of committed memory without further checks.
#[allow(unsafe_code)]
pub unsafe trait VirtualMemoryBackend: fmt::Debug {
    /// The kind of backing store, for diagnostics.
    fn kind(&self) -> BackendKind;

    /// Reserve `size` bytes of address space without committing it.
    fn reserve(&mut self, size: usize) -> io::Result<NonNull<u8>>;

    /// Commit the first `len` bytes of a reservation.
    ///
    /// Called with the full range from the base to the new high-water
    /// mark on every allocation, so `len` grows monotonically.
    ///
    /// # Safety
    ///
    /// `base` must have been returned by [`reserve`](Self::reserve) on
    /// this backend with a `size` of at least `len`, and must not have
    /// been released.
    unsafe fn commit(&mut self, base: NonNull<u8>, len: usize) -> io::Result<()>;

    /// Release a whole reservation, committed or not.
    ///
    /// # Safety
    ///
    /// `base` and `size` must match a prior [`reserve`](Self::reserve)
    /// call on this backend, and no reference into the range may
    /// outlive this call.
    unsafe fn release(&mut self, base: NonNull<u8>, size: usize) -> io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kind_reserves_then_commits() {
        assert_eq!(BackendKind::default(), BackendKind::ReserveCommit);
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(BackendKind::ReserveCommit.to_string(), "reserve-commit");
        assert_eq!(BackendKind::OsHeap.to_string(), "os-heap");
        assert_eq!(BackendKind::PlainHeap.to_string(), "plain-heap");
        assert_eq!(BackendKind::Custom.to_string(), "custom");
    }
}
