//! Allocation handles.
//!
//! An [`Allocation`] is the "pointer-like offset" a hunk hands out. It
//! records which hunk it came from so it cannot be resolved against any
//! other hunk, and it stays meaningful for as long as that hunk lives.

use std::fmt;

use hunk_core::HunkId;

/// Location of one allocation inside a hunk.
///
/// Offsets are measured from the hunk's base. `len` is the rounded size
/// actually committed, which may exceed the size that was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Allocation {
    pub(crate) hunk: HunkId,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl Allocation {
    pub(crate) fn new(hunk: HunkId, offset: usize, len: usize) -> Self {
        Self { hunk, offset, len }
    }

    /// The hunk this allocation was carved from.
    pub fn hunk(&self) -> HunkId {
        self.hunk
    }

    /// Byte offset from the hunk's base.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Rounded length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte, i.e. the next allocation's offset.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{}]", self.hunk, self.offset, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let id = HunkId::next();
        let a = Allocation::new(id, 32, 64);
        assert_eq!(a.hunk(), id);
        assert_eq!(a.offset(), 32);
        assert_eq!(a.len(), 64);
        assert_eq!(a.end(), 96);
        assert!(!a.is_empty());
    }

    #[test]
    fn empty_allocation() {
        let a = Allocation::new(HunkId::next(), 128, 0);
        assert!(a.is_empty());
        assert_eq!(a.end(), 128);
    }

    #[test]
    fn display_shows_range() {
        let id = HunkId::next();
        let a = Allocation::new(id, 0, 32);
        assert_eq!(a.to_string(), format!("{id}[0..32]"));
    }
}
