//! Test utilities and fake backends for Hunk development.
//!
//! Provides [`RecordingBackend`], an in-memory implementation of
//! [`VirtualMemoryBackend`] that logs every call and can be told to
//! fail, so allocator behaviour can be checked without touching the
//! operating system's memory manager.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::RefCell;
use std::io;
use std::ptr::NonNull;
use std::rc::Rc;

use hunk_core::{BackendKind, VirtualMemoryBackend, CACHE_LINE};
use smallvec::SmallVec;

/// One call made against a [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    Reserve { size: usize },
    Commit { len: usize },
    Release { size: usize },
}

/// Shared view of a [`RecordingBackend`]'s call history.
///
/// The backend is usually boxed and moved into a hunk; keep a `CallLog`
/// from [`RecordingBackend::log`] to inspect it afterwards.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    calls: Rc<RefCell<SmallVec<[BackendCall; 8]>>>,
}

impl CallLog {
    fn push(&self, call: BackendCall) {
        self.calls.borrow_mut().push(call);
    }

    /// Every call in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.borrow().to_vec()
    }

    /// The `len` of every successful commit, in order.
    pub fn commits(&self) -> Vec<usize> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                BackendCall::Commit { len } => Some(*len),
                _ => None,
            })
            .collect()
    }

    /// Whether a release has been logged.
    pub fn released(&self) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| matches!(c, BackendCall::Release { .. }))
    }
}

/// 32-byte aligned storage unit so the fake base matches real backends.
#[derive(Clone, Copy)]
#[repr(C, align(32))]
struct Line([u8; CACHE_LINE]);

/// In-memory backend that records calls and injects failures.
///
/// Reservations are backed by a zeroed heap buffer. The backend tracks
/// the committed length and panics if a caller commits past the
/// reservation or releases a range it does not own, turning allocator
/// bugs into test failures.
pub struct RecordingBackend {
    storage: Option<Box<[Line]>>,
    reserved: usize,
    committed: usize,
    log: CallLog,
    fail_reserve: bool,
    commits_before_failure: Option<usize>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            storage: None,
            reserved: 0,
            committed: 0,
            log: CallLog::default(),
            fail_reserve: false,
            commits_before_failure: None,
        }
    }

    /// A handle to this backend's call history.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Make [`reserve`](VirtualMemoryBackend::reserve) fail with `OutOfMemory`.
    pub fn fail_reserve(mut self) -> Self {
        self.fail_reserve = true;
        self
    }

    /// Let the first `n` commits succeed and fail every one after that.
    pub fn fail_commit_after(mut self, n: usize) -> Self {
        self.commits_before_failure = Some(n);
        self
    }

    /// Bytes committed so far.
    pub fn committed(&self) -> usize {
        self.committed
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecordingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingBackend")
            .field("reserved", &self.reserved)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}

// SAFETY: the buffer is zero-initialized, aligned to 32 bytes, owned by
// this backend until `release`, and never touched by the backend after
// `reserve`, so committed bytes keep whatever the hunk wrote.
#[allow(unsafe_code)]
unsafe impl VirtualMemoryBackend for RecordingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Custom
    }

    fn reserve(&mut self, size: usize) -> io::Result<NonNull<u8>> {
        assert!(self.storage.is_none(), "RecordingBackend reserved twice");
        if self.fail_reserve {
            return Err(io::Error::from(io::ErrorKind::OutOfMemory));
        }
        let lines = size.div_ceil(CACHE_LINE);
        let mut storage = vec![Line([0; CACHE_LINE]); lines].into_boxed_slice();
        let base = NonNull::new(storage.as_mut_ptr().cast::<u8>())
            .ok_or_else(|| io::Error::from(io::ErrorKind::OutOfMemory))?;
        self.storage = Some(storage);
        self.reserved = size;
        self.log.push(BackendCall::Reserve { size });
        Ok(base)
    }

    unsafe fn commit(&mut self, _base: NonNull<u8>, len: usize) -> io::Result<()> {
        assert!(
            len <= self.reserved,
            "commit of {len} bytes past reservation of {}",
            self.reserved
        );
        if let Some(remaining) = self.commits_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(io::Error::from(io::ErrorKind::OutOfMemory));
            }
            *remaining -= 1;
        }
        self.committed = self.committed.max(len);
        self.log.push(BackendCall::Commit { len });
        Ok(())
    }

    unsafe fn release(&mut self, _base: NonNull<u8>, size: usize) -> io::Result<()> {
        assert_eq!(size, self.reserved, "release size does not match reservation");
        assert!(self.storage.take().is_some(), "release without reservation");
        self.log.push(BackendCall::Release { size });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(unsafe_code)]
    fn records_calls_in_order() {
        let mut backend = RecordingBackend::new();
        let log = backend.log();
        let base = backend.reserve(100).unwrap();
        assert_eq!(base.as_ptr() as usize % CACHE_LINE, 0);
        // SAFETY: base/len come from the reservation above.
        unsafe {
            backend.commit(base, 32).unwrap();
            backend.commit(base, 64).unwrap();
            backend.release(base, 100).unwrap();
        }
        assert_eq!(
            log.calls(),
            vec![
                BackendCall::Reserve { size: 100 },
                BackendCall::Commit { len: 32 },
                BackendCall::Commit { len: 64 },
                BackendCall::Release { size: 100 },
            ]
        );
        assert_eq!(log.commits(), vec![32, 64]);
        assert!(log.released());
    }

    #[test]
    #[allow(unsafe_code)]
    fn fail_commit_after_n() {
        let mut backend = RecordingBackend::new().fail_commit_after(1);
        let base = backend.reserve(64).unwrap();
        // SAFETY: base/len come from the reservation above.
        unsafe {
            assert!(backend.commit(base, 32).is_ok());
            assert!(backend.commit(base, 64).is_err());
            backend.release(base, 64).unwrap();
        }
        assert_eq!(backend.log().commits(), vec![32]);
        assert_eq!(backend.committed(), 32);
    }

    #[test]
    fn fail_reserve_logs_nothing() {
        let mut backend = RecordingBackend::new().fail_reserve();
        assert!(backend.reserve(64).is_err());
        assert!(backend.log().calls().is_empty());
    }
}
