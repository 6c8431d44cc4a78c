//! The hunk: a reserved range carved up by a bump pointer.
//!
//! A [`Hunk`] reserves `max_size` bytes once, then every [`alloc`]
//! rounds the request up to the configured granularity, commits the
//! range from the base to the new high-water mark, and returns the old
//! high-water mark as the allocation's offset. Nothing is ever freed
//! individually. [`end`] finalizes the hunk and reports its size;
//! [`free`] (or dropping the hunk) releases the whole reservation.
//!
//! Overflow is checked before the backend is asked to commit anything,
//! so a rejected request leaves the hunk exactly as it was.
//!
//! [`alloc`]: Hunk::alloc
//! [`end`]: Hunk::end
//! [`free`]: Hunk::free

#![allow(unsafe_code)]

use std::fmt;
use std::ptr::NonNull;
use std::slice;

use hunk_core::{round_up, BackendKind, HunkError, HunkId, VirtualMemoryBackend};

use crate::backend;
use crate::config::HunkConfig;
use crate::handle::Allocation;
use crate::ledger::HunkLedger;

/// Where a hunk is in its lifecycle.
///
/// There is no `Released` state: a released hunk no longer exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HunkState {
    /// Address space reserved, nothing allocated yet.
    Reserved,
    /// At least one allocation has been made.
    Committing,
    /// [`Hunk::end`] has been called; no further allocation is accepted.
    Finalized,
}

/// A contiguous reserved range with sequential, never-freed allocations.
///
/// A hunk owns its reservation exclusively and is confined to the thread
/// that created it (it is neither `Send` nor `Sync`). Independent hunks
/// share nothing except, optionally, a [`HunkLedger`].
pub struct Hunk {
    id: HunkId,
    backend: Box<dyn VirtualMemoryBackend>,
    /// Start of the reservation. Valid until `Drop`.
    base: NonNull<u8>,
    reserved: usize,
    /// High-water mark: bytes handed out so far, and the next offset.
    committed: usize,
    alignment: usize,
    state: HunkState,
    ledger: Option<HunkLedger>,
}

impl Hunk {
    /// Reserve `max_size` bytes from the backend named in `config`.
    ///
    /// Nothing is committed yet. Fails with
    /// [`HunkError::ZeroReservation`] if `max_size` is zero and with
    /// [`HunkError::Reserve`] if the backend refuses the reservation.
    pub fn begin(max_size: usize, config: &HunkConfig) -> Result<Self, HunkError> {
        config.validate()?;
        let backend = backend::for_kind(config.backend)?;
        Self::with_backend(backend, max_size, config)
    }

    /// Reserve `max_size` bytes from an explicitly supplied backend.
    ///
    /// `config.backend` is ignored; the alignment and ledger still apply.
    pub fn with_backend(
        mut backend: Box<dyn VirtualMemoryBackend>,
        max_size: usize,
        config: &HunkConfig,
    ) -> Result<Self, HunkError> {
        config.validate()?;
        if max_size == 0 {
            return Err(HunkError::ZeroReservation);
        }
        let base = backend
            .reserve(max_size)
            .map_err(|source| HunkError::Reserve {
                requested: max_size,
                source,
            })?;
        let id = HunkId::next();
        tracing::debug!(
            hunk = %id,
            backend = %backend.kind(),
            reserved = max_size,
            "hunk reserved"
        );
        Ok(Self {
            id,
            backend,
            base,
            reserved: max_size,
            committed: 0,
            alignment: config.alignment,
            state: HunkState::Reserved,
            ledger: config.ledger.clone(),
        })
    }

    /// Carve `size` bytes (rounded up to the alignment) off the end of
    /// the committed region.
    ///
    /// The returned allocation starts at the previous high-water mark,
    /// so consecutive allocations are adjacent and never overlap. The
    /// memory is zeroed. A zero-byte request returns an empty allocation
    /// at the current high-water mark without touching the backend.
    ///
    /// # Errors
    ///
    /// - [`HunkError::Finalized`] after [`end`](Self::end).
    /// - [`HunkError::Overflow`] if the rounded request does not fit in
    ///   the reservation. Nothing is committed in that case.
    /// - [`HunkError::Commit`] if the backend fails to commit. The
    ///   high-water mark is left unchanged.
    pub fn alloc(&mut self, size: usize) -> Result<Allocation, HunkError> {
        if self.state == HunkState::Finalized {
            return Err(HunkError::Finalized {
                committed: self.committed,
            });
        }

        let overflow = |requested| HunkError::Overflow {
            requested,
            committed: self.committed,
            reserved: self.reserved,
        };
        let rounded = round_up(size, self.alignment).ok_or_else(|| overflow(usize::MAX))?;
        let high_water = match self.committed.checked_add(rounded) {
            Some(end) if end <= self.reserved => end,
            _ => {
                tracing::warn!(
                    hunk = %self.id,
                    requested = rounded,
                    committed = self.committed,
                    reserved = self.reserved,
                    "hunk overflow"
                );
                return Err(overflow(rounded));
            }
        };

        if rounded > 0 {
            // SAFETY: `base` came from `reserve(self.reserved)` on this
            // backend, has not been released, and `high_water <= reserved`.
            unsafe { self.backend.commit(self.base, high_water) }.map_err(|source| {
                HunkError::Commit {
                    len: high_water,
                    source,
                }
            })?;
        }

        let offset = self.committed;
        self.committed = high_water;
        self.state = HunkState::Committing;
        tracing::trace!(hunk = %self.id, offset, len = rounded, "hunk alloc");
        Ok(Allocation::new(self.id, offset, rounded))
    }

    /// Finalize the hunk and return the total committed bytes.
    ///
    /// The memory stays live and readable; only further allocation is
    /// refused. The hunk is entered into its ledger, if any. Calling
    /// `end` again returns the same total.
    pub fn end(&mut self) -> usize {
        if self.state != HunkState::Finalized {
            self.state = HunkState::Finalized;
            if let Some(ledger) = &self.ledger {
                ledger.record(self.id, self.committed);
            }
            tracing::debug!(hunk = %self.id, committed = self.committed, "hunk finalized");
        }
        self.committed
    }

    /// Release the whole reservation back to the backend.
    ///
    /// Equivalent to dropping the hunk. Consuming `self` makes a second
    /// release of the same hunk impossible.
    pub fn free(self) {
        drop(self);
    }

    /// Release the hunk held in `slot`, if any, and clear the slot.
    ///
    /// An empty slot is a no-op, so calling this twice on the same slot
    /// releases once.
    pub fn free_slot(slot: &mut Option<Hunk>) {
        if let Some(hunk) = slot.take() {
            hunk.free();
        }
    }

    /// This hunk's identifier.
    pub fn id(&self) -> HunkId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HunkState {
        self.state
    }

    /// Which backend the reservation came from.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Total reserved bytes. Fixed at creation.
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// Bytes committed so far (the high-water mark).
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Bytes still available for allocation.
    pub fn remaining(&self) -> usize {
        self.reserved - self.committed
    }

    /// Start of the reservation.
    ///
    /// Only the first [`committed`](Self::committed) bytes are accessible.
    pub fn base_ptr(&self) -> NonNull<u8> {
        self.base
    }

    fn owns(&self, alloc: &Allocation) -> bool {
        alloc.hunk == self.id && alloc.end() <= self.committed
    }

    /// Raw pointer to the start of `alloc`, or `None` if it belongs to a
    /// different hunk.
    pub fn as_ptr(&self, alloc: &Allocation) -> Option<NonNull<u8>> {
        if !self.owns(alloc) {
            return None;
        }
        // SAFETY: `alloc.offset <= committed <= reserved`, so the result
        // stays within (or one past) the reservation.
        Some(unsafe { self.base.add(alloc.offset) })
    }

    /// Shared view of `alloc`'s bytes.
    pub fn get(&self, alloc: &Allocation) -> Option<&[u8]> {
        let ptr = self.as_ptr(alloc)?;
        // SAFETY: the range is inside the committed prefix, which the
        // backend contract keeps readable and initialized; `&self` rules
        // out a live mutable view.
        Some(unsafe { slice::from_raw_parts(ptr.as_ptr(), alloc.len) })
    }

    /// Mutable view of `alloc`'s bytes.
    pub fn get_mut(&mut self, alloc: &Allocation) -> Option<&mut [u8]> {
        let ptr = self.as_ptr(alloc)?;
        // SAFETY: as in `get`, and `&mut self` makes this the only view.
        Some(unsafe { slice::from_raw_parts_mut(ptr.as_ptr(), alloc.len) })
    }

    /// The whole committed prefix.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `[base, base + committed)` is committed and initialized.
        unsafe { slice::from_raw_parts(self.base.as_ptr(), self.committed) }
    }

    /// The whole committed prefix, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_slice`, with exclusive access through `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.base.as_ptr(), self.committed) }
    }
}

impl Drop for Hunk {
    fn drop(&mut self) {
        if let Some(ledger) = &self.ledger {
            ledger.remove(self.id);
        }
        // SAFETY: `base`/`reserved` are exactly what `reserve` returned and
        // took; `&mut self` guarantees no outstanding views into the range.
        let released = unsafe { self.backend.release(self.base, self.reserved) };
        match released {
            Ok(()) => tracing::debug!(hunk = %self.id, reserved = self.reserved, "hunk released"),
            Err(err) => tracing::error!(
                hunk = %self.id,
                reserved = self.reserved,
                error = %err,
                "hunk release failed"
            ),
        }
    }
}

impl fmt::Debug for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hunk")
            .field("id", &self.id)
            .field("backend", &self.backend.kind())
            .field("reserved", &self.reserved)
            .field("committed", &self.committed)
            .field("state", &self.state)
            .finish()
    }
}
