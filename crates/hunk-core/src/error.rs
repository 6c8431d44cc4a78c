//! Error types for hunk operations.
//!
//! Every failure falls into one of two fatal classes inherited from the
//! engine's allocator (reservation and overflow), plus a usage class
//! for calls that break the hunk lifecycle. None of these carry a retry
//! path: once a hunk reports a `Reservation` or `Overflow` failure the
//! owner is expected to tear it down.

use std::error::Error;
use std::fmt;
use std::io;

/// Coarse classification of a [`HunkError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The backend could not reserve or commit memory.
    Reservation,
    /// A request would push the committed size past the reservation.
    Overflow,
    /// The caller broke the lifecycle or configuration contract.
    Usage,
}

/// Errors from hunk reservation, allocation and configuration.
#[derive(Debug)]
pub enum HunkError {
    /// `begin` was called with a maximum size of zero.
    ZeroReservation,
    /// The backend refused to reserve the address range.
    Reserve {
        /// Number of bytes requested.
        requested: usize,
        /// The underlying OS error.
        source: io::Error,
    },
    /// The backend refused to commit the range up to the new high-water mark.
    Commit {
        /// Length of the range `[base, base + len)` being committed.
        len: usize,
        /// The underlying OS error.
        source: io::Error,
    },
    /// Committing the request would exceed the reserved size.
    Overflow {
        /// Rounded size of the rejected request, or `usize::MAX` if
        /// rounding itself overflowed.
        requested: usize,
        /// Bytes committed before the request.
        committed: usize,
        /// Total reserved bytes.
        reserved: usize,
    },
    /// `alloc` was called after `end` finalized the hunk.
    Finalized {
        /// Bytes committed when the hunk was finalized.
        committed: usize,
    },
    /// A configuration value failed validation.
    InvalidConfig {
        /// Description of the validation failure.
        reason: String,
    },
}

impl HunkError {
    /// Which failure class this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Reserve { .. } | Self::Commit { .. } => FailureKind::Reservation,
            Self::Overflow { .. } => FailureKind::Overflow,
            Self::ZeroReservation | Self::Finalized { .. } | Self::InvalidConfig { .. } => {
                FailureKind::Usage
            }
        }
    }
}

impl fmt::Display for HunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroReservation => write!(f, "hunk reservation size must be non-zero"),
            Self::Reserve { requested, source } => {
                write!(f, "reserve of {requested} bytes failed: {source}")
            }
            Self::Commit { len, source } => {
                write!(f, "commit of {len} bytes failed: {source}")
            }
            Self::Overflow {
                requested,
                committed,
                reserved,
            } => {
                write!(
                    f,
                    "hunk overflow: requested {requested} bytes with {committed} of {reserved} committed"
                )
            }
            Self::Finalized { committed } => {
                write!(f, "hunk already finalized at {committed} bytes")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid hunk config: {reason}"),
        }
    }
}

impl Error for HunkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Reserve { source, .. } | Self::Commit { source, .. } => Some(source),
            _ => None,
        }
    }
}
