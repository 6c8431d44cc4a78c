//! Hunk configuration parameters.

use hunk_core::{BackendKind, HunkError, CACHE_LINE};

use crate::ledger::HunkLedger;

/// Configuration for constructing a [`Hunk`](crate::Hunk).
///
/// Validated by [`Hunk::begin`](crate::Hunk::begin); immutable for the
/// hunk's lifetime once it is created.
#[derive(Clone, Debug)]
pub struct HunkConfig {
    /// Which backing store to reserve from.
    ///
    /// Default: [`BackendKind::ReserveCommit`].
    pub backend: BackendKind,

    /// Granularity every allocation size is rounded up to, in bytes.
    ///
    /// Default: 32. Must be a power of two no larger than
    /// [`MAX_ALIGNMENT`](Self::MAX_ALIGNMENT). This rounds sizes only;
    /// the base address is aligned to at least 32 bytes by every backend.
    pub alignment: usize,

    /// Ledger that records the hunk once it is finalized.
    ///
    /// Default: `None` (untracked).
    pub ledger: Option<HunkLedger>,
}

impl HunkConfig {
    /// Default allocation granularity.
    pub const DEFAULT_ALIGNMENT: usize = CACHE_LINE;

    /// Largest accepted allocation granularity (one small page).
    pub const MAX_ALIGNMENT: usize = 4096;

    /// Create a config for the given backend with default values for
    /// everything else.
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            alignment: Self::DEFAULT_ALIGNMENT,
            ledger: None,
        }
    }

    /// Set the allocation granularity.
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Track hunks built from this config in `ledger`.
    pub fn with_ledger(mut self, ledger: HunkLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), HunkError> {
        if !self.alignment.is_power_of_two() {
            return Err(HunkError::InvalidConfig {
                reason: format!("alignment {} is not a power of two", self.alignment),
            });
        }
        if self.alignment > Self::MAX_ALIGNMENT {
            return Err(HunkError::InvalidConfig {
                reason: format!(
                    "alignment {} exceeds maximum {}",
                    self.alignment,
                    Self::MAX_ALIGNMENT
                ),
            });
        }
        Ok(())
    }
}

impl Default for HunkConfig {
    fn default() -> Self {
        Self::new(BackendKind::default())
    }
}
