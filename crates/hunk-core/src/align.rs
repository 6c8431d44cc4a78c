//! Size rounding for hunk allocations.

/// Default allocation granularity in bytes.
///
/// Every request is rounded up to a multiple of this, so consecutive
/// allocations never share a cache line.
pub const CACHE_LINE: usize = 32;

/// Round `size` up to the next multiple of `align`.
///
/// Returns `None` if the rounded value would not fit in a `usize`.
///
/// # Panics
///
/// Panics in debug builds if `align` is not a power of two.
#[inline]
pub fn round_up(size: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two(), "alignment {align} is not a power of two");
    let mask = align - 1;
    size.checked_add(mask).map(|v| v & !mask)
}

/// Round `size` up to a multiple of [`CACHE_LINE`].
#[inline]
pub fn round_up_32(size: usize) -> Option<usize> {
    round_up(size, CACHE_LINE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cache_line() {
        assert_eq!(round_up_32(0), Some(0));
        assert_eq!(round_up_32(1), Some(32));
        assert_eq!(round_up_32(10), Some(32));
        assert_eq!(round_up_32(32), Some(32));
        assert_eq!(round_up_32(33), Some(64));
        assert_eq!(round_up_32(100), Some(128));
    }

    #[test]
    fn other_alignments() {
        assert_eq!(round_up(5, 1), Some(5));
        assert_eq!(round_up(5, 8), Some(8));
        assert_eq!(round_up(4097, 4096), Some(8192));
    }

    #[test]
    fn overflow_is_none() {
        assert_eq!(round_up_32(usize::MAX), None);
        assert_eq!(round_up_32(usize::MAX - 30), None);
    }

    #[test]
    fn largest_representable_multiple() {
        let top = usize::MAX & !31;
        assert_eq!(round_up_32(top), Some(top));
        assert_eq!(round_up_32(top - 31), Some(top));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn round_up_32_is_idempotent(size in 0usize..(usize::MAX / 2)) {
                let once = round_up_32(size).unwrap();
                prop_assert_eq!(round_up_32(once), Some(once));
            }

            #[test]
            fn round_up_is_smallest_multiple_not_below(
                size in 0usize..(1 << 40),
                shift in 0u32..13,
            ) {
                let align = 1usize << shift;
                let rounded = round_up(size, align).unwrap();
                prop_assert!(rounded >= size);
                prop_assert_eq!(rounded % align, 0);
                prop_assert!(rounded - size < align);
            }
        }
    }
}
