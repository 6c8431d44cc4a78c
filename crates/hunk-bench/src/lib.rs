//! Allocation profiles for benchmarking the Hunk allocator.
//!
//! - [`level_load_profile`]: the mix of sizes a level load produces
//!   (a few large lumps, many mid-sized surfaces, lots of small nodes).
//! - [`uniform_profile`]: `count` requests of one size.
//! - [`reservation_for`]: the exact reservation a profile needs.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use hunk_core::round_up_32;

/// Sizes a typical map load requests, in request order.
///
/// Deterministic: the same profile every call.
pub fn level_load_profile() -> Vec<usize> {
    let mut sizes = Vec::with_capacity(1 + 64 + 2048 + 4096);
    // Vertex and lightmap lumps.
    sizes.push(2 * 1024 * 1024);
    // Textured surfaces: sizes cycle through a handful of face counts.
    sizes.extend((0..64).map(|i| 4096 + (i % 7) * 1500));
    // BSP nodes and leaves: small, odd sizes that exercise rounding.
    sizes.extend((0..2048).map(|i| 28 + (i % 5) * 12));
    // Edge and vertex-index arrays.
    sizes.extend((0..4096).map(|i| 8 + (i % 3) * 4));
    sizes
}

/// `count` requests of `size` bytes each.
pub fn uniform_profile(count: usize, size: usize) -> Vec<usize> {
    vec![size; count]
}

/// Smallest reservation that fits every request in `sizes` after
/// 32-byte rounding.
///
/// # Panics
///
/// Panics if the total does not fit in a `usize`.
pub fn reservation_for(sizes: &[usize]) -> usize {
    sizes
        .iter()
        .map(|&s| round_up_32(s).expect("profile size overflows usize"))
        .sum()
}
