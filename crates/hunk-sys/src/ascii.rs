//! Byte-string primitives used on hot path-handling code.
//!
//! Engine strings are NUL-terminated byte buffers. These helpers treat
//! the first NUL (or the end of the slice) as the end of the string.

const WORD: usize = std::mem::size_of::<usize>();
const LO: usize = usize::from_ne_bytes([0x01; WORD]);
const HI: usize = usize::from_ne_bytes([0x80; WORD]);

/// Whether any byte of `word` is zero.
#[inline]
fn has_zero_byte(word: usize) -> bool {
    word.wrapping_sub(LO) & !word & HI != 0
}

/// Length of the NUL-terminated string at the start of `s`.
///
/// Returns the index of the first zero byte, or `s.len()` if there is
/// none. Scans a machine word at a time and falls back to bytes only
/// for the word that contains the terminator and for the tail. Bytes
/// above 0x7F are handled exactly.
pub fn cstr_len(s: &[u8]) -> usize {
    let mut chunks = s.chunks_exact(WORD);
    let mut scanned = 0;
    for chunk in &mut chunks {
        let mut buf = [0u8; WORD];
        buf.copy_from_slice(chunk);
        if has_zero_byte(usize::from_ne_bytes(buf)) {
            break;
        }
        scanned += WORD;
    }
    s[scanned..]
        .iter()
        .position(|&b| b == 0)
        .map_or(s.len(), |i| scanned + i)
}

/// Lowercase an ASCII letter; every other byte is returned unchanged.
#[inline]
pub fn to_lower(c: u8) -> u8 {
    if c.is_ascii_uppercase() {
        c | 0x20
    } else {
        c
    }
}

/// Lowercase `A`–`Z` in place up to the first NUL.
///
/// Only bytes that change are written.
pub fn lowercase_in_place(s: &mut [u8]) {
    for b in s.iter_mut() {
        match *b {
            0 => break,
            b'A'..=b'Z' => *b |= 0x20,
            _ => {}
        }
    }
}
