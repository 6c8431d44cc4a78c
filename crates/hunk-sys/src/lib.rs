//! Platform shim for the Hunk engine.
//!
//! Small wrappers that turn operating-system facilities into the
//! engine's conventions:
//!
//! - [`clock`]: a 32-bit millisecond clock and an accumulating
//!   performance timer.
//! - [`find`]: directory search by wildcard pattern with attribute
//!   filters, and single-level directory creation.
//! - [`ascii`]: NUL-terminated byte-string length and ASCII lowercasing.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ascii;
pub mod clock;
pub mod find;

pub use ascii::{cstr_len, lowercase_in_place, to_lower};
pub use clock::{milliseconds, Clock, PerfTimer};
pub use find::{make_dir, AttributeFilter, FileAttributes, Finder};
