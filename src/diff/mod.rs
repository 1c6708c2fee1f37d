//! Diff scanning and utilities.
//!
//! This module turns zero-context git diffs into marker entries
//! and provides helpers for working with raw diff content.

pub mod parser;
pub mod traits;

pub use parser::{classify, scan_diff, DiffLine, DiffScanner};
pub use traits::Utf8String;
