//! Path module
//!
//! Store paths are dot-delimited sequences of segments. The `.` separator is
//! reserved and never appears inside a segment.
//!
//! # Overview
//!
//! The path module provides:
//! - `PathSanitizer` - Replaces characters the store cannot address with `_`
//! - Segment helpers for member keys and array-derived names

mod sanitizer;

pub use sanitizer::{
    join, last_segment, member_segment, strip_dots, PathSanitizer, DEFAULT_FORBIDDEN_CHARS,
};
