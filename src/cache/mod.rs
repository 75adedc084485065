//! Structural memo module
//!
//! Per-instance state that lets the flattener skip redundant structure
//! creation while still writing every value.
//!
//! # Overview
//!
//! The cache module provides:
//! - `ObjectCache` - Paths whose container/leaf metadata already exists
//! - `ConflictTracker` - Last runtime type per leaf path, with sticky `mixed`
//!
//! Both are flat key/value tables behind async locks. Concurrent parses of
//! the same path can at worst repeat an idempotent creation call.

mod conflict;
mod object_cache;

pub use conflict::{ConflictTracker, Resolution, TrackedType};
pub use object_cache::ObjectCache;
