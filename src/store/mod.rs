//! Hierarchical store module
//!
//! The flattener's only output is a sequence of calls against a
//! path-addressed store of containers ("channels") and typed leaves
//! ("states").
//!
//! # Overview
//!
//! The store module provides:
//! - `TreeStore` - Async trait the flattener writes through
//! - `LeafMetadata` / `StateValue` - What a leaf declares and holds
//! - `MemoryStore` - In-memory store with a call journal and file snapshots

mod memory;
mod types;

pub use memory::{MemoryStore, StoredNode};
pub use types::{LeafMetadata, StateValue, StoreCall, TreeStore};
