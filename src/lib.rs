// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # json2states
//!
//! Maps schema-less nested JSON onto a path-addressed tree of containers
//! ("channels") and typed leaves ("states").
//!
//! ## Features
//!
//! - **Stable array naming**: ordered heuristics pick human-readable child
//!   names, with positional numbering as fallback or override
//! - **Schema-less metadata**: declared type, role and writability are
//!   inferred per leaf
//! - **Create once, write always**: structure is memoized per path while
//!   values are written on every update
//! - **Type drift**: a leaf that changes runtime type is declared `mixed`
//!   for good
//! - **Payload sniffing**: base64 and embedded JSON strings are decoded
//!   and traversed
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use json2states::{Flattener, MemoryStore, ParseOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     let flattener = Flattener::new(store.clone());
//!
//!     let mut options = ParseOptions::new().with_channel_name("Front camera");
//!     let payload = serde_json::json!({"fps": 5, "detect": {"enabled": true}});
//!     flattener.parse("cameras.front", payload, &mut options).await;
//!
//!     assert!(store.value("cameras.front.detect.enabled").await.is_some());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Flattener                              │
//! │   parse(path, value, options) → container / leaf / value calls  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Path   │  Decode   │    Array      │   Cache   │   Store     │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Sanitize │ Base64    │ Naming rules  │ Objects   │ TreeStore   │
//! │ Join     │ autoCast  │ Flat pairs    │ Types     │ MemoryStore │
//! │          │           │ Index names   │           │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Parse options and engine settings
pub mod config;

/// Path sanitizing and joining
pub mod path;

/// Role inference
pub mod role;

/// Base64 and embedded JSON decoding
pub mod decode;

/// Object cache and type conflict tracking
pub mod cache;

/// Store abstraction and in-memory store
pub mod store;

/// Array element naming
pub mod array;

/// Recursive flattening engine
pub mod flatten;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{FlattenerConfig, ParseOptions};
pub use flatten::Flattener;
pub use store::{LeafMetadata, MemoryStore, StateValue, TreeStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
