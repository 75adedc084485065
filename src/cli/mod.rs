//! CLI module
//!
//! Command-line interface for flattening JSON payloads.
//!
//! # Commands
//!
//! - `flatten` - Flatten one JSON document under a root path
//! - `stream` - Flatten a JSON lines stream of `{path, payload}` messages
//! - `role` - Show the role inferred for a value
//! - `sanitize` - Show a sanitized path

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
