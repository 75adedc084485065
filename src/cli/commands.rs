//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// JSON to hierarchical state flattener
#[derive(Parser, Debug)]
#[command(name = "json2states")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Parse options file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub options: Option<PathBuf>,

    /// Store snapshot file (JSON), loaded before and saved after the run
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten one JSON document
    Flatten {
        /// Root path for the document
        #[arg(short, long)]
        path: String,

        /// Input file, `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },

    /// Flatten JSON lines of the form {"path": "...", "payload": ...}
    Stream {
        /// Input file, `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Messages flattened at the same time
        #[arg(short, long, default_value = "4")]
        concurrency: usize,
    },

    /// Show the role inferred for a value
    Role {
        /// Value as JSON (plain text is taken as a string)
        value: String,

        /// Infer for a writable leaf
        #[arg(long)]
        write: bool,
    },

    /// Show the sanitized form of a path
    Sanitize {
        /// Path to sanitize
        path: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
