//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ParseOptions;
use crate::decode::probe_json;
use crate::error::{Error, Result, ResultExt};
use crate::flatten::Flattener;
use crate::path::PathSanitizer;
use crate::role::infer_role;
use crate::store::MemoryStore;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::io::Read;
use std::time::Instant;
use tracing::info;

/// One line of a `stream` input
#[derive(Debug, Deserialize)]
struct StreamMessage {
    path: String,
    #[serde(default)]
    payload: Value,
}

impl StreamMessage {
    /// Path and payload, with JSON held in a string payload decoded
    fn into_parts(self) -> (String, Value) {
        let payload = match self.payload {
            Value::String(text) => probe_json(&text).unwrap_or(Value::String(text)),
            other => other,
        };
        (self.path, payload)
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Flatten { path, input } => self.flatten(path, input).await,
            Commands::Stream { input, concurrency } => self.stream(input, *concurrency).await,
            Commands::Role { value, write } => self.role(value, *write),
            Commands::Sanitize { path } => self.sanitize(path),
        }
    }

    /// Load parse options
    fn load_options(&self) -> Result<ParseOptions> {
        match &self.cli.options {
            Some(path) => ParseOptions::from_file(path)
                .with_context(|| format!("Failed to load options from {}", path.display())),
            None => Ok(ParseOptions::default()),
        }
    }

    /// Load the store snapshot, or start empty
    async fn load_store(&self) -> Result<MemoryStore> {
        match &self.cli.store {
            Some(path) => MemoryStore::from_file(path)
                .await
                .with_context(|| format!("Failed to load store from {}", path.display())),
            None => Ok(MemoryStore::new()),
        }
    }

    /// Persist the store if a snapshot file was given
    async fn save_store(&self, store: &MemoryStore) -> Result<()> {
        if let Some(path) = &self.cli.store {
            store.save_to_file(path).await?;
        }
        Ok(())
    }

    /// Read a file, or stdin for `-`
    fn read_input(input: &str) -> Result<String> {
        if input == "-" {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            return Ok(buffer);
        }
        fs::read_to_string(input).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: input.to_string(),
                }
            } else {
                Error::Io(e)
            }
        })
    }

    /// Flatten one document
    async fn flatten(&self, path: &str, input: &str) -> Result<()> {
        let text = Self::read_input(input)?;
        let element: Value = serde_json::from_str(&text)
            .map_err(|e| Error::config(format!("Invalid input JSON: {e}")))?;
        let mut options = self.load_options()?;
        let store = self.load_store().await?;

        let flattener = Flattener::new(store.clone());
        flattener.parse(path, element, &mut options).await;
        self.save_store(&store).await?;

        self.output_message(&json!({
            "path": path,
            "calls": store.calls().await,
            "nodes": store.snapshot().await?,
        }));
        Ok(())
    }

    /// Flatten a JSON lines stream through one shared engine
    async fn stream(&self, input: &str, concurrency: usize) -> Result<()> {
        let text = Self::read_input(input)?;
        let messages = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<StreamMessage>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::config(format!("Invalid stream message: {e}")))?;
        let options = self.load_options()?;
        let store = self.load_store().await?.with_journal(false);

        let flattener = Flattener::new(store.clone());
        let start = Instant::now();
        let count = messages.len();

        stream::iter(messages)
            .map(|message| {
                let flattener = &flattener;
                let mut options = options.clone();
                async move {
                    let (path, payload) = message.into_parts();
                    flattener.parse(&path, payload, &mut options).await;
                }
            })
            .buffer_unordered(concurrency.max(1))
            .collect::<Vec<()>>()
            .await;

        info!(
            "Flattened {} messages in {}ms",
            count,
            start.elapsed().as_millis()
        );
        self.save_store(&store).await?;

        self.output_message(&json!({
            "messages": count,
            "calls": store.call_count(),
            "nodes": store.len().await,
            "created": flattener.created_count().await,
        }));
        Ok(())
    }

    /// Show the inferred role
    fn role(&self, value: &str, write: bool) -> Result<()> {
        let parsed = probe_json(value).unwrap_or_else(|| Value::String(value.to_string()));
        let role = infer_role(&parsed, write);
        self.output_message(&json!({
            "value": parsed,
            "write": write,
            "role": role,
        }));
        Ok(())
    }

    /// Show the sanitized path
    fn sanitize(&self, path: &str) -> Result<()> {
        let sanitized = PathSanitizer::new().sanitize(path);
        self.output_message(&json!({
            "path": path,
            "sanitized": sanitized,
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
