//! In-memory store implementation
//!
//! Keeps a flat map of path to node plus a journal of every call received.
//! The journal can be switched off for long runs; the call count is always
//! kept. Snapshots can be persisted to a JSON file with atomic writes.

use super::types::{LeafMetadata, StateValue, StoreCall, TreeStore};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A node held by the in-memory store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoredNode {
    /// Grouping node
    Channel { name: String },
    /// Value-holding node
    State {
        /// Metadata, absent if a value was written before any creation call
        #[serde(default, skip_serializing_if = "Option::is_none")]
        common: Option<LeafMetadata>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        val: Option<StateValue>,
        #[serde(default)]
        ack: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ts: Option<DateTime<Utc>>,
    },
}

impl StoredNode {
    /// Metadata of a state node
    pub fn metadata(&self) -> Option<&LeafMetadata> {
        match self {
            Self::State { common, .. } => common.as_ref(),
            Self::Channel { .. } => None,
        }
    }

    /// Current value of a state node
    pub fn value(&self) -> Option<&StateValue> {
        match self {
            Self::State { val, .. } => val.as_ref(),
            Self::Channel { .. } => None,
        }
    }

    /// Check if this node is a channel
    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Channel { .. })
    }
}

/// In-memory `TreeStore`
///
/// Clones share the same nodes and journal.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    nodes: Arc<RwLock<BTreeMap<String, StoredNode>>>,
    journal: Arc<RwLock<Vec<StoreCall>>>,
    call_count: Arc<AtomicUsize>,
    keep_journal: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            nodes: Arc::default(),
            journal: Arc::default(),
            call_count: Arc::default(),
            keep_journal: true,
        }
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep (default) or drop the per-call journal
    pub fn with_journal(mut self, keep: bool) -> Self {
        self.keep_journal = keep;
        self
    }

    /// Create a store from a snapshot file, empty if the file does not exist
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let location = path.display().to_string();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::store(&location, format!("Failed to read snapshot: {e}")))?;
        let nodes: BTreeMap<String, StoredNode> = serde_json::from_str(&contents)
            .map_err(|e| Error::store(&location, format!("Failed to parse snapshot: {e}")))?;

        Ok(Self {
            nodes: Arc::new(RwLock::new(nodes)),
            ..Self::default()
        })
    }

    /// Save a snapshot of all nodes to a file
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let location = path.display().to_string();
        let contents = self.to_json_pretty().await?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::store(&location, format!("Failed to write snapshot: {e}")))?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::store(&location, format!("Failed to rename snapshot: {e}")))?;

        Ok(())
    }

    /// Export all nodes as a JSON value
    pub async fn snapshot(&self) -> Result<JsonValue> {
        let nodes = self.nodes.read().await;
        Ok(serde_json::to_value(&*nodes)?)
    }

    /// Export all nodes as pretty-printed JSON
    pub async fn to_json_pretty(&self) -> Result<String> {
        let nodes = self.nodes.read().await;
        Ok(serde_json::to_string_pretty(&*nodes)?)
    }

    /// Get the node at `path`
    pub async fn get(&self, path: &str) -> Option<StoredNode> {
        self.nodes.read().await.get(path).cloned()
    }

    /// Get the current value at `path`
    pub async fn value(&self, path: &str) -> Option<StateValue> {
        self.nodes.read().await.get(path)?.value().cloned()
    }

    /// Get the leaf metadata at `path`
    pub async fn metadata(&self, path: &str) -> Option<LeafMetadata> {
        self.nodes.read().await.get(path)?.metadata().cloned()
    }

    /// All node paths, sorted
    pub async fn paths(&self) -> Vec<String> {
        self.nodes.read().await.keys().cloned().collect()
    }

    /// Number of nodes
    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    /// Check if the store holds no nodes
    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }

    /// Every call received so far, in arrival order
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.journal.read().await.clone()
    }

    /// Calls that addressed `path`
    pub async fn calls_for(&self, path: &str) -> Vec<StoreCall> {
        self.journal
            .read()
            .await
            .iter()
            .filter(|c| c.path() == path)
            .cloned()
            .collect()
    }

    /// Number of calls received, journaled or not
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Forget the call journal, keeping the nodes
    pub async fn clear_journal(&self) {
        self.journal.write().await.clear();
    }

    async fn record(&self, call: StoreCall) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if self.keep_journal {
            self.journal.write().await.push(call);
        }
    }
}

#[async_trait]
impl TreeStore for MemoryStore {
    async fn create_or_update_container(&self, path: &str, name: &str) -> Result<()> {
        self.record(StoreCall::Container {
            path: path.to_string(),
            name: name.to_string(),
        })
        .await;

        self.nodes.write().await.insert(
            path.to_string(),
            StoredNode::Channel {
                name: name.to_string(),
            },
        );
        Ok(())
    }

    async fn create_or_update_leaf(&self, path: &str, metadata: &LeafMetadata) -> Result<()> {
        self.record(StoreCall::Leaf {
            path: path.to_string(),
            metadata: metadata.clone(),
        })
        .await;

        let mut nodes = self.nodes.write().await;
        match nodes.get_mut(path) {
            Some(StoredNode::State { common, .. }) => *common = Some(metadata.clone()),
            _ => {
                nodes.insert(
                    path.to_string(),
                    StoredNode::State {
                        common: Some(metadata.clone()),
                        val: None,
                        ack: false,
                        ts: None,
                    },
                );
            }
        }
        Ok(())
    }

    async fn write_value(&self, path: &str, value: &StateValue, ack: bool) -> Result<()> {
        self.record(StoreCall::Write {
            path: path.to_string(),
            value: value.clone(),
            ack,
        })
        .await;

        let mut nodes = self.nodes.write().await;
        let node = nodes
            .entry(path.to_string())
            .or_insert_with(|| StoredNode::State {
                common: None,
                val: None,
                ack: false,
                ts: None,
            });
        match node {
            StoredNode::State {
                val, ack: acked, ts, ..
            } => {
                *val = Some(value.clone());
                *acked = ack;
                *ts = Some(Utc::now());
                Ok(())
            }
            StoredNode::Channel { .. } => {
                Err(Error::store(path, "cannot write a value to a channel"))
            }
        }
    }

    async fn delete_subtree(&self, path: &str) -> Result<()> {
        self.record(StoreCall::Delete {
            path: path.to_string(),
        })
        .await;

        let prefix = format!("{path}.");
        self.nodes
            .write()
            .await
            .retain(|p, _| p != path && !p.starts_with(&prefix));
        Ok(())
    }
}
