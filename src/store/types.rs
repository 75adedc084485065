//! Store types and traits

use crate::error::Result;
use crate::types::{CommonType, JsonValue, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Metadata declared for a leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafMetadata {
    /// Display name
    pub name: String,
    /// Inferred display role
    pub role: Role,
    /// Declared value type
    #[serde(rename = "type")]
    pub common_type: CommonType,
    /// Readable flag
    pub read: bool,
    /// Writable flag
    pub write: bool,
    /// Optional unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Optional enumerated value to label map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<BTreeMap<String, String>>,
}

/// Value written to a leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Text(String),
    Number(serde_json::Number),
    Boolean(bool),
}

impl StateValue {
    /// Convert a scalar JSON value, `None` for null/array/object
    pub fn from_scalar(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) => Some(Self::Text(s.clone())),
            JsonValue::Number(n) => Some(Self::Number(n.clone())),
            JsonValue::Bool(b) => Some(Self::Boolean(*b)),
            _ => None,
        }
    }

    /// Pre-stringify a JSON document for a raw snapshot leaf
    pub fn json_snapshot(value: &JsonValue) -> Result<Self> {
        Ok(Self::Text(serde_json::to_string(value)?))
    }

    /// Convert back to a JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Number(n) => JsonValue::Number(n.clone()),
            Self::Boolean(b) => JsonValue::Bool(*b),
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// One operation issued against a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreCall {
    Container { path: String, name: String },
    Leaf { path: String, metadata: LeafMetadata },
    Write { path: String, value: StateValue, ack: bool },
    Delete { path: String },
}

impl StoreCall {
    /// Path the call addressed
    pub fn path(&self) -> &str {
        match self {
            Self::Container { path, .. }
            | Self::Leaf { path, .. }
            | Self::Write { path, .. }
            | Self::Delete { path } => path,
        }
    }

    /// Whether the call created or updated structure
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Container { .. } | Self::Leaf { .. })
    }
}

/// Path-addressed hierarchical store of containers and leaves
///
/// Every operation is independent: no cross-call atomicity is assumed, and
/// creation calls must be idempotent.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Create a container or update its display name
    async fn create_or_update_container(&self, path: &str, name: &str) -> Result<()>;

    /// Create a leaf or replace its metadata
    async fn create_or_update_leaf(&self, path: &str, metadata: &LeafMetadata) -> Result<()>;

    /// Write a leaf value
    async fn write_value(&self, path: &str, value: &StateValue, ack: bool) -> Result<()>;

    /// Delete a node and everything below it
    async fn delete_subtree(&self, path: &str) -> Result<()>;
}

#[async_trait]
impl<T: TreeStore + ?Sized> TreeStore for Arc<T> {
    async fn create_or_update_container(&self, path: &str, name: &str) -> Result<()> {
        self.as_ref().create_or_update_container(path, name).await
    }

    async fn create_or_update_leaf(&self, path: &str, metadata: &LeafMetadata) -> Result<()> {
        self.as_ref().create_or_update_leaf(path, metadata).await
    }

    async fn write_value(&self, path: &str, value: &StateValue, ack: bool) -> Result<()> {
        self.as_ref().write_value(path, value, ack).await
    }

    async fn delete_subtree(&self, path: &str) -> Result<()> {
        self.as_ref().delete_subtree(path).await
    }
}

#[async_trait]
impl<T: TreeStore + ?Sized> TreeStore for Box<T> {
    async fn create_or_update_container(&self, path: &str, name: &str) -> Result<()> {
        self.as_ref().create_or_update_container(path, name).await
    }

    async fn create_or_update_leaf(&self, path: &str, metadata: &LeafMetadata) -> Result<()> {
        self.as_ref().create_or_update_leaf(path, metadata).await
    }

    async fn write_value(&self, path: &str, value: &StateValue, ack: bool) -> Result<()> {
        self.as_ref().write_value(path, value, ack).await
    }

    async fn delete_subtree(&self, path: &str) -> Result<()> {
        self.as_ref().delete_subtree(path).await
    }
}
