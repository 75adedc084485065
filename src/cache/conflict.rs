//! Type conflict tracking

use crate::types::CommonType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// What the tracker remembers for one leaf path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackedType {
    /// Only this runtime type has been seen
    Concrete(CommonType),
    /// Two calls disagreed; never reverts
    Mixed,
}

impl TrackedType {
    /// Type to declare in leaf metadata
    pub fn declared(self) -> CommonType {
        match self {
            Self::Concrete(t) => t,
            Self::Mixed => CommonType::Mixed,
        }
    }
}

/// Outcome of checking an incoming runtime type against the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Type the leaf metadata should declare
    pub declared: TrackedType,
    /// Previous concrete type, when this call introduced the drift
    pub drifted_from: Option<CommonType>,
}

impl Resolution {
    /// Whether this call changed the declared type
    pub fn drifted(&self) -> bool {
        self.drifted_from.is_some()
    }
}

/// Last observed runtime type per leaf path
#[derive(Debug, Clone, Default)]
pub struct ConflictTracker {
    types: Arc<RwLock<HashMap<String, TrackedType>>>,
}

impl ConflictTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently tracked type for `path`
    pub async fn get(&self, path: &str) -> Option<TrackedType> {
        self.types.read().await.get(path).copied()
    }

    /// Decide the declared type for an incoming value without recording it
    pub async fn resolve(&self, path: &str, runtime: CommonType) -> Resolution {
        match self.get(path).await {
            None => Resolution {
                declared: TrackedType::Concrete(runtime),
                drifted_from: None,
            },
            Some(TrackedType::Mixed) => Resolution {
                declared: TrackedType::Mixed,
                drifted_from: None,
            },
            Some(TrackedType::Concrete(previous)) if previous == runtime => Resolution {
                declared: TrackedType::Concrete(previous),
                drifted_from: None,
            },
            Some(TrackedType::Concrete(previous)) => Resolution {
                declared: TrackedType::Mixed,
                drifted_from: Some(previous),
            },
        }
    }

    /// Record the declared type after metadata was written
    ///
    /// A `Mixed` entry is never downgraded.
    pub async fn record(&self, path: impl Into<String>, tracked: TrackedType) {
        let mut types = self.types.write().await;
        let entry = types.entry(path.into()).or_insert(tracked);
        if *entry != TrackedType::Mixed {
            *entry = tracked;
        }
    }

    /// Number of tracked paths
    pub async fn len(&self) -> usize {
        self.types.read().await.len()
    }

    /// Check if nothing is tracked
    pub async fn is_empty(&self) -> bool {
        self.types.read().await.is_empty()
    }
}
