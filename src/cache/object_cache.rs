//! Object cache implementation

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Set of paths that already have structural metadata
#[derive(Debug, Clone, Default)]
pub struct ObjectCache {
    created: Arc<RwLock<HashSet<String>>>,
}

impl ObjectCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether structure for `path` was created
    pub async fn contains(&self, path: &str) -> bool {
        self.created.read().await.contains(path)
    }

    /// Remember that structure for `path` exists
    pub async fn insert(&self, path: impl Into<String>) {
        self.created.write().await.insert(path.into());
    }

    /// Forget `path` and everything below it, returning how many entries went
    pub async fn evict_subtree(&self, path: &str) -> usize {
        let prefix = format!("{path}.");
        let mut created = self.created.write().await;
        let before = created.len();
        created.retain(|p| p != path && !p.starts_with(&prefix));
        before - created.len()
    }

    /// Number of cached paths
    pub async fn len(&self) -> usize {
        self.created.read().await.len()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.created.read().await.is_empty()
    }
}
