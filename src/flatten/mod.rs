//! Recursive flattening module
//!
//! Walks a JSON value and emits container, leaf and value-write calls to a
//! `TreeStore`.
//!
//! # Overview
//!
//! The flatten module provides:
//! - `Flattener` - The engine instance, owning the object cache and the
//!   conflict tracker for its whole lifetime
//! - `Node` - Shape classification used to dispatch each JSON node
//!
//! Structure (containers and leaf metadata) is created once per path and
//! remembered in the object cache. Values are written on every call.
//!
//! Failures never escape `parse`: store errors are logged where the call is
//! made and the traversal moves on to the next node.

mod types;

pub use types::Node;

use types::{truncated_dump, Walk};

use crate::array::{ArrayKeyResolver, ElementPlan};
use crate::cache::{ConflictTracker, ObjectCache, TrackedType};
use crate::config::{FlattenerConfig, ParseOptions};
use crate::decode::PayloadSniffer;
use crate::error::{Error, Result};
use crate::path::{last_segment, member_segment, PathSanitizer};
use crate::role::infer_role;
use crate::store::{LeafMetadata, StateValue, TreeStore};
use crate::types::{is_truthy, scalar_text, CommonType, JsonObject, JsonValue, Role};
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use tracing::{debug, error};

/// JSON to store flattening engine
///
/// One instance serves many concurrent `parse` calls. The caches only grow,
/// except for subtrees wiped by `deleteBeforeUpdate`.
pub struct Flattener<S> {
    /// Backing store
    store: S,
    /// Paths whose structure has been created
    cache: ObjectCache,
    /// Declared type per leaf path
    tracker: ConflictTracker,
    sanitizer: PathSanitizer,
    config: FlattenerConfig,
}

impl<S: TreeStore> Flattener<S> {
    /// Create a flattener with default settings
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: ObjectCache::new(),
            tracker: ConflictTracker::new(),
            sanitizer: PathSanitizer::new(),
            config: FlattenerConfig::default(),
        }
    }

    /// Create a flattener with custom settings
    pub fn with_config(store: S, config: FlattenerConfig) -> Result<Self> {
        let sanitizer = config.sanitizer()?;
        Ok(Self {
            store,
            cache: ObjectCache::new(),
            tracker: ConflictTracker::new(),
            sanitizer,
            config,
        })
    }

    /// Get the backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the engine settings
    pub fn config(&self) -> &FlattenerConfig {
        &self.config
    }

    /// Flatten `element` under `path`
    ///
    /// `options` is updated in place: `channel_name` and
    /// `delete_before_update` are cleared once the first container exists,
    /// and `states` maps gain newly seen values.
    pub async fn parse(&self, path: &str, element: JsonValue, options: &mut ParseOptions) {
        self.parse_node(path.to_string(), element, Walk::default(), options)
            .await;
    }

    /// Flatten the elements of an array stored under `key` at `path`
    ///
    /// Element segments are derived from `key` (see `ArrayKeyResolver`). No
    /// container is created for `path` itself.
    pub async fn parse_array(
        &self,
        path: &str,
        key: &str,
        items: Vec<JsonValue>,
        options: &mut ParseOptions,
    ) {
        let path = self.sanitizer.sanitize(path);
        self.extract_array(path, key, items, Walk::default(), options)
            .await;
    }

    /// Write a pre-stringified JSON snapshot to a `json` role leaf
    pub async fn write_json_snapshot(&self, path: &str, value: &JsonValue) -> Result<()> {
        let path = self.sanitizer.sanitize(path);
        let state = StateValue::json_snapshot(value)?;

        if !self.cache.contains(&path).await {
            let metadata = LeafMetadata {
                name: last_segment(&path).to_string(),
                role: Role::Json,
                common_type: CommonType::String,
                read: true,
                write: false,
                unit: None,
                states: None,
            };
            self.store.create_or_update_leaf(&path, &metadata).await?;
            self.cache.insert(path.clone()).await;
            self.tracker
                .record(path.clone(), TrackedType::Concrete(CommonType::String))
                .await;
        }

        self.store
            .write_value(&path, &state, self.config.ack)
            .await
    }

    /// Check if structure for `path` has been created and remembered
    pub async fn is_created(&self, path: &str) -> bool {
        self.cache.contains(&self.sanitizer.sanitize(path)).await
    }

    /// Declared type of the leaf at `path`
    pub async fn declared_type(&self, path: &str) -> Option<CommonType> {
        self.tracker
            .get(&self.sanitizer.sanitize(path))
            .await
            .map(TrackedType::declared)
    }

    /// Number of paths in the object cache
    pub async fn created_count(&self) -> usize {
        self.cache.len().await
    }

    fn parse_node<'a>(
        &'a self,
        path: String,
        element: JsonValue,
        mut walk: Walk,
        options: &'a mut ParseOptions,
    ) -> BoxFuture<'a, ()> {
        async move {
            if self.too_deep(&path, &element, walk) {
                return;
            }
            let path = self.sanitizer.sanitize(&path);

            match Node::from(element) {
                Node::Null => debug!("Cannot extract empty: {}", path),
                Node::Scalar(value) => {
                    let key = last_segment(&path).to_string();
                    let value = PayloadSniffer::new(options).sniff(value, &key, &path);
                    self.visit_value(path, &key, key.clone(), value, walk, options)
                        .await;
                }
                Node::Array(items) => {
                    if self.open_container(&path, None, &mut walk, options).await {
                        self.extract_array(path, "", items, walk, options).await;
                    }
                }
                Node::Object(map) => {
                    if self
                        .open_container(&path, Some(&map), &mut walk, options)
                        .await
                    {
                        self.parse_members(path, map, walk, options).await;
                    }
                }
            }
        }
        .boxed()
    }

    /// Route a (possibly decoded) value: structures are traversed, scalars
    /// become leaves
    async fn visit_value(
        &self,
        path: String,
        key: &str,
        name: String,
        value: JsonValue,
        walk: Walk,
        options: &mut ParseOptions,
    ) {
        match value {
            JsonValue::Null => debug!("Cannot extract empty: {}", path),
            JsonValue::Array(_) | JsonValue::Object(_) => {
                self.parse_node(path, value, walk.deeper(), options).await;
            }
            scalar => {
                self.write_leaf(&path, key, name, scalar, walk, options)
                    .await;
            }
        }
    }

    async fn parse_members(
        &self,
        path: String,
        map: JsonObject,
        walk: Walk,
        options: &mut ParseOptions,
    ) {
        for (key, value) in map {
            if options.is_hidden_password(&key) {
                debug!("skip password : {}.{}", path, key);
                continue;
            }

            let child = self.sanitizer.child(&path, &member_segment(&key));
            let value = if value.is_null() {
                JsonValue::String(String::new())
            } else {
                value
            };
            let value = PayloadSniffer::new(options).sniff(value, &key, &child);

            match value {
                // Array members are numbered against the parent path
                JsonValue::Array(items) => {
                    self.extract_array(path.clone(), &key, items, walk, options)
                        .await;
                }
                value => {
                    self.visit_value(child, &key, key.clone(), value, walk, options)
                        .await;
                }
            }
        }
    }

    async fn extract_array(
        &self,
        path: String,
        key: &str,
        items: Vec<JsonValue>,
        walk: Walk,
        options: &mut ParseOptions,
    ) {
        // Dotted keys name one segment, like object members; the raw key is
        // only a display name
        let key_segment = member_segment(key);
        let container = (!key.is_empty()).then(|| self.sanitizer.child(&path, &key_segment));

        for (index, element) in items.into_iter().enumerate() {
            let element = PayloadSniffer::new(options).auto_cast(element, &path);
            let plan = ArrayKeyResolver::new(options).plan(&key_segment, index, &element);

            match plan {
                ElementPlan::Skip => debug!("Cannot extract empty: {}.{}.{}", path, key, index),
                ElementPlan::StringChild { segment } => {
                    let container = container.clone().unwrap_or_else(|| path.clone());
                    self.ensure_container(&container, key, options).await;
                    let child = self.sanitizer.child(&container, &segment);
                    self.parse_node(child, element, walk.deeper(), options)
                        .await;
                }
                ElementPlan::Leaf { segment } | ElementPlan::Child { segment } => {
                    let child = self.sanitizer.child(&path, &segment);
                    self.parse_node(child, element, walk.deeper(), options)
                        .await;
                }
                ElementPlan::FlatPair {
                    segment,
                    name,
                    value,
                } => {
                    let parent = match &container {
                        Some(container) => {
                            self.ensure_container(container, key, options).await;
                            container.clone()
                        }
                        None => path.clone(),
                    };
                    self.write_pair(&parent, &segment, name, value, walk, options)
                        .await;
                }
            }
        }
    }

    /// One leaf under `parent` for a two-field array element
    async fn write_pair(
        &self,
        parent: &str,
        segment: &str,
        name: String,
        value: JsonValue,
        walk: Walk,
        options: &mut ParseOptions,
    ) {
        let leaf_path = self.sanitizer.child(parent, segment);
        let value = PayloadSniffer::new(options).sniff(value, segment, &leaf_path);
        self.visit_value(leaf_path, segment, name, value, walk, options)
            .await;
    }

    /// Create (or wipe and recreate) the container at `path`
    ///
    /// Returns false when the subtree must be skipped.
    async fn open_container(
        &self,
        path: &str,
        element: Option<&JsonObject>,
        walk: &mut Walk,
        options: &mut ParseOptions,
    ) -> bool {
        if options.is_hidden_password(path) {
            debug!("skip password : {}", path);
            return false;
        }
        if options.is_excluded(path) {
            debug!("skip channel with ending : {}", path);
            return false;
        }
        if options.is_forced_writable(path) {
            debug!("make channel with ending writable : {}", path);
            walk.write = true;
        }
        if !options.delete_before_update && self.cache.contains(path).await {
            return true;
        }

        if options.delete_before_update {
            let evicted = self.cache.evict_subtree(path).await;
            debug!("Deleting {} before update ({} cached paths)", path, evicted);
            if let Err(e) = self.store.delete_subtree(path).await {
                error!("Failed to delete {}: {}", path, e);
            }
        }

        let name = options
            .preferred_array_desc
            .as_deref()
            .and_then(|field| element?.get(field))
            .filter(|value| is_truthy(value))
            .and_then(scalar_text)
            .or_else(|| options.channel_name.clone())
            .unwrap_or_default();

        match self.store.create_or_update_container(path, &name).await {
            Ok(()) => {
                if !options.dont_save_created_objects {
                    self.cache.insert(path).await;
                }
                options.channel_name = None;
                options.delete_before_update = false;
            }
            Err(e) => error!("Failed to create channel {}: {}", path, e),
        }
        true
    }

    /// Create a container named after an array key, once
    async fn ensure_container(&self, path: &str, name: &str, options: &ParseOptions) {
        if self.cache.contains(path).await {
            return;
        }
        match self.store.create_or_update_container(path, name).await {
            Ok(()) => {
                if !options.dont_save_created_objects {
                    self.cache.insert(path).await;
                }
            }
            Err(e) => error!("Failed to create channel {}: {}", path, e),
        }
    }

    async fn write_leaf(
        &self,
        path: &str,
        key: &str,
        name: String,
        value: JsonValue,
        walk: Walk,
        options: &mut ParseOptions,
    ) {
        let segment = last_segment(path);
        if options.is_excluded(segment) {
            debug!("skip state with ending : {}", path);
            return;
        }
        let mut write = walk.write || options.write;
        if options.is_forced_writable(segment) {
            debug!("make state with ending writable : {}", path);
            write = true;
        }

        let (Some(runtime), Some(state)) = (CommonType::of(&value), StateValue::from_scalar(&value))
        else {
            return;
        };

        let resolution = self.tracker.resolve(path, runtime).await;
        if resolution.drifted() || !self.cache.contains(path).await {
            if let Some(previous) = resolution.drifted_from {
                debug!(
                    "Type changed for {} from {} to {}",
                    path,
                    previous,
                    CommonType::Mixed
                );
            }

            let metadata = LeafMetadata {
                name: ParseOptions::lookup(&options.descriptions, path, key)
                    .cloned()
                    .unwrap_or(name),
                role: infer_role(&value, write),
                common_type: resolution.declared.declared(),
                read: true,
                write,
                unit: ParseOptions::lookup(&options.units, path, key).cloned(),
                states: extend_states(options, path, key, &value),
            };

            match self.store.create_or_update_leaf(path, &metadata).await {
                Ok(()) => {
                    if !options.dont_save_created_objects {
                        self.cache.insert(path).await;
                    }
                    self.tracker.record(path, resolution.declared).await;
                }
                Err(e) => error!("Failed to create state {}: {}", path, e),
            }
        }

        if let Err(e) = self.store.write_value(path, &state, self.config.ack).await {
            error!("Failed to write {}: {}", path, e);
        }
    }

    fn too_deep(&self, path: &str, element: &JsonValue, walk: Walk) -> bool {
        if walk.depth <= self.config.max_depth {
            return false;
        }
        let err = Error::traversal(
            path,
            format!("nested deeper than {} levels", self.config.max_depth),
        );
        error!(
            "Error extract keys: {} {}",
            path,
            truncated_dump(element, self.config.max_logged_value_len)
        );
        error!("{}", err);
        true
    }
}

/// Enum map for a leaf, extended with `value` when it is not listed yet
fn extend_states(
    options: &mut ParseOptions,
    path: &str,
    key: &str,
    value: &JsonValue,
) -> Option<BTreeMap<String, String>> {
    let id = if options.states.contains_key(path) {
        path
    } else {
        key
    };
    let states = options.states.get_mut(id)?;
    if !value.is_boolean() {
        if let Some(text) = scalar_text(value) {
            states.entry(text.clone()).or_insert(text);
        }
    }
    Some(states.clone())
}
