//! Configuration types
//!
//! This module contains the per-call parse options record and the
//! per-instance engine configuration. Parse options can be written in YAML
//! or JSON using the camelCase keys the options have always used.

use crate::error::{Error, Result};
use crate::path::PathSanitizer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

// ============================================================================
// Parse Options
// ============================================================================

/// Options recognized by a single `parse` call
///
/// `channel_name` and `delete_before_update` are consumed by the first
/// container created during the call. `states` maps are extended in place
/// with newly seen values, so reusing one `ParseOptions` across calls keeps
/// the extensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// Make every leaf writable
    pub write: bool,

    /// Name array children by position instead of by heuristics
    pub force_index: bool,

    /// Do not zero-pad positional indices (only with `force_index`)
    pub disable_pad_index: bool,

    /// Start positional indices at 0 (only with `force_index`)
    pub zero_based_array_index: bool,

    /// Display name of the root container
    pub channel_name: Option<String>,

    /// Field used to name array children: `"a"`, `"a/b"` or `"a+b"`
    #[serde(alias = "preferedArrayName")]
    pub preferred_array_name: Option<String>,

    /// Field used as the display name of array child containers
    #[serde(alias = "preferedArrayDesc")]
    pub preferred_array_desc: Option<String>,

    /// Parse strings holding JSON
    pub auto_cast: bool,

    /// Display-name overrides, keyed by path or key
    pub descriptions: HashMap<String, String>,

    /// Enumerated value to label maps, keyed by path or key
    pub states: HashMap<String, BTreeMap<String, String>>,

    /// Units, keyed by path or key
    pub units: HashMap<String, String>,

    /// Decode every string that looks like base64
    pub parse_base64: bool,

    /// Keys or paths whose values are always base64-decoded to UTF-8
    #[serde(rename = "parseBase64byIds")]
    pub parse_base64_by_ids: Vec<String>,

    /// Keys or paths whose values are always base64-decoded to hex
    #[serde(rename = "parseBase64byIdsToHex")]
    pub parse_base64_by_ids_to_hex: Vec<String>,

    /// Wipe the target subtree before recreating it
    pub delete_before_update: bool,

    /// Skip keys and paths containing "password"
    pub remove_passwords: bool,

    /// Skip leaves and containers whose path ends with one of these
    pub exclude_state_with_ending: Vec<String>,

    /// Make leaves writable when their last segment ends with one of these
    pub make_state_writable_with_ending: Vec<String>,

    /// Create structure but do not remember it in the object cache
    pub dont_save_created_objects: bool,
}

impl ParseOptions {
    /// Create default options (read-only leaves, heuristic array naming)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a YAML (or JSON) string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse parse options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read options file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;
        Self::from_yaml_str(&content)
    }

    /// Validate option combinations
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.preferred_array_name {
            if name.is_empty() {
                return Err(Error::invalid_value(
                    "preferredArrayName",
                    "must not be empty",
                ));
            }
            if name.contains('+') && name.split('+').count() != 2 {
                return Err(Error::invalid_value(
                    "preferredArrayName",
                    format!("'{name}' must join exactly two fields with '+'"),
                ));
            }
        }
        Ok(())
    }

    /// Whether `path` or `key` is excluded by `exclude_state_with_ending`
    pub fn is_excluded(&self, segment: &str) -> bool {
        !segment.is_empty()
            && self
                .exclude_state_with_ending
                .iter()
                .any(|ending| segment.ends_with(ending.as_str()))
    }

    /// Whether `segment` should be writable by `make_state_writable_with_ending`
    pub fn is_forced_writable(&self, segment: &str) -> bool {
        let lower = segment.to_lowercase();
        !segment.is_empty()
            && self
                .make_state_writable_with_ending
                .iter()
                .any(|ending| lower.ends_with(ending.as_str()))
    }

    /// Whether `key` names a secret that `remove_passwords` hides
    pub fn is_hidden_password(&self, key: &str) -> bool {
        self.remove_passwords && key.to_lowercase().contains("password")
    }

    /// Look up a per-leaf override by full path, then by plain key
    pub fn lookup<'a, V>(map: &'a HashMap<String, V>, path: &str, key: &str) -> Option<&'a V> {
        map.get(path).or_else(|| map.get(key))
    }

    /// Set write mode
    #[must_use]
    pub fn with_write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Set positional array naming
    #[must_use]
    pub fn with_force_index(mut self, force_index: bool) -> Self {
        self.force_index = force_index;
        self
    }

    /// Set zero-based positional indices
    #[must_use]
    pub fn with_zero_based_array_index(mut self, zero_based: bool) -> Self {
        self.zero_based_array_index = zero_based;
        self
    }

    /// Disable zero padding of positional indices
    #[must_use]
    pub fn with_disable_pad_index(mut self, disable: bool) -> Self {
        self.disable_pad_index = disable;
        self
    }

    /// Set the root container display name
    #[must_use]
    pub fn with_channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = Some(name.into());
        self
    }

    /// Set the preferred array naming field
    #[must_use]
    pub fn with_preferred_array_name(mut self, name: impl Into<String>) -> Self {
        self.preferred_array_name = Some(name.into());
        self
    }

    /// Set the preferred array description field
    #[must_use]
    pub fn with_preferred_array_desc(mut self, desc: impl Into<String>) -> Self {
        self.preferred_array_desc = Some(desc.into());
        self
    }

    /// Enable JSON string casting
    #[must_use]
    pub fn with_auto_cast(mut self, auto_cast: bool) -> Self {
        self.auto_cast = auto_cast;
        self
    }

    /// Enable global base64 sniffing
    #[must_use]
    pub fn with_parse_base64(mut self, parse: bool) -> Self {
        self.parse_base64 = parse;
        self
    }

    /// Enable subtree wipe before update
    #[must_use]
    pub fn with_delete_before_update(mut self, delete: bool) -> Self {
        self.delete_before_update = delete;
        self
    }

    /// Enable password redaction
    #[must_use]
    pub fn with_remove_passwords(mut self, remove: bool) -> Self {
        self.remove_passwords = remove;
        self
    }

    /// Disable object cache memoization
    #[must_use]
    pub fn with_dont_save_created_objects(mut self, dont_save: bool) -> Self {
        self.dont_save_created_objects = dont_save;
        self
    }

    /// Add a display-name override
    #[must_use]
    pub fn with_description(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.descriptions.insert(id.into(), name.into());
        self
    }

    /// Add a unit
    #[must_use]
    pub fn with_unit(mut self, id: impl Into<String>, unit: impl Into<String>) -> Self {
        self.units.insert(id.into(), unit.into());
        self
    }

    /// Add an enumerated value map
    #[must_use]
    pub fn with_states(mut self, id: impl Into<String>, states: BTreeMap<String, String>) -> Self {
        self.states.insert(id.into(), states);
        self
    }
}

// ============================================================================
// Flattener Config
// ============================================================================

/// Engine-instance settings, fixed for the life of a `Flattener`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlattenerConfig {
    /// Nesting depth at which a subtree is abandoned
    pub max_depth: usize,

    /// Characters of a value dump kept in error logs
    pub max_logged_value_len: usize,

    /// Acknowledge flag passed with every value write
    pub ack: bool,

    /// Custom forbidden-character regex for path sanitizing
    pub forbidden_chars: Option<String>,
}

impl Default for FlattenerConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_logged_value_len: 500,
            ack: true,
            forbidden_chars: None,
        }
    }
}

impl FlattenerConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the logged value dump length
    #[must_use]
    pub fn with_max_logged_value_len(mut self, len: usize) -> Self {
        self.max_logged_value_len = len;
        self
    }

    /// Set the acknowledge flag for value writes
    #[must_use]
    pub fn with_ack(mut self, ack: bool) -> Self {
        self.ack = ack;
        self
    }

    /// Set a custom forbidden-character pattern
    #[must_use]
    pub fn with_forbidden_chars(mut self, pattern: impl Into<String>) -> Self {
        self.forbidden_chars = Some(pattern.into());
        self
    }

    /// Build the path sanitizer this config describes
    pub fn sanitizer(&self) -> Result<PathSanitizer> {
        match &self.forbidden_chars {
            Some(pattern) => PathSanitizer::with_pattern(pattern),
            None => Ok(PathSanitizer::new()),
        }
    }
}
