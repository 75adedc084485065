//! Path sanitizing and segment helpers

use crate::error::Result;
use regex::Regex;
use std::sync::LazyLock;

/// Character class matching everything a store path may not contain
pub const DEFAULT_FORBIDDEN_CHARS: &str = r"[^A-Za-z0-9._\-/ :!#$%&()+=@^{}|~]+";

static DEFAULT_FORBIDDEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_FORBIDDEN_CHARS).unwrap());

/// Normalizes paths to the store's safe character set
///
/// Each run of forbidden characters collapses into a single `_`.
#[derive(Debug, Clone)]
pub struct PathSanitizer {
    forbidden: Regex,
}

impl Default for PathSanitizer {
    fn default() -> Self {
        Self {
            forbidden: DEFAULT_FORBIDDEN_REGEX.clone(),
        }
    }
}

impl PathSanitizer {
    /// Create a sanitizer with the default forbidden character class
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sanitizer from a custom forbidden-character pattern
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            forbidden: Regex::new(pattern)?,
        })
    }

    /// Replace forbidden characters and drop a trailing separator
    pub fn sanitize(&self, path: &str) -> String {
        let cleaned = self.forbidden.replace_all(path, "_");
        cleaned.strip_suffix('.').unwrap_or(&*cleaned).to_string()
    }

    /// Join a parent path and a raw segment, sanitizing the result
    pub fn child(&self, parent: &str, segment: &str) -> String {
        self.sanitize(&join(parent, segment))
    }
}

/// Join two path parts with the separator, skipping empty parts
pub fn join(parent: &str, segment: &str) -> String {
    match (parent.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}.{segment}"),
    }
}

/// Last segment of a path
pub fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Remove every separator from an array-derived segment
pub fn strip_dots(segment: &str) -> String {
    segment.replace('.', "")
}

/// Turn a mapping key into a segment: separators become `_`
pub fn member_segment(key: &str) -> String {
    key.replace('.', "_")
}
