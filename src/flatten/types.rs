//! Flattener types

use crate::types::{JsonObject, JsonValue};

/// Shape of one JSON node, decided once before dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    /// String, number or boolean
    Scalar(JsonValue),
    Array(Vec<JsonValue>),
    Object(JsonObject),
}

impl From<JsonValue> for Node {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Array(items) => Self::Array(items),
            JsonValue::Object(map) => Self::Object(map),
            scalar => Self::Scalar(scalar),
        }
    }
}

/// Per-branch traversal context
///
/// `write` is raised by a container matching `makeStateWritableWithEnding`
/// and applies to that container's subtree only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Walk {
    pub write: bool,
    pub depth: usize,
}

impl Walk {
    /// Context for a child node
    pub fn deeper(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }
}

/// Compact JSON text of `value`, cut to `max_len` characters for logging
pub(crate) fn truncated_dump(value: &JsonValue, max_len: usize) -> String {
    let text = value.to_string();
    match text.char_indices().nth(max_len) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text,
    }
}
