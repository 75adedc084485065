//! Common types used throughout json2states
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Common Type
// ============================================================================

/// Declared value type of a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommonType {
    #[default]
    String,
    Number,
    Boolean,
    /// More than one concrete runtime type was observed at the same path
    Mixed,
}

impl CommonType {
    /// Runtime type of a scalar JSON value, `None` for null/array/object
    pub fn of(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(_) => Some(Self::String),
            JsonValue::Number(_) => Some(Self::Number),
            JsonValue::Bool(_) => Some(Self::Boolean),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for CommonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Role
// ============================================================================

/// Display role of a leaf
///
/// Informational only: the store keeps it as metadata for UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "indicator")]
    Indicator,
    #[serde(rename = "switch")]
    Switch,
    #[serde(rename = "level")]
    Level,
    #[serde(rename = "value")]
    Value,
    #[serde(rename = "value.time")]
    ValueTime,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json")]
    Json,
    #[default]
    #[serde(rename = "state")]
    State,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Indicator => "indicator",
            Self::Switch => "switch",
            Self::Level => "level",
            Self::Value => "value",
            Self::ValueTime => "value.time",
            Self::Text => "text",
            Self::Json => "json",
            Self::State => "state",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Render a scalar the way it reads in a path segment or enum label
///
/// Strings are returned without quotes; other scalars use their JSON text.
/// Returns `None` for null, arrays and objects.
pub fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// JavaScript-style truthiness of a JSON value
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_common_type_of() {
        assert_eq!(CommonType::of(&json!("x")), Some(CommonType::String));
        assert_eq!(CommonType::of(&json!(1.5)), Some(CommonType::Number));
        assert_eq!(CommonType::of(&json!(false)), Some(CommonType::Boolean));
        assert_eq!(CommonType::of(&json!(null)), None);
        assert_eq!(CommonType::of(&json!([1])), None);
    }

    #[test]
    fn test_common_type_serde() {
        let json = serde_json::to_string(&CommonType::Mixed).unwrap();
        assert_eq!(json, "\"mixed\"");

        let parsed: CommonType = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(parsed, CommonType::Boolean);
    }

    #[test]
    fn test_role_serde_matches_display() {
        for role in [
            Role::Indicator,
            Role::Switch,
            Role::Level,
            Role::Value,
            Role::ValueTime,
            Role::Text,
            Role::Json,
            Role::State,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("a.b")), Some("a.b".to_string()));
        assert_eq!(scalar_text(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_text(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&json!(null)), None);
        assert_eq!(scalar_text(&json!({"a": 1})), None);
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!({})));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(null)));
    }
}
