//! Payload sniffer implementation

use super::types::Base64Output;
use crate::config::ParseOptions;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;
use tracing::warn;

/// Canonical padded base64
static BASE64_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9a-zA-Z+/]{4})*(?:[0-9a-zA-Z+/]{2}==|[0-9a-zA-Z+/]{3}=)$").unwrap()
});

/// Check whether a string has the shape of padded base64
pub fn is_base64(s: &str) -> bool {
    !s.is_empty() && BASE64_REGEX.is_match(s)
}

/// Parse a string as JSON, `None` if it is not valid JSON
pub fn probe_json(s: &str) -> Option<JsonValue> {
    serde_json::from_str(s).ok()
}

/// Decode base64 text
///
/// UTF-8 output that is itself valid JSON comes back parsed.
pub fn decode_base64(encoded: &str, output: Base64Output) -> Result<JsonValue> {
    let bytes = STANDARD.decode(encoded)?;
    match output {
        Base64Output::Hex => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for byte in &bytes {
                write!(hex, "{byte:02x}").map_err(|e| Error::decode(e.to_string()))?;
            }
            Ok(JsonValue::String(hex))
        }
        Base64Output::Utf8 => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            Ok(probe_json(&text).unwrap_or(JsonValue::String(text)))
        }
    }
}

/// Applies `autoCast` and base64 options to a value about to be stored
#[derive(Debug, Clone, Copy)]
pub struct PayloadSniffer<'a> {
    options: &'a ParseOptions,
}

impl<'a> PayloadSniffer<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self { options }
    }

    /// Decode `value` if the options ask for it
    ///
    /// `key` is the member key (or pair key) and `path` the full leaf path;
    /// explicit base64 lists match either.
    pub fn sniff(&self, value: JsonValue, key: &str, path: &str) -> JsonValue {
        let value = self.auto_cast(value, path);
        let Some(text) = value.as_str() else {
            return value;
        };

        let Some(output) = self.base64_output(text, key, path) else {
            return value;
        };
        match decode_base64(text, output) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Cannot parse base64 for {}: {}", path, e);
                value
            }
        }
    }

    /// Replace a JSON-looking string with its parsed form
    pub fn auto_cast(&self, value: JsonValue, path: &str) -> JsonValue {
        if !self.options.auto_cast {
            return value;
        }
        let Some(text) = value.as_str() else {
            return value;
        };
        let parsed = serde_json::from_str::<JsonValue>(text);
        match parsed {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::trace!("No JSON in {}: {}", path, e);
                value
            }
        }
    }

    fn base64_output(&self, text: &str, key: &str, path: &str) -> Option<Base64Output> {
        let listed = |ids: &[String]| ids.iter().any(|id| id == key || id == path);

        if listed(&self.options.parse_base64_by_ids_to_hex) {
            Some(Base64Output::Hex)
        } else if listed(&self.options.parse_base64_by_ids)
            || (self.options.parse_base64 && is_base64(text))
        {
            Some(Base64Output::Utf8)
        } else {
            None
        }
    }
}
