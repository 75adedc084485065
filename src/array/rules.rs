//! Naming rules for array elements

use crate::path::strip_dots;
use crate::types::{is_truthy, scalar_text, JsonObject, JsonValue};

/// One naming heuristic for an object element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingRule {
    /// Value of the first own key, if it is a string
    FirstStringValue,
    /// Any non-null key ending with the suffix; the last one wins
    KeySuffix(&'static str),
    /// A literal key with a truthy value
    Literal(&'static str),
}

/// The heuristic chain, in evaluation order
pub const OBJECT_NAMING_RULES: [NamingRule; 8] = [
    NamingRule::FirstStringValue,
    NamingRule::KeySuffix("Id"),
    NamingRule::KeySuffix("Name"),
    NamingRule::Literal("id"),
    NamingRule::Literal("name"),
    NamingRule::Literal("label"),
    NamingRule::Literal("labelText"),
    NamingRule::Literal("start_date_time"),
];

impl NamingRule {
    /// Name this rule picks for `element`, if it applies
    pub fn extract(&self, element: &JsonObject) -> Option<String> {
        match self {
            Self::FirstStringValue => element
                .values()
                .next()
                .and_then(JsonValue::as_str)
                .map(ToString::to_string),
            Self::KeySuffix(suffix) => element
                .iter()
                .filter(|(key, value)| key.ends_with(suffix) && !value.is_null())
                .filter_map(|(_, value)| scalar_text(value))
                .last(),
            Self::Literal(key) => element
                .get(*key)
                .filter(|value| is_truthy(value))
                .and_then(scalar_text),
        }
    }
}

/// Run the whole chain; later matches override earlier ones
pub fn heuristic_name(element: &JsonObject) -> Option<String> {
    OBJECT_NAMING_RULES
        .iter()
        .filter_map(|rule| rule.extract(element))
        .last()
}

/// Parsed `preferredArrayName`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferredName {
    /// `field`
    Field(String),
    /// `object/field`: a field inside a named sub-object
    Nested { object: String, field: String },
    /// `first+second`, where `second` may itself be `object/field`
    Compound { first: String, second: String },
}

impl PreferredName {
    pub fn parse(name: &str) -> Self {
        if let Some((first, second)) = name.split_once('+') {
            return Self::Compound {
                first: first.to_string(),
                second: second.to_string(),
            };
        }
        match name.split_once('/') {
            Some((object, field)) => Self::Nested {
                object: object.to_string(),
                field: first_part(field, '/').to_string(),
            },
            None => Self::Field(name.to_string()),
        }
    }

    /// Name for `element`, `None` when the referenced fields are missing
    pub fn extract(&self, element: &JsonObject) -> Option<String> {
        match self {
            Self::Field(field) => element
                .get(field)
                .filter(|value| is_truthy(value))
                .and_then(scalar_text)
                .map(|name| strip_dots(&name)),
            Self::Nested { object, field } => {
                let sub = element.get(object).filter(|value| is_truthy(value))?;
                sub.get(field).and_then(scalar_text).map(|name| compact(&name))
            }
            Self::Compound { first, second } => {
                let head = element.get(first).and_then(scalar_text)?;
                let tail = match second.split_once('/') {
                    Some((object, field)) => {
                        let field = first_part(field, '/');
                        element
                            .get(object)
                            .and_then(|sub| sub.get(field))
                            .or_else(|| element.get(field))
                            .and_then(scalar_text)
                            .unwrap_or_default()
                    }
                    None => element
                        .get(second)
                        .and_then(scalar_text)
                        .map(|name| compact(&name))
                        .unwrap_or_default(),
                };
                Some(format!("{}-{}", compact(&head), tail))
            }
        }
    }
}

/// Drop separators and spaces
fn compact(name: &str) -> String {
    strip_dots(name).replace(' ', "")
}

fn first_part(s: &str, separator: char) -> &str {
    s.split(separator).next().unwrap_or(s)
}
