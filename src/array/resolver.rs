//! Array element planning

use super::rules::{heuristic_name, PreferredName};
use crate::config::ParseOptions;
use crate::path::strip_dots;
use crate::types::{scalar_text, JsonObject, JsonValue};
use std::borrow::Cow;

/// What the flattener should do with one array element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementPlan {
    /// Null element, nothing to store
    Skip,
    /// String element under a named array: container `path.key`, leaf
    /// `path.key.<segment>` holding the string itself
    StringChild { segment: String },
    /// Other scalar element: leaf at `path.<segment>`
    Leaf { segment: String },
    /// Two-scalar record collapsed into one leaf at `path.key.<segment>`
    FlatPair {
        segment: String,
        name: String,
        value: JsonValue,
    },
    /// Structured element: traverse into `path.<segment>`
    Child { segment: String },
}

/// Positional segment for element `index` (0-based position in the array)
///
/// Without `forced`, numbering is 1-based and padded below 10. With it, the
/// `zeroBasedArrayIndex` and `disablePadIndex` options apply.
pub fn index_segment(key: &str, index: usize, options: &ParseOptions, forced: bool) -> String {
    let mut number = index + 1;
    let mut pad = true;
    if forced {
        if options.zero_based_array_index {
            number -= 1;
        }
        pad = !options.disable_pad_index;
    }
    if pad && number < 10 {
        format!("{key}0{number}")
    } else {
        format!("{key}{number}")
    }
}

/// Chooses a child path segment for every array element
#[derive(Debug, Clone)]
pub struct ArrayKeyResolver<'a> {
    options: &'a ParseOptions,
    preferred: Option<PreferredName>,
}

impl<'a> ArrayKeyResolver<'a> {
    pub fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            preferred: options
                .preferred_array_name
                .as_deref()
                .map(PreferredName::parse),
        }
    }

    /// Plan element `index` of the array stored under `key`
    pub fn plan(&self, key: &str, index: usize, element: &JsonValue) -> ElementPlan {
        match element {
            JsonValue::Null => ElementPlan::Skip,
            JsonValue::String(s) if !key.is_empty() => ElementPlan::StringChild {
                segment: strip_dots(s),
            },
            JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => ElementPlan::Leaf {
                segment: index_segment(key, index, self.options, self.options.force_index),
            },
            JsonValue::Object(record) => self.plan_record(key, index, record),
            // Nested arrays are named like records keyed by position
            JsonValue::Array(items) => {
                let record: JsonObject = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), item.clone()))
                    .collect();
                self.plan_record(key, index, &record)
            }
        }
    }

    fn plan_record(&self, key: &str, index: usize, record: &JsonObject) -> ElementPlan {
        let visible = self.visible_fields(record);
        // A pair holding a hidden password is a record, not a pair
        if !self.options.force_index && visible.len() == record.len() {
            if let Some(pair) = flat_pair(record) {
                return pair;
            }
        }
        ElementPlan::Child {
            segment: strip_dots(&self.record_name(key, index, &visible)),
        }
    }

    /// Segment for a structured element: positional default, then the
    /// heuristic chain, then the preferred name, then forced indexing
    ///
    /// Hidden password fields never contribute to the name.
    pub fn record_name(&self, key: &str, index: usize, record: &JsonObject) -> String {
        if self.options.force_index {
            return index_segment(key, index, self.options, true);
        }

        let record = self.visible_fields(record);
        let mut name = index_segment(key, index, self.options, false);
        if let Some(found) = heuristic_name(&record) {
            name = found;
        }
        if let Some(found) = self.preferred.as_ref().and_then(|p| p.extract(&record)) {
            name = found;
        }
        name
    }

    /// `record` without the fields `removePasswords` hides
    fn visible_fields<'r>(&self, record: &'r JsonObject) -> Cow<'r, JsonObject> {
        if !record.keys().any(|k| self.options.is_hidden_password(k)) {
            return Cow::Borrowed(record);
        }
        Cow::Owned(
            record
                .iter()
                .filter(|(k, _)| !self.options.is_hidden_password(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

/// Collapse `{k1: v1, k2: v2}` with two scalar values into `v1 = v2`
fn flat_pair(record: &JsonObject) -> Option<ElementPlan> {
    if record.len() != 2 {
        return None;
    }
    let mut entries = record.iter();
    let (first_key, first) = entries.next()?;
    let (second_key, second) = entries.next()?;

    if !is_scalar(first) || !is_scalar(second) || first.as_str() == Some("null") {
        return None;
    }

    let label = scalar_text(first).unwrap_or_default();
    let segment = if label.is_empty() {
        first_key.clone()
    } else {
        label
    };
    Some(ElementPlan::FlatPair {
        segment: strip_dots(&segment),
        name: format!("{first_key} {second_key}"),
        value: second.clone(),
    })
}

fn is_scalar(value: &JsonValue) -> bool {
    matches!(
        value,
        JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_)
    )
}
