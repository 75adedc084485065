//! Array key resolution module
//!
//! Arrays from external producers carry no guaranteed identity. Each element
//! gets a path segment from an ordered chain of naming rules, with positional
//! numbering as the fallback and as an explicit override (`forceIndex`).
//!
//! # Overview
//!
//! The array module provides:
//! - `NamingRule` - One heuristic of the chain, evaluated in order, last match wins
//! - `PreferredName` - Parsed `preferredArrayName` (`a`, `a/b`, `a+b`)
//! - `ArrayKeyResolver` - Turns each element into an `ElementPlan`

mod resolver;
mod rules;

pub use resolver::{index_segment, ArrayKeyResolver, ElementPlan};
pub use rules::{heuristic_name, NamingRule, PreferredName, OBJECT_NAMING_RULES};
