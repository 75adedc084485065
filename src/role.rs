//! Role inference for leaf values
//!
//! Derives a display role from a scalar's runtime type, its value and
//! whether the leaf is writable. Numbers that look like Unix epoch
//! timestamps (seconds or milliseconds) are tagged as times, but only for
//! read-only leaves.

use crate::types::{JsonValue, Role};

/// Epoch milliseconds window, `[1.5e12, 2e12)`
const EPOCH_MS_RANGE: std::ops::Range<f64> = 1_500_000_000_000.0..2_000_000_000_000.0;

/// Epoch seconds window, `[1.5e9, 2e9)`
const EPOCH_S_RANGE: std::ops::Range<f64> = 1_500_000_000.0..2_000_000_000.0;

/// Infer the role of a scalar value
pub fn infer_role(value: &JsonValue, write: bool) -> Role {
    match value {
        JsonValue::Bool(_) if write => Role::Switch,
        JsonValue::Bool(_) => Role::Indicator,
        JsonValue::Number(_) if write => Role::Level,
        JsonValue::Number(n) => match n.as_f64() {
            Some(f) if looks_like_epoch(f) => Role::ValueTime,
            _ => Role::Value,
        },
        JsonValue::String(_) => Role::Text,
        _ => Role::State,
    }
}

/// 13 integer digits in the millisecond window, or 10 digits (after
/// rounding) in the second window
fn looks_like_epoch(f: f64) -> bool {
    if f == 0.0 || !f.is_finite() {
        return false;
    }
    if f.fract() == 0.0 && digit_count(f) == 13 {
        return EPOCH_MS_RANGE.contains(&f);
    }
    digit_count(f.round()) == 10 && EPOCH_S_RANGE.contains(&f)
}

fn digit_count(f: f64) -> usize {
    format!("{f:.0}").len()
}
