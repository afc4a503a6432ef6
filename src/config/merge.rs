//! Configuration merge logic
//!
//! Merges the user document over the default document:
//! - Objects: deep-merge by key, unless the key is in [`NO_MERGE_KEYS`]
//! - No-merge keys, arrays and scalars: the override wins wholesale
//! - Keys only present in the base are carried over unchanged
//!
//! Result order: override keys first (in override order), then base-only keys.

use serde_json::{Map, Value};

/// Keys whose values are replaced wholesale instead of merged
pub const NO_MERGE_KEYS: &[&str] = &["rules", "breakpoints", "colors", "spacements"];

/// Whether `key` is merged recursively when both sides are objects
pub fn is_mergeable_key(key: &str) -> bool {
    !NO_MERGE_KEYS.contains(&key)
}

/// Merge `overlay` over `base`.
///
/// Not commutative: `base` only fills gaps left by `overlay`.
pub fn merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map))
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Merge two JSON objects key by key
pub fn merge_maps(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = Map::with_capacity(base.len().max(overlay.len()));

    for (key, overlay_value) in overlay {
        let value = match (base.get(key), overlay_value) {
            (Some(base_value @ Value::Object(_)), Value::Object(_)) if is_mergeable_key(key) => {
                merge(base_value, overlay_value)
            }
            _ => overlay_value.clone(),
        };
        merged.insert(key.clone(), value);
    }

    for (key, base_value) in base {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), base_value.clone());
        }
    }

    merged
}
