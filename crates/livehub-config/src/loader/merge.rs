//! Right-biased overlay of config layers.
//!
//! Objects merge key by key; any other overlay value, arrays included,
//! replaces the lower value wholesale, so an application list from a higher
//! layer supersedes the lower list instead of being spliced into it.
//!
//! `null` means "not set". An empty YAML key such as `static_push:` must fall
//! back to the lower layer or the field default, never reach decoding.

use serde_json::{Map, Value};

/// Overlay `upper` onto `lower` in place.
pub(super) fn merge_values(lower: &mut Value, upper: &Value) {
    match (lower, upper) {
        (_, Value::Null) => {}
        (Value::Object(lower_map), Value::Object(upper_map)) => {
            for (key, upper_value) in upper_map {
                if let Some(slot) = lower_map.get_mut(key) {
                    merge_values(slot, upper_value);
                } else if !upper_value.is_null() {
                    lower_map.insert(key.clone(), strip_nulls(upper_value));
                }
            }
        }
        (slot, replacement) => *slot = strip_nulls(replacement),
    }
}

/// Fold layers lowest-precedence first into a single tree.
pub(super) fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a Value>) -> Value {
    layers
        .into_iter()
        .fold(Value::Object(Map::new()), |mut merged, layer| {
            merge_values(&mut merged, layer);
            merged
        })
}

/// Copy `value`, dropping object entries that are `null` at any depth.
fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, entry)| !entry.is_null())
                .map(|(key, entry)| (key.clone(), strip_nulls(entry)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}
