//! Merge patches
//!
//! JSON merge-patch (RFC 7386) helpers. `diff` builds the minimal patch the
//! client sends for `edit`; `apply` is the server-side merge rule, kept here
//! so the two directions can be tested against each other.
//!
//! Contract: presence is significant. An explicit `null` clears a field; an
//! explicitly empty collection (`[]`/`{}`) is a value like any other and is
//! sent as such, never collapsed into "absent". Arrays are replaced
//! wholesale, never merged element-wise.

use serde_json::{Map, Value};

/// Compute the merge patch that turns `original` into `modified`.
///
/// Only changed keys appear. A key present in `original` but absent in
/// `modified` becomes an explicit `null`. Objects recurse; any other pair of
/// differing values yields the modified value wholesale.
pub fn diff(original: &Value, modified: &Value) -> Value {
    match (original, modified) {
        (Value::Object(before), Value::Object(after)) => {
            let mut patch = Map::new();
            for (key, after_value) in after {
                match before.get(key) {
                    Some(before_value) if before_value == after_value => {}
                    Some(before_value) => {
                        patch.insert(key.clone(), diff(before_value, after_value));
                    }
                    None => {
                        patch.insert(key.clone(), after_value.clone());
                    }
                }
            }
            for key in before.keys() {
                if !after.contains_key(key) {
                    patch.insert(key.clone(), Value::Null);
                }
            }
            Value::Object(patch)
        }
        _ => modified.clone(),
    }
}

/// Apply a merge patch to a document, returning the patched document.
pub fn apply(target: &Value, patch: &Value) -> Value {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            let mut merged = target_map.clone();
            for (key, patch_value) in patch_map {
                if patch_value.is_null() {
                    merged.remove(key);
                    continue;
                }
                let next = match merged.get(key) {
                    Some(existing) => apply(existing, patch_value),
                    None => apply(&Value::Object(Map::new()), patch_value),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        // A non-object target is treated as empty when the patch is an object.
        (_, Value::Object(_)) => apply(&Value::Object(Map::new()), patch),
        _ => patch.clone(),
    }
}
