//! RFC 7396 JSON Merge Patch (§4.7): `null` removes a key, arrays replace
//! wholesale, objects merge recursively, everything else replaces.

use serde_json::{Map, Value};

/// Apply `patch` onto `target` per RFC 7396.
pub fn apply_merge_patch(target: &Value, patch: &Value) -> Value {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            let mut result = target_map.clone();
            for (key, patch_value) in patch_map {
                if patch_value.is_null() {
                    result.remove(key);
                } else {
                    let existing = result.get(key).cloned().unwrap_or(Value::Null);
                    result.insert(key.clone(), apply_merge_patch(&existing, patch_value));
                }
            }
            Value::Object(result)
        }
        // Patch is not an object (or target isn't): the patch wholly
        // replaces the target, per RFC 7396 §2.
        _ => patch.clone(),
    }
}

/// Dotted paths for every leaf value the patch actually changes, relative
/// to `before`. A path appears once per changed leaf; removed keys are
/// included (their "changed" value is absence, represented by the path
/// alone — callers treat a changed path the same whether the value was
/// set or removed).
pub fn changed_paths(before: &Value, patch: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_changed_paths(before, patch, "", &mut paths);
    paths
}

fn collect_changed_paths(before: &Value, patch: &Value, prefix: &str, out: &mut Vec<String>) {
    let Value::Object(patch_map) = patch else {
        if !prefix.is_empty() {
            out.push(prefix.to_string());
        }
        return;
    };

    for (key, patch_value) in patch_map {
        let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
        let before_value = before.get(key);

        match (before_value, patch_value) {
            (Some(Value::Object(_)), Value::Object(_)) => {
                collect_changed_paths(before_value.unwrap(), patch_value, &path, out);
            }
            (Some(existing), new_value) if existing == new_value => {
                // Re-stating an identical value: not a change, caller emits
                // a `mention` event instead (§4.7).
            }
            _ => out.push(path),
        }
    }
}

/// Whether `patch` re-states any path with the exact value it already has
/// in `before` — these become `mention` events rather than contradictions.
pub fn restated_paths(before: &Value, patch: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_restated_paths(before, patch, "", &mut paths);
    paths
}

fn collect_restated_paths(before: &Value, patch: &Value, prefix: &str, out: &mut Vec<String>) {
    let Value::Object(patch_map) = patch else {
        return;
    };

    for (key, patch_value) in patch_map {
        let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
        match (before.get(key), patch_value) {
            (Some(Value::Object(_)), Value::Object(_)) => {
                collect_restated_paths(before.get(key).unwrap(), patch_value, &path, out);
            }
            (Some(existing), new_value) if existing == new_value && !new_value.is_null() => {
                out.push(path);
            }
            _ => {}
        }
    }
}

/// Placeholder so callers can build an empty document without depending
/// on `serde_json::Map` directly.
pub fn empty_document() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_removes_a_key() {
        let target = json!({"a": 1, "b": 2});
        let patch = json!({"b": null});
        assert_eq!(apply_merge_patch(&target, &patch), json!({"a": 1}));
    }

    #[test]
    fn arrays_replace_wholesale() {
        let target = json!({"tags": [1, 2, 3]});
        let patch = json!({"tags": [9]});
        assert_eq!(apply_merge_patch(&target, &patch), json!({"tags": [9]}));
    }

    #[test]
    fn objects_merge_recursively() {
        let target = json!({"work": {"company": "Acme", "role": "eng"}});
        let patch = json!({"work": {"role": "staff eng"}});
        assert_eq!(
            apply_merge_patch(&target, &patch),
            json!({"work": {"company": "Acme", "role": "staff eng"}})
        );
    }

    #[test]
    fn changed_paths_are_dotted_and_nested() {
        let before = json!({"work": {"company": "Acme", "role": "eng"}});
        let patch = json!({"work": {"role": "staff eng"}});
        assert_eq!(changed_paths(&before, &patch), vec!["work.role".to_string()]);
    }

    #[test]
    fn restating_identical_value_is_not_a_changed_path() {
        let before = json!({"name": "Sam"});
        let patch = json!({"name": "Sam"});
        assert!(changed_paths(&before, &patch).is_empty());
        assert_eq!(restated_paths(&before, &patch), vec!["name".to_string()]);
    }
}
