//! Nested mapping helpers for loaded message files

use serde_json::Value;

/// Recursively merge `other` into `base`.
///
/// Mappings merge key by key, lists append values not already present,
/// anything else is replaced by `other`.
pub fn merge_into(base: &mut Value, other: Value) {
    match (base, other) {
        (Value::Object(base), Value::Object(other)) => {
            for (key, value) in other {
                match base.get_mut(&key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(other)) => {
            for value in other {
                if !base.contains(&value) {
                    base.push(value);
                }
            }
        }
        (base, other) => *base = other,
    }
}

/// Look up a dotted key path such as `username.notEmpty`.
///
/// A key containing the whole path literally takes precedence over walking.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(direct) = value.as_object().and_then(|map| map.get(path)) {
        return Some(direct);
    }

    path.split('.').try_fold(value, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
        _ => None,
    })
}
