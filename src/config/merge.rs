//! Tier merging for configuration values.
//!
//! Tiers are merged as JSON trees: objects merge key by key, everything else
//! (including arrays) is replaced wholesale by the higher tier. Keys are
//! lowercased before merging so file and environment keys match regardless of
//! case.

use serde_json::{Map, Value};

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - If overlay is null, the base value is preserved (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use service_bootstrap::config::deep_merge;
///
/// let base = json!({
///     "kafka": { "topic": "analytics", "brokers": ["a:9092", "b:9092"] }
/// });
/// let overlay = json!({
///     "kafka": { "brokers": ["c:9092"] }
/// });
/// let result = deep_merge(base, overlay);
/// assert_eq!(result, json!({ "kafka": { "topic": "analytics", "brokers": ["c:9092"] } }));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge multiple values in order, with later values taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

/// Lowercase every object key, recursively.
///
/// When two keys collide after lowercasing, the one appearing later wins.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), normalize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Value at a dotted `path`, if every segment resolves through an object.
pub fn value_at<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, part| node.get(part))
}

/// Insert `value` at a dotted `path`, creating intermediate objects.
pub fn insert_path(root: &mut Value, path: &str, value: Value) {
    let mut parts = path.split('.').peekable();
    let mut node = root;
    while let Some(part) = parts.next() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return;
        };
        if parts.peek().is_none() {
            map.insert(part.to_string(), value);
            return;
        }
        node = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_nested_objects() {
        let base = json!({
            "server": {"host": "0.0.0.0", "port": 8080},
            "jwt": {"expiremins": 60}
        });
        let overlay = json!({
            "server": {"port": 9000}
        });
        let result = deep_merge(base, overlay);
        assert_eq!(
            result,
            json!({
                "server": {"host": "0.0.0.0", "port": 9000},
                "jwt": {"expiremins": 60}
            })
        );
    }

    #[test]
    fn test_arrays_replaced_not_merged() {
        let base = json!({"brokers": ["a", "b", "c"]});
        let overlay = json!({"brokers": ["d"]});
        assert_eq!(deep_merge(base, overlay), json!({"brokers": ["d"]}));
    }

    #[test]
    fn test_null_preserves_base() {
        let base = json!({"a": 1, "b": {"c": 2}});
        let overlay = json!({"a": null, "b": {"c": null}});
        assert_eq!(deep_merge(base, overlay), json!({"a": 1, "b": {"c": 2}}));
    }

    #[test]
    fn test_merge_all_later_wins() {
        let values = vec![json!({"a": 1}), json!({"b": 2}), json!({"a": 3, "c": 4})];
        assert_eq!(deep_merge_all(values), json!({"a": 3, "b": 2, "c": 4}));
    }

    #[test]
    fn test_normalize_keys_lowercases_recursively() {
        let value = json!({"Server": {"readTimeout": 5}, "kafka": {"Brokers": ["A:1"]}});
        assert_eq!(
            normalize_keys(value),
            json!({"server": {"readtimeout": 5}, "kafka": {"brokers": ["A:1"]}})
        );
    }

    #[test]
    fn test_value_at_walks_objects_only() {
        let root = json!({
            "server": {"port": {"value": 9000}},
            "kafka": {"brokers": ["a", "b"]},
            "jwt": 5
        });
        assert_eq!(value_at(&root, "server.port"), Some(&json!({"value": 9000})));
        assert_eq!(value_at(&root, "kafka.brokers"), Some(&json!(["a", "b"])));
        assert_eq!(value_at(&root, "jwt.secret"), None);
        assert_eq!(value_at(&root, "redis.host"), None);
    }

    #[test]
    fn test_insert_path_builds_objects() {
        let mut root = Value::Null;
        insert_path(&mut root, "server.port", json!(1));
        insert_path(&mut root, "server.host", json!("h"));
        insert_path(&mut root, "jwt.secret", json!("s"));
        assert_eq!(
            root,
            json!({"server": {"port": 1, "host": "h"}, "jwt": {"secret": "s"}})
        );
    }
}
