//! Environment variable tier.
//!
//! Every recognized key can be overridden by an environment variable named
//! after it with dots replaced by underscores (`server.port` -> `SERVER_PORT`).
//! Variable names match case-insensitively. Empty values count as unset.

use super::keys::KNOWN_KEYS;
use super::merge::insert_path;
use serde_json::{Map, Value};
use tracing::debug;

/// Snapshot of the process environment, skipping entries that are not valid UTF-8.
pub fn process_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Build the environment tier from a set of variables.
///
/// Values stay raw strings; coercion to the declared type happens after
/// merging. The result uses lowercase keys, like the other normalized tiers.
/// When several variables differ only in case, the all-uppercase one wins.
pub fn env_overrides<I, K, V>(vars: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut tree = Value::Object(Map::new());
    let mut exact: Vec<&'static str> = Vec::new();

    for (name, value) in vars {
        let (name, value) = (name.as_ref(), value.as_ref());
        if value.is_empty() {
            continue;
        }
        let Some(spec) = KNOWN_KEYS
            .iter()
            .find(|spec| spec.env_var().eq_ignore_ascii_case(name))
        else {
            continue;
        };

        let is_exact = spec.env_var() == name;
        if !is_exact && exact.contains(&spec.path) {
            continue;
        }
        if is_exact {
            exact.push(spec.path);
        }

        debug!(key = spec.path, var = name, "environment override");
        insert_path(&mut tree, &spec.normalized(), Value::String(value.to_string()));
    }

    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_vars_become_overrides() {
        let tree = env_overrides([
            ("SERVER_PORT", "9000"),
            ("DATABASE_INFLUXTOKEN", "secret-token"),
            ("KAFKA_BROKERS", "a:1,b:2"),
        ]);
        assert_eq!(
            tree,
            json!({
                "server": {"port": "9000"},
                "database": {"influxtoken": "secret-token"},
                "kafka": {"brokers": "a:1,b:2"}
            })
        );
    }

    #[test]
    fn test_unknown_and_empty_vars_ignored() {
        let tree = env_overrides([("PATH", "/usr/bin"), ("SERVER_HOST", ""), ("SERVER", "x")]);
        assert_eq!(tree, json!({}));
    }

    #[test]
    fn test_names_match_case_insensitively() {
        let tree = env_overrides([("server_readtimeout", "30")]);
        assert_eq!(tree, json!({"server": {"readtimeout": "30"}}));
    }

    #[test]
    fn test_uppercase_name_wins_over_mixed_case() {
        let tree = env_overrides([("SERVER_PORT", "1"), ("server_port", "2")]);
        assert_eq!(tree, json!({"server": {"port": "1"}}));

        let tree = env_overrides([("server_port", "2"), ("SERVER_PORT", "1")]);
        assert_eq!(tree, json!({"server": {"port": "1"}}));
    }
}
