//! Configuration resolver with tier-based merging.
//!
//! Loads configuration from defaults, an optional config file and the
//! environment, merges them field-by-field and decodes the result into
//! [`Settings`].

use super::env::{env_overrides, process_env};
use super::keys::KNOWN_KEYS;
use super::merge::{deep_merge_all, insert_path, normalize_keys, value_at};
use super::types::Settings;
use crate::error::ConfigError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Base name of the config file, without extension.
pub const CONFIG_FILE_NAME: &str = "config";

/// Recognized config file extensions, in lookup order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["yaml", "yml", "json", "toml"];

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Compiled-in defaults (lowest priority)
    Defaults = 0,
    /// `config.<ext>` from the first search path that has one
    File = 1,
    /// Environment variables (highest priority)
    Environment = 2,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::File => write!(f, "file"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: Settings,
    /// Config file that contributed the file tier, if one was found.
    pub source: Option<PathBuf>,
}

/// Resolves [`Settings`] from defaults, config file and environment.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    search_paths: Vec<PathBuf>,
    env: Option<Vec<(String, String)>>,
}

impl ConfigResolver {
    /// Search `config_dir` first, then the working directory.
    pub fn new(config_dir: impl AsRef<Path>) -> Self {
        let config_dir = config_dir.as_ref().to_path_buf();
        let cwd = PathBuf::from(".");
        let mut search_paths = vec![config_dir.clone()];
        if config_dir != cwd {
            search_paths.push(cwd);
        }
        Self {
            search_paths,
            env: None,
        }
    }

    /// Replace the directories searched for the config file.
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths = paths.into_iter().collect();
        self
    }

    /// Use the given variables instead of the process environment.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// First `config.<ext>` found, walking search paths then extensions.
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths.iter().find_map(|dir| {
            SUPPORTED_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{CONFIG_FILE_NAME}.{ext}")))
                .find(|candidate| candidate.is_file())
        })
    }

    /// Run the full resolution pipeline.
    pub fn resolve(&self) -> Result<Resolved, ConfigError> {
        let mut tiers: Vec<(ConfigTier, Value)> = Vec::with_capacity(3);

        // Tier 1: Defaults
        let defaults = normalize_keys(serde_json::to_value(Settings::default())?);
        tiers.push((ConfigTier::Defaults, defaults.clone()));

        // Tier 2: Config file (absence is not an error)
        let source = self.find_config_file();
        match &source {
            Some(path) => {
                info!(path = %path.display(), "loading config file");
                tiers.push((ConfigTier::File, normalize_keys(read_config_file(path)?)));
            }
            None => {
                info!(
                    searched = ?self.search_paths,
                    "config file not found, using defaults and environment variables"
                );
            }
        }

        // Tier 3: Environment
        let env = match &self.env {
            Some(vars) => env_overrides(vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
            None => env_overrides(process_env()),
        };
        tiers.push((ConfigTier::Environment, env));

        let names: Vec<String> = tiers.iter().map(|(tier, _)| tier.to_string()).collect();
        debug!(tiers = ?names, "merging config tiers");
        let merged = deep_merge_all(tiers.into_iter().map(|(_, value)| value));
        let settings = decode(&merged, &defaults)?;

        Ok(Resolved { settings, source })
    }
}

/// Resolve settings, looking for the config file in `config_dir` then the
/// working directory, with overrides from the process environment.
pub fn resolve(config_dir: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    ConfigResolver::new(config_dir)
        .resolve()
        .map(|resolved| resolved.settings)
}

/// Parse a config file into a JSON tree according to its extension.
fn read_config_file(path: &Path) -> Result<Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let value: Value = match ext.as_str() {
        "json" => serde_json::from_str(&content).map_err(|e| ConfigError::parse(path, e))?,
        "toml" => toml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?,
        _ => serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))?,
    };

    match value {
        // Empty or comment-only YAML parses as null
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(value),
        _ => Err(ConfigError::parse(path, "top level must be a mapping")),
    }
}

/// Decode the merged tree into [`Settings`].
///
/// Only recognized keys are carried over; everything else is ignored. Whatever
/// sits at a key's path is coerced to its declared type, so a mapping where a
/// scalar belongs is a coercion failure. The default applies only when the
/// path is absent.
fn decode(merged: &Value, defaults: &Value) -> Result<Settings, ConfigError> {
    let mut tree = Value::Object(Map::new());
    for spec in KNOWN_KEYS {
        let key = spec.normalized();
        if let Some(raw) = value_at(merged, &key).or_else(|| value_at(defaults, &key)) {
            insert_path(&mut tree, spec.path, spec.coerce(raw)?);
        }
    }

    Ok(serde_json::from_value(tree)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver(dir: &Path) -> ConfigResolver {
        ConfigResolver::new(dir)
            .with_search_paths([dir.to_path_buf()])
            .with_env(Vec::<(String, String)>::new())
    }

    #[test]
    fn test_new_searches_dir_then_cwd() {
        let resolver = ConfigResolver::new("/etc/app");
        assert_eq!(
            resolver.search_paths(),
            &[PathBuf::from("/etc/app"), PathBuf::from(".")]
        );

        let resolver = ConfigResolver::new(".");
        assert_eq!(resolver.search_paths(), &[PathBuf::from(".")]);
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let resolved = resolver(temp.path()).resolve().unwrap();

        assert!(resolved.source.is_none());
        assert_eq!(resolved.settings, Settings::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.yaml"),
            "server:\n  port: 9000\n",
        )
        .unwrap();

        let resolved = resolver(temp.path()).resolve().unwrap();
        assert_eq!(resolved.source, Some(temp.path().join("config.yaml")));
        assert_eq!(resolved.settings.server.port, 9000);
        // Siblings keep their defaults
        assert_eq!(resolved.settings.server.host, "0.0.0.0");
        assert_eq!(resolved.settings.server.read_timeout, 10);
    }

    #[test]
    fn test_extension_order_prefers_yaml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.json"), r#"{"server": {"port": 1}}"#).unwrap();
        std::fs::write(temp.path().join("config.yaml"), "server:\n  port: 2\n").unwrap();

        let resolved = resolver(temp.path()).resolve().unwrap();
        assert_eq!(resolved.settings.server.port, 2);
    }

    #[test]
    fn test_first_search_path_wins() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(second.join("config.yaml"), "redis:\n  db: 2\n").unwrap();

        let resolved = ConfigResolver::new(&first)
            .with_search_paths([first.clone(), second.clone()])
            .with_env(Vec::<(String, String)>::new())
            .resolve()
            .unwrap();
        assert_eq!(resolved.settings.redis.db, 2);

        std::fs::write(first.join("config.toml"), "[redis]\ndb = 1\n").unwrap();
        let resolved = ConfigResolver::new(&first)
            .with_search_paths([first.clone(), second])
            .with_env(Vec::<(String, String)>::new())
            .resolve()
            .unwrap();
        assert_eq!(resolved.settings.redis.db, 1);
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.yaml"), "# nothing here\n").unwrap();

        let resolved = resolver(temp.path()).resolve().unwrap();
        assert_eq!(resolved.settings, Settings::default());
    }

    #[test]
    fn test_non_mapping_root_is_parse_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.yaml"), "- just\n- a list\n").unwrap();

        let err = resolver(temp.path()).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_clobbered_group_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.yaml"), "server: 5\n").unwrap();

        let resolved = resolver(temp.path()).resolve().unwrap();
        assert_eq!(resolved.settings.server, Settings::default().server);
    }

    #[test]
    fn test_mapping_under_scalar_key_is_coercion_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.yaml"),
            "server:\n  host:\n    name: example\n",
        )
        .unwrap();

        let err = resolver(temp.path()).resolve().unwrap_err();
        match err {
            ConfigError::Coercion { key, .. } => assert_eq!(key, "server.host"),
            other => panic!("expected coercion error, got {other:?}"),
        }
    }

    #[test]
    fn test_yaml_null_keeps_lower_tier() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.yaml"), "server:\n  port: ~\n").unwrap();

        let resolved = resolver(temp.path()).resolve().unwrap();
        assert_eq!(resolved.settings.server.port, 8080);
    }

    #[test]
    fn test_tier_display_and_order() {
        assert_eq!(ConfigTier::File.to_string(), "file");
        assert!(ConfigTier::Defaults < ConfigTier::File);
        assert!(ConfigTier::File < ConfigTier::Environment);
    }
}
