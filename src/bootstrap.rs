//! Startup wiring shared by the binary and its tests.

use crate::config::{ConfigResolver, Resolved, Settings};
use crate::logging::{self, Field, Logger, StructuredLogger};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] crate::error::ConfigError),
    #[error(transparent)]
    Log(#[from] crate::error::LogError),
}

/// Resolve settings from `config_dir` and build the logger they describe.
pub fn init(config_dir: impl AsRef<Path>) -> Result<(Resolved, StructuredLogger), BootstrapError> {
    let resolved = ConfigResolver::new(config_dir).resolve()?;
    let logger = logging::from_settings(&resolved.settings.logging)?;
    Ok((resolved, logger))
}

/// Log the effective configuration, secrets masked, and warn about
/// credentials that no tier provided.
pub fn report_startup(logger: &dyn Logger, resolved: &Resolved) {
    let settings = &resolved.settings;
    let source = resolved
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());

    logger.info(
        "configuration resolved",
        &[
            Field::new("source", source),
            Field::new("bind", settings.server.bind_address()),
            Field::new("settings", settings.redacted()),
        ],
    );

    for key in missing_credentials(settings) {
        logger.warn("credential not configured", &[Field::new("key", key)]);
    }
}

/// Credential keys that resolved to an empty value.
pub fn missing_credentials(settings: &Settings) -> Vec<&'static str> {
    [
        ("database.influxToken", &settings.database.influx_token),
        ("jwt.secret", &settings.jwt.secret),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(key, _)| key)
    .collect()
}
