//! Structured error types for configuration resolution and logger construction.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    // Configuration errors
    ConfigFileUnreadable,
    ConfigFileMalformed,
    ConfigCoercionFailure,
    ConfigDecodeFailure,

    // Logging errors
    LogSinkOpenFailure,
}

/// Failure while resolving [`Settings`](crate::config::Settings).
///
/// A missing config file is not represented here: resolution falls back to
/// defaults and environment overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading config file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for {key}: {value:?} is not a valid {expected}")]
    Coercion {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("unable to decode config into settings: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn parse(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn coercion(key: &str, value: impl Into<String>, expected: &'static str) -> Self {
        Self::Coercion {
            key: key.to_string(),
            value: value.into(),
            expected,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::ReadFile { .. } => ErrorKind::ConfigFileUnreadable,
            ConfigError::Parse { .. } => ErrorKind::ConfigFileMalformed,
            ConfigError::Coercion { .. } => ErrorKind::ConfigCoercionFailure,
            ConfigError::Decode(_) => ErrorKind::ConfigDecodeFailure,
        }
    }
}

/// Failure while constructing a logger.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("unable to open log file {}: {source}", .path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LogError::SinkOpen { .. } => ErrorKind::LogSinkOpenFailure,
        }
    }
}
