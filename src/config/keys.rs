//! Table of recognized configuration keys and their declared types.
//!
//! Values from every tier pass through [`KeySpec::coerce`] before being decoded
//! into [`Settings`](super::Settings). Environment variables always arrive as
//! strings, file values may be loosely typed (`port: "8080"`).

use crate::error::ConfigError;
use serde_json::Value;

/// Delimiter used when a list-typed key is given as a single string.
pub const LIST_DELIMITER: char = ',';

/// Declared type of a configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    U16,
    U32,
    U64,
    Text,
    TextList,
}

impl ValueKind {
    /// Human readable name used in coercion errors.
    pub fn describe(self) -> &'static str {
        match self {
            ValueKind::U16 => "integer in 0..=65535",
            ValueKind::U32 => "non-negative 32-bit integer",
            ValueKind::U64 => "non-negative integer",
            ValueKind::Text => "string",
            ValueKind::TextList => "list of strings",
        }
    }

    fn max(self) -> u64 {
        match self {
            ValueKind::U16 => u16::MAX as u64,
            ValueKind::U32 => u32::MAX as u64,
            _ => u64::MAX,
        }
    }
}

/// One recognized key, written with the casing used in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub path: &'static str,
    pub kind: ValueKind,
}

const fn key(path: &'static str, kind: ValueKind) -> KeySpec {
    KeySpec { path, kind }
}

pub const KNOWN_KEYS: &[KeySpec] = &[
    key("server.port", ValueKind::U16),
    key("server.readTimeout", ValueKind::U64),
    key("server.writeTimeout", ValueKind::U64),
    key("server.host", ValueKind::Text),
    key("database.influxURL", ValueKind::Text),
    key("database.influxOrg", ValueKind::Text),
    key("database.influxBucket", ValueKind::Text),
    key("database.influxToken", ValueKind::Text),
    key("database.influxPassword", ValueKind::Text),
    key("redis.host", ValueKind::Text),
    key("redis.port", ValueKind::U16),
    key("redis.password", ValueKind::Text),
    key("redis.db", ValueKind::U32),
    key("kafka.brokers", ValueKind::TextList),
    key("kafka.topic", ValueKind::Text),
    key("kafka.groupID", ValueKind::Text),
    key("logging.level", ValueKind::Text),
    key("logging.file", ValueKind::Text),
    key("jwt.secret", ValueKind::Text),
    key("jwt.expireMins", ValueKind::U64),
];

impl KeySpec {
    /// Lookup form of the key: lowercase, dot separated.
    pub fn normalized(&self) -> String {
        self.path.to_ascii_lowercase()
    }

    /// Environment variable that overrides this key (`server.readTimeout` -> `SERVER_READTIMEOUT`).
    pub fn env_var(&self) -> String {
        self.path.replace('.', "_").to_ascii_uppercase()
    }

    /// Coerce a raw tier value to this key's declared type.
    pub fn coerce(&self, raw: &Value) -> Result<Value, ConfigError> {
        let fail = || ConfigError::coercion(self.path, render(raw), self.kind.describe());

        match self.kind {
            ValueKind::U16 | ValueKind::U32 | ValueKind::U64 => {
                let n = match raw {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.trim().parse::<u64>().ok(),
                    _ => None,
                }
                .filter(|n| *n <= self.kind.max())
                .ok_or_else(fail)?;
                Ok(Value::from(n))
            }
            ValueKind::Text => match raw {
                Value::String(_) => Ok(raw.clone()),
                Value::Null => Ok(Value::String(String::new())),
                Value::Number(_) | Value::Bool(_) => Ok(Value::String(raw.to_string())),
                Value::Array(_) | Value::Object(_) => Err(fail()),
            },
            ValueKind::TextList => match raw {
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(Value::String(s.clone())),
                        Value::Number(_) | Value::Bool(_) => Ok(Value::String(item.to_string())),
                        _ => Err(fail()),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                Value::String(s) => Ok(Value::Array(
                    split_list(s).into_iter().map(Value::String).collect(),
                )),
                _ => Err(fail()),
            },
        }
    }
}

/// Find the spec for a dotted key, ignoring case.
pub fn lookup(path: &str) -> Option<&'static KeySpec> {
    KNOWN_KEYS.iter().find(|k| k.path.eq_ignore_ascii_case(path))
}

/// Split a delimited string into trimmed, non-empty elements.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn render(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
