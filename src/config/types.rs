//! Configuration types and structures.
//!
//! Field names serialize to the keys used in config files (`server.readTimeout`,
//! `database.influxURL`, ...). Every group implements `Default`, and those
//! defaults form the lowest resolution tier.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Placeholder written in place of secret values by [`Settings::redacted`].
pub const REDACTED: &str = "****";

/// Fully resolved application settings.
///
/// Built once at startup and handed to consumers by value or reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub kafka: KafkaSettings,
    pub logging: LoggingSettings,
    pub jwt: JwtSettings,
}

impl Settings {
    /// JSON view of the settings with secrets masked.
    ///
    /// Empty secrets stay empty so a missing credential is still visible.
    pub fn redacted(&self) -> Value {
        let mut view = serde_json::to_value(self).unwrap_or_default();
        for path in [
            ["database", "influxToken"],
            ["database", "influxPassword"],
            ["redis", "password"],
            ["jwt", "secret"],
        ] {
            if let Some(slot) = view
                .get_mut(path[0])
                .and_then(|group| group.get_mut(path[1]))
                && slot.as_str().is_some_and(|s| !s.is_empty())
            {
                *slot = Value::String(REDACTED.to_string());
            }
        }
        view
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    /// Read timeout in seconds.
    #[serde(rename = "readTimeout")]
    pub read_timeout: u64,
    /// Write timeout in seconds.
    #[serde(rename = "writeTimeout")]
    pub write_timeout: u64,
    pub host: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8080,
            read_timeout: 10,
            write_timeout: 10,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl ServerSettings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout)
    }

    /// `host:port` suitable for binding a listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Time-series database settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    #[serde(rename = "influxURL")]
    pub influx_url: String,
    #[serde(rename = "influxOrg")]
    pub influx_org: String,
    #[serde(rename = "influxBucket")]
    pub influx_bucket: String,
    /// No default; must come from the config file or environment.
    #[serde(rename = "influxToken")]
    pub influx_token: String,
    #[serde(rename = "influxPassword")]
    pub influx_password: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            influx_url: "http://localhost:8086".to_string(),
            influx_org: "analytics".to_string(),
            influx_bucket: "metrics".to_string(),
            influx_token: String::new(),
            influx_password: String::new(),
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: String,
    /// Logical database index.
    pub db: u32,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: String::new(),
            db: 0,
        }
    }
}

impl RedisSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Message broker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaSettings {
    pub brokers: Vec<String>,
    pub topic: String,
    #[serde(rename = "groupID")]
    pub group_id: String,
}

impl Default for KafkaSettings {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            topic: "analytics".to_string(),
            group_id: "analytics-group".to_string(),
        }
    }
}

/// Logger settings, consumed by [`crate::logging::from_settings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Minimum level name (`debug`, `info`, `warn`, `error`, `fatal`).
    pub level: String,
    /// Log file path; empty means stderr only.
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: String::new(),
        }
    }
}

/// Token signing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    pub secret: String,
    #[serde(rename = "expireMins")]
    pub expire_mins: u64,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expire_mins: 60,
        }
    }
}

impl JwtSettings {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.expire_mins.saturating_mul(60))
    }
}
