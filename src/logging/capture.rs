//! In-memory logger for tests of code that takes a [`Logger`].

use super::field::{Field, merge_fields};
use super::level::Level;
use super::logger::{Logger, SharedLogger, nested_name};
use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};

/// A record as seen by [`CapturingLogger`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    pub level: Level,
    pub logger: Option<String>,
    pub message: String,
    pub fields: Vec<Field>,
}

impl CapturedRecord {
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }
}

/// Logger that stores records instead of writing them.
///
/// Derived loggers append to the same store. Fatal records are stored and
/// counted; nothing terminates.
#[derive(Debug, Clone)]
pub struct CapturingLogger {
    level: Level,
    name: Option<String>,
    fields: Vec<Field>,
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl CapturingLogger {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            name: None,
            fields: Vec::new(),
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    fn push(&self, level: Level, message: &str, fields: &[Field]) {
        let record = CapturedRecord {
            level,
            logger: self.name.clone(),
            message: message.to_string(),
            fields: merge_fields(&self.fields, fields),
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

impl Default for CapturingLogger {
    fn default() -> Self {
        Self::new(Level::Debug)
    }
}

impl Logger for CapturingLogger {
    fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    fn log_at(&self, level: Level, message: &str, fields: &[Field], _: &'static Location<'static>) {
        if self.enabled(level) {
            self.push(level, message, fields);
        }
    }

    fn fatal_at(&self, message: &str, fields: &[Field], _: &'static Location<'static>) {
        self.push(Level::Fatal, message, fields);
    }

    fn with(&self, fields: &[Field]) -> SharedLogger {
        Arc::new(Self {
            fields: merge_fields(&self.fields, fields),
            ..self.clone()
        })
    }

    fn named(&self, name: &str) -> SharedLogger {
        Arc::new(Self {
            name: nested_name(self.name.as_deref(), name),
            ..self.clone()
        })
    }
}
