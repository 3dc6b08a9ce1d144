//! Context fields attached to log records.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A key/value pair carried by a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Field whose value is the `Display` rendering of `value`.
    pub fn display(key: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(key, value.to_string())
    }

    /// `error` field holding the error message.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::display("error", err)
    }
}

/// Extend `base` with `extra`, in order.
///
/// A key already present keeps its position but takes the newer value.
pub fn merge_fields(base: &[Field], extra: &[Field]) -> Vec<Field> {
    let mut merged = base.to_vec();
    for field in extra {
        match merged.iter_mut().find(|f| f.key == field.key) {
            Some(existing) => existing.value = field.value.clone(),
            None => merged.push(field.clone()),
        }
    }
    merged
}
