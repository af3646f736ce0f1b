//! Untyped metadata records.
//!
//! A record is an order-irrelevant mapping from field name to [`Value`].
//! It is kept in a `BTreeMap` so that diagnostics and "first failure"
//! reporting are deterministic.

pub mod value;

use std::collections::BTreeMap;

use thiserror::Error;

pub use value::Value;

/// One metadata submission keyed by field name.
pub type Record = BTreeMap<String, Value>;

/// Errors raised while decoding a record from JSON.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Input was not valid JSON.
    #[error("failed to decode record: {0}")]
    Decode(#[from] serde_json::Error),

    /// Top-level JSON value was not an object.
    #[error("record must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A field carried `null` or a nested object.
    #[error("unsupported value for field '{key}': {kind}")]
    UnsupportedValue { key: String, kind: &'static str },
}

/// Decode a record from a JSON document.
pub fn from_json_str(input: &str) -> Result<Record, RecordError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    from_json(&value)
}

/// Convert a decoded JSON object into a record.
pub fn from_json(value: &serde_json::Value) -> Result<Record, RecordError> {
    let obj = value.as_object().ok_or(RecordError::NotAnObject(json_kind(value)))?;

    let mut record = Record::new();
    for (key, v) in obj {
        let converted = Value::from_json(v).ok_or_else(|| RecordError::UnsupportedValue {
            key: key.clone(),
            kind: unsupported_kind(v),
        })?;
        record.insert(key.clone(), converted);
    }
    Ok(record)
}

/// Render a record as a JSON object.
pub fn to_json(record: &Record) -> serde_json::Value {
    serde_json::Value::Object(
        record.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
    )
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn unsupported_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .find(|v| Value::from_json(v).is_none())
            .map_or("array", unsupported_kind),
        other => json_kind(other),
    }
}
