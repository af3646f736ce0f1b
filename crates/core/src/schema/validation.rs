//! Record validation against a schema.

use super::definition::Schema;
use super::errors::{ValidationError, ValidationReport};
use super::field::{FieldType, SchemaFieldSpec};
use crate::record::{Record, Value};

/// Administrative keys injected by the intake layer; never declared by schemas.
pub const SKIP_KEYS: &[&str] = &["User", "Date", "Description", "SchemaName", "SchemaFile", "Schema"];

/// Validate a record, returning the first failure.
///
/// Keys are checked in sorted order, then mandatory keys. Pure: neither the
/// schema nor the record is touched.
pub fn validate(schema: &Schema, record: &Record) -> Result<(), ValidationError> {
    validate_all(schema, record).into_result()
}

/// Validate a record and collect every failure.
pub fn validate_all(schema: &Schema, record: &Record) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (key, value) in record {
        if SKIP_KEYS.contains(&key.as_str()) {
            continue;
        }

        let Some(spec) = schema.get_field(key) else {
            report.add_error(ValidationError::UnknownField { key: key.clone() });
            continue;
        };

        if !type_matches(spec.field_type, value) {
            report.add_error(ValidationError::TypeMismatch {
                key: key.clone(),
                declared: spec.field_type.to_string(),
                actual: value.type_name().to_string(),
            });
            continue;
        }

        if let Some(bad) = first_disallowed(spec, value) {
            report.add_error(ValidationError::ValueNotAllowed { key: key.clone(), value: bad });
            continue;
        }

        if spec.field_type == FieldType::Int64 && matches!(value, Value::Float(_)) && !value.is_zero() {
            report.add_warning(format!("key '{key}': float {value} accepted as int64"));
        }
    }

    let missing: Vec<String> = schema
        .mandatory_keys()
        .into_iter()
        .filter(|k| !record.contains_key(*k))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        report.add_error(ValidationError::MissingMandatoryFields { missing });
    }

    report
}

/// Whether `value` is acceptable for a field declared as `declared`.
pub fn type_matches(declared: FieldType, value: &Value) -> bool {
    // Untyped decoding collapses every zero numeric.
    if declared.is_numeric() && value.is_zero() {
        return true;
    }

    match (declared, value) {
        (FieldType::Bool, Value::Bool(_)) => true,
        (FieldType::Int | FieldType::Int64, Value::Int(_)) => true,
        (FieldType::Int64, Value::Float(f)) => f.is_finite() && f.fract() == 0.0,
        (FieldType::Float | FieldType::Float64, v) => v.is_number(),
        (FieldType::String, Value::String(_)) => true,
        (FieldType::ListStr, Value::List(items)) => {
            items.iter().all(|v| matches!(v, Value::String(_)))
        }
        (FieldType::ListInt, Value::List(items)) => items.iter().all(|v| matches!(v, Value::Int(_))),
        (FieldType::ListFloat, Value::List(items)) => items.iter().all(Value::is_number),
        (FieldType::List, Value::List(_)) => true,
        _ => false,
    }
}

/// First element of `value` outside the field's enumeration, if any.
fn first_disallowed(spec: &SchemaFieldSpec, value: &Value) -> Option<String> {
    let allowed = spec.enumeration()?;
    let elements: &[Value] = match value {
        Value::List(items) => items,
        scalar => std::slice::from_ref(scalar),
    };

    elements
        .iter()
        .map(|v| v.to_string().trim().to_string())
        .find(|v| !allowed.iter().any(|a| a == v))
}
