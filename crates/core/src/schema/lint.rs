//! Offline checks for schema files.
//!
//! Linting always parses strictly and additionally verifies that default
//! values and enumerations agree with the declared field type.

use std::fmt;
use std::path::Path;

use serde_json::Value as JsonValue;

use super::definition::Schema;
use super::errors::SchemaLoadError;
use super::field::{FieldType, SchemaFieldSpec};
use super::parse::{ParseOptions, load_schema_from_file};
use super::validation::type_matches;
use crate::record::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    Error,
    Warning,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A problem found in one field record.
#[derive(Debug, Clone, PartialEq)]
pub struct LintIssue {
    pub key: String,
    pub severity: LintSeverity,
    pub message: String,
}

/// Lint result for one file.
#[derive(Debug, Clone)]
pub struct LintReport {
    pub schema: Schema,
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == LintSeverity::Error)
    }
}

/// Lint a schema file. Structural problems are returned as `Err`.
pub fn lint_schema_file(path: &Path) -> Result<LintReport, SchemaLoadError> {
    let schema = load_schema_from_file(path, ParseOptions::strict())?;
    let issues = lint_schema(&schema);
    Ok(LintReport { schema, issues })
}

/// Check every field of an already parsed schema, in key order.
pub fn lint_schema(schema: &Schema) -> Vec<LintIssue> {
    let mut issues = Vec::new();
    for field in schema.field_list() {
        if field.section.is_empty() {
            issues.push(LintIssue {
                key: field.key.clone(),
                severity: LintSeverity::Warning,
                message: "no section".to_string(),
            });
        }
        if let Some(bad) = mismatched_value(field) {
            issues.push(LintIssue {
                key: field.key.clone(),
                severity: LintSeverity::Error,
                message: format!("type {} does not match value {bad}", field.field_type),
            });
        }
    }
    issues
}

/// First entry of the field's `value` that contradicts its declared type.
fn mismatched_value(field: &SchemaFieldSpec) -> Option<String> {
    let value = field.value.as_ref()?;
    let element_type = field.field_type.element_type();

    match value {
        JsonValue::Array(items) => items
            .iter()
            .find(|item| match element_type {
                Some(t) => !value_fits(t, item),
                None if field.field_type == FieldType::List => false,
                None => !value_fits(field.field_type, item),
            })
            .map(JsonValue::to_string),
        scalar => (!value_fits(field.field_type, scalar)).then(|| scalar.to_string()),
    }
}

fn value_fits(declared: FieldType, json: &JsonValue) -> bool {
    match json {
        JsonValue::Null => true,
        JsonValue::String(s) if s.is_empty() => true,
        JsonValue::String(s) if declared == FieldType::Bool => s == "true" || s == "false",
        other => Value::from_json(other).is_some_and(|v| type_matches(declared, &v)),
    }
}
