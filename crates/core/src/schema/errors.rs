//! Error types for schema loading and record validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading a schema definition file.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    /// Error reading a schema file.
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON schema file.
    #[error("failed to parse JSON schema {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Malformed YAML schema file.
    #[error("failed to parse YAML schema {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// File extension is neither JSON nor YAML.
    #[error("unsupported data format of schema file {0}")]
    UnsupportedFormat(PathBuf),

    /// Top-level document is not a list of field records.
    #[error("schema file {0} must contain a list of field records")]
    NotAList(PathBuf),

    /// A field record is structurally invalid.
    #[error("invalid field record #{index} in {path}: {message}")]
    InvalidField { path: PathBuf, index: usize, message: String },

    /// A field declares a type tag outside the supported set.
    #[error("unknown type '{type_name}' for key '{key}' in {path}")]
    UnknownType { path: PathBuf, key: String, type_name: String },

    /// Strict mode found an attribute that is not part of the field format.
    #[error("unknown attribute '{attribute}' for key '{key}' in {path}")]
    UnknownAttribute { path: PathBuf, key: String, attribute: String },

    /// The same key is declared twice.
    #[error("duplicate key '{key}' in {path}")]
    DuplicateKey { path: PathBuf, key: String },

    /// Error walking a schema directory.
    #[error("failed to read schema directory {0}: {1}")]
    Walk(String, #[source] walkdir::Error),
}

/// Errors that occur when a record does not conform to its schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Record carries a key the schema does not declare.
    #[error("record key '{key}' is not known")]
    UnknownField { key: String },

    /// Value type is incompatible with the declared type.
    #[error("invalid data type for key '{key}': expected {declared}, got {actual}")]
    TypeMismatch { key: String, declared: String, actual: String },

    /// Value is outside the field's enumeration.
    #[error("invalid data value for key '{key}': '{value}' is not allowed")]
    ValueNotAllowed { key: String, value: String },

    /// Mandatory keys absent from the record.
    #[error("missing mandatory keys: {}", missing.join(", "))]
    MissingMandatoryFields { missing: Vec<String> },
}

impl ValidationError {
    /// Field the error refers to, when it concerns a single key.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::UnknownField { key }
            | Self::TypeMismatch { key, .. }
            | Self::ValueNotAllowed { key, .. } => Some(key),
            Self::MissingMandatoryFields { .. } => None,
        }
    }
}

/// Every failure found while checking a record, for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Validation errors (empty if valid).
    pub errors: Vec<ValidationError>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a warning to the report.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// First error in key order, which is what `validate` reports.
    pub fn first_error(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    /// Convert into the single-error contract.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
