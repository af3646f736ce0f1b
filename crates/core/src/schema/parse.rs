//! Schema file discovery and parsing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};
use walkdir::WalkDir;

use super::definition::Schema;
use super::errors::SchemaLoadError;
use super::field::{FieldType, SchemaFieldSpec};

/// Attributes a field record may carry.
pub const FIELD_ATTRIBUTES: &[&str] =
    &["key", "type", "optional", "multiple", "section", "value", "placeholder", "description"];

/// On-disk format of a schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Yaml,
}

impl SchemaFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// How field records are projected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject attributes outside [`FIELD_ATTRIBUTES`] instead of dropping them.
    pub strict: bool,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn lax() -> Self {
        Self { strict: false }
    }
}

/// Discover schema files in a directory.
///
/// Finds `.json`, `.yaml` and `.yml` files (non-recursive), sorted by path.
/// Returns an empty list if the directory doesn't exist.
pub fn discover_schema_files(root: &Path) -> Result<Vec<PathBuf>, SchemaLoadError> {
    if !root.exists() {
        return Ok(vec![]);
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(root).max_depth(1) {
        let entry = entry.map_err(|e| SchemaLoadError::Walk(root.display().to_string(), e))?;

        let path = entry.path();
        if path.is_file() && SchemaFormat::from_path(path).is_some() {
            out.push(path.to_path_buf());
        }
    }

    out.sort();
    Ok(out)
}

/// Read and parse a schema file.
pub fn load_schema_from_file(path: &Path, opts: ParseOptions) -> Result<Schema, SchemaLoadError> {
    let format = SchemaFormat::from_path(path)
        .ok_or_else(|| SchemaLoadError::UnsupportedFormat(path.to_path_buf()))?;

    let source = fs::read_to_string(path).map_err(|e| SchemaLoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_schema(&source, format, path, opts)
}

/// Parse schema source text in the given format.
///
/// `path` is recorded as the schema's source path and used in errors.
pub fn parse_schema(
    source: &str,
    format: SchemaFormat,
    path: &Path,
    opts: ParseOptions,
) -> Result<Schema, SchemaLoadError> {
    let document: JsonValue = match format {
        SchemaFormat::Json => serde_json::from_str(source).map_err(|e| SchemaLoadError::Json {
            path: path.to_path_buf(),
            source: e,
        })?,
        SchemaFormat::Yaml => serde_yaml::from_str(source).map_err(|e| SchemaLoadError::Yaml {
            path: path.to_path_buf(),
            source: e,
        })?,
    };

    let records = document
        .as_array()
        .ok_or_else(|| SchemaLoadError::NotAList(path.to_path_buf()))?;

    let mut fields: HashMap<String, SchemaFieldSpec> = HashMap::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let spec = extract_field(record, index, path, opts)?;
        if fields.contains_key(&spec.key) {
            return Err(SchemaLoadError::DuplicateKey {
                path: path.to_path_buf(),
                key: spec.key,
            });
        }
        fields.insert(spec.key.clone(), spec);
    }

    Ok(Schema {
        source_path: path.to_path_buf(),
        fields,
    })
}

/// Project one attribute map onto a field record.
fn extract_field(
    record: &JsonValue,
    index: usize,
    path: &Path,
    opts: ParseOptions,
) -> Result<SchemaFieldSpec, SchemaLoadError> {
    let invalid = |message: String| SchemaLoadError::InvalidField {
        path: path.to_path_buf(),
        index,
        message,
    };

    let map = record
        .as_object()
        .ok_or_else(|| invalid("field record must be a map".to_string()))?;

    let key = match map.get("key") {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(JsonValue::String(_)) => return Err(invalid("'key' must not be empty".into())),
        Some(_) => return Err(invalid("'key' must be a string".into())),
        None => return Err(invalid("missing 'key'".into())),
    };

    let type_name = match map.get("type") {
        Some(JsonValue::String(s)) => s.clone(),
        Some(_) => return Err(invalid(format!("'type' of '{key}' must be a string"))),
        None => return Err(invalid(format!("missing 'type' for '{key}'"))),
    };
    let field_type: FieldType =
        type_name.parse().map_err(|_| SchemaLoadError::UnknownType {
            path: path.to_path_buf(),
            key: key.clone(),
            type_name: type_name.clone(),
        })?;

    for attribute in map.keys() {
        if FIELD_ATTRIBUTES.contains(&attribute.as_str()) {
            continue;
        }
        if opts.strict {
            return Err(SchemaLoadError::UnknownAttribute {
                path: path.to_path_buf(),
                key,
                attribute: attribute.clone(),
            });
        }
        tracing::debug!(
            "Dropping unknown attribute '{}' of '{}' in {}",
            attribute,
            key,
            path.display()
        );
    }

    let optional = bool_attr(map, "optional").map_err(&invalid)?;
    let multiple = bool_attr(map, "multiple").map_err(&invalid)?;
    let section = string_attr(map, "section").map_err(&invalid)?;
    let placeholder = string_attr(map, "placeholder").map_err(&invalid)?;
    let description = string_attr(map, "description").map_err(&invalid)?;
    let value = map.get("value").filter(|v| !v.is_null()).cloned();

    Ok(SchemaFieldSpec {
        key,
        field_type,
        optional,
        multiple,
        section,
        value,
        placeholder,
        description,
    })
}

fn bool_attr(map: &Map<String, JsonValue>, name: &str) -> Result<bool, String> {
    match map.get(name) {
        None | Some(JsonValue::Null) => Ok(false),
        Some(JsonValue::Bool(b)) => Ok(*b),
        Some(other) => Err(format!("'{name}' must be a boolean, got {other}")),
    }
}

fn string_attr(map: &Map<String, JsonValue>, name: &str) -> Result<String, String> {
    match map.get(name) {
        None | Some(JsonValue::Null) => Ok(String::new()),
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("'{name}' must be a string, got {other}")),
    }
}
