//! Loaded schema structure.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use super::field::SchemaFieldSpec;

/// A parsed schema definition file.
///
/// Immutable once built; a reload produces a new `Schema`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Path to the source file.
    pub source_path: PathBuf,

    /// Field records by canonical key.
    pub fields: HashMap<String, SchemaFieldSpec>,
}

impl Schema {
    pub fn new(source_path: impl Into<PathBuf>, fields: Vec<SchemaFieldSpec>) -> Self {
        Self {
            source_path: source_path.into(),
            fields: fields.into_iter().map(|f| (f.key.clone(), f)).collect(),
        }
    }

    /// Schema name (file stem), e.g. `ID3A` for `/srv/schemas/ID3A.json`.
    pub fn name(&self) -> String {
        schema_name(&self.source_path)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn get_field(&self, key: &str) -> Option<&SchemaFieldSpec> {
        self.fields.get(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Optional keys, sorted.
    pub fn optional_keys(&self) -> Vec<&str> {
        self.filtered_keys(|f| f.optional)
    }

    /// Mandatory keys, sorted.
    pub fn mandatory_keys(&self) -> Vec<&str> {
        self.filtered_keys(SchemaFieldSpec::is_mandatory)
    }

    fn filtered_keys(&self, pred: impl Fn(&SchemaFieldSpec) -> bool) -> Vec<&str> {
        let mut keys: Vec<&str> =
            self.fields.values().filter(|f| pred(f)).map(|f| f.key.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    /// Field records sorted by key, for serialising back to the file format.
    pub fn field_list(&self) -> Vec<&SchemaFieldSpec> {
        let mut fields: Vec<&SchemaFieldSpec> = self.fields.values().collect();
        fields.sort_by(|a, b| a.key.cmp(&b.key));
        fields
    }

    /// Section names.
    ///
    /// Sections listed in `preferred` come first, in that order, followed by
    /// any other section used by the schema in sorted order.
    pub fn sections(&self, preferred: &[String]) -> Vec<String> {
        let used: BTreeSet<&str> = self
            .fields
            .values()
            .filter(|f| !f.section.is_empty())
            .map(|f| f.section.as_str())
            .collect();

        let mut out: Vec<String> = preferred.to_vec();
        for s in used {
            if !out.iter().any(|p| p == s) {
                out.push(s.to_string());
            }
        }
        out
    }

    /// Sorted keys of each section.
    pub fn section_keys(&self, preferred: &[String]) -> Vec<(String, Vec<&str>)> {
        self.sections(preferred)
            .into_iter()
            .map(|section| {
                let keys = self.filtered_keys(|f| f.section == section);
                (section, keys)
            })
            .collect()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<schema {}, map {} entries>", self.source_path.display(), self.fields.len())
    }
}

/// Name of a schema from its file path.
pub fn schema_name(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string()
}
