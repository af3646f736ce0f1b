//! Structured query filters.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Value as JsonValue, json};

use super::ObjectId;

/// Pseudo-key carrying a free-text search.
pub const TEXT_KEY: &str = "$text";

/// Match applied to one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact value, or a document of `$`-operators.
    Literal(JsonValue),
    /// Regular expression over string values.
    Regex { pattern: String, case_insensitive: bool },
    /// Free-text search; only valid under [`TEXT_KEY`].
    Text { search: String },
    /// Document identifier match on `_id`.
    ObjectId(ObjectId),
}

impl Condition {
    /// Case-insensitive whole-string match of `value`. The value is not escaped.
    pub fn anchored_regex(value: &str) -> Self {
        Self::Regex { pattern: format!("^{value}$"), case_insensitive: true }
    }

    pub fn to_document(&self) -> JsonValue {
        match self {
            Self::Literal(v) => v.clone(),
            Self::Regex { pattern, case_insensitive } => {
                if *case_insensitive {
                    json!({"$regex": pattern, "$options": "i"})
                } else {
                    json!({"$regex": pattern})
                }
            }
            Self::Text { search } => json!({"$search": search}),
            Self::ObjectId(oid) => json!({"$oid": oid.to_hex()}),
        }
    }
}

/// Filter produced by the query parser, keyed by canonical field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    conditions: BTreeMap<String, Condition>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spec matching every record.
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Free-text search spec.
    pub fn text(search: impl Into<String>) -> Self {
        let mut spec = Self::new();
        spec.insert(TEXT_KEY, Condition::Text { search: search.into() });
        spec
    }

    /// Add a condition, replacing any previous one on the same key.
    pub fn insert(&mut self, key: impl Into<String>, condition: Condition) {
        self.conditions.insert(key.into(), condition);
    }

    pub fn get(&self, key: &str) -> Option<&Condition> {
        self.conditions.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Condition)> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render as a MongoDB-style filter document.
    pub fn to_document(&self) -> JsonValue {
        JsonValue::Object(
            self.conditions.iter().map(|(k, c)| (k.clone(), c.to_document())).collect(),
        )
    }
}

impl Serialize for QuerySpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_document())
    }
}
