//! User query string parsing.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::convert::{convert_type, is_numeric};
use super::errors::QueryError;
use super::ObjectId;
use super::spec::{Condition, QuerySpec, TEXT_KEY};
use crate::record::json_kind;
use crate::schema::SchemaKeyIndex;

/// Separator between a key and its value.
pub const SEPARATOR: char = ':';

/// Turns query strings into [`QuerySpec`]s.
///
/// Accepted forms, tried in order: a JSON object, `key:value` pairs, free
/// text. Keys of the `key:value` form are resolved through the schema key
/// index.
#[derive(Debug, Clone)]
pub struct QueryParser {
    key_index: Arc<SchemaKeyIndex>,
}

impl QueryParser {
    pub fn new(key_index: Arc<SchemaKeyIndex>) -> Self {
        Self { key_index }
    }

    pub fn parse(&self, query: &str) -> Result<QuerySpec, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            tracing::warn!("Empty query string");
            return Err(QueryError::EmptyQuery);
        }

        if query.contains('{') {
            let spec = parse_structured(query)?;
            tracing::debug!("Found structured spec {}", spec);
            return Ok(spec);
        }

        if query.contains(SEPARATOR) {
            let mut spec = QuerySpec::new();
            for (key, value) in split_key_values(query) {
                let (key, condition) = self.adjust(key, value);
                spec.insert(key, condition);
            }
            tracing::debug!("Parsed '{}' into {}", query, spec);
            return Ok(spec);
        }

        Ok(QuerySpec::text(query))
    }

    /// Map one user key:value pair onto a canonical key and condition.
    fn adjust(&self, key: String, value: String) -> (String, Condition) {
        if key.starts_with('$') {
            return (key, Condition::Literal(JsonValue::String(value)));
        }

        if key == "_id" {
            let condition = match ObjectId::parse_str(&value) {
                Ok(oid) => Condition::ObjectId(oid),
                Err(_) => Condition::Literal(JsonValue::String(value)),
            };
            return (key, condition);
        }

        match self.key_index.resolve(&key) {
            Some(canonical) if is_numeric(&value) => {
                (canonical, Condition::Literal(convert_type(&value).to_json()))
            }
            Some(canonical) => (canonical, Condition::anchored_regex(&value)),
            None => {
                tracing::warn!("Unable to find matching schema key for '{}'", key);
                (key, Condition::Literal(JsonValue::String(value)))
            }
        }
    }
}

/// Decode a JSON filter, recognising `_id` object ids and `$text` searches.
fn parse_structured(query: &str) -> Result<QuerySpec, QueryError> {
    let document: JsonValue = serde_json::from_str(query).map_err(|e| {
        tracing::error!("Unable to parse input query '{}': {}", query, e);
        QueryError::MalformedSpec(e)
    })?;

    let JsonValue::Object(map) = document else {
        return Err(QueryError::NotAnObject(json_kind(&document)));
    };

    let mut spec = QuerySpec::new();
    for (key, value) in map {
        let condition = structured_condition(&key, value);
        spec.insert(key, condition);
    }
    Ok(spec)
}

fn structured_condition(key: &str, value: JsonValue) -> Condition {
    if key == "_id"
        && let Some(oid) = value.as_str().and_then(|s| ObjectId::parse_str(s).ok())
    {
        return Condition::ObjectId(oid);
    }
    if key == TEXT_KEY
        && let Some(search) = value.get("$search").and_then(JsonValue::as_str)
    {
        return Condition::Text { search: search.to_string() };
    }
    Condition::Literal(value)
}

/// Split a `key:value` query into pairs.
///
/// The query is split on `:`. The first segment is the first key. For each
/// following segment: if it is textually equal to the final segment it is
/// the whole value of the current key and splitting stops; otherwise its
/// last space-separated word is the next key and the words before it are
/// the value of the current key.
///
/// A multi-word value followed by another key is therefore ambiguous, and a
/// value cannot contain `:`.
pub fn split_key_values(query: &str) -> Vec<(String, String)> {
    let segments: Vec<&str> = query.split(SEPARATOR).collect();
    let Some((&last, _)) = segments.split_last() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut key = segments[0].to_string();
    for segment in &segments[1..] {
        if *segment == last {
            out.push((key, last.to_string()));
            return out;
        }
        let words: Vec<&str> = segment.split(' ').collect();
        let Some((next_key, value_words)) = words.split_last() else {
            continue;
        };
        out.push((key, value_words.join(" ")));
        key = (*next_key).to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser(keys: &[&str]) -> QueryParser {
        let index = SchemaKeyIndex::new();
        index.extend(keys.iter().copied());
        QueryParser::new(Arc::new(index))
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_split_single_pair() {
        assert_eq!(split_key_values("user:alice"), pairs(&[("user", "alice")]));
    }

    #[test]
    fn test_split_multiple_pairs() {
        assert_eq!(
            split_key_values("user:alice proposal:123"),
            pairs(&[("user", "alice"), ("proposal", "123")])
        );
    }

    #[test]
    fn test_split_multi_word_value() {
        assert_eq!(
            split_key_values("title:beam line test run:5"),
            pairs(&[("title", "beam line test"), ("run", "5")])
        );
        assert_eq!(split_key_values("title:beam line"), pairs(&[("title", "beam line")]));
    }

    #[test]
    fn test_split_stops_at_segment_equal_to_last() {
        // The middle segment equals the final one, so the rest is dropped.
        assert_eq!(split_key_values("a:x:x"), pairs(&[("a", "x")]));
    }

    #[test]
    fn test_split_colon_in_value() {
        assert_eq!(
            split_key_values("date:12:30"),
            pairs(&[("date", ""), ("12", "30")])
        );
    }

    #[test]
    fn test_resolved_key_becomes_regex() {
        let spec = parser(&["User"]).parse("user:alice").unwrap();
        assert_eq!(spec.to_document(), json!({"User": {"$regex": "^alice$", "$options": "i"}}));
    }

    #[test]
    fn test_unresolved_key_is_literal() {
        let spec = parser(&[]).parse("user:alice").unwrap();
        assert_eq!(spec.to_document(), json!({"user": "alice"}));
    }

    #[test]
    fn test_numeric_value_is_literal() {
        let spec = parser(&["Proposal", "Energy"]).parse("proposal:123 energy:7.5").unwrap();
        assert_eq!(spec.to_document(), json!({"Proposal": 123, "Energy": 7.5}));
    }

    #[test]
    fn test_free_text() {
        let spec = parser(&[]).parse("free text search").unwrap();
        assert_eq!(spec.to_document(), json!({"$text": {"$search": "free text search"}}));
    }

    #[test]
    fn test_empty_query() {
        assert!(matches!(parser(&[]).parse(""), Err(QueryError::EmptyQuery)));
        assert!(matches!(parser(&[]).parse("   "), Err(QueryError::EmptyQuery)));
    }

    #[test]
    fn test_object_id_key_value() {
        let spec = parser(&[]).parse("_id:5f1b2c3d4e5f60718293a4b5").unwrap();
        assert!(matches!(spec.get("_id"), Some(Condition::ObjectId(_))));

        let spec = parser(&[]).parse("_id:nothex").unwrap();
        assert_eq!(spec.get("_id"), Some(&Condition::Literal(json!("nothex"))));

        let spec = parser(&[]).parse("_id:5f1b2c3d4e5f60718293a4b5ff").unwrap();
        assert_eq!(spec.get("_id"), Some(&Condition::Literal(json!("5f1b2c3d4e5f60718293a4b5ff"))));
    }

    #[test]
    fn test_object_id_hex_is_normalised() {
        let spec = parser(&[]).parse("_id:5F1B2C3D4E5F60718293A4B5").unwrap();
        assert_eq!(spec.to_document(), json!({"_id": {"$oid": "5f1b2c3d4e5f60718293a4b5"}}));

        let fresh = ObjectId::new();
        let spec = parser(&[]).parse(&format!("_id:{fresh}")).unwrap();
        assert_eq!(spec.get("_id"), Some(&Condition::ObjectId(fresh)));
        assert_ne!(fresh, ObjectId::new());
    }

    #[test]
    fn test_structured_spec_is_verbatim() {
        let spec = parser(&["User"])
            .parse(r#"{"user": "alice", "_id": "5f1b2c3d4e5f60718293a4b5", "Run": {"$gt": 3}}"#)
            .unwrap();
        assert_eq!(
            spec.to_document(),
            json!({
                "user": "alice",
                "_id": {"$oid": "5f1b2c3d4e5f60718293a4b5"},
                "Run": {"$gt": 3}
            })
        );
    }

    #[test]
    fn test_malformed_structured_spec_is_not_retried() {
        let err = parser(&[]).parse("{user:alice").unwrap_err();
        assert!(matches!(err, QueryError::MalformedSpec(_)));
        let err = parser(&[]).parse("[{}]").unwrap_err();
        assert!(matches!(err, QueryError::NotAnObject("array")));
    }
}
