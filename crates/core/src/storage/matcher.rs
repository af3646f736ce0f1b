//! In-process evaluation of query specs against stored records.

use std::cmp::Ordering;
use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value as JsonValue};

use super::StoreError;
use crate::query::{Condition, ObjectId, QuerySpec, TEXT_KEY};

/// A query spec compiled for repeated matching.
#[derive(Debug, Clone)]
pub struct Filter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
enum Clause {
    Field { key: String, ops: Vec<Op> },
    Id(ObjectId),
    Text(Vec<String>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

#[derive(Debug, Clone)]
enum Op {
    Eq(JsonValue),
    Ne(JsonValue),
    Gt(JsonValue),
    Gte(JsonValue),
    Lt(JsonValue),
    Lte(JsonValue),
    In(Vec<JsonValue>),
    Nin(Vec<JsonValue>),
    Exists(bool),
    Regex(Regex),
}

impl Filter {
    /// Compile a spec. Fails on bad regexes and unknown operators.
    pub fn compile(spec: &QuerySpec) -> Result<Self, StoreError> {
        let clauses = spec
            .iter()
            .map(|(key, condition)| compile_condition(key, condition))
            .collect::<Result<_, _>>()?;
        Ok(Self { clauses })
    }

    /// Whether the record `doc` stored under `id` satisfies every clause.
    pub fn matches(&self, id: &ObjectId, doc: &Map<String, JsonValue>) -> bool {
        self.clauses.iter().all(|c| c.matches(id, doc))
    }
}

impl Clause {
    fn matches(&self, id: &ObjectId, doc: &Map<String, JsonValue>) -> bool {
        match self {
            Self::Field { key, ops } => {
                let hex;
                let value = if key == "_id" {
                    hex = JsonValue::String(id.to_hex());
                    Some(&hex)
                } else {
                    doc.get(key)
                };
                ops.iter().all(|op| op.matches(value))
            }
            Self::Id(oid) => oid == id,
            Self::Text(terms) => {
                let words = document_words(doc);
                terms.iter().any(|t| words.contains(t))
            }
            Self::And(filters) => filters.iter().all(|f| f.matches(id, doc)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(id, doc)),
        }
    }
}

impl Op {
    fn matches(&self, value: Option<&JsonValue>) -> bool {
        match self {
            Self::Eq(v) => value.is_some_and(|f| contains_equal(f, v)),
            Self::Ne(v) => !value.is_some_and(|f| contains_equal(f, v)),
            Self::Gt(v) => compares(value, v, |o| o == Ordering::Greater),
            Self::Gte(v) => compares(value, v, |o| o != Ordering::Less),
            Self::Lt(v) => compares(value, v, |o| o == Ordering::Less),
            Self::Lte(v) => compares(value, v, |o| o != Ordering::Greater),
            Self::In(vs) => value.is_some_and(|f| vs.iter().any(|v| contains_equal(f, v))),
            Self::Nin(vs) => !value.is_some_and(|f| vs.iter().any(|v| contains_equal(f, v))),
            Self::Exists(expected) => value.is_some() == *expected,
            Self::Regex(re) => value.is_some_and(|f| {
                any_element(f, |x| x.as_str().is_some_and(|s| re.is_match(s)))
            }),
        }
    }
}

fn compile_condition(key: &str, condition: &Condition) -> Result<Clause, StoreError> {
    match condition {
        Condition::Literal(value) => compile_literal(key, value),
        Condition::Regex { pattern, case_insensitive } => {
            let options = if *case_insensitive { "i" } else { "" };
            Ok(Clause::Field { key: key.to_string(), ops: vec![Op::Regex(build_regex(pattern, options)?)] })
        }
        Condition::Text { search } => Ok(Clause::Text(terms(search))),
        Condition::ObjectId(oid) if key == "_id" => Ok(Clause::Id(*oid)),
        Condition::ObjectId(oid) => Ok(Clause::Field {
            key: key.to_string(),
            ops: vec![Op::Eq(JsonValue::String(oid.to_hex()))],
        }),
    }
}

fn compile_literal(key: &str, value: &JsonValue) -> Result<Clause, StoreError> {
    match key {
        "$and" | "$or" => {
            let items = value
                .as_array()
                .ok_or_else(|| StoreError::UnsupportedOperator(format!("{key} expects a list")))?;
            let filters = items
                .iter()
                .map(|item| match item {
                    JsonValue::Object(map) => compile_document(map),
                    _ => Err(StoreError::UnsupportedOperator(format!("{key} expects objects"))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(if key == "$and" { Clause::And(filters) } else { Clause::Or(filters) })
        }
        TEXT_KEY => match value {
            JsonValue::String(s) => Ok(Clause::Text(terms(s))),
            _ => match value.get("$search").and_then(JsonValue::as_str) {
                Some(s) => Ok(Clause::Text(terms(s))),
                None => Err(StoreError::UnsupportedOperator(format!("{TEXT_KEY} without $search"))),
            },
        },
        k if k.starts_with('$') => Err(StoreError::UnsupportedOperator(k.to_string())),
        _ => Ok(Clause::Field { key: key.to_string(), ops: compile_ops(value)? }),
    }
}

fn compile_document(map: &Map<String, JsonValue>) -> Result<Filter, StoreError> {
    let clauses = map
        .iter()
        .map(|(k, v)| compile_literal(k, v))
        .collect::<Result<_, _>>()?;
    Ok(Filter { clauses })
}

fn compile_ops(value: &JsonValue) -> Result<Vec<Op>, StoreError> {
    let JsonValue::Object(map) = value else {
        return Ok(vec![Op::Eq(value.clone())]);
    };
    if map.is_empty() || !map.keys().all(|k| k.starts_with('$')) {
        return Ok(vec![Op::Eq(value.clone())]);
    }

    let options = map.get("$options").and_then(JsonValue::as_str).unwrap_or("");
    let mut ops = Vec::with_capacity(map.len());
    for (name, arg) in map {
        let op = match name.as_str() {
            "$eq" => Op::Eq(arg.clone()),
            "$ne" => Op::Ne(arg.clone()),
            "$gt" => Op::Gt(arg.clone()),
            "$gte" => Op::Gte(arg.clone()),
            "$lt" => Op::Lt(arg.clone()),
            "$lte" => Op::Lte(arg.clone()),
            "$in" => Op::In(list_arg(name, arg)?),
            "$nin" => Op::Nin(list_arg(name, arg)?),
            "$exists" => Op::Exists(truthy(arg)),
            "$regex" => {
                let pattern = arg.as_str().ok_or_else(|| {
                    StoreError::UnsupportedOperator(format!("{name} expects a string"))
                })?;
                Op::Regex(build_regex(pattern, options)?)
            }
            "$options" => continue,
            other => return Err(StoreError::UnsupportedOperator(other.to_string())),
        };
        ops.push(op);
    }
    Ok(ops)
}

fn list_arg(name: &str, arg: &JsonValue) -> Result<Vec<JsonValue>, StoreError> {
    arg.as_array()
        .cloned()
        .ok_or_else(|| StoreError::UnsupportedOperator(format!("{name} expects a list")))
}

fn truthy(arg: &JsonValue) -> bool {
    match arg {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64() != Some(0.0),
        JsonValue::Null => false,
        _ => true,
    }
}

fn build_regex(pattern: &str, options: &str) -> Result<Regex, StoreError> {
    RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .dot_matches_new_line(options.contains('s'))
        .ignore_whitespace(options.contains('x'))
        .build()
        .map_err(|e| StoreError::InvalidRegex { pattern: pattern.to_string(), source: e })
}

fn terms(search: &str) -> Vec<String> {
    search.split_whitespace().map(str::to_lowercase).collect()
}

/// Lower-cased words of every string value in the record.
fn document_words(doc: &Map<String, JsonValue>) -> HashSet<String> {
    let mut words = HashSet::new();
    for (key, value) in doc {
        if key == "_id" {
            continue;
        }
        any_element(value, |v| {
            if let Some(s) = v.as_str() {
                words.extend(
                    s.split(|c: char| !c.is_alphanumeric())
                        .filter(|w| !w.is_empty())
                        .map(str::to_lowercase),
                );
            }
            false
        });
    }
    words
}

fn any_element(value: &JsonValue, mut pred: impl FnMut(&JsonValue) -> bool) -> bool {
    match value {
        JsonValue::Array(items) => items.iter().any(pred),
        other => pred(other),
    }
}

fn values_equal(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn contains_equal(field: &JsonValue, expected: &JsonValue) -> bool {
    values_equal(field, expected)
        || field.as_array().is_some_and(|items| items.iter().any(|x| values_equal(x, expected)))
}

fn compares(value: Option<&JsonValue>, bound: &JsonValue, accept: impl Fn(Ordering) -> bool) -> bool {
    value.is_some_and(|f| any_element(f, |x| compare(x, bound).is_some_and(&accept)))
}

fn compare(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (JsonValue::String(x), JsonValue::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: JsonValue) -> Map<String, JsonValue> {
        match value {
            JsonValue::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn literal(pairs: JsonValue) -> QuerySpec {
        let mut spec = QuerySpec::new();
        for (k, v) in doc(pairs) {
            spec.insert(k, Condition::Literal(v));
        }
        spec
    }

    fn id() -> ObjectId {
        ObjectId::parse_str("5f1b2c3d4e5f60718293a4b5").unwrap()
    }

    fn sample() -> Map<String, JsonValue> {
        doc(json!({
            "Pi": "Alice Smith",
            "Run": 42,
            "Energy": 7.5,
            "Detectors": ["eiger", "pilatus"],
            "Title": "Beam line commissioning"
        }))
    }

    fn check(spec: &QuerySpec) -> bool {
        Filter::compile(spec).unwrap().matches(&id(), &sample())
    }

    #[test]
    fn test_literal_equality_and_membership() {
        assert!(check(&literal(json!({"Run": 42}))));
        assert!(check(&literal(json!({"Run": 42.0}))));
        assert!(check(&literal(json!({"Detectors": "eiger"}))));
        assert!(!check(&literal(json!({"Run": 43}))));
        assert!(!check(&literal(json!({"Missing": 1}))));
    }

    #[test]
    fn test_comparison_operators() {
        assert!(check(&literal(json!({"Run": {"$gt": 40, "$lte": 42}}))));
        assert!(!check(&literal(json!({"Energy": {"$lt": 7}}))));
        assert!(check(&literal(json!({"Run": {"$in": [1, 42]}}))));
        assert!(check(&literal(json!({"Run": {"$nin": [1, 2]}}))));
        assert!(check(&literal(json!({"Run": {"$ne": 1}}))));
        assert!(check(&literal(json!({"Missing": {"$exists": false}}))));
    }

    #[test]
    fn test_regex_conditions() {
        let mut spec = QuerySpec::new();
        spec.insert("Pi", Condition::anchored_regex("alice smith"));
        assert!(check(&spec));

        assert!(check(&literal(json!({"Pi": {"$regex": "^alice", "$options": "i"}}))));
        assert!(!check(&literal(json!({"Pi": {"$regex": "^alice"}}))));
    }

    #[test]
    fn test_text_search_any_term() {
        assert!(check(&QuerySpec::text("COMMISSIONING nothing")));
        assert!(check(&QuerySpec::text("pilatus")));
        assert!(!check(&QuerySpec::text("nothing here")));
    }

    #[test]
    fn test_object_id() {
        let mut spec = QuerySpec::new();
        spec.insert("_id", Condition::ObjectId(id()));
        assert!(check(&spec));
        assert!(check(&literal(json!({"_id": "5f1b2c3d4e5f60718293a4b5"}))));
        assert!(!check(&literal(json!({"_id": "000000000000000000000000"}))));
    }

    #[test]
    fn test_and_or() {
        assert!(check(&literal(json!({"$or": [{"Run": 1}, {"Run": 42}]}))));
        assert!(!check(&literal(json!({"$and": [{"Run": 42}, {"Energy": 1}]}))));
    }

    #[test]
    fn test_unsupported_operator() {
        let err = Filter::compile(&literal(json!({"Run": {"$where": "x"}}))).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedOperator(ref op) if op == "$where"));

        let err = Filter::compile(&literal(json!({"Pi": {"$regex": "("}}))).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRegex { .. }));
    }
}
