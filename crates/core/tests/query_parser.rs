use mdintake_core::query::{Condition, QueryError, QueryParser, split_key_values};
use mdintake_core::schema::SchemaKeyIndex;
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;

#[fixture]
fn parser() -> QueryParser {
    let index = SchemaKeyIndex::new();
    index.extend(["User", "Proposal", "BeamEnergy", "Title", "Cycle"]);
    QueryParser::new(Arc::new(index))
}

#[rstest]
#[case::resolved_regex("user:alice", json!({"User": {"$regex": "^alice$", "$options": "i"}}))]
#[case::integer_literal("proposal:123", json!({"Proposal": 123}))]
#[case::float_literal("beamenergy:7.5", json!({"BeamEnergy": 7.5}))]
#[case::unresolved_literal("sample:gold", json!({"sample": "gold"}))]
#[case::free_text("free text search", json!({"$text": {"$search": "free text search"}}))]
#[case::two_pairs(
    "user:alice proposal:42",
    json!({"User": {"$regex": "^alice$", "$options": "i"}, "Proposal": 42})
)]
#[case::operator_key_kept("$text:beam", json!({"$text": "beam"}))]
#[case::object_id(
    "_id:5f1b2c3d4e5f60718293a4b5",
    json!({"_id": {"$oid": "5f1b2c3d4e5f60718293a4b5"}})
)]
#[case::structured_verbatim(
    r#"{"user": "alice", "Proposal": {"$gte": 10}}"#,
    json!({"user": "alice", "Proposal": {"$gte": 10}})
)]
fn parses_to_document(parser: QueryParser, #[case] query: &str, #[case] expected: serde_json::Value) {
    let spec = parser.parse(query).unwrap();
    assert_eq!(spec.to_document(), expected);
}

#[rstest]
#[case::empty("")]
#[case::blank(" \t ")]
fn empty_query_fails(parser: QueryParser, #[case] query: &str) {
    assert!(matches!(parser.parse(query), Err(QueryError::EmptyQuery)));
}

#[rstest]
fn malformed_structured_spec_is_an_error(parser: QueryParser) {
    // Contains ':' but is never retried as key:value.
    let err = parser.parse("{user: alice}").unwrap_err();
    assert!(matches!(err, QueryError::MalformedSpec(_)));
}

#[rstest]
fn numeric_value_on_unresolved_key_stays_string(parser: QueryParser) {
    let spec = parser.parse("run:5").unwrap();
    assert_eq!(spec.get("run"), Some(&Condition::Literal(json!("5"))));
}

#[rstest]
fn regex_value_is_not_escaped(parser: QueryParser) {
    let spec = parser.parse("title:beam.*").unwrap();
    assert_eq!(
        spec.get("Title"),
        Some(&Condition::Regex { pattern: "^beam.*$".into(), case_insensitive: true })
    );
}

#[test]
fn segmentation_is_pinned() {
    let cases = [
        "user:alice",
        "user:alice proposal:123",
        "title:beam line test cycle:2024-1",
        "title:first run run:first run",
        "a:x b:x",
        "time:12:30",
        "user: alice",
        "user:",
    ];

    let rendered = cases
        .iter()
        .map(|q| format!("{q:?} => {:?}", split_key_values(q)))
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!("key_value_segmentation", rendered);
}
