//! Shared output formatting for record listings.

use mdintake_core::intake::{DID_KEY, SearchResults};
use mdintake_core::storage::StoredRecord;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

/// Keys shown in their own table columns rather than in the summary.
const COLUMN_KEYS: [&str; 5] = ["Schema", "User", "Date", "SchemaFile", DID_KEY];

/// Row for the record table.
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Schema")]
    schema: String,
    #[tabled(rename = "DID")]
    did: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Fields")]
    fields: String,
}

impl From<&StoredRecord> for RecordRow {
    fn from(stored: &StoredRecord) -> Self {
        let get = |key: &str| stored.record.get(key).map(|v| v.to_string()).unwrap_or_default();
        let fields = stored
            .record
            .iter()
            .filter(|(k, _)| !COLUMN_KEYS.contains(&k.as_str()))
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: stored.id.to_hex(),
            schema: get("Schema"),
            did: get(DID_KEY),
            user: get("User"),
            fields: truncate(&fields, 60),
        }
    }
}

/// Search page for JSON output.
#[derive(Debug, Serialize)]
struct SearchOutput {
    query: serde_json::Value,
    total: usize,
    records: Vec<serde_json::Value>,
}

/// Print a page of records as a table.
pub fn print_records_table(results: &SearchResults) {
    if results.records.is_empty() {
        println!("(no records found)");
        return;
    }

    let rows: Vec<RecordRow> = results.records.iter().map(RecordRow::from).collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");

    println!();
    println!("-- {} of {} records --", results.records.len(), results.total);
}

/// Print a page of records as JSON.
pub fn print_records_json(results: &SearchResults) {
    let output = SearchOutput {
        query: results.spec.to_document(),
        total: results.total,
        records: results.records.iter().map(StoredRecord::to_json).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

/// Truncate string with ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdintake_core::query::ObjectId;
    use mdintake_core::record::{Record, Value};

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer string", 8), "a lon...");
        assert_eq!(truncate("añbñcñ", 3), "añb");
    }

    #[test]
    fn test_record_row_splits_columns() {
        let mut record = Record::new();
        record.insert("Schema".into(), Value::from("ID3A"));
        record.insert("User".into(), Value::from("alice"));
        record.insert("did".into(), Value::from("abc"));
        record.insert("Proposal".into(), Value::Int(100));
        record.insert("Pi".into(), Value::from("Alice"));
        let stored = StoredRecord { id: ObjectId::from_bytes([0; 12]), record };

        let row = RecordRow::from(&stored);
        assert_eq!(row.id, "000000000000000000000000");
        assert_eq!(row.schema, "ID3A");
        assert_eq!(row.did, "abc");
        assert_eq!(row.fields, "Pi=Alice Proposal=100");
    }
}
