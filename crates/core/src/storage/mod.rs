//! Record storage.
//!
//! [`MetadataStore`] is the contract the intake service writes to and
//! searches through. [`SqliteStore`] keeps records as JSON rows in a single
//! SQLite file and evaluates [`QuerySpec`]s in process.

pub mod matcher;
pub mod schema;
pub mod sqlite;

use thiserror::Error;

use crate::query::{ObjectId, QuerySpec};
use crate::record::Record;

pub use matcher::Filter;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store layout version {found} is newer than supported {supported}")]
    VersionTooNew { found: i32, supported: i32 },

    #[error("failed to encode or decode record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored record {0} is corrupt: {1}")]
    Corrupt(String, String),

    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported query operator '{0}'")]
    UnsupportedOperator(String),
}

/// A record as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: ObjectId,
    pub record: Record,
}

impl StoredRecord {
    /// The record as a JSON object with `_id` in hex form.
    pub fn to_json(&self) -> serde_json::Value {
        let mut doc = crate::record::to_json(&self.record);
        if let serde_json::Value::Object(map) = &mut doc {
            map.insert("_id".to_string(), serde_json::Value::String(self.id.to_hex()));
        }
        doc
    }
}

/// Document store holding validated records.
pub trait MetadataStore {
    /// Write records, merging into existing ones that share the upsert key.
    /// Returns the number of records written.
    fn upsert(&self, database: &str, collection: &str, records: &[Record])
    -> Result<usize, StoreError>;

    /// Records matching `filter` in insertion order, skipping `offset` and
    /// returning at most `limit` (all when `None`).
    fn find(
        &self,
        database: &str,
        collection: &str,
        filter: &QuerySpec,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<StoredRecord>, StoreError>;

    /// Number of records matching `filter`.
    fn count(&self, database: &str, collection: &str, filter: &QuerySpec)
    -> Result<usize, StoreError>;
}
