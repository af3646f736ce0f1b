//! SQLite-backed record store.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value as JsonValue};

use super::matcher::Filter;
use super::schema::init_schema;
use super::{MetadataStore, StoreError, StoredRecord};
use crate::query::{ObjectId, QuerySpec};
use crate::record::{self, Record};

/// Record store in a single SQLite file.
///
/// Records live as JSON bodies keyed by `(database, collection, _id)`. When an
/// upsert key is set, a record carrying that attribute is merged into the
/// stored record with the same value instead of being inserted again.
pub struct SqliteStore {
    conn: Connection,
    upsert_key: Option<String>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        init_schema(&conn)?;
        Ok(Self { conn, upsert_key: None })
    }

    /// Create an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn, upsert_key: None })
    }

    /// Set the attribute used to merge resubmitted records.
    pub fn with_upsert_key(mut self, key: Option<String>) -> Self {
        self.upsert_key = key;
        self
    }

    pub fn upsert_key(&self) -> Option<&str> {
        self.upsert_key.as_deref()
    }

    /// Get a record by id.
    pub fn get(
        &self,
        database: &str,
        collection: &str,
        id: &ObjectId,
    ) -> Result<Option<StoredRecord>, StoreError> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM records WHERE database = ?1 AND collection = ?2 AND oid = ?3",
                params![database, collection, id.to_hex()],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|b| {
            let doc = decode_body(&id.to_hex(), &b)?;
            to_stored(*id, doc)
        })
        .transpose()
    }

    /// Record counts per `(database, collection)`.
    pub fn collection_counts(&self) -> Result<Vec<(String, String, i64)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT database, collection, COUNT(*) FROM records
             GROUP BY database, collection ORDER BY database, collection",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Every record of a collection in insertion order.
    fn scan(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Vec<(ObjectId, Map<String, JsonValue>)>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT oid, body FROM records WHERE database = ?1 AND collection = ?2 ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![database, collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(oid, body)| {
                let id = ObjectId::parse_str(&oid)
                    .map_err(|e| StoreError::Corrupt(oid.clone(), e.to_string()))?;
                Ok((id, decode_body(&oid, &body)?))
            })
            .collect()
    }

    fn matching(
        &self,
        database: &str,
        collection: &str,
        filter: &QuerySpec,
    ) -> Result<impl Iterator<Item = (ObjectId, Map<String, JsonValue>)>, StoreError> {
        let compiled = Filter::compile(filter)?;
        let rows = self.scan(database, collection)?;
        Ok(rows.into_iter().filter(move |(id, doc)| compiled.matches(id, doc)))
    }
}

impl MetadataStore for SqliteStore {
    fn upsert(
        &self,
        database: &str,
        collection: &str,
        records: &[Record],
    ) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();

        for rec in records {
            let upsert = self
                .upsert_key
                .as_deref()
                .and_then(|k| rec.get(k).map(|v| (k, v.to_json().to_string())));

            let existing: Option<(String, String)> = match &upsert {
                Some((key, value)) => tx
                    .query_row(
                        "SELECT oid, body FROM records
                         WHERE database = ?1 AND collection = ?2 AND upsert_key = ?3 AND upsert_value = ?4",
                        params![database, collection, key, value],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?,
                None => None,
            };

            match existing {
                Some((oid, body)) => {
                    let mut merged = decode_body(&oid, &body)?;
                    for (k, v) in rec {
                        merged.insert(k.clone(), v.to_json());
                    }
                    tx.execute(
                        "UPDATE records SET body = ?1, updated_at = ?2
                         WHERE database = ?3 AND collection = ?4 AND oid = ?5",
                        params![JsonValue::Object(merged).to_string(), now, database, collection, oid],
                    )?;
                    tracing::debug!("Merged record {} into {}.{}", oid, database, collection);
                }
                None => {
                    let oid = ObjectId::new().to_hex();
                    tx.execute(
                        "INSERT INTO records
                         (database, collection, oid, upsert_key, upsert_value, body, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                        params![
                            database,
                            collection,
                            oid,
                            upsert.as_ref().map(|(k, _)| *k),
                            upsert.as_ref().map(|(_, v)| v.as_str()),
                            serde_json::to_string(rec)?,
                            now,
                        ],
                    )?;
                    tracing::debug!("Inserted record {} into {}.{}", oid, database, collection);
                }
            }
        }

        tx.commit()?;
        Ok(records.len())
    }

    fn find(
        &self,
        database: &str,
        collection: &str,
        filter: &QuerySpec,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        self.matching(database, collection, filter)?
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(|(id, doc)| to_stored(id, doc))
            .collect()
    }

    fn count(
        &self,
        database: &str,
        collection: &str,
        filter: &QuerySpec,
    ) -> Result<usize, StoreError> {
        Ok(self.matching(database, collection, filter)?.count())
    }
}

fn decode_body(oid: &str, body: &str) -> Result<Map<String, JsonValue>, StoreError> {
    match serde_json::from_str(body)? {
        JsonValue::Object(map) => Ok(map),
        _ => Err(StoreError::Corrupt(oid.to_string(), "body is not an object".to_string())),
    }
}

fn to_stored(id: ObjectId, doc: Map<String, JsonValue>) -> Result<StoredRecord, StoreError> {
    let record = record::from_json(&JsonValue::Object(doc))
        .map_err(|e| StoreError::Corrupt(id.to_hex(), e.to_string()))?;
    Ok(StoredRecord { id, record })
}
