//! Submission and search pipeline.
//!
//! Submitting a record loads its schema through the [`SchemaManager`],
//! injects the administrative keys, validates, and upserts into the store.
//! Searching parses the query with a [`QueryParser`] sharing the manager's
//! key index, then counts and fetches matching records.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::config::types::ResolvedConfig;
use crate::query::{ObjectId, QueryError, QueryParser, QuerySpec};
use crate::record::{Record, Value};
use crate::schema::{SchemaLoadError, SchemaManager, ValidationError, schema_name};
use crate::storage::{MetadataStore, SqliteStore, StoreError, StoredRecord};

/// Attribute holding the generated dataset identifier.
pub const DID_KEY: &str = "did";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    SchemaLoad(#[from] SchemaLoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("schema '{name}' not found in {dir}")]
    SchemaNotFound { name: String, dir: PathBuf },

    #[error("failed to prepare store directory {path}: {source}")]
    StoreDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where records go and where schemas come from.
#[derive(Debug, Clone)]
pub struct IntakeTarget {
    pub schema_dir: PathBuf,
    pub database: String,
    pub collection: String,
}

impl From<&ResolvedConfig> for IntakeTarget {
    fn from(cfg: &ResolvedConfig) -> Self {
        Self {
            schema_dir: cfg.schema_dir.clone(),
            database: cfg.database.clone(),
            collection: cfg.collection.clone(),
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub schema: String,
    pub did: String,
    pub record: Record,
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub spec: QuerySpec,
    pub total: usize,
    pub records: Vec<StoredRecord>,
}

/// Counts from [`IntakeService::import_records`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Resolve a schema name or path to a schema file.
///
/// Paths with an extension are taken as given, falling back to `schema_dir`.
/// Bare names are looked up as `<name>.json`, `<name>.yaml` or `<name>.yml`
/// in `schema_dir`.
pub fn resolve_schema(schema_dir: &Path, name: &str) -> Result<PathBuf, IntakeError> {
    let given = Path::new(name);
    let candidates: Vec<PathBuf> = if given.extension().is_some() {
        vec![given.to_path_buf(), schema_dir.join(given)]
    } else {
        ["json", "yaml", "yml"].iter().map(|ext| schema_dir.join(format!("{name}.{ext}"))).collect()
    };

    candidates.into_iter().find(|p| p.is_file()).ok_or_else(|| IntakeError::SchemaNotFound {
        name: name.to_string(),
        dir: schema_dir.to_path_buf(),
    })
}

pub struct IntakeService<S> {
    schemas: Arc<SchemaManager>,
    parser: QueryParser,
    store: S,
    target: IntakeTarget,
}

impl IntakeService<SqliteStore> {
    /// Build a service over the SQLite store named by the configuration.
    pub fn from_config(cfg: &ResolvedConfig) -> Result<Self, IntakeError> {
        if let Some(parent) = cfg.store_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| IntakeError::StoreDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let store = SqliteStore::open(&cfg.store_path)?.with_upsert_key(cfg.upsert_key.clone());
        let schemas = Arc::new(SchemaManager::new(cfg.schemas.clone()));
        Ok(Self::new(schemas, store, IntakeTarget::from(cfg)))
    }
}

impl<S: MetadataStore> IntakeService<S> {
    pub fn new(schemas: Arc<SchemaManager>, store: S, target: IntakeTarget) -> Self {
        let parser = QueryParser::new(schemas.key_index());
        Self { schemas, parser, store, target }
    }

    pub fn schemas(&self) -> &Arc<SchemaManager> {
        &self.schemas
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn target(&self) -> &IntakeTarget {
        &self.target
    }

    /// Resolve a schema name or path against the target's schema directory.
    pub fn resolve_schema(&self, name: &str) -> Result<PathBuf, IntakeError> {
        resolve_schema(&self.target.schema_dir, name)
    }

    /// Load every schema in the schema directory so the key index knows
    /// their keys. Broken files are skipped. Returns the number loaded.
    pub fn warm_schemas(&self) -> Result<usize, IntakeError> {
        Ok(self.schemas.load_dir(&self.target.schema_dir)?)
    }

    /// Inject the administrative keys and validate `record` against its schema.
    pub fn prepare(&self, schema: &Path, mut record: Record, user: &str) -> Result<Record, IntakeError> {
        let loaded = self.schemas.load(schema)?;

        record.insert("User".to_string(), Value::from(user));
        record.entry("Date".to_string()).or_insert_with(|| Value::Int(Utc::now().timestamp()));
        record.insert(
            "SchemaFile".to_string(),
            Value::from(loaded.source_path.display().to_string()),
        );
        record.insert("Schema".to_string(), Value::from(schema_name(&loaded.source_path)));

        crate::schema::validate(&loaded, &record)?;
        Ok(record)
    }

    /// Validate and store one record.
    pub fn submit(&self, schema: &Path, record: Record, user: &str) -> Result<SubmitOutcome, IntakeError> {
        let mut record = self.prepare(schema, record, user)?;

        let did = match record.get(DID_KEY) {
            Some(v) => v.to_string(),
            None => {
                let did = ObjectId::new().to_hex();
                record.insert(DID_KEY.to_string(), Value::from(did.clone()));
                did
            }
        };

        self.store
            .upsert(&self.target.database, &self.target.collection, std::slice::from_ref(&record))?;
        tracing::info!("Stored record did={} with schema {}", did, schema.display());

        Ok(SubmitOutcome { schema: schema_name(schema), did, record })
    }

    /// Parse `query` and return the matching page of records.
    pub fn search(
        &self,
        query: &str,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<SearchResults, IntakeError> {
        let spec = self.parser.parse(query)?;
        let total = self.store.count(&self.target.database, &self.target.collection, &spec)?;
        let records =
            self.store.find(&self.target.database, &self.target.collection, &spec, offset, limit)?;
        Ok(SearchResults { spec, total, records })
    }

    /// Every record of the target collection, in insertion order.
    pub fn export_records(&self) -> Result<Vec<StoredRecord>, IntakeError> {
        let all = QuerySpec::match_all();
        Ok(self.store.find(&self.target.database, &self.target.collection, &all, 0, None)?)
    }

    /// Store exported documents as they are, without schema validation.
    ///
    /// `_id` is dropped and a fresh one assigned. Documents sharing the
    /// upsert key with a stored record are merged into it. Entries that are
    /// not records are skipped with a warning.
    pub fn import_records(&self, docs: &[serde_json::Value]) -> Result<ImportSummary, IntakeError> {
        let mut records = Vec::with_capacity(docs.len());
        let mut skipped = 0;

        for (i, doc) in docs.iter().enumerate() {
            let mut doc = doc.clone();
            if let serde_json::Value::Object(map) = &mut doc {
                map.remove("_id");
            }
            match crate::record::from_json(&doc) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping entry {}: {}", i, e);
                    skipped += 1;
                }
            }
        }

        let imported =
            self.store.upsert(&self.target.database, &self.target.collection, &records)?;
        tracing::info!(
            "Imported {} records into {}.{}",
            imported,
            self.target.database,
            self.target.collection
        );
        Ok(ImportSummary { imported, skipped })
    }

    /// Parse a query without running it.
    pub fn parse_query(&self, query: &str) -> Result<QuerySpec, IntakeError> {
        Ok(self.parser.parse(query)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::SchemaSettings;
    use std::fs;
    use tempfile::TempDir;

    fn service(dir: &Path) -> IntakeService<SqliteStore> {
        let store = SqliteStore::open_in_memory().unwrap().with_upsert_key(Some(DID_KEY.into()));
        IntakeService::new(
            Arc::new(SchemaManager::new(SchemaSettings::default())),
            store,
            IntakeTarget {
                schema_dir: dir.to_path_buf(),
                database: "meta".into(),
                collection: "runs".into(),
            },
        )
    }

    #[test]
    fn test_resolve_schema_by_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("ID3A.yaml"), "[]").unwrap();
        let svc = service(tmp.path());

        assert_eq!(svc.resolve_schema("ID3A").unwrap(), tmp.path().join("ID3A.yaml"));
        assert_eq!(svc.resolve_schema("ID3A.yaml").unwrap(), tmp.path().join("ID3A.yaml"));
        assert!(matches!(
            svc.resolve_schema("nope"),
            Err(IntakeError::SchemaNotFound { .. })
        ));
    }

    #[test]
    fn test_prepare_injects_admin_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ID3A.json");
        fs::write(&path, r#"[{"key": "Pi", "type": "string"}]"#).unwrap();
        let svc = service(tmp.path());

        let mut rec = Record::new();
        rec.insert("Pi".into(), Value::from("alice"));
        rec.insert("Date".into(), Value::Int(1));
        let prepared = svc.prepare(&path, rec, "bob").unwrap();

        assert_eq!(prepared.get("User"), Some(&Value::from("bob")));
        assert_eq!(prepared.get("Date"), Some(&Value::Int(1)));
        assert_eq!(prepared.get("Schema"), Some(&Value::from("ID3A")));
        assert!(prepared.contains_key("SchemaFile"));
    }

    #[test]
    fn test_submit_generates_did() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ID3A.json");
        fs::write(&path, r#"[{"key": "Pi", "type": "string"}, {"key": "did", "type": "string", "optional": true}]"#)
            .unwrap();
        let svc = service(tmp.path());

        let mut rec = Record::new();
        rec.insert("Pi".into(), Value::from("alice"));
        let outcome = svc.submit(&path, rec, "bob").unwrap();
        assert_eq!(outcome.did.len(), 24);
        assert_eq!(outcome.schema, "ID3A");

        let found = svc.search("pi:alice", 0, None).unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.records[0].record.get(DID_KEY), Some(&Value::from(outcome.did)));
    }

    #[test]
    fn test_export_then_import_merges_by_did() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ID3A.json");
        fs::write(&path, r#"[{"key": "Pi", "type": "string"}, {"key": "did", "type": "string", "optional": true}]"#)
            .unwrap();
        let svc = service(tmp.path());

        let mut rec = Record::new();
        rec.insert("Pi".into(), Value::from("alice"));
        svc.submit(&path, rec, "bob").unwrap();

        let exported: Vec<serde_json::Value> =
            svc.export_records().unwrap().iter().map(StoredRecord::to_json).collect();
        assert_eq!(exported.len(), 1);
        assert!(exported[0].get("_id").is_some());

        let other = service(tmp.path());
        let summary = other.import_records(&exported).unwrap();
        assert_eq!(summary, ImportSummary { imported: 1, skipped: 0 });
        let again = other.import_records(&exported).unwrap();
        assert_eq!(again.imported, 1);

        let stored = other.export_records().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record.get("Pi"), Some(&Value::from("alice")));
        assert!(!stored[0].record.contains_key("_id"));
    }

    #[test]
    fn test_import_skips_non_records() {
        let tmp = TempDir::new().unwrap();
        let svc = service(tmp.path());

        let docs = vec![serde_json::json!({"Pi": "carol"}), serde_json::json!(42)];
        let summary = svc.import_records(&docs).unwrap();
        assert_eq!(summary, ImportSummary { imported: 1, skipped: 1 });
        assert_eq!(svc.export_records().unwrap().len(), 1);
    }

    #[test]
    fn test_submit_rejects_invalid_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ID3A.json");
        fs::write(&path, r#"[{"key": "Pi", "type": "string"}]"#).unwrap();
        let svc = service(tmp.path());

        let err = svc.submit(&path, Record::new(), "bob").unwrap_err();
        assert!(matches!(
            err,
            IntakeError::Validation(ValidationError::MissingMandatoryFields { .. })
        ));
        assert_eq!(svc.store().count("meta", "runs", &QuerySpec::match_all()).unwrap(), 0);
    }
}
