//! Cached, time-limited access to schema files.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use super::definition::Schema;
use super::errors::{SchemaLoadError, ValidationError};
use super::key_index::SchemaKeyIndex;
use super::parse::{ParseOptions, discover_schema_files, load_schema_from_file};
use super::validation;
use crate::config::types::SchemaSettings;
use crate::record::Record;

/// A loaded schema and when it was read.
#[derive(Debug, Clone)]
pub struct SchemaCacheEntry {
    pub schema: Arc<Schema>,
    pub loaded_at: Instant,
    pub loaded_wall: DateTime<Utc>,
}

impl SchemaCacheEntry {
    fn new(schema: Schema) -> Self {
        Self { schema: Arc::new(schema), loaded_at: Instant::now(), loaded_wall: Utc::now() }
    }

    pub fn is_fresh(&self, renew_interval: Duration) -> bool {
        self.loaded_at.elapsed() < renew_interval
    }
}

/// Loads schema files and keeps them for `renew_interval`.
///
/// Staleness is detected lazily in [`SchemaManager::load`]. Finding a stale
/// entry empties the whole cache, so every other path is re-read on its next
/// load as well.
#[derive(Debug)]
pub struct SchemaManager {
    settings: SchemaSettings,
    cache: RwLock<HashMap<PathBuf, SchemaCacheEntry>>,
    key_index: Arc<SchemaKeyIndex>,
}

impl SchemaManager {
    pub fn new(settings: SchemaSettings) -> Self {
        Self { settings, cache: RwLock::new(HashMap::new()), key_index: Arc::new(SchemaKeyIndex::new()) }
    }

    pub fn settings(&self) -> &SchemaSettings {
        &self.settings
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions { strict: self.settings.strict }
    }

    /// Get the schema at `path`, reading it from disk when absent or stale.
    ///
    /// A failed read leaves any previous entry in place.
    pub fn load(&self, path: &Path) -> Result<Arc<Schema>, SchemaLoadError> {
        let path = std::path::absolute(path).map_err(|e| SchemaLoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let renew = self.settings.renew_interval();

        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = cache.get(&path)
                && entry.is_fresh(renew)
            {
                return Ok(Arc::clone(&entry.schema));
            }
        }

        let schema = load_schema_from_file(&path, self.parse_options())?;
        self.key_index.extend(schema.fields.keys().map(String::as_str));

        let entry = SchemaCacheEntry::new(schema);
        let loaded = Arc::clone(&entry.schema);

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        if cache.get(&path).is_some_and(|old| !old.is_fresh(renew)) {
            tracing::debug!("Schema {} expired, resetting schema cache", path.display());
            cache.clear();
        }
        cache.insert(path, entry);

        Ok(loaded)
    }

    /// Load several schema files, stopping at the first failure.
    pub fn load_all<P: AsRef<Path>>(
        &self,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<Vec<Arc<Schema>>, SchemaLoadError> {
        paths.into_iter().map(|p| self.load(p.as_ref())).collect()
    }

    /// Load every schema file under `dir`, skipping files that fail to load.
    ///
    /// Returns how many loaded. Only an unreadable `dir` is an error.
    pub fn load_dir(&self, dir: &Path) -> Result<usize, SchemaLoadError> {
        let mut loaded = 0;
        for path in self.discover(dir)? {
            match self.load(&path) {
                Ok(_) => loaded += 1,
                Err(e) => tracing::warn!("Skipping schema {}: {}", path.display(), e),
            }
        }
        Ok(loaded)
    }

    /// Schema files found directly under `dir`.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, SchemaLoadError> {
        discover_schema_files(dir)
    }

    /// Load `path` and validate `record` against it.
    pub fn validate(&self, path: &Path, record: &Record) -> Result<(), ManagerValidateError> {
        let schema = self.load(path)?;
        validation::validate(&schema, record)?;
        Ok(())
    }

    /// Cached paths, sorted.
    pub fn cached_paths(&self) -> Vec<PathBuf> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        let mut paths: Vec<PathBuf> = cache.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shared key index fed by every successful load.
    pub fn key_index(&self) -> Arc<SchemaKeyIndex> {
        Arc::clone(&self.key_index)
    }

    /// Recompute the key index from the schemas currently cached.
    pub fn rebuild_index(&self) {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        let mut paths: Vec<&PathBuf> = cache.keys().collect();
        paths.sort();
        self.key_index.replace(
            paths.into_iter().flat_map(|p| cache[p].schema.keys()),
        );
    }

    /// Human-readable dump of the cache.
    pub fn describe(&self) -> String {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        let mut paths: Vec<&PathBuf> = cache.keys().collect();
        paths.sort();

        let mut out = String::new();
        for path in paths {
            let entry = &cache[path];
            let _ = writeln!(
                out,
                "{} loaded {}",
                entry.schema,
                entry.loaded_wall.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        out
    }
}

/// Failure of [`SchemaManager::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ManagerValidateError {
    #[error(transparent)]
    Load(#[from] SchemaLoadError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
