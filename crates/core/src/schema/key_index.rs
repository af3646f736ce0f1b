//! Case-insensitive lookup from user-typed keys to canonical schema keys.

use std::collections::HashMap;
use std::sync::RwLock;

/// Mapping of lower-cased key to canonical key, across every schema loaded.
///
/// Append-only: later schemas never overwrite an existing mapping. Keys of
/// evicted schemas stay until [`SchemaKeyIndex::replace`] is called.
#[derive(Debug, Default)]
pub struct SchemaKeyIndex {
    entries: RwLock<HashMap<String, String>>,
}

impl SchemaKeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record canonical keys. The first canonical spelling of a key wins.
    pub fn extend<'a>(&self, keys: impl IntoIterator<Item = &'a str>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            entries.entry(key.to_lowercase()).or_insert_with(|| key.to_string());
        }
    }

    /// Resolve a user-supplied key, ignoring case.
    pub fn resolve(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(&key.to_lowercase()).cloned()
    }

    /// Swap in a freshly computed set of keys.
    pub fn replace<'a>(&self, keys: impl IntoIterator<Item = &'a str>) {
        let mut fresh = HashMap::new();
        for key in keys {
            fresh.entry(key.to_lowercase()).or_insert_with(|| key.to_string());
        }
        *self.entries.write().unwrap_or_else(|e| e.into_inner()) = fresh;
    }

    /// All canonical keys, sorted.
    pub fn canonical_keys(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<String> = entries.values().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ignores_case() {
        let idx = SchemaKeyIndex::new();
        idx.extend(["BeamEnergy", "Pi"]);
        assert_eq!(idx.resolve("beamenergy"), Some("BeamEnergy".to_string()));
        assert_eq!(idx.resolve("PI"), Some("Pi".to_string()));
        assert_eq!(idx.resolve("foo"), None);
    }

    #[test]
    fn test_first_writer_wins() {
        let idx = SchemaKeyIndex::new();
        idx.extend(["BeamEnergy"]);
        idx.extend(["beamEnergy"]);
        assert_eq!(idx.resolve("BEAMENERGY"), Some("BeamEnergy".to_string()));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_replace_drops_old_keys() {
        let idx = SchemaKeyIndex::new();
        idx.extend(["Old"]);
        idx.replace(["New"]);
        assert_eq!(idx.resolve("old"), None);
        assert_eq!(idx.canonical_keys(), vec!["New".to_string()]);
    }
}
