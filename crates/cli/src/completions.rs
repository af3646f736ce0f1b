//! Dynamic value completers.
//!
//! Schema names are offered from the configured schema directory, so
//! `mdi submit --schema ID<TAB>` lists the stems of the schema files found
//! there.

use clap_complete::engine::CompletionCandidate;
use mdintake_core::config::loader::ConfigLoader;
use mdintake_core::schema::{discover_schema_files, schema_name};
use std::ffi::OsStr;
use std::path::Path;

/// Load the resolved config, returning None if it fails.
fn load_config() -> Option<mdintake_core::config::types::ResolvedConfig> {
    ConfigLoader::load(None, None).ok()
}

/// Complete schema names from the configured schema directory.
pub fn complete_schemas(current: &OsStr) -> Vec<CompletionCandidate> {
    match load_config() {
        Some(cfg) => schema_candidates(&cfg.schema_dir, current),
        None => vec![],
    }
}

fn schema_candidates(dir: &Path, current: &OsStr) -> Vec<CompletionCandidate> {
    let current_str = current.to_str().unwrap_or("");
    let Ok(files) = discover_schema_files(dir) else {
        return vec![];
    };

    let mut names: Vec<String> = files
        .iter()
        .map(|p| schema_name(p))
        .filter(|name| name.starts_with(current_str))
        .collect();
    names.dedup();

    names.into_iter().map(CompletionCandidate::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn values(candidates: &[CompletionCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.get_value().to_str().unwrap()).collect()
    }

    #[test]
    fn test_schema_candidates_lists_stems() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("ID3A.json"), "[]").unwrap();
        fs::write(tmp.path().join("ID4B.yaml"), "[]").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();

        let candidates = schema_candidates(tmp.path(), OsStr::new(""));
        assert_eq!(values(&candidates), vec!["ID3A", "ID4B"]);
    }

    #[test]
    fn test_schema_candidates_prefix_filter() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("ID3A.json"), "[]").unwrap();
        fs::write(tmp.path().join("BM14.yml"), "[]").unwrap();

        let candidates = schema_candidates(tmp.path(), OsStr::new("ID"));
        assert_eq!(values(&candidates), vec!["ID3A"]);
    }

    #[test]
    fn test_schema_candidates_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let candidates = schema_candidates(&tmp.path().join("nope"), OsStr::new(""));
        assert!(candidates.is_empty());
    }
}
