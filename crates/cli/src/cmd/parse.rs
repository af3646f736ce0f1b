//! Parse command implementation.

use std::path::Path;

use mdintake_core::query::QueryParser;
use mdintake_core::schema::SchemaManager;

use super::load_config;
use crate::ParseArgs;

/// Print the filter document a query parses into.
///
/// Schemas under `schema_dir` are loaded first so that user keys resolve
/// to their canonical spelling.
pub fn run(config: Option<&Path>, profile: Option<&str>, args: ParseArgs) {
    let rc = load_config(config, profile);

    let manager = SchemaManager::new(rc.schemas.clone());
    match manager.load_dir(&rc.schema_dir) {
        Ok(loaded) => tracing::debug!("Loaded {loaded} schemas for key resolution"),
        Err(e) => tracing::warn!("Schemas not loaded, keys will not be resolved: {e}"),
    }

    let parser = QueryParser::new(manager.key_index());
    match parser.parse(&args.query) {
        Ok(spec) => {
            println!("{}", serde_json::to_string_pretty(&spec.to_document()).unwrap_or_default());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
