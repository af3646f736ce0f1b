//! Import command implementation.

use std::path::Path;

use super::{load_config, open_service, read_input};
use crate::ImportArgs;

/// Load a JSON array written by `mdi export` into the configured collection.
pub fn run(config: Option<&Path>, profile: Option<&str>, args: ImportArgs) {
    let rc = load_config(config, profile);
    let svc = open_service(&rc);

    let docs: Vec<serde_json::Value> = match serde_json::from_str(&read_input(args.file.as_deref())) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error decoding export: expected a JSON array of records: {e}");
            std::process::exit(1);
        }
    };

    match svc.import_records(&docs) {
        Ok(summary) => {
            println!(
                "OK   imported {} records into {}.{}",
                summary.imported, rc.database, rc.collection
            );
            if summary.skipped > 0 {
                println!("skipped: {}", summary.skipped);
            }
        }
        Err(e) => {
            eprintln!("FAIL {e}");
            std::process::exit(1);
        }
    }
}
