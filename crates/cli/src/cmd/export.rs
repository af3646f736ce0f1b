//! Export command implementation.

use std::path::Path;

use mdintake_core::storage::StoredRecord;

use super::{load_config, open_service};
use crate::ExportArgs;

/// Write every record of the configured collection as a JSON array.
pub fn run(config: Option<&Path>, profile: Option<&str>, args: ExportArgs) {
    let rc = load_config(config, profile);
    let svc = open_service(&rc);

    let records = match svc.export_records() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error reading store: {e}");
            std::process::exit(1);
        }
    };

    let docs: Vec<serde_json::Value> = records.iter().map(StoredRecord::to_json).collect();
    let body = serde_json::to_string_pretty(&docs).unwrap_or_else(|_| "[]".to_string());

    match args.out {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, body + "\n") {
                eprintln!("Error writing {}: {e}", path.display());
                std::process::exit(1);
            }
            println!(
                "OK   exported {} records from {}.{} to {}",
                docs.len(),
                rc.database,
                rc.collection,
                path.display()
            );
        }
        None => println!("{body}"),
    }
}
