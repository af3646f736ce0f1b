//! Search command implementation.

use std::path::Path;

use super::output::{print_records_json, print_records_table};
use super::{load_config, open_service};
use crate::{OutputFormat, SearchArgs};

pub fn run(config: Option<&Path>, profile: Option<&str>, args: SearchArgs) {
    let rc = load_config(config, profile);
    let svc = open_service(&rc);

    // Keys only resolve against schemas the manager has seen.
    if let Err(e) = svc.warm_schemas() {
        tracing::warn!("Schemas not loaded, keys will not be resolved: {e}");
    }

    let results = match svc.search(&args.query, args.offset, args.limit) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error searching: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!("Query {} matched {} records", results.spec, results.total);

    let format = if args.json { OutputFormat::Json } else { args.output };
    match format {
        OutputFormat::Table => print_records_table(&results),
        OutputFormat::Json => print_records_json(&results),
    }
}
