pub mod doctor;
pub mod export;
pub mod import;
pub mod lint;
pub mod output;
pub mod parse;
pub mod search;
pub mod show;
pub mod stats;
pub mod submit;
pub mod validate;

use std::io::Read;
use std::path::Path;

use mdintake_core::config::loader::ConfigLoader;
use mdintake_core::config::types::ResolvedConfig;
use mdintake_core::intake::IntakeService;
use mdintake_core::record::{self, Record};
use mdintake_core::storage::SqliteStore;

/// Load the configuration and install logging, exiting on failure.
pub fn load_config(config: Option<&Path>, profile: Option<&str>) -> ResolvedConfig {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };
    crate::logging::init(&rc);
    rc
}

pub fn open_service(rc: &ResolvedConfig) -> IntakeService<SqliteStore> {
    match IntakeService::from_config(rc) {
        Ok(svc) => svc,
        Err(e) => {
            eprintln!("Error opening store {}: {e}", rc.store_path.display());
            std::process::exit(1);
        }
    }
}

/// Read `path`, or stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> String {
    let source = match path {
        Some(p) => std::fs::read_to_string(p).map_err(|e| format!("{}: {e}", p.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
                .map_err(|e| format!("stdin: {e}"))
        }
    };

    source.unwrap_or_else(|e| {
        eprintln!("Error reading input: {e}");
        std::process::exit(1);
    })
}

/// Read a record from `path`, or from stdin when no path is given.
pub fn read_record(path: Option<&Path>) -> Record {
    record::from_json_str(&read_input(path)).unwrap_or_else(|e| {
        eprintln!("Error decoding record: {e}");
        std::process::exit(1);
    })
}
