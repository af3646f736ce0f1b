//! Submit command implementation.

use std::path::Path;

use super::{load_config, open_service, read_record};
use crate::SubmitArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: SubmitArgs) {
    let rc = load_config(config, profile);
    let svc = open_service(&rc);

    let schema_path = match svc.resolve_schema(&args.schema) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let user = args
        .user
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "unknown".to_string());

    let record = read_record(args.record.as_deref());

    match svc.submit(&schema_path, record, &user) {
        Ok(outcome) => {
            println!("OK   stored {} record", outcome.schema);
            println!("did: {}", outcome.did);
        }
        Err(e) => {
            eprintln!("FAIL {e}");
            std::process::exit(1);
        }
    }
}
