//! Validate command implementation.

use std::path::Path;

use mdintake_core::intake::resolve_schema;
use mdintake_core::schema::{SchemaManager, ValidationReport, validate_all};
use serde::Serialize;

use super::{load_config, read_record};
use crate::ValidateArgs;

/// Validation report for JSON output.
#[derive(Debug, Serialize)]
struct ReportOutput {
    schema: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, args: ValidateArgs) {
    let rc = load_config(config, profile);

    let schema_path = match resolve_schema(&rc.schema_dir, &args.schema) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let manager = SchemaManager::new(rc.schemas.clone());
    let schema = match manager.load(&schema_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading schema {}: {e}", schema_path.display());
            std::process::exit(1);
        }
    };

    let record = read_record(args.record.as_deref());
    let report = validate_all(&schema, &record);

    if args.json {
        print_report_json(&schema.name(), &report);
    } else {
        print_report(&schema.name(), &report);
    }

    if !report.is_valid() {
        std::process::exit(1);
    }
}

fn print_report(schema: &str, report: &ValidationReport) {
    if report.is_valid() {
        println!("OK   record matches schema {schema}");
    } else {
        println!("FAIL record does not match schema {schema}");
    }
    for error in &report.errors {
        println!("     error   {error}");
    }
    for warning in &report.warnings {
        println!("     warning {warning}");
    }
}

fn print_report_json(schema: &str, report: &ValidationReport) {
    let output = ReportOutput {
        schema: schema.to_string(),
        valid: report.is_valid(),
        errors: report.errors.iter().map(ToString::to_string).collect(),
        warnings: report.warnings.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}
