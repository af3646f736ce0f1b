//! Lint command implementation.

use std::path::{Path, PathBuf};

use mdintake_core::schema::{LintSeverity, discover_schema_files, lint_schema_file};

use super::load_config;
use crate::LintArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: LintArgs) {
    let files: Vec<PathBuf> = if args.files.is_empty() {
        let rc = load_config(config, profile);
        match discover_schema_files(&rc.schema_dir) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("Error scanning {}: {e}", rc.schema_dir.display());
                std::process::exit(1);
            }
        }
    } else {
        args.files
    };

    if files.is_empty() {
        println!("(no schemas found)");
        return;
    }

    let mut failed = 0usize;
    let mut warnings = 0usize;

    for path in &files {
        match lint_schema_file(path) {
            Ok(report) => {
                let status = if report.has_errors() { "FAIL" } else { "OK  " };
                println!("{status} {} ({} fields)", path.display(), report.schema.fields.len());
                for issue in &report.issues {
                    println!("     {:<7} {}: {}", issue.severity.to_string(), issue.key, issue.message);
                    if issue.severity == LintSeverity::Warning {
                        warnings += 1;
                    }
                }
                if report.has_errors() {
                    failed += 1;
                }
            }
            Err(e) => {
                println!("FAIL {}", path.display());
                println!("     {e}");
                failed += 1;
            }
        }
    }

    println!();
    println!("-- {} schemas, {} failed, {} warnings --", files.len(), failed, warnings);

    if failed > 0 {
        std::process::exit(1);
    }
}
