//! Show command implementation.

use std::path::Path;

use mdintake_core::intake::resolve_schema;
use mdintake_core::schema::{Schema, SchemaManager};
use tabled::{Table, Tabled, settings::Style};

use super::load_config;
use crate::ShowArgs;

/// Row for the field table.
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Type")]
    field_type: String,
    #[tabled(rename = "Required")]
    required: String,
    #[tabled(rename = "Allowed")]
    allowed: String,
}

/// Print the fields of a schema grouped by section.
pub fn run(config: Option<&Path>, profile: Option<&str>, args: ShowArgs) {
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
    tracing::debug!("Schema cache:\n{}", manager.describe());

    println!("{} ({})", schema.name(), schema.source_path.display());

    for (section, keys) in schema.section_keys(&rc.schemas.sections) {
        if keys.is_empty() {
            continue;
        }
        print_section(&section, &schema, &keys);
    }

    let unsectioned: Vec<&str> = schema
        .field_list()
        .into_iter()
        .filter(|f| f.section.is_empty())
        .map(|f| f.key.as_str())
        .collect();
    if !unsectioned.is_empty() {
        print_section("(no section)", &schema, &unsectioned);
    }
}

fn print_section(title: &str, schema: &Schema, keys: &[&str]) {
    let rows: Vec<FieldRow> = keys
        .iter()
        .filter_map(|k| schema.get_field(k))
        .map(|f| FieldRow {
            key: f.key.clone(),
            field_type: f.field_type.to_string(),
            required: if f.is_mandatory() { "yes".into() } else { "no".into() },
            allowed: f.enumeration().map(|vals| vals.join(", ")).unwrap_or_default(),
        })
        .collect();

    println!();
    println!("[{title}]");
    println!("{}", Table::new(&rows).with(Style::rounded()));
}
