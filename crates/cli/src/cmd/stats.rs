//! Stats command implementation.

use std::path::Path;

use tabled::{Table, Tabled, settings::Style};

use super::{load_config, open_service};

/// Row for the collection table.
#[derive(Tabled)]
struct CollectionRow {
    #[tabled(rename = "Database")]
    database: String,
    #[tabled(rename = "Collection")]
    collection: String,
    #[tabled(rename = "Records")]
    records: i64,
}

/// Print record counts per collection.
pub fn run(config: Option<&Path>, profile: Option<&str>) {
    let rc = load_config(config, profile);
    let svc = open_service(&rc);

    let counts = match svc.store().collection_counts() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading store: {e}");
            std::process::exit(1);
        }
    };

    println!("store: {}", rc.store_path.display());
    if counts.is_empty() {
        println!("(no records stored)");
        return;
    }

    let rows: Vec<CollectionRow> = counts
        .into_iter()
        .map(|(database, collection, records)| CollectionRow { database, collection, records })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));
}
