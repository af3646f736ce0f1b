use mdintake_core::config::loader::{ConfigLoader, default_config_path};
use std::path::Path;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            crate::logging::init(&rc);
            tracing::debug!("Resolved profile {}", rc.active_profile);

            println!("OK   mdi doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("profile: {}", rc.active_profile);
            println!("data_root: {}", rc.data_root.display());
            println!("schema_dir: {}", rc.schema_dir.display());
            println!("store_path: {}", rc.store_path.display());
            println!("database: {}", rc.database);
            println!("collection: {}", rc.collection);
            println!("upsert_key: {}", rc.upsert_key.as_deref().unwrap_or("(none)"));
            println!("schemas.renew_interval_secs: {}", rc.schemas.renew_interval_secs);
            println!("schemas.strict: {}", rc.schemas.strict);
        }
        Err(e) => {
            println!("FAIL mdi doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
