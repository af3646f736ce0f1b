use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub schemas: SchemaSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub data_root: String,
    pub schema_dir: String,
    pub store_path: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Record attribute used to merge resubmitted records. `None` disables merging.
    #[serde(default = "default_upsert_key")]
    pub upsert_key: Option<String>,
}

/// Schema cache and parsing behaviour.
#[derive(Debug, Deserialize, Clone)]
pub struct SchemaSettings {
    /// Seconds a cached schema stays fresh before the next load re-reads it.
    #[serde(default = "default_renew_interval_secs")]
    pub renew_interval_secs: u64,
    /// Reject unknown schema attributes instead of dropping them.
    #[serde(default)]
    pub strict: bool,
    /// Preferred section order for presentation.
    #[serde(default)]
    pub sections: Vec<String>,
}

impl SchemaSettings {
    pub fn renew_interval(&self) -> Duration {
        Duration::from_secs(self.renew_interval_secs)
    }
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            renew_interval_secs: default_renew_interval_secs(),
            strict: false,
            sections: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_renew_interval_secs() -> u64 {
    600
}

fn default_database() -> String {
    "metadata".to_string()
}

fn default_collection() -> String {
    "records".to_string()
}

fn default_upsert_key() -> Option<String> {
    Some("did".to_string())
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub data_root: PathBuf,
    /// Directory scanned for `.json`/`.yaml`/`.yml` schema files.
    pub schema_dir: PathBuf,
    /// SQLite file backing the metadata store.
    pub store_path: PathBuf,
    pub database: String,
    pub collection: String,
    pub upsert_key: Option<String>,
    pub schemas: SchemaSettings,
    pub logging: LoggingConfig,
}
