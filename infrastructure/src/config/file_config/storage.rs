//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding persisted state; defaults to the platform data dir
    pub data_dir: Option<String>,
}

impl FileStorageConfig {
    /// Configured directory, else `$XDG_DATA_HOME/schatphone`.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        match &self.data_dir {
            Some(dir) if !dir.trim().is_empty() => Some(PathBuf::from(dir)),
            _ => dirs::data_dir().map(|d| d.join("schatphone")),
        }
    }
}
