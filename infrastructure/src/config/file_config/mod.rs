//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and
//! application types at the edges.

mod api;
mod generation;
mod log;
mod storage;

pub use api::FileApiConfig;
pub use generation::FileGenerationConfig;
pub use log::FileLogConfig;
pub use storage::FileStorageConfig;

use schatphone_domain::Settings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("generation.model_list_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("generation.temperature must be between 0 and 2, got {0}")]
    TemperatureOutOfRange(f32),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider endpoint and credential
    pub api: FileApiConfig,
    /// Generation settings
    pub generation: FileGenerationConfig,
    /// Where state is persisted
    pub storage: FileStorageConfig,
    /// Log output
    pub log: FileLogConfig,
}

impl FileConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.generation.model_list_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        let temperature = self.generation.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigValidationError::TemperatureOutOfRange(temperature));
        }
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        Settings::with_api(self.api.to_api_settings())
    }
}
