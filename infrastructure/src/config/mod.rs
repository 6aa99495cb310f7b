//! Configuration file loading for schatphone
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SCHATPHONE_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./schatphone.toml` or `./.schatphone.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/schatphone/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileApiConfig, FileConfig, FileGenerationConfig, FileLogConfig,
    FileStorageConfig,
};
pub use loader::ConfigLoader;
