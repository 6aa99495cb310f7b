//! Infrastructure layer for schatphone
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileApiConfig, FileConfig, FileGenerationConfig,
    FileLogConfig, FileStorageConfig,
};
pub use providers::{GeminiProvider, OpenAiCompatibleProvider};
pub use storage::JsonFileStore;
