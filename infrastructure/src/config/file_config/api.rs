//! Provider API configuration from TOML (`[api]` section)

use schatphone_domain::ApiSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Base or endpoint URL. Blank means the OpenAI default.
    pub url: String,
    /// API key (prefer `SCHATPHONE_API__KEY` over writing it to disk).
    pub key: String,
    /// Model id. Blank means the provider default.
    pub model: String,
}

impl FileApiConfig {
    pub fn to_api_settings(&self) -> ApiSettings {
        ApiSettings::new(&self.url, &self.key, &self.model)
    }
}
