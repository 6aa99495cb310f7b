//! Generation configuration from TOML (`[generation]` section)

use schatphone_application::GatewayParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Sampling temperature (0.0 to 2.0)
    pub temperature: f32,
    /// Output cap for Gemini requests
    pub max_output_tokens: u32,
    /// Deadline for listing models
    pub model_list_timeout_seconds: u64,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        let params = GatewayParams::default();
        Self {
            temperature: params.temperature,
            max_output_tokens: params.max_output_tokens,
            model_list_timeout_seconds: params.model_list_timeout.as_secs(),
        }
    }
}

impl FileGenerationConfig {
    pub fn to_gateway_params(&self) -> GatewayParams {
        GatewayParams::default()
            .with_temperature(self.temperature)
            .with_max_output_tokens(self.max_output_tokens)
            .with_model_list_timeout(Duration::from_secs(self.model_list_timeout_seconds))
    }
}
