//! Gateway parameters: generation settings and the model-list deadline.
//!
//! [`GatewayParams`] holds the static knobs the [`AiGateway`] applies to
//! every request. These are application-layer concerns, not domain policy.
//!
//! [`AiGateway`]: crate::use_cases::ai_gateway::AiGateway

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayParams {
    /// Sampling temperature sent with every completion.
    pub temperature: f32,
    /// Output cap for providers that accept one (Gemini).
    pub max_output_tokens: u32,
    /// Deadline for the whole model-list round trip.
    pub model_list_timeout: Duration,
}

impl Default for GatewayParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 500,
            model_list_timeout: Duration::from_secs(12),
        }
    }
}

impl GatewayParams {
    // ==================== Builder Methods ====================

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn with_model_list_timeout(mut self, timeout: Duration) -> Self {
        self.model_list_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = GatewayParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_output_tokens, 500);
        assert_eq!(params.model_list_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_builder() {
        let params = GatewayParams::default()
            .with_temperature(1.2)
            .with_max_output_tokens(64)
            .with_model_list_timeout(Duration::from_secs(3));

        assert_eq!(params.temperature, 1.2);
        assert_eq!(params.max_output_tokens, 64);
        assert_eq!(params.model_list_timeout, Duration::from_secs(3));
    }
}
