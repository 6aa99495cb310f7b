//! Chat provider port
//!
//! Defines the interface for talking to one backend protocol family.

use async_trait::async_trait;
use schatphone_domain::{ApiError, ApiKind, ApiSettings, ChatMessage};

/// One assistant-reply request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Conversation turns in chronological order, without the system prompt
    pub messages: Vec<ChatMessage>,
    pub system_prompt: String,
    pub temperature: f32,
    /// Honored by providers that accept an output cap
    pub max_output_tokens: u32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, system_prompt: impl Into<String>) -> Self {
        Self {
            messages,
            system_prompt: system_prompt.into(),
            temperature: 0.7,
            max_output_tokens: 500,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }
}

/// Adapter for a single provider kind
///
/// The gateway picks an implementation once per call from the configured
/// URL. Implementations must classify every failure into an [`ApiError`];
/// raw transport errors never cross this boundary.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Which protocol this adapter speaks
    fn kind(&self) -> ApiKind;

    /// Model ids available to the configured credential
    async fn list_models(&self, api: &ApiSettings) -> Result<Vec<String>, ApiError>;

    /// One assistant reply, or an empty string when the provider sent none
    async fn complete(
        &self,
        api: &ApiSettings,
        request: &CompletionRequest,
    ) -> Result<String, ApiError>;
}
