//! AI gateway use case
//!
//! Entry point for the two provider operations: listing models and
//! producing one assistant reply. The provider kind is detected from the
//! configured URL on every call and the matching [`ChatProvider`] is used.

use crate::config::GatewayParams;
use crate::ports::chat_provider::{ChatProvider, CompletionRequest};
use schatphone_domain::{ApiError, ApiKind, ChatMessage, Settings, detect_api_kind_from_url};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of [`AiGateway::fetch_available_models`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelList {
    pub kind: ApiKind,
    pub models: Vec<String>,
}

pub struct AiGateway {
    openai: Arc<dyn ChatProvider>,
    gemini: Arc<dyn ChatProvider>,
    params: GatewayParams,
}

impl AiGateway {
    pub fn new(openai: Arc<dyn ChatProvider>, gemini: Arc<dyn ChatProvider>) -> Self {
        Self {
            openai,
            gemini,
            params: GatewayParams::default(),
        }
    }

    pub fn with_params(mut self, params: GatewayParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &GatewayParams {
        &self.params
    }

    fn provider_for(&self, kind: ApiKind) -> &dyn ChatProvider {
        let provider = match kind {
            ApiKind::Gemini => self.gemini.as_ref(),
            ApiKind::OpenaiCompatible => self.openai.as_ref(),
        };
        debug_assert_eq!(provider.kind(), kind, "provider wired into the wrong slot");
        provider
    }

    /// Lists models for the configured credential. Never mutates `settings`.
    ///
    /// The whole round trip is bounded by
    /// [`GatewayParams::model_list_timeout`]; expiry fails with `TIMEOUT`.
    pub async fn fetch_available_models(&self, settings: &Settings) -> Result<ModelList, ApiError> {
        self.fetch_available_models_with_cancel(settings, &CancellationToken::new())
            .await
    }

    /// [`fetch_available_models`](Self::fetch_available_models) that also
    /// stops with `CANCELED` when `cancel` fires.
    pub async fn fetch_available_models_with_cancel(
        &self,
        settings: &Settings,
        cancel: &CancellationToken,
    ) -> Result<ModelList, ApiError> {
        if settings.api.trimmed_key().is_none() {
            return Err(ApiError::no_api_key());
        }

        let kind = detect_api_kind_from_url(&settings.api.url);
        let provider = self.provider_for(kind);
        debug!("Listing models via {}", kind);

        let deadline = self.params.model_list_timeout;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Model listing canceled");
                Err(ApiError::canceled())
            }
            result = tokio::time::timeout(deadline, provider.list_models(&settings.api)) => {
                match result {
                    Ok(models) => models.map(|models| {
                        debug!("{} returned {} models", kind, models.len());
                        ModelList { kind, models }
                    }),
                    Err(_) => {
                        warn!("Model listing timed out after {:?}", deadline);
                        Err(ApiError::timeout())
                    }
                }
            }
        }
    }

    /// Produces one assistant reply. Single attempt, no retry.
    ///
    /// Fails with `NO_API_KEY` before any network access when the key is
    /// blank. Otherwise records the detected kind in
    /// `settings.api.resolved_kind`.
    pub async fn call_ai(
        &self,
        messages: &[ChatMessage],
        system_prompt: &str,
        settings: &mut Settings,
    ) -> Result<String, ApiError> {
        if settings.api.trimmed_key().is_none() {
            return Err(ApiError::no_api_key());
        }

        let kind = detect_api_kind_from_url(&settings.api.url);
        settings.api.resolved_kind = Some(kind);

        let request = CompletionRequest::new(messages.to_vec(), system_prompt)
            .with_temperature(self.params.temperature)
            .with_max_output_tokens(self.params.max_output_tokens);
        debug!("Requesting completion via {} ({} messages)", kind, messages.len());

        self.provider_for(kind)
            .complete(&settings.api, &request)
            .await
    }
}
