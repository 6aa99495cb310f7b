//! OpenAI-compatible provider
//!
//! Speaks `GET {base}/models` and `POST {base}/chat/completions` with a
//! bearer token. Works against any gateway that mirrors the OpenAI routes.

use super::http_error::{classify_transport_error, read_json};
use async_trait::async_trait;
use schatphone_application::{ChatProvider, CompletionRequest};
use schatphone_domain::api::endpoint::{OPENAI_DEFAULT_MODEL, to_openai_chat_url, to_openai_models_url};
use schatphone_domain::core::string::non_blank;
use schatphone_domain::{ApiError, ApiKind, ApiSettings};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    stream: bool,
}

/// Model ids from `data[]` or `models[]`, preferring `.id` over `.name`.
fn extract_models(payload: &Value) -> Vec<String> {
    let items = payload
        .get("data")
        .and_then(Value::as_array)
        .or_else(|| payload.get("models").and_then(Value::as_array));

    items
        .into_iter()
        .flatten()
        .filter_map(|item| {
            [item.get("id"), item.get("name")]
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .find(|s| !s.is_empty())
        })
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    fn kind(&self) -> ApiKind {
        ApiKind::OpenaiCompatible
    }

    async fn list_models(&self, api: &ApiSettings) -> Result<Vec<String>, ApiError> {
        let key = api.trimmed_key().ok_or_else(ApiError::no_api_key)?;
        let url = to_openai_models_url(&api.url)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(key)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), "Load models failed"));
        }
        Ok(extract_models(&read_json(response).await?))
    }

    async fn complete(
        &self,
        api: &ApiSettings,
        request: &CompletionRequest,
    ) -> Result<String, ApiError> {
        let key = api.trimmed_key().ok_or_else(ApiError::no_api_key)?;
        let url = to_openai_chat_url(&api.url)?;
        let model = non_blank(&api.model).unwrap_or(OPENAI_DEFAULT_MODEL);

        let messages = std::iter::once(WireMessage {
            role: "system",
            content: &request.system_prompt,
        })
        .chain(request.messages.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }))
        .collect();
        let body = ChatCompletionBody {
            model,
            messages,
            temperature: request.temperature,
            stream: false,
        };
        debug!("POST {} (model {})", url, model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("OpenAI API error {}: {}", status, detail);
            return Err(ApiError::http(status.as_u16(), "API Request Failed"));
        }

        let payload = read_json(response).await?;
        Ok(payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}
