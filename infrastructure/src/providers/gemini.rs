//! Gemini provider
//!
//! Speaks the Generative Language API: `GET {base}/models?key=...` and
//! `POST {base}/models/{model}:generateContent?key=...`.

use super::http_error::{classify_transport_error, read_json};
use async_trait::async_trait;
use schatphone_application::{ChatProvider, CompletionRequest};
use schatphone_domain::api::endpoint::{
    normalize_gemini_model_name, to_gemini_generate_url, to_gemini_models_url,
};
use schatphone_domain::{ApiError, ApiKind, ApiSettings, ChatRole};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: SystemInstruction<'a>,
    generation_config: GenerationConfig,
}

/// Gemini has no assistant or system role in `contents`.
fn wire_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant | ChatRole::System => "model",
    }
}

fn extract_models(payload: &Value) -> Vec<String> {
    payload
        .get("models")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("name").and_then(Value::as_str))
        .filter(|name| !name.is_empty())
        .map(normalize_gemini_model_name)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct GeminiProvider {
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn kind(&self) -> ApiKind {
        ApiKind::Gemini
    }

    async fn list_models(&self, api: &ApiSettings) -> Result<Vec<String>, ApiError> {
        let key = api.trimmed_key().ok_or_else(ApiError::no_api_key)?;
        let url = to_gemini_models_url(&api.url)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", key)])
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
        let url = to_gemini_generate_url(&api.url, &api.model)?;

        let body = GenerateContentBody {
            contents: request
                .messages
                .iter()
                .map(|m| Content {
                    role: wire_role(m.role),
                    parts: vec![Part { text: &m.content }],
                })
                .collect(),
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: &request.system_prompt,
                }],
            },
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        };
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), "Gemini API Request Failed"));
        }

        let payload = read_json(response).await?;
        Ok(payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::{Recorder, record, serve};
    use axum::Json;
    use axum::Router;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::routing::{get, post};
    use schatphone_domain::{ApiErrorKind, ChatMessage};
    use serde_json::json;

    async fn models(State(rec): State<Recorder>, uri: Uri, headers: HeaderMap) -> Json<Value> {
        record(&rec, &uri, &headers, None);
        Json(json!({"models": [
            {"name": "models/gemini-2.5-flash"},
            {"name": "models/gemini-2.5-pro"},
            {"displayName": "nameless"}
        ]}))
    }

    async fn generate(
        State(rec): State<Recorder>,
        Path(action): Path<String>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        record(&rec, &uri, &headers, Some(body));
        match action.as_str() {
            "gemini-2.5-flash:generateContent" => Ok(Json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "Morning, V."}]}}]
            }))),
            "blocked:generateContent" => Ok(Json(json!({"candidates": []}))),
            _ => Err(StatusCode::FORBIDDEN),
        }
    }

    async fn fake_gemini() -> (String, Recorder) {
        let rec = Recorder::default();
        let router = Router::new()
            .route("/v1beta/models", get(models))
            .route("/v1beta/models/{action}", post(generate))
            .with_state(rec.clone());
        (serve(router).await, rec)
    }

    #[test]
    fn test_wire_roles() {
        assert_eq!(wire_role(ChatRole::User), "user");
        assert_eq!(wire_role(ChatRole::Assistant), "model");
        assert_eq!(wire_role(ChatRole::System), "model");
    }

    #[tokio::test]
    async fn test_list_models_uses_key_query_and_strips_prefix() {
        let (base, rec) = fake_gemini().await;
        let api = ApiSettings::new(format!("{base}/v1beta/models?alt=json"), "g-key", "");

        let models = GeminiProvider::new().list_models(&api).await.unwrap();
        assert_eq!(models, ["gemini-2.5-flash", "gemini-2.5-pro"]);

        let seen = rec.lock().unwrap();
        assert_eq!(seen[0].path, "/v1beta/models");
        assert_eq!(seen[0].query.as_deref(), Some("key=g-key"));
        assert!(seen[0].authorization.is_none());
    }

    #[tokio::test]
    async fn test_complete_builds_contents() {
        let (base, rec) = fake_gemini().await;
        let api = ApiSettings::new(format!("{base}/v1beta"), "g-key", "models/gemini-2.5-flash");
        let request = CompletionRequest::new(
            vec![ChatMessage::user("status?"), ChatMessage::assistant("nominal")],
            "You are Eva.",
        );

        let reply = GeminiProvider::new().complete(&api, &request).await.unwrap();
        assert_eq!(reply, "Morning, V.");

        let seen = rec.lock().unwrap();
        assert_eq!(seen[0].path, "/v1beta/models/gemini-2.5-flash:generateContent");
        assert_eq!(seen[0].query.as_deref(), Some("key=g-key"));
        assert_eq!(
            seen[0].body.as_ref().unwrap(),
            &json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "status?"}]},
                    {"role": "model", "parts": [{"text": "nominal"}]}
                ],
                "systemInstruction": {"parts": [{"text": "You are Eva."}]},
                "generationConfig": {"temperature": 0.7, "maxOutputTokens": 500}
            })
        );
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_reply() {
        let (base, _) = fake_gemini().await;
        let api = ApiSettings::new(format!("{base}/v1beta"), "g-key", "blocked");
        let reply = GeminiProvider::new()
            .complete(&api, &CompletionRequest::new(vec![], ""))
            .await
            .unwrap();
        assert_eq!(reply, "");
    }

    #[tokio::test]
    async fn test_forbidden_is_auth() {
        let (base, _) = fake_gemini().await;
        let api = ApiSettings::new(format!("{base}/v1beta"), "bad-key", "gemini-1.0-pro");
        let err = GeminiProvider::new()
            .complete(&api, &CompletionRequest::new(vec![ChatMessage::user("hi")], ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Auth);
        assert_eq!(err.status, Some(403));
    }
}
