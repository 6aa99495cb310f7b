//! Provider kind detection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host of Google's Generative Language API.
pub const GEMINI_API_HOST: &str = "generativelanguage.googleapis.com";

/// Backend protocol family (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKind {
    #[default]
    OpenaiCompatible,
    Gemini,
}

impl ApiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKind::OpenaiCompatible => "openai_compatible",
            ApiKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a configured API URL.
///
/// Case-insensitive substring match: the Gemini host, a `/v1beta/models`
/// path or a `:generateContent` action all mean Gemini. Anything else,
/// including a blank URL, is treated as OpenAI-compatible.
pub fn detect_api_kind_from_url(url: &str) -> ApiKind {
    let lower = url.trim().to_lowercase();
    if lower.is_empty() {
        return ApiKind::OpenaiCompatible;
    }
    if lower.contains(GEMINI_API_HOST)
        || lower.contains("/v1beta/models")
        || lower.contains(":generatecontent")
    {
        return ApiKind::Gemini;
    }
    ApiKind::OpenaiCompatible
}
