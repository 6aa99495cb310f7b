//! Endpoint resolution for both provider families
//!
//! All functions are pure. A blank input falls back to the provider's
//! built-in default URL; an input without a scheme is read as `https://`.
//! Inputs that still do not parse as an http(s) URL fail with
//! [`ApiErrorKind::InvalidUrl`](super::error::ApiErrorKind::InvalidUrl).

use super::error::ApiError;
use url::Url;

pub const OPENAI_DEFAULT_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";

fn parse_or_default(input: &str, default_url: &str) -> Result<Url, ApiError> {
    let trimmed = input.trim();
    let candidate = if trimmed.is_empty() {
        default_url.to_string()
    } else if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| ApiError::invalid_url(format!("{trimmed}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::invalid_url(format!(
            "{trimmed}: unsupported scheme '{other}'"
        ))),
    }
}

fn trimmed_path(url: &Url) -> String {
    url.path().trim_end_matches('/').to_string()
}

fn openai_chat_url(input: &str) -> Result<Url, ApiError> {
    let mut url = parse_or_default(input, OPENAI_DEFAULT_CHAT_URL)?;
    let path = trimmed_path(&url);

    if path.is_empty() {
        url.set_path("/v1/chat/completions");
    } else if path.ends_with("/chat/completions") {
        // already a chat endpoint
    } else if let Some(prefix) = path.strip_suffix("/models") {
        url.set_path(&format!("{prefix}/chat/completions"));
    } else if path.ends_with("/v1") {
        url.set_path(&format!("{path}/chat/completions"));
    }
    // Any other custom path is a gateway deployment's own route: kept as-is.

    Ok(url)
}

/// Chat-completions endpoint for an OpenAI-compatible base URL.
///
/// ```
/// use schatphone_domain::api::endpoint::to_openai_chat_url;
///
/// assert_eq!(
///     to_openai_chat_url("https://host/api/v1/models").unwrap(),
///     "https://host/api/v1/chat/completions"
/// );
/// ```
pub fn to_openai_chat_url(input: &str) -> Result<String, ApiError> {
    openai_chat_url(input).map(String::from)
}

/// Model-listing endpoint derived from the chat endpoint.
pub fn to_openai_models_url(input: &str) -> Result<String, ApiError> {
    let mut url = openai_chat_url(input)?;
    let path = trimmed_path(&url);

    if let Some(prefix) = path.strip_suffix("/chat/completions") {
        url.set_path(&format!("{prefix}/models"));
    } else if let Some(prefix) = path.strip_suffix("/completions") {
        url.set_path(&format!("{prefix}/models"));
    } else if path.ends_with("/v1") {
        url.set_path(&format!("{path}/models"));
    } else {
        url.set_path("/v1/models");
    }

    Ok(url.into())
}

fn gemini_version_base_url(input: &str) -> Result<Url, ApiError> {
    let mut url = parse_or_default(input, GEMINI_DEFAULT_BASE_URL)?;
    let path = url.path().to_lowercase();

    let version = if path.contains("/v1beta") {
        "/v1beta"
    } else if path.contains("/v1") {
        "/v1"
    } else {
        "/v1beta"
    };
    url.set_path(version);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// `{scheme}://{host}/v1beta` or `/v1`, without query string or trailing slash.
pub fn to_gemini_version_base_url(input: &str) -> Result<String, ApiError> {
    let url = gemini_version_base_url(input)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Model id without a `models/` prefix; the built-in default when blank.
pub fn normalize_gemini_model_name(name: &str) -> String {
    let trimmed = name.trim();
    let bare = trimmed.strip_prefix("models/").unwrap_or(trimmed);
    if bare.is_empty() {
        GEMINI_DEFAULT_MODEL.to_string()
    } else {
        bare.to_string()
    }
}

/// Model-listing endpoint for Gemini (the key is added as a query parameter
/// by the caller).
pub fn to_gemini_models_url(input: &str) -> Result<String, ApiError> {
    Ok(format!("{}/models", to_gemini_version_base_url(input)?))
}

/// `{versionBaseUrl}/models/{model}:generateContent`. The model name is
/// percent-encoded on its own, so a `:` or `/` inside it cannot be mistaken
/// for the action suffix or a path separator.
pub fn to_gemini_generate_url(input: &str, model: &str) -> Result<String, ApiError> {
    let mut url = gemini_version_base_url(input)?;
    let model = normalize_gemini_model_name(model);
    let path = format!(
        "{}/models/{}:generateContent",
        url.path().trim_end_matches('/'),
        urlencoding::encode(&model)
    );
    url.set_path(&path);
    Ok(url.into())
}
