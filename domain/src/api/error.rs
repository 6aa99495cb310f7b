//! Gateway error taxonomy
//!
//! Every failure the AI gateway reports is classified into exactly one
//! [`ApiErrorKind`] before it crosses the gateway boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message used when neither the error nor the caller provide one.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed. Please try again.";

/// Closed set of gateway failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorKind {
    NoApiKey,
    InvalidUrl,
    Auth,
    NotFound,
    RateLimit,
    Server,
    HttpError,
    Timeout,
    Network,
    ParseError,
    Canceled,
    Unknown,
}

impl ApiErrorKind {
    pub const ALL: [ApiErrorKind; 12] = [
        ApiErrorKind::NoApiKey,
        ApiErrorKind::InvalidUrl,
        ApiErrorKind::Auth,
        ApiErrorKind::NotFound,
        ApiErrorKind::RateLimit,
        ApiErrorKind::Server,
        ApiErrorKind::HttpError,
        ApiErrorKind::Timeout,
        ApiErrorKind::Network,
        ApiErrorKind::ParseError,
        ApiErrorKind::Canceled,
        ApiErrorKind::Unknown,
    ];

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorKind::NoApiKey => "NO_API_KEY",
            ApiErrorKind::InvalidUrl => "INVALID_URL",
            ApiErrorKind::Auth => "AUTH",
            ApiErrorKind::NotFound => "NOT_FOUND",
            ApiErrorKind::RateLimit => "RATE_LIMIT",
            ApiErrorKind::Server => "SERVER",
            ApiErrorKind::HttpError => "HTTP_ERROR",
            ApiErrorKind::Timeout => "TIMEOUT",
            ApiErrorKind::Network => "NETWORK",
            ApiErrorKind::ParseError => "PARSE_ERROR",
            ApiErrorKind::Canceled => "CANCELED",
            ApiErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Map an HTTP status to its error kind.
pub fn classify_http_code(status: u16) -> ApiErrorKind {
    match status {
        401 | 403 => ApiErrorKind::Auth,
        404 => ApiErrorKind::NotFound,
        429 => ApiErrorKind::RateLimit,
        s if s >= 500 => ApiErrorKind::Server,
        _ => ApiErrorKind::HttpError,
    }
}

/// A classified gateway failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status, when the failure came from a response
    pub status: Option<u16>,
    /// Diagnostic message (not necessarily user-facing)
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Classify a non-2xx response. `context` prefixes the status in the message.
    pub fn http(status: u16, context: &str) -> Self {
        Self {
            kind: classify_http_code(status),
            status: Some(status),
            message: format!("{context}: {status}"),
        }
    }

    pub fn no_api_key() -> Self {
        Self::new(ApiErrorKind::NoApiKey, "No API Key")
    }

    pub fn invalid_url(detail: impl fmt::Display) -> Self {
        Self::new(ApiErrorKind::InvalidUrl, format!("Invalid URL: {detail}"))
    }

    pub fn timeout() -> Self {
        Self::new(ApiErrorKind::Timeout, "Request timed out")
    }

    pub fn canceled() -> Self {
        Self::new(ApiErrorKind::Canceled, "Request canceled")
    }

    pub fn network(detail: impl fmt::Display) -> Self {
        Self::new(ApiErrorKind::Network, format!("Network error: {detail}"))
    }

    pub fn parse(detail: impl fmt::Display) -> Self {
        Self::new(
            ApiErrorKind::ParseError,
            format!("Failed to parse response: {detail}"),
        )
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unknown, message)
    }

    /// User-facing text for this error; see [`format_api_error_for_ui`].
    pub fn ui_message(&self, fallback: &str) -> String {
        format_api_error_for_ui(Some(self), fallback)
    }
}

fn status_suffix(status: Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Render an error for display.
///
/// Every kind has a fixed template; the HTTP status is interpolated where the
/// kind carries one. `Unknown` (and a missing error) falls back to the error's
/// own message, then to `fallback`, then to [`GENERIC_FAILURE_MESSAGE`], so the
/// result is never empty.
pub fn format_api_error_for_ui(error: Option<&ApiError>, fallback: &str) -> String {
    let fallback = if fallback.trim().is_empty() {
        GENERIC_FAILURE_MESSAGE
    } else {
        fallback
    };
    let Some(error) = error else {
        return fallback.to_string();
    };
    let status = status_suffix(error.status);

    match error.kind {
        ApiErrorKind::NoApiKey => {
            "No API key configured. Add one under Settings > API.".to_string()
        }
        ApiErrorKind::InvalidUrl => {
            "The API URL is invalid. Check the URL under Settings > API.".to_string()
        }
        ApiErrorKind::Auth => {
            format!("Authentication failed{status}. Check that the API key is valid.")
        }
        ApiErrorKind::NotFound => {
            format!("Endpoint or model not found{status}. Check the API URL and model name.")
        }
        ApiErrorKind::RateLimit => {
            format!("Rate limited by the provider{status}. Wait a moment and try again.")
        }
        ApiErrorKind::Server => {
            format!("The provider reported a server error{status}. Try again later.")
        }
        ApiErrorKind::HttpError => format!("The request failed{status}."),
        ApiErrorKind::Timeout => {
            "The request timed out. Check the network or the API URL.".to_string()
        }
        ApiErrorKind::Network => {
            "Network error: the API endpoint could not be reached.".to_string()
        }
        ApiErrorKind::ParseError => {
            "The provider returned a response that could not be read.".to_string()
        }
        ApiErrorKind::Canceled => "The request was canceled.".to_string(),
        ApiErrorKind::Unknown => {
            if error.message.trim().is_empty() {
                fallback.to_string()
            } else {
                error.message.clone()
            }
        }
    }
}
