//! API settings consumed by the gateway

use super::kind::ApiKind;
use crate::core::string::non_blank;

/// Settings object owned by the caller.
///
/// The gateway reads `api` and writes back exactly one field,
/// [`ApiSettings::resolved_kind`], after a completion call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub api: ApiSettings,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiSettings {
    /// User-supplied base or endpoint URL (may be blank or partial)
    pub url: String,
    /// API key / bearer token
    pub key: String,
    /// Model id; blank means the provider's built-in default
    pub model: String,
    /// Provider kind detected on the last completion call
    pub resolved_kind: Option<ApiKind>,
}

impl ApiSettings {
    pub fn new(url: impl Into<String>, key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            model: model.into(),
            resolved_kind: None,
        }
    }

    /// The API key with surrounding whitespace removed, if any is left.
    pub fn trimmed_key(&self) -> Option<&str> {
        non_blank(&self.key)
    }
}

impl Settings {
    pub fn with_api(api: ApiSettings) -> Self {
        Self { api }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_key() {
        let api = ApiSettings::new("", "  sk-test \n", "");
        assert_eq!(api.trimmed_key(), Some("sk-test"));
        assert_eq!(ApiSettings::new("", "   ", "").trimmed_key(), None);
    }
}
