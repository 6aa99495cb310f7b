//! Message entity

use super::normalize;
use crate::api::message::{ChatMessage, ChatRole};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// Author of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }

    pub fn to_chat_role(self) -> ChatRole {
        match self {
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Assistant,
            Role::System => ChatRole::System,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown message status: {0}")]
pub struct UnknownStatus(pub String);

/// Delivery status of a message
///
/// Sanctioned transitions: `sending → sent`, `sending → failed` and
/// `failed → sending` (retry). Nothing advances a status automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sending,
    #[default]
    Sent,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sending => "sending",
            MessageStatus::Sent => "sent",
            MessageStatus::Failed => "failed",
        }
    }

    pub fn can_transition_to(self, next: MessageStatus) -> bool {
        matches!(
            (self, next),
            (MessageStatus::Sending, MessageStatus::Sent)
                | (MessageStatus::Sending, MessageStatus::Failed)
                | (MessageStatus::Failed, MessageStatus::Sending)
        )
    }
}

impl FromStr for MessageStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sending" => Ok(MessageStatus::Sending),
            "sent" => Ok(MessageStatus::Sent),
            "failed" => Ok(MessageStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A stored message (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: i64,
    pub status: MessageStatus,
}

/// Caller input for appending a message; missing fields get defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMessage {
    pub id: Option<String>,
    /// Defaults to `assistant`
    pub role: Option<Role>,
    pub content: String,
    /// Defaults to the current time
    pub created_at: Option<i64>,
    /// Defaults to `sent`
    pub status: Option<MessageStatus>,
}

impl NewMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// `msg_{millis}_{six base-36 characters}`
pub fn new_message_id(now: i64) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("msg_{now}_{suffix}")
}

impl Message {
    pub(crate) fn from_new(new: NewMessage, now: i64) -> Self {
        Self {
            id: new
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| new_message_id(now)),
            role: new.role.unwrap_or_default(),
            content: new.content,
            created_at: new.created_at.unwrap_or(now),
            status: new.status.unwrap_or_default(),
        }
    }

    /// Tolerant read of a persisted message.
    pub fn from_value(raw: &Value, now: i64) -> Self {
        Self {
            id: normalize::non_empty_string(raw.get("id"))
                .map(str::to_string)
                .unwrap_or_else(|| new_message_id(now)),
            role: normalize::string(raw.get("role"))
                .and_then(Role::parse)
                .unwrap_or_default(),
            content: normalize::string(raw.get("content"))
                .unwrap_or_default()
                .to_string(),
            created_at: normalize::timestamp(raw.get("createdAt")).unwrap_or(now),
            status: normalize::string(raw.get("status"))
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }

    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role.to_chat_role(),
            content: self.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_id_shape() {
        let id = new_message_id(1_700_000_000_000);
        assert!(id.starts_with("msg_1700000000000_"));
        let suffix = id.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("sending".parse::<MessageStatus>(), Ok(MessageStatus::Sending));
        assert_eq!("failed".parse::<MessageStatus>(), Ok(MessageStatus::Failed));
        assert_eq!(
            "delivered".parse::<MessageStatus>(),
            Err(UnknownStatus("delivered".to_string()))
        );
    }

    #[test]
    fn test_sanctioned_transitions() {
        use MessageStatus::*;
        assert!(Sending.can_transition_to(Sent));
        assert!(Sending.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Sending));
        assert!(!Sent.can_transition_to(Sending));
        assert!(!Failed.can_transition_to(Sent));
        assert!(!Sent.can_transition_to(Failed));
    }

    #[test]
    fn test_from_new_fills_defaults() {
        let message = Message::from_new(NewMessage::default(), 5_000);
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.status, MessageStatus::Sent);
        assert_eq!(message.created_at, 5_000);
        assert!(message.id.starts_with("msg_5000_"));

        let kept = Message::from_new(NewMessage::user("hi").with_id("fixed"), 5_000);
        assert_eq!(kept.id, "fixed");
        assert_eq!(kept.role, Role::User);
    }

    #[test]
    fn test_from_value_coerces_malformed_fields() {
        let message = Message::from_value(
            &json!({"id": 12, "role": "robot", "content": ["x"], "createdAt": "yesterday", "status": "lost"}),
            9_000,
        );
        assert!(message.id.starts_with("msg_9000_"));
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "");
        assert_eq!(message.created_at, 9_000);
        assert_eq!(message.status, MessageStatus::Sent);
    }

    #[test]
    fn test_from_value_keeps_valid_fields() {
        let raw = json!({"id": "m1", "role": "system", "content": "hello", "createdAt": 42, "status": "failed"});
        let message = Message::from_value(&raw, 9_000);
        assert_eq!(
            message,
            Message {
                id: "m1".to_string(),
                role: Role::System,
                content: "hello".to_string(),
                created_at: 42,
                status: MessageStatus::Failed,
            }
        );
        assert_eq!(serde_json::to_value(&message).unwrap(), raw);
    }
}
