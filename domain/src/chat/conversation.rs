//! Conversation entity

use super::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Map key for a contact's conversation and message list.
pub fn conversation_key(contact_id: u64) -> String {
    contact_id.to_string()
}

/// One conversation per contact (Entity)
///
/// `last_message` and `last_message_at` are the conversation summary; they
/// mirror the last entry of the message list, or the contact's cached
/// `last_message` when the list is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub contact_id: u64,
    pub created_at: i64,
    pub updated_at: i64,
    pub unread: u32,
    pub draft: String,
    pub pinned: bool,
    pub last_message: String,
    pub last_message_at: i64,
}

impl Conversation {
    pub fn new(contact_id: u64, now: i64) -> Self {
        Self {
            id: format!("conv_{contact_id}"),
            contact_id,
            created_at: now,
            updated_at: now,
            unread: 0,
            draft: String::new(),
            pinned: false,
            last_message: String::new(),
            last_message_at: 0,
        }
    }

    /// Tolerant read of a persisted conversation. `contact_id` always comes
    /// from the owning contact, never from the stored record.
    pub fn from_value(raw: Option<&Value>, contact_id: u64, now: i64) -> Self {
        let Some(raw) = raw else {
            return Self::new(contact_id, now);
        };
        Self {
            id: normalize::non_empty_string(raw.get("id"))
                .map(str::to_string)
                .unwrap_or_else(|| format!("conv_{contact_id}")),
            contact_id,
            created_at: normalize::timestamp(raw.get("createdAt")).unwrap_or(now),
            updated_at: normalize::timestamp(raw.get("updatedAt")).unwrap_or(now),
            unread: normalize::number(raw.get("unread"))
                .map(|n| n.floor().clamp(0.0, u32::MAX as f64) as u32)
                .unwrap_or(0),
            draft: normalize::string(raw.get("draft"))
                .unwrap_or_default()
                .to_string(),
            pinned: normalize::truthy(raw.get("pinned")),
            last_message: normalize::string(raw.get("lastMessage"))
                .unwrap_or_default()
                .to_string(),
            last_message_at: normalize::timestamp(raw.get("lastMessageAt")).unwrap_or(0),
        }
    }
}
