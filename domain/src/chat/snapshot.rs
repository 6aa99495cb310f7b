//! Persisted shapes of the chat state.
//!
//! Two shapes exist on disk:
//!
//! - **current**: `{contacts, conversations, messagesByConversation}`
//! - **legacy**: `{contacts, chatHistory}` where `chatHistory` maps a contact
//!   id to `[{role, content}]`
//!
//! Both are read through tolerant normalization: malformed entries are
//! coerced to defaults, never rejected.

use super::contact::Contact;
use super::conversation::{Conversation, conversation_key};
use super::defaults::default_legacy_value;
use super::message::{Message, MessageStatus, Role};
use super::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Spacing between synthesized timestamps of legacy messages.
const LEGACY_MESSAGE_SPACING_MS: i64 = 60_000;

/// Flat copy of everything `ChatState` owns (current shape).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub contacts: Vec<Contact>,
    pub conversations: BTreeMap<String, Conversation>,
    pub messages_by_conversation: BTreeMap<String, Vec<Message>>,
}

/// Export view of one message in the legacy `chatHistory` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyMessage {
    pub role: Role,
    pub content: String,
}

/// Both summary maps present and truthy.
pub fn is_current_shape(value: &Value) -> bool {
    normalize::truthy(value.get("conversations"))
        && normalize::truthy(value.get("messagesByConversation"))
}

fn normalize_contacts(raw: Option<&Value>, now: i64) -> Vec<Contact> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| Contact::from_value(item, index, now))
            .collect(),
        _ => default_contacts(now),
    }
}

fn default_contacts(now: i64) -> Vec<Contact> {
    normalize_contacts(default_legacy_value().get("contacts"), now)
}

impl ChatSnapshot {
    /// Built-in contacts with their opening lines.
    pub fn seed(now: i64) -> Self {
        Self::from_legacy_value(&default_legacy_value(), now)
    }

    /// Reads any stored payload, picking the shape by its fields. Non-object
    /// payloads seed the defaults.
    pub fn from_value(value: &Value, now: i64) -> Self {
        if !value.is_object() {
            return Self::seed(now);
        }
        if is_current_shape(value) {
            Self::from_current_value(value, now)
        } else {
            Self::from_legacy_value(value, now)
        }
    }

    /// Current shape: each contact's conversation and message list are read
    /// from the keyed maps; missing entries start empty.
    pub fn from_current_value(value: &Value, now: i64) -> Self {
        let contacts = normalize_contacts(value.get("contacts"), now);
        let stored_conversations = value.get("conversations");
        let stored_messages = value.get("messagesByConversation");

        let mut snapshot = Self {
            contacts,
            ..Self::default()
        };
        for contact in &snapshot.contacts {
            let key = conversation_key(contact.id);
            let conversation = Conversation::from_value(
                stored_conversations.and_then(|c| c.get(&key)),
                contact.id,
                now,
            );
            let messages = match stored_messages.and_then(|m| m.get(&key)) {
                Some(Value::Array(items)) => {
                    items.iter().map(|raw| Message::from_value(raw, now)).collect()
                }
                _ => Vec::new(),
            };
            snapshot.conversations.insert(key.clone(), conversation);
            snapshot.messages_by_conversation.insert(key, messages);
        }
        snapshot
    }

    /// Legacy shape: a conversation is synthesized per contact and history
    /// entries become `sent` messages stamped a minute apart, ending one
    /// minute before `now`, so their order survives.
    pub fn from_legacy_value(value: &Value, now: i64) -> Self {
        let contacts = normalize_contacts(value.get("contacts"), now);
        let history = value.get("chatHistory");

        let mut snapshot = Self {
            contacts,
            ..Self::default()
        };
        for contact in &snapshot.contacts {
            let key = conversation_key(contact.id);
            let entries = match history.and_then(|h| h.get(&key)) {
                Some(Value::Array(items)) => items.as_slice(),
                _ => &[],
            };
            let total = entries.len() as i64;
            let messages: Vec<Message> = entries
                .iter()
                .enumerate()
                .map(|(index, raw)| {
                    let mut message = Message::from_value(raw, now);
                    message.created_at = now - (total - index as i64) * LEGACY_MESSAGE_SPACING_MS;
                    message.status = MessageStatus::Sent;
                    message
                })
                .collect();

            let mut conversation = Conversation::new(contact.id, now);
            conversation.last_message = contact.last_message.clone();
            conversation.last_message_at = messages.last().map_or(now, |m| m.created_at);
            conversation.updated_at = conversation.last_message_at;

            snapshot.conversations.insert(key.clone(), conversation);
            snapshot.messages_by_conversation.insert(key, messages);
        }
        snapshot
    }
}
