//! Plain-text rendering of chat state for the terminal.

use chrono::{Local, TimeZone};
use schatphone_domain::core::string::preview;
use schatphone_domain::{
    ChatState, Contact, ContactKind, Conversation, Message, MessageStatus, Role,
};

const PREVIEW_CHARS: usize = 48;

fn format_time(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

pub fn contact_line(contact: &Contact, conversation: Option<&Conversation>) -> String {
    let pinned = conversation.is_some_and(|c| c.pinned);
    let unread = conversation.map_or(0, |c| c.unread);
    let marker = if pinned { "*" } else { " " };
    let badge = if unread > 0 {
        format!(" ({unread})")
    } else {
        String::new()
    };
    let role = if contact.role.is_empty() {
        String::new()
    } else {
        format!(" - {}", contact.role)
    };
    let kind = match contact.kind {
        ContactKind::Persona => String::new(),
        other => format!(" [{other}]"),
    };
    format!(
        "{marker}{:>4}  {}{}{}{}\n        {}",
        contact.id,
        contact.name,
        kind,
        role,
        badge,
        preview(&contact.last_message, PREVIEW_CHARS)
    )
}

pub fn contact_list(state: &ChatState) -> String {
    state
        .contacts_for_list()
        .into_iter()
        .map(|contact| contact_line(contact, state.conversation_for_contact(contact.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn message_line(message: &Message, contact_name: &str) -> String {
    let author = match message.role {
        Role::User => "You",
        Role::Assistant => contact_name,
        Role::System => "System",
    };
    let status = match message.status {
        MessageStatus::Sent => String::new(),
        other => format!(" [{} {}]", other.as_str(), message.id),
    };
    format!(
        "[{}] {}: {}{}",
        format_time(message.created_at),
        author,
        message.content,
        status
    )
}

pub fn history(state: &ChatState, contact: &Contact) -> String {
    let mut lines: Vec<String> = state
        .messages_for_contact(contact.id)
        .iter()
        .map(|m| message_line(m, &contact.name))
        .collect();
    if let Some(conversation) = state.conversation_for_contact(contact.id)
        && !conversation.draft.is_empty()
    {
        lines.push(format!("(draft) {}", conversation.draft));
    }
    if lines.is_empty() {
        return format!("No messages with {} yet.", contact.name);
    }
    lines.join("\n")
}
