//! In-memory conversation state engine.
//!
//! [`ChatState`] owns contacts, one conversation per contact and each
//! conversation's append-only message list. Every mutator that can change
//! the last message recomputes the conversation summary and the contact's
//! cached `last_message` before returning.
//!
//! Mutators never fail: lookups that miss return `false`, everything else
//! succeeds. Each effective change bumps [`ChatState::revision`], which the
//! application layer uses to decide when to persist.

use super::contact::{Contact, ContactPatch, MAX_CONTACT_ID, NewContact};
use super::conversation::{Conversation, conversation_key};
use super::message::{Message, MessageStatus, NewMessage};
use super::snapshot::{ChatSnapshot, LegacyMessage};
use crate::core::clock::Clock;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub struct ChatState {
    contacts: Vec<Contact>,
    conversations: BTreeMap<String, Conversation>,
    messages: BTreeMap<String, Vec<Message>>,
    clock: Arc<dyn Clock>,
    revision: u64,
}

impl fmt::Debug for ChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatState")
            .field("contacts", &self.contacts)
            .field("conversations", &self.conversations)
            .field("messages", &self.messages)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl ChatState {
    /// Empty state with no contacts.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            contacts: Vec::new(),
            conversations: BTreeMap::new(),
            messages: BTreeMap::new(),
            clock,
            revision: 0,
        }
    }

    /// State seeded with the built-in contacts.
    pub fn seeded(clock: Arc<dyn Clock>) -> Self {
        let snapshot = ChatSnapshot::seed(clock.now_millis());
        Self::from_snapshot(snapshot, clock)
    }

    /// Adopts a snapshot and resynchronizes every contact's summary.
    pub fn from_snapshot(snapshot: ChatSnapshot, clock: Arc<dyn Clock>) -> Self {
        let mut state = Self {
            contacts: snapshot.contacts,
            conversations: snapshot.conversations,
            messages: snapshot.messages_by_conversation,
            clock,
            revision: 0,
        };
        let ids: Vec<u64> = state.contacts.iter().map(|c| c.id).collect();
        for id in ids {
            state.sync_conversation_summary(id);
        }
        state.revision = 0;
        state
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            contacts: self.contacts.clone(),
            conversations: self.conversations.clone(),
            messages_by_conversation: self.messages.clone(),
        }
    }

    /// Monotonic change counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contact(&self, contact_id: u64) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == contact_id)
    }

    pub fn conversation_for_contact(&self, contact_id: u64) -> Option<&Conversation> {
        self.conversations.get(&conversation_key(contact_id))
    }

    /// Messages in display order; empty when the contact has none.
    pub fn messages_for_contact(&self, contact_id: u64) -> &[Message] {
        self.messages
            .get(&conversation_key(contact_id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn ensure_conversation_for_contact(&mut self, contact_id: u64) -> &Conversation {
        let key = self.ensure_slot(contact_id);
        &self.conversations[&key]
    }

    /// Appends a message and returns it as stored.
    pub fn append_message(&mut self, contact_id: u64, new: NewMessage) -> Message {
        let key = self.ensure_slot(contact_id);
        let message = Message::from_new(new, self.now());
        self.messages
            .entry(key)
            .or_default()
            .push(message.clone());
        self.sync_conversation_summary(contact_id);
        self.touch();
        message
    }

    /// Sets a message's status in place. `updated_at` moves forward to the
    /// message's `created_at` at most, never backward.
    pub fn update_message_status(
        &mut self,
        contact_id: u64,
        message_id: &str,
        status: MessageStatus,
    ) -> bool {
        let key = self.ensure_slot(contact_id);
        let Some(message) = self
            .messages
            .get_mut(&key)
            .and_then(|list| list.iter_mut().find(|m| m.id == message_id))
        else {
            return false;
        };
        message.status = status;
        let created_at = message.created_at;
        if created_at > 0
            && let Some(conversation) = self.conversations.get_mut(&key)
        {
            conversation.updated_at = conversation.updated_at.max(created_at);
        }
        self.sync_conversation_summary(contact_id);
        self.touch();
        true
    }

    pub fn update_message_content(
        &mut self,
        contact_id: u64,
        message_id: &str,
        content: impl Into<String>,
    ) -> bool {
        let key = self.ensure_slot(contact_id);
        let Some(message) = self
            .messages
            .get_mut(&key)
            .and_then(|list| list.iter_mut().find(|m| m.id == message_id))
        else {
            return false;
        };
        message.content = content.into();
        self.sync_conversation_summary(contact_id);
        self.touch();
        true
    }

    /// Returns `false` when the draft was already equal.
    pub fn set_conversation_draft(&mut self, contact_id: u64, draft: impl Into<String>) -> bool {
        let draft = draft.into();
        self.update_conversation(contact_id, |conversation| {
            if conversation.draft == draft {
                return false;
            }
            conversation.draft = draft;
            true
        })
    }

    pub fn mark_conversation_read(&mut self, contact_id: u64) -> bool {
        self.update_conversation(contact_id, |conversation| {
            if conversation.unread == 0 {
                return false;
            }
            conversation.unread = 0;
            true
        })
    }

    /// Adds `delta` (possibly negative) to the unread counter, floored at zero.
    pub fn increment_conversation_unread(&mut self, contact_id: u64, delta: i64) -> bool {
        self.update_conversation(contact_id, |conversation| {
            let next = i64::from(conversation.unread)
                .saturating_add(delta)
                .clamp(0, i64::from(u32::MAX)) as u32;
            if next == conversation.unread {
                return false;
            }
            conversation.unread = next;
            true
        })
    }

    pub fn set_conversation_pinned(&mut self, contact_id: u64, pinned: bool) -> bool {
        self.update_conversation(contact_id, |conversation| {
            if conversation.pinned == pinned {
                return false;
            }
            conversation.pinned = pinned;
            true
        })
    }

    /// Adds a contact. The id is `max + 1` unless a free id in
    /// `1..=MAX_CONTACT_ID` was given.
    pub fn add_contact(&mut self, new: NewContact) -> Contact {
        let id = match new.id {
            Some(id) if (1..=MAX_CONTACT_ID).contains(&id) && self.contact(id).is_none() => id,
            _ => self.next_contact_id(),
        };
        let index = self.contacts.len();
        self.contacts.push(Contact::from_new(new, id));
        self.ensure_slot(id);
        self.sync_conversation_summary(id);
        self.touch();
        self.contacts[index].clone()
    }

    pub fn update_contact(&mut self, contact_id: u64, patch: ContactPatch) -> bool {
        let Some(contact) = self.contacts.iter_mut().find(|c| c.id == contact_id) else {
            return false;
        };
        if !contact.apply_patch(patch) {
            return false;
        }
        self.touch();
        true
    }

    /// Removes a contact along with its conversation and messages.
    pub fn remove_contact(&mut self, contact_id: u64) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id != contact_id);
        if self.contacts.len() == before {
            return false;
        }
        let key = conversation_key(contact_id);
        self.conversations.remove(&key);
        self.messages.remove(&key);
        self.touch();
        true
    }

    /// Pinned conversations first, then most recently updated. Stable, so
    /// ties keep contact order.
    pub fn contacts_for_list(&self) -> Vec<&Contact> {
        let mut list: Vec<&Contact> = self.contacts.iter().collect();
        list.sort_by_key(|contact| {
            let conversation = self.conversation_for_contact(contact.id);
            let pinned = conversation.is_some_and(|c| c.pinned);
            let updated_at = conversation.map_or(0, |c| c.updated_at);
            (Reverse(pinned), Reverse(updated_at))
        });
        list
    }

    /// `{contactId: [{role, content}]}` for every contact.
    pub fn legacy_chat_history(&self) -> BTreeMap<String, Vec<LegacyMessage>> {
        self.contacts
            .iter()
            .map(|contact| {
                let history = self
                    .messages_for_contact(contact.id)
                    .iter()
                    .map(|m| LegacyMessage {
                        role: m.role,
                        content: m.content.clone(),
                    })
                    .collect();
                (conversation_key(contact.id), history)
            })
            .collect()
    }

    /// `max + 1`, or the first free id from the current timestamp when the
    /// largest id cannot be incremented.
    fn next_contact_id(&self) -> u64 {
        let max = self.contacts.iter().map(|c| c.id).max().unwrap_or(0);
        if let Some(id) = max.checked_add(1) {
            return id;
        }
        let mut id = self.now().max(1) as u64;
        while self.contact(id).is_some() {
            id = id.checked_add(1).unwrap_or(1);
        }
        id
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Creates the conversation and message list for `contact_id` if missing.
    fn ensure_slot(&mut self, contact_id: u64) -> String {
        let key = conversation_key(contact_id);
        let now = self.now();
        let mut created = false;
        if !self.conversations.contains_key(&key) {
            self.conversations
                .insert(key.clone(), Conversation::new(contact_id, now));
            created = true;
        }
        if !self.messages.contains_key(&key) {
            self.messages.insert(key.clone(), Vec::new());
            created = true;
        }
        if created {
            self.touch();
        }
        key
    }

    /// Runs `apply` on the conversation; when it reports a change,
    /// `updated_at` moves to now (never backward).
    fn update_conversation(
        &mut self,
        contact_id: u64,
        apply: impl FnOnce(&mut Conversation) -> bool,
    ) -> bool {
        let key = self.ensure_slot(contact_id);
        let now = self.now();
        let Some(conversation) = self.conversations.get_mut(&key) else {
            return false;
        };
        if !apply(conversation) {
            return false;
        }
        conversation.updated_at = conversation.updated_at.max(now);
        self.touch();
        true
    }

    fn sync_conversation_summary(&mut self, contact_id: u64) {
        let key = self.ensure_slot(contact_id);
        let Self {
            contacts,
            conversations,
            messages,
            ..
        } = self;
        let Some(conversation) = conversations.get_mut(&key) else {
            return;
        };
        let contact = contacts.iter_mut().find(|c| c.id == contact_id);

        match messages.get(&key).and_then(|list| list.last()) {
            Some(last) => {
                conversation.last_message = last.content.clone();
                conversation.last_message_at = last.created_at;
                conversation.updated_at = conversation.updated_at.max(last.created_at);
            }
            None => {
                if conversation.last_message.is_empty()
                    && let Some(contact) = contact.as_deref()
                {
                    conversation.last_message = contact.last_message.clone();
                }
                if conversation.last_message_at == 0 {
                    conversation.last_message_at = conversation.created_at;
                }
                conversation.updated_at = conversation.updated_at.max(conversation.last_message_at);
            }
        }

        if let Some(contact) = contact
            && !conversation.last_message.is_empty()
        {
            contact.last_message = conversation.last_message.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::contact::ContactKind;
    use crate::chat::message::Role;
    use crate::core::clock::ManualClock;

    const T0: i64 = 1_700_000_000_000;

    fn state_with_clock() -> (ChatState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(T0));
        let state = ChatState::seeded(clock.clone());
        (state, clock)
    }

    #[test]
    fn test_seeded_state_is_in_sync() {
        let (state, _) = state_with_clock();
        assert_eq!(state.contacts().len(), 2);
        assert_eq!(state.revision(), 0);
        let eva = state.contact(1).unwrap();
        let conversation = state.conversation_for_contact(1).unwrap();
        assert_eq!(conversation.last_message, "Morning, V. All systems nominal.");
        assert_eq!(eva.last_message, conversation.last_message);
        assert_eq!(conversation.last_message_at, T0 - 60_000);
    }

    #[test]
    fn test_ensure_conversation_is_idempotent() {
        let (mut state, clock) = state_with_clock();
        let first = state.ensure_conversation_for_contact(42).clone();
        clock.advance(5_000);
        let second = state.ensure_conversation_for_contact(42).clone();
        assert_eq!(first, second);
        assert_eq!(first.id, "conv_42");
        assert!(state.messages_for_contact(42).is_empty());
    }

    #[test]
    fn test_appending_n_messages_tracks_the_last() {
        let (mut state, clock) = state_with_clock();
        let mut last = None;
        for i in 0..5 {
            clock.advance(1_000);
            last = Some(state.append_message(2, NewMessage::user(format!("message {i}"))));
        }
        let last = last.unwrap();
        let conversation = state.conversation_for_contact(2).unwrap();
        assert_eq!(conversation.last_message, "message 4");
        assert_eq!(conversation.last_message_at, last.created_at);
        assert_eq!(conversation.updated_at, last.created_at);
        assert_eq!(state.contact(2).unwrap().last_message, "message 4");
        assert_eq!(state.messages_for_contact(2).len(), 6);
    }

    #[test]
    fn test_append_defaults_role_and_status() {
        let (mut state, _) = state_with_clock();
        let message = state.append_message(1, NewMessage {
            content: "hello".to_string(),
            ..NewMessage::default()
        });
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.status, MessageStatus::Sent);
        assert_eq!(message.created_at, T0);
    }

    #[test]
    fn test_update_status_unknown_id_changes_nothing() {
        let (mut state, _) = state_with_clock();
        let before = state.messages_for_contact(1).to_vec();
        let revision = state.revision();
        assert!(!state.update_message_status(1, "msg_missing", MessageStatus::Failed));
        assert_eq!(state.messages_for_contact(1), before.as_slice());
        assert_eq!(state.revision(), revision);
    }

    #[test]
    fn test_update_status_never_regresses_updated_at() {
        let (mut state, clock) = state_with_clock();
        let sent = state.append_message(
            1,
            NewMessage::user("hi").with_status(MessageStatus::Sending).with_created_at(T0 - 500_000),
        );
        clock.advance(10_000);
        state.set_conversation_draft(1, "typing");
        let updated_before = state.conversation_for_contact(1).unwrap().updated_at;

        assert!(state.update_message_status(1, &sent.id, MessageStatus::Sent));
        assert_eq!(state.messages_for_contact(1).last().unwrap().status, MessageStatus::Sent);
        assert_eq!(state.conversation_for_contact(1).unwrap().updated_at, updated_before);
    }

    #[test]
    fn test_update_content_resyncs_summary() {
        let (mut state, _) = state_with_clock();
        let message = state.append_message(1, NewMessage::assistant("draft reply"));
        assert!(state.update_message_content(1, &message.id, "final reply"));
        assert_eq!(state.conversation_for_contact(1).unwrap().last_message, "final reply");
        assert_eq!(state.contact(1).unwrap().last_message, "final reply");
        assert!(!state.update_message_content(1, "nope", "x"));
    }

    #[test]
    fn test_draft_noop_is_short_circuited() {
        let (mut state, clock) = state_with_clock();
        assert!(state.set_conversation_draft(1, "hello"));
        let revision = state.revision();
        let updated_at = state.conversation_for_contact(1).unwrap().updated_at;
        clock.advance(1_000);
        assert!(!state.set_conversation_draft(1, "hello"));
        assert_eq!(state.revision(), revision);
        assert_eq!(state.conversation_for_contact(1).unwrap().updated_at, updated_at);
    }

    #[test]
    fn test_unread_is_clamped_at_zero() {
        let (mut state, clock) = state_with_clock();
        clock.advance(1_000);
        assert!(state.increment_conversation_unread(1, 3));
        assert_eq!(state.conversation_for_contact(1).unwrap().unread, 3);
        assert_eq!(state.conversation_for_contact(1).unwrap().updated_at, T0 + 1_000);
        assert!(state.increment_conversation_unread(1, -10));
        assert_eq!(state.conversation_for_contact(1).unwrap().unread, 0);
        assert!(!state.increment_conversation_unread(1, -1));
        assert!(state.increment_conversation_unread(1, 2));
        assert!(state.mark_conversation_read(1));
        assert!(!state.mark_conversation_read(1));
    }

    #[test]
    fn test_unread_saturates_on_extreme_deltas() {
        let (mut state, _) = state_with_clock();
        assert!(state.increment_conversation_unread(1, 1));
        assert!(state.increment_conversation_unread(1, i64::MAX));
        assert_eq!(state.conversation_for_contact(1).unwrap().unread, u32::MAX);
        assert!(!state.increment_conversation_unread(1, i64::MAX));
        assert!(state.increment_conversation_unread(1, i64::MIN));
        assert_eq!(state.conversation_for_contact(1).unwrap().unread, 0);
        assert!(!state.increment_conversation_unread(1, i64::MIN));
    }

    #[test]
    fn test_add_contact_assigns_next_id() {
        let (mut state, _) = state_with_clock();
        let contact = state.add_contact(NewContact::new("  Judy ").with_role("Braindance editor"));
        assert_eq!(contact.id, 3);
        assert_eq!(contact.name, "Judy");
        assert_eq!(state.conversation_for_contact(3).unwrap().id, "conv_3");

        let colliding = state.add_contact(NewContact::new("Dup").with_id(1));
        assert_eq!(colliding.id, 4);
        let unnamed = state.add_contact(NewContact::default().with_id(10));
        assert_eq!(unnamed.id, 10);
        assert_eq!(unnamed.name, "Contact 10");

        let oversized = state.add_contact(NewContact::new("Big").with_id(u64::MAX));
        assert_eq!(oversized.id, 11);
    }

    #[test]
    fn test_add_contact_after_hydrating_oversized_id() {
        let value = serde_json::json!({
            "contacts": [{"id": 1e20, "name": "Overflow"}],
            "chatHistory": {}
        });
        let clock = Arc::new(ManualClock::new(T0));
        let mut state = ChatState::from_snapshot(ChatSnapshot::from_value(&value, T0), clock);
        assert_eq!(state.contacts()[0].id, T0 as u64);

        let next = state.add_contact(NewContact::new("Next"));
        assert_eq!(next.id, T0 as u64 + 1);
        assert!(state.conversation_for_contact(next.id).is_some());
    }

    #[test]
    fn test_add_contact_when_max_id_cannot_grow() {
        let clock = Arc::new(ManualClock::new(T0));
        let mut state = ChatState::new(clock);
        state.contacts.push(Contact::from_new(NewContact::new("Edge"), u64::MAX));

        let next = state.add_contact(NewContact::new("Next"));
        assert_eq!(next.id, T0 as u64);
        let after = state.add_contact(NewContact::new("After"));
        assert_ne!(after.id, next.id);
        assert!(after.id > 0);
    }

    #[test]
    fn test_update_and_remove_contact() {
        let (mut state, _) = state_with_clock();
        assert!(state.update_contact(2, ContactPatch {
            name: Some("Jackie Welles".to_string()),
            ..ContactPatch::default()
        }));
        assert_eq!(state.contact(2).unwrap().name, "Jackie Welles");
        assert!(!state.update_contact(99, ContactPatch::default()));

        let service = state.add_contact(
            NewContact::new("Service Bot")
                .with_kind(ContactKind::Service)
                .with_role("Service account")
                .with_service_template("Order notice"),
        );
        assert_eq!(service.kind, ContactKind::Service);
        assert_eq!(service.service_template, "Order notice");
        assert!(state.update_contact(service.id, ContactPatch {
            kind: Some(ContactKind::Official),
            service_template: Some("Announcement".to_string()),
            ..ContactPatch::default()
        }));
        let updated = state.contact(service.id).unwrap();
        assert_eq!(updated.kind, ContactKind::Official);
        assert_eq!(updated.service_template, "Announcement");
        let restored = ChatState::from_snapshot(state.snapshot(), state.clock.clone());
        assert_eq!(restored.contact(service.id), state.contact(service.id));
        assert!(state.remove_contact(service.id));
        assert!(state.contact(service.id).is_none());

        assert!(state.remove_contact(2));
        assert!(state.contact(2).is_none());
        assert!(state.conversation_for_contact(2).is_none());
        assert!(state.messages_for_contact(2).is_empty());
        assert!(!state.remove_contact(2));
    }

    #[test]
    fn test_contacts_for_list_order() {
        let (mut state, clock) = state_with_clock();
        state.add_contact(NewContact::new("Judy"));
        state.add_contact(NewContact::new("Panam"));
        clock.advance(60_000);
        state.append_message(1, NewMessage::user("newest"));
        state.set_conversation_pinned(4, true);

        let order: Vec<u64> = state.contacts_for_list().iter().map(|c| c.id).collect();
        // 3 and 4 were created at T0, 2 has its seed message at T0 - 60s
        assert_eq!(order, [4, 1, 3, 2]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (mut state, clock) = state_with_clock();
        clock.advance(1_000);
        state.append_message(2, NewMessage::user("ping").with_status(MessageStatus::Failed));
        state.set_conversation_draft(1, "half a thought");

        let restored = ChatState::from_snapshot(state.snapshot(), clock.clone());
        assert_eq!(restored.snapshot(), state.snapshot());
    }

    #[test]
    fn test_legacy_chat_history_view() {
        let (state, _) = state_with_clock();
        let history = state.legacy_chat_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history["2"][0].content, "Hey choom, drinks at the Afterlife tonight?");
        assert_eq!(history["2"][0].role, Role::Assistant);
    }

    #[test]
    fn test_empty_conversation_falls_back_to_contact_preview() {
        let clock = Arc::new(ManualClock::new(T0));
        let mut state = ChatState::new(clock);
        let contact = state.add_contact(NewContact {
            last_message: "See you soon".to_string(),
            ..NewContact::new("River")
        });
        let conversation = state.conversation_for_contact(contact.id).unwrap();
        assert_eq!(conversation.last_message, "See you soon");
        assert_eq!(conversation.last_message_at, T0);
    }
}
