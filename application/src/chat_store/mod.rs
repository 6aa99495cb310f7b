//! Persistence-backed chat store.
//!
//! [`ChatStore`] wraps the domain [`ChatState`] and writes it through a
//! [`PersistedState`] after every mutation that changed something. Each
//! mutator runs inside [`ChatStore::commit`], which compares the state's
//! revision before and after and persists synchronously on change.

mod hydrate;
pub mod migration;

use crate::persistence::PersistedState;
use crate::ports::state_store::StateStore;
use schatphone_domain::{
    ChatState, Clock, Contact, ContactPatch, Conversation, Message, MessageStatus, NewContact,
    NewMessage,
};
use std::sync::Arc;
use tracing::debug;

pub const CHAT_STORAGE_KEY: &str = "store:chat";
pub const CHAT_STORAGE_VERSION: u32 = 2;

pub struct ChatStore {
    state: ChatState,
    persisted: PersistedState,
    clock: Arc<dyn Clock>,
    persisted_revision: u64,
}

impl ChatStore {
    /// Opens the store and hydrates it from `store`.
    pub fn open(store: Arc<dyn StateStore>, clock: Arc<dyn Clock>) -> Self {
        let persisted = PersistedState::new(store, clock.clone());
        let mut chat_store = Self {
            state: ChatState::new(clock.clone()),
            persisted,
            clock,
            persisted_revision: 0,
        };
        chat_store.hydrate_from_storage();
        chat_store
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Replaces the in-memory state with whatever storage holds. Does not
    /// write back.
    pub fn hydrate_from_storage(&mut self) {
        let snapshot = hydrate::load_snapshot(&self.persisted, self.clock.now_millis());
        self.state = ChatState::from_snapshot(snapshot, self.clock.clone());
        self.persisted_revision = self.state.revision();
    }

    pub fn persist_to_storage(&mut self) {
        self.persisted
            .write(CHAT_STORAGE_KEY, &self.state.snapshot(), CHAT_STORAGE_VERSION);
        self.persisted_revision = self.state.revision();
        debug!("Persisted chat state at revision {}", self.persisted_revision);
    }

    /// Persists unconditionally.
    pub fn save_now(&mut self) {
        self.persist_to_storage();
    }

    /// Removes the stored state. The in-memory state is kept.
    pub fn clear_storage(&self) {
        self.persisted.clear(CHAT_STORAGE_KEY);
    }

    /// Runs `mutate` and persists if it changed the state.
    pub fn commit<R>(&mut self, mutate: impl FnOnce(&mut ChatState) -> R) -> R {
        let result = mutate(&mut self.state);
        if self.state.revision() != self.persisted_revision {
            self.persist_to_storage();
        }
        result
    }

    // ==================== Mutators ====================

    pub fn ensure_conversation_for_contact(&mut self, contact_id: u64) -> Conversation {
        self.commit(|state| state.ensure_conversation_for_contact(contact_id).clone())
    }

    pub fn append_message(&mut self, contact_id: u64, message: NewMessage) -> Message {
        self.commit(|state| state.append_message(contact_id, message))
    }

    pub fn update_message_status(
        &mut self,
        contact_id: u64,
        message_id: &str,
        status: MessageStatus,
    ) -> bool {
        self.commit(|state| state.update_message_status(contact_id, message_id, status))
    }

    pub fn update_message_content(
        &mut self,
        contact_id: u64,
        message_id: &str,
        content: impl Into<String>,
    ) -> bool {
        self.commit(|state| state.update_message_content(contact_id, message_id, content))
    }

    pub fn set_conversation_draft(&mut self, contact_id: u64, draft: impl Into<String>) -> bool {
        self.commit(|state| state.set_conversation_draft(contact_id, draft))
    }

    pub fn mark_conversation_read(&mut self, contact_id: u64) -> bool {
        self.commit(|state| state.mark_conversation_read(contact_id))
    }

    pub fn increment_conversation_unread(&mut self, contact_id: u64, delta: i64) -> bool {
        self.commit(|state| state.increment_conversation_unread(contact_id, delta))
    }

    pub fn set_conversation_pinned(&mut self, contact_id: u64, pinned: bool) -> bool {
        self.commit(|state| state.set_conversation_pinned(contact_id, pinned))
    }

    pub fn add_contact(&mut self, contact: NewContact) -> Contact {
        self.commit(|state| state.add_contact(contact))
    }

    pub fn update_contact(&mut self, contact_id: u64, patch: ContactPatch) -> bool {
        self.commit(|state| state.update_contact(contact_id, patch))
    }

    pub fn remove_contact(&mut self, contact_id: u64) -> bool {
        self.commit(|state| state.remove_contact(contact_id))
    }
}
