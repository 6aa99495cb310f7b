//! Conversation state domain.
//!
//! - [`contact::Contact`]: a chat partner and its cached last message
//! - [`conversation::Conversation`]: per-contact metadata and summary
//! - [`message::Message`]: one append-only entry in a conversation
//! - [`snapshot::ChatSnapshot`]: the persisted shape, plus legacy upgrade
//! - [`state::ChatState`]: the owned in-memory model and its mutators
//!
//! Persisted JSON is read through tolerant constructors (`from_value`) that
//! coerce malformed fields to defaults instead of failing.

pub mod contact;
pub mod conversation;
pub mod defaults;
pub mod message;
mod normalize;
pub mod snapshot;
pub mod state;
