//! Domain layer for schatphone
//!
//! This crate contains the core data model and the pure rules around it.
//! It has no dependencies on networking, storage or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Provider endpoints
//!
//! A single user-supplied API URL drives two backend families:
//!
//! - **OpenAI-compatible**: `/v1/chat/completions` and `/v1/models`
//! - **Gemini**: `/v1beta/models/{model}:generateContent`
//!
//! [`api::kind::detect_api_kind_from_url`] classifies the URL and
//! [`api::endpoint`] derives the concrete endpoints.
//!
//! ## Conversation state
//!
//! Every [`Contact`] owns exactly one [`Conversation`] and an append-only list
//! of [`Message`]s. [`ChatState`] owns all three and keeps the denormalized
//! conversation summary in sync after every mutation.

pub mod api;
pub mod chat;
pub mod core;

// Re-export commonly used types
pub use api::{
    error::{ApiError, ApiErrorKind, classify_http_code, format_api_error_for_ui},
    kind::{ApiKind, detect_api_kind_from_url},
    message::{ChatMessage, ChatRole},
    settings::{ApiSettings, Settings},
};
pub use chat::{
    contact::{Contact, ContactKind, ContactPatch, NewContact},
    conversation::Conversation,
    message::{Message, MessageStatus, NewMessage, Role},
    snapshot::{ChatSnapshot, LegacyMessage},
    state::ChatState,
};
pub use core::clock::{Clock, ManualClock, SystemClock};
