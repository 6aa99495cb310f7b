//! AI provider domain.
//!
//! - [`kind::ApiKind`]: which backend protocol a configured URL targets
//! - [`endpoint`]: canonical endpoint derivation per provider kind
//! - [`error::ApiError`]: the closed error taxonomy and its UI messages
//! - [`settings::Settings`]: the user's API settings consumed by the gateway
//! - [`message::ChatMessage`]: a provider-agnostic conversation turn

pub mod endpoint;
pub mod error;
pub mod kind;
pub mod message;
pub mod settings;
