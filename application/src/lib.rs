//! Application layer for schatphone
//!
//! This crate contains use cases, port definitions, persistence policy and
//! application configuration. It depends only on the domain layer.

pub mod chat_store;
pub mod config;
pub mod persistence;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use chat_store::{CHAT_STORAGE_KEY, CHAT_STORAGE_VERSION, ChatStore};
pub use config::GatewayParams;
pub use persistence::PersistedState;
pub use ports::{
    chat_provider::{ChatProvider, CompletionRequest},
    state_store::{InMemoryStateStore, StateStore, StoreError},
};
pub use use_cases::ai_gateway::{AiGateway, ModelList};
pub use use_cases::run_turn::{RunTurnError, RunTurnUseCase, TurnOutcome};
