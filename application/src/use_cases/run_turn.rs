//! Run Turn use case
//!
//! Sends one user message to a contact and records the reply. The user
//! message goes through `sending → sent` on success or `sending → failed`
//! on error; a failed message can be retried (`failed → sending`).

use crate::chat_store::ChatStore;
use crate::use_cases::ai_gateway::AiGateway;
use schatphone_domain::{
    ApiError, ChatMessage, Message, MessageStatus, NewMessage, Settings,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during a turn
#[derive(Error, Debug)]
pub enum RunTurnError {
    #[error("Unknown contact: {0}")]
    UnknownContact(u64),

    #[error("Message {0} not found")]
    MessageNotFound(String),

    #[error("Message {id} is {status} and cannot be retried")]
    NotRetryable { id: String, status: &'static str },

    /// The provider call failed; the user message is now `failed`.
    #[error("{ui_message}")]
    Provider {
        message_id: String,
        ui_message: String,
        #[source]
        source: ApiError,
    },
}

impl RunTurnError {
    /// The classified provider error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            RunTurnError::Provider { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A completed turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub user_message: Message,
    pub reply: Message,
}

/// Use case for one conversation turn
pub struct RunTurnUseCase {
    gateway: Arc<AiGateway>,
}

impl RunTurnUseCase {
    pub fn new(gateway: Arc<AiGateway>) -> Self {
        Self { gateway }
    }

    /// Appends `text` as a user message and asks the provider for a reply.
    pub async fn execute(
        &self,
        store: &mut ChatStore,
        settings: &mut Settings,
        contact_id: u64,
        text: &str,
    ) -> Result<TurnOutcome, RunTurnError> {
        if store.state().contact(contact_id).is_none() {
            return Err(RunTurnError::UnknownContact(contact_id));
        }

        let sent = store.append_message(
            contact_id,
            NewMessage::user(text).with_status(MessageStatus::Sending),
        );
        store.set_conversation_draft(contact_id, "");
        self.complete(store, settings, contact_id, sent.id).await
    }

    /// Resends a failed user message.
    pub async fn retry(
        &self,
        store: &mut ChatStore,
        settings: &mut Settings,
        contact_id: u64,
        message_id: &str,
    ) -> Result<TurnOutcome, RunTurnError> {
        if store.state().contact(contact_id).is_none() {
            return Err(RunTurnError::UnknownContact(contact_id));
        }
        let status = store
            .state()
            .messages_for_contact(contact_id)
            .iter()
            .find(|m| m.id == message_id)
            .map(|m| m.status)
            .ok_or_else(|| RunTurnError::MessageNotFound(message_id.to_string()))?;
        if !status.can_transition_to(MessageStatus::Sending) {
            return Err(RunTurnError::NotRetryable {
                id: message_id.to_string(),
                status: status.as_str(),
            });
        }

        debug!("Retrying message {}", message_id);
        store.update_message_status(contact_id, message_id, MessageStatus::Sending);
        self.complete(store, settings, contact_id, message_id.to_string())
            .await
    }

    async fn complete(
        &self,
        store: &mut ChatStore,
        settings: &mut Settings,
        contact_id: u64,
        message_id: String,
    ) -> Result<TurnOutcome, RunTurnError> {
        let (history, system_prompt) = {
            let state = store.state();
            let history: Vec<ChatMessage> = state
                .messages_for_contact(contact_id)
                .iter()
                .filter(|m| m.status != MessageStatus::Failed)
                .map(Message::to_chat_message)
                .collect();
            let system_prompt = state
                .contact(contact_id)
                .map(|c| c.system_prompt())
                .unwrap_or_default();
            (history, system_prompt)
        };

        match self.gateway.call_ai(&history, &system_prompt, settings).await {
            Ok(text) => {
                store.update_message_status(contact_id, &message_id, MessageStatus::Sent);
                let reply = store.append_message(contact_id, NewMessage::assistant(text));
                let user_message = store
                    .state()
                    .messages_for_contact(contact_id)
                    .iter()
                    .find(|m| m.id == message_id)
                    .cloned()
                    .ok_or(RunTurnError::MessageNotFound(message_id))?;
                Ok(TurnOutcome {
                    user_message,
                    reply,
                })
            }
            Err(e) => {
                warn!("Turn for contact {} failed: {} ({})", contact_id, e, e.kind);
                store.update_message_status(contact_id, &message_id, MessageStatus::Failed);
                Err(RunTurnError::Provider {
                    message_id,
                    ui_message: e.ui_message(""),
                    source: e,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::state_store::InMemoryStateStore;
    use crate::use_cases::ai_gateway::tests::StubProvider;
    use schatphone_domain::{ApiErrorKind, ApiKind, ApiSettings, ManualClock, Role};

    fn setup(replies: Vec<Result<String, ApiError>>) -> (RunTurnUseCase, Arc<StubProvider>, ChatStore) {
        let mut openai = StubProvider::new(ApiKind::OpenaiCompatible);
        for reply in replies {
            openai = openai.with_reply(reply);
        }
        let openai = Arc::new(openai);
        let gateway = AiGateway::new(openai.clone(), Arc::new(StubProvider::new(ApiKind::Gemini)));
        let store = ChatStore::open(
            Arc::new(InMemoryStateStore::new()),
            Arc::new(ManualClock::new(1_700_000_000_000)),
        );
        (RunTurnUseCase::new(Arc::new(gateway)), openai, store)
    }

    fn settings() -> Settings {
        Settings::with_api(ApiSettings::new("https://api.openai.com/v1", "sk-test", ""))
    }

    #[tokio::test]
    async fn test_successful_turn() {
        let (use_case, provider, mut store) = setup(vec![Ok("Choom!".to_string())]);
        let mut settings = settings();

        let outcome = use_case
            .execute(&mut store, &mut settings, 2, "You there?")
            .await
            .unwrap();

        assert_eq!(outcome.user_message.status, MessageStatus::Sent);
        assert_eq!(outcome.reply.role, Role::Assistant);
        assert_eq!(outcome.reply.content, "Choom!");
        assert_eq!(
            store.state().conversation_for_contact(2).unwrap().last_message,
            "Choom!"
        );

        let requests = provider.requests.lock().unwrap();
        let request = &requests[0];
        assert!(request.system_prompt.starts_with("You are Jackie Welles"));
        assert_eq!(request.messages.last().unwrap(), &ChatMessage::user("You there?"));
    }

    #[tokio::test]
    async fn test_failed_turn_marks_message_failed() {
        let (use_case, _, mut store) = setup(vec![Err(ApiError::http(401, "API Request Failed"))]);
        let mut settings = settings();

        let err = use_case
            .execute(&mut store, &mut settings, 1, "hello")
            .await
            .unwrap_err();

        assert_eq!(err.api_error().unwrap().kind, ApiErrorKind::Auth);
        assert!(err.to_string().contains("(HTTP 401)"));
        let last = store.state().messages_for_contact(1).last().unwrap();
        assert_eq!(last.content, "hello");
        assert_eq!(last.status, MessageStatus::Failed);
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let (use_case, provider, mut store) = setup(vec![]);
        let mut settings = Settings::default();

        let err = use_case
            .execute(&mut store, &mut settings, 1, "hello")
            .await
            .unwrap_err();

        assert_eq!(err.api_error().unwrap().kind, ApiErrorKind::NoApiKey);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_retry_excludes_failed_history_then_succeeds() {
        let (use_case, provider, mut store) = setup(vec![
            Err(ApiError::timeout()),
            Ok("Back online.".to_string()),
        ]);
        let mut settings = settings();

        let err = use_case
            .execute(&mut store, &mut settings, 1, "status?")
            .await
            .unwrap_err();
        let RunTurnError::Provider { message_id, .. } = err else {
            panic!("expected provider error");
        };

        let outcome = use_case
            .retry(&mut store, &mut settings, 1, &message_id)
            .await
            .unwrap();
        assert_eq!(outcome.user_message.id, message_id);
        assert_eq!(outcome.user_message.status, MessageStatus::Sent);
        assert_eq!(outcome.reply.content, "Back online.");

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].messages.last().unwrap().content, "status?");
    }

    #[tokio::test]
    async fn test_retry_rejects_sent_message() {
        let (use_case, _, mut store) = setup(vec![]);
        let mut settings = settings();
        let seeded = store.state().messages_for_contact(1)[0].id.clone();

        let err = use_case
            .retry(&mut store, &mut settings, 1, &seeded)
            .await
            .unwrap_err();
        assert!(matches!(err, RunTurnError::NotRetryable { status: "sent", .. }));
    }

    #[tokio::test]
    async fn test_unknown_contact() {
        let (use_case, _, mut store) = setup(vec![]);
        let mut settings = settings();
        let err = use_case
            .execute(&mut store, &mut settings, 77, "anyone?")
            .await
            .unwrap_err();
        assert!(matches!(err, RunTurnError::UnknownContact(77)));
    }
}
