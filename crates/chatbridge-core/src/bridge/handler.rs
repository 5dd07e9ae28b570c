//! ConversationHandler -- one inbound event, end to end.
//!
//! Extract the question, find the chat's session, ask with retry and deliver
//! the answer (or the busy message once retries are exhausted).

use std::sync::Arc;

use tracing::{error, info, warn};

use chatbridge_types::chat::AskOptions;
use chatbridge_types::config::BridgeConfig;
use chatbridge_types::event::{ChatKind, InboundEvent};

use super::reply::BoxReplier;
use super::trigger::{TriggerRules, extract_question};
use crate::chat::{SessionConfig, SessionManager};
use crate::retry::RetryPolicy;

/// Line separating the echoed question from the answer in group replies.
const GROUP_SEPARATOR: &str = "-------------";

/// Per-event handling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerConfig {
    pub trigger: TriggerRules,
    /// Message cap for sessions created by the event pipeline.
    pub max_messages: usize,
    pub model: Option<String>,
    pub retry: RetryPolicy,
    pub busy_message: String,
}

impl HandlerConfig {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            trigger: TriggerRules {
                bot_id: config.server.bot_id.clone(),
                command_prefix: config.server.command_prefix.clone(),
            },
            max_messages: config.conversation.chat_max_messages,
            model: config.backend.model.clone(),
            retry: RetryPolicy::from(&config.retry),
            busy_message: config.server.busy_message.clone(),
        }
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}

/// How an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The event did not address the bot.
    Ignored,
    /// The answer was delivered.
    Answered,
    /// The event was already processed; nothing was sent.
    Duplicate,
    /// Retries were exhausted and the busy message was sent instead.
    Busy,
    /// A reply could not be delivered.
    DeliveryFailed,
    /// No session could be obtained for the chat.
    Failed,
    /// Handling was stopped by shutdown.
    Cancelled,
}

/// Handles inbound events against the shared session manager.
pub struct ConversationHandler {
    sessions: Arc<SessionManager>,
    replier: Arc<BoxReplier>,
    config: HandlerConfig,
}

impl ConversationHandler {
    pub fn new(sessions: Arc<SessionManager>, replier: Arc<BoxReplier>, config: HandlerConfig) -> Self {
        Self {
            sessions,
            replier,
            config,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub async fn handle(&self, event: &InboundEvent) -> Outcome {
        let Some(question) = extract_question(event, &self.config.trigger) else {
            return Outcome::Ignored;
        };
        info!(sender = %event.sender_id, chat_id = %event.chat_id, %question, "question received");

        let session_config = SessionConfig::default()
            .with_max_messages(self.config.max_messages)
            .with_model(self.config.model.clone());
        let session = match self.sessions.get_or_create(&event.chat_id, session_config) {
            Ok(session) => session,
            Err(e) => {
                error!(chat_id = %event.chat_id, error = %e, "failed to get or create conversation");
                return Outcome::Failed;
            }
        };

        if let Err(e) = session.is_question_asked(&event.event_id) {
            warn!(event_id = %event.event_id, error = %e, "duplicated event");
            return Outcome::Duplicate;
        }

        let options = AskOptions::new(event.event_id.clone()).with_author(event.sender_id.clone());
        let answer = match session
            .ask_with_retry(&question, options, &self.config.retry)
            .await
        {
            Ok(answer) => answer,
            Err(e) if e.is_duplicate() => {
                warn!(event_id = %event.event_id, "duplicated event");
                return Outcome::Duplicate;
            }
            Err(e) => {
                error!(chat_id = %event.chat_id, error = %e, "failed to get answer");
                return match self.deliver(event, &self.config.busy_message).await {
                    Outcome::Answered => Outcome::Busy,
                    other => other,
                };
            }
        };

        info!(chat_id = %event.chat_id, %answer, "answer received");
        let text = format_reply(event.chat_kind, &question, &answer);
        self.deliver(event, &text).await
    }

    async fn deliver(&self, event: &InboundEvent, text: &str) -> Outcome {
        match self.replier.reply(event, text).await {
            Ok(()) => Outcome::Answered,
            Err(e) => {
                error!(
                    chat_id = %event.chat_id,
                    replier = self.replier.name(),
                    error = %e,
                    "failed to reply"
                );
                Outcome::DeliveryFailed
            }
        }
    }
}

/// Group replies echo the question above the answer.
pub fn format_reply(kind: ChatKind, question: &str, answer: &str) -> String {
    match kind {
        ChatKind::Direct => answer.to_string(),
        ChatKind::Group => format!("{question}\n{GROUP_SEPARATOR}\n{answer}"),
    }
}
