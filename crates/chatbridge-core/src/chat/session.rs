//! One chat's conversation with the AI backend.
//!
//! A `ConversationSession` owns its message log, its dedup ledger and the
//! continuation state chained from one backend round-trip to the next. It is
//! shared behind an `Arc` by the `SessionManager`; every method takes `&self`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tracing::{Instrument, debug, error, info, info_span, warn};

use chatbridge_types::backend::{AskRequest, AskResponse};
use chatbridge_types::chat::{AskOptions, ChatTurn, ConversationState};
use chatbridge_types::config::{
    DEFAULT_CONTEXT, DEFAULT_CONVERSATION_MAX_AGE_SECS, DEFAULT_MAX_MESSAGES,
};
use chatbridge_types::error::SessionError;

use super::dedup::DedupLedger;
use super::log::MessageLog;
use crate::backend::BoxAskBackend;
use crate::retry::{RetryPolicy, retry};

/// Settings for a new conversation session.
///
/// Unset fields fall back to the session manager's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionConfig {
    /// Session identifier; defaults to the chat identifier.
    pub id: Option<String>,
    /// Conversation tag for user turns logged before the first answer.
    /// Never sent upstream; the session still starts Fresh.
    pub conversation_id: Option<String>,
    /// Instruction template; `{date}` is replaced with the current date.
    pub context: Option<String>,
    pub language: Option<String>,
    pub max_messages: Option<usize>,
    pub max_age: Option<Duration>,
    pub model: Option<String>,
}

impl SessionConfig {
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = Some(max_messages);
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// A conversation between one chat and the AI backend.
///
/// Lifecycle: **Fresh** until the first successful round-trip, **Active**
/// afterwards. Failed round-trips never change the state.
///
/// Questions are serialized per session: a second `ask` waits until the
/// first has finished its round-trip, so every request carries the
/// continuation of the turn before it.
pub struct ConversationSession {
    id: String,
    backend: Arc<BoxAskBackend>,
    messages: MessageLog,
    ledger: DedupLedger,
    state: Mutex<ConversationState>,
    turn_gate: tokio::sync::Mutex<()>,
    conversation_tag: Option<String>,
    model: Option<String>,
    context: String,
    language: Option<String>,
    max_age: Duration,
}

impl ConversationSession {
    /// Build a session, falling back to built-in defaults for unset fields.
    pub fn new(
        id: impl Into<String>,
        backend: Arc<BoxAskBackend>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SessionError::Creation(
                "session identifier must not be empty".to_string(),
            ));
        }

        Ok(Self {
            messages: MessageLog::new(config.max_messages.unwrap_or(DEFAULT_MAX_MESSAGES)),
            ledger: DedupLedger::new(),
            state: Mutex::new(ConversationState::new(id.clone())),
            turn_gate: tokio::sync::Mutex::new(()),
            conversation_tag: config.conversation_id.filter(|c| !c.is_empty()),
            model: config.model.filter(|m| !m.is_empty()),
            context: config
                .context
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_string()),
            language: config.language.filter(|l| !l.is_empty()),
            max_age: config
                .max_age
                .unwrap_or(Duration::from_secs(DEFAULT_CONVERSATION_MAX_AGE_SECS)),
            backend,
            id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read-only access to the message log.
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Snapshot of the continuation state.
    pub fn state(&self) -> ConversationState {
        self.state.lock().expect("session state lock poisoned").clone()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Fails with `DuplicateRequest` if `request_id` was already processed.
    pub fn is_question_asked(&self, request_id: &str) -> Result<(), SessionError> {
        if self.ledger.has(request_id) {
            return Err(SessionError::DuplicateRequest(request_id.to_string()));
        }
        Ok(())
    }

    /// Ask one question, making a single backend attempt.
    pub async fn ask(&self, question: &str, options: AskOptions) -> Result<String, SessionError> {
        self.ask_with_retry(question, options, &RetryPolicy::once())
            .await
    }

    /// Ask one question, retrying the backend round-trip per `policy`.
    ///
    /// The request is claimed in the dedup ledger and the user turn appended
    /// exactly once; only the backend call is repeated. The claim is made
    /// after the turn gate is acquired, so a call dropped while waiting for
    /// an earlier turn leaves no trace.
    pub async fn ask_with_retry(
        &self,
        question: &str,
        options: AskOptions,
        policy: &RetryPolicy,
    ) -> Result<String, SessionError> {
        let request_id = if options.request_id.is_empty() {
            uuid::Uuid::now_v7().to_string()
        } else {
            options.request_id
        };

        let _turn = self.turn_gate.lock().await;

        if !self.ledger.mark_seen(&request_id) {
            warn!(session_id = %self.id, %request_id, "duplicate request ignored");
            return Err(SessionError::DuplicateRequest(request_id));
        }

        let state = self.state();
        self.messages.append(ChatTurn::user(
            request_id.clone(),
            question,
            options.author,
            state
                .conversation_id
                .clone()
                .or_else(|| self.conversation_tag.clone()),
            options.created_at.unwrap_or_else(Utc::now),
        ));

        let request = self.build_request(question, &state);
        let span = info_span!(
            "gen_ai.ask",
            gen_ai.system = self.backend.name(),
            gen_ai.request.model = ?self.model,
            chat.session_id = %self.id,
            chat.request_id = %request_id,
            chat.continuation = request.continuation.is_some(),
        );

        async {
            let backend = &self.backend;
            let request = &request;
            let response = retry(policy, move |attempt| {
                debug!(attempt, "sending question to backend");
                backend.ask(request)
            })
            .await
            .inspect_err(|e| error!(error = %e, "backend round-trip failed"))?;

            self.complete_turn(&response);
            info!(
                conversation_id = response.conversation_id(),
                answer_len = response.text().len(),
                "question answered"
            );
            Ok::<_, SessionError>(response.text().to_string())
        }
        .instrument(span)
        .await
    }

    fn build_request(&self, question: &str, state: &ConversationState) -> AskRequest {
        let continuation = state.continuation();
        let system_prompt = if continuation.is_none() {
            self.render_system_prompt()
        } else {
            None
        };

        AskRequest {
            question: question.to_string(),
            model: self.model.clone(),
            system_prompt,
            continuation,
        }
    }

    /// Instruction context sent with the first turn of a fresh conversation.
    fn render_system_prompt(&self) -> Option<String> {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        let mut prompt = self.context.replace("{date}", &date);
        if let Some(language) = &self.language {
            if !prompt.is_empty() {
                prompt.push('\n');
            }
            prompt.push_str(&format!("Please answer in {language}."));
        }

        if prompt.trim().is_empty() {
            None
        } else {
            Some(prompt)
        }
    }

    fn complete_turn(&self, response: &AskResponse) {
        let mut state = self.state.lock().expect("session state lock poisoned");
        state.apply(response);
        self.messages.append(ChatTurn::assistant(
            response.text(),
            state.conversation_id.clone(),
        ));
    }
}

impl std::fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationSession")
            .field("id", &self.id)
            .field("backend", &self.backend.name())
            .field("model", &self.model)
            .field("messages", &self.messages.len())
            .finish()
    }
}
