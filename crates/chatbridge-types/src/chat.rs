//! Chat turn and conversation state types for chatbridge.
//!
//! These types model one conversation between the users of a chat and the
//! AI backend: the turns appended to its message log, the continuation state
//! chained from one round-trip to the next, and the per-question options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::backend::{AskResponse, Continuation, ProviderChain};

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOrigin {
    User,
    Assistant,
}

impl fmt::Display for TurnOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnOrigin::User => write!(f, "user"),
            TurnOrigin::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnOrigin::User),
            "assistant" => Ok(TurnOrigin::Assistant),
            other => Err(format!("invalid turn origin: '{other}'")),
        }
    }
}

/// A single message within a conversation.
///
/// Immutable once created. User turns carry the author identifier and the
/// inbound request identifier as `id`; assistant turns get a fresh UUID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: String,
    pub text: String,
    pub origin: TurnOrigin,
    /// Upstream conversation the turn belongs to, when known.
    pub conversation_id: Option<String>,
    /// Author of the turn (user turns only).
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    /// Build a user turn.
    pub fn user(
        id: impl Into<String>,
        text: impl Into<String>,
        author: Option<String>,
        conversation_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            origin: TurnOrigin::User,
            conversation_id,
            author,
            created_at,
        }
    }

    /// Build an assistant turn with a freshly generated identifier.
    pub fn assistant(text: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            text: text.into(),
            origin: TurnOrigin::Assistant,
            conversation_id,
            author: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.origin == TurnOrigin::User
    }
}

/// Mutable metadata of a conversation session.
///
/// A session is **Fresh** until its first successful round-trip, after which
/// it holds an upstream conversation identifier and is **Active**.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Session identifier (the chat identifier by default).
    pub session_id: String,
    /// Backend identifier of the last assistant turn.
    pub last_message_id: Option<String>,
    /// Opaque upstream conversation token.
    pub conversation_id: Option<String>,
    /// Provider-specific chaining fields, adopted only from chained responses.
    pub chain: Option<ProviderChain>,
}

impl ConversationState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    /// Whether a successful round-trip has happened yet.
    pub fn is_active(&self) -> bool {
        self.conversation_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Continuation context for the next question, `None` while Fresh.
    pub fn continuation(&self) -> Option<Continuation> {
        if !self.is_active() {
            return None;
        }

        Some(Continuation {
            conversation_id: self.conversation_id.clone().unwrap_or_default(),
            parent_message_id: self.last_message_id.clone().unwrap_or_default(),
            chain: self.chain.clone(),
        })
    }

    /// Adopt the continuation fields of a successful response.
    ///
    /// Chaining fields are only replaced by a `Chained` response; a plain
    /// response leaves any previously adopted chain untouched.
    pub fn apply(&mut self, response: &AskResponse) {
        self.last_message_id = Some(response.message_id().to_string());
        self.conversation_id = Some(response.conversation_id().to_string());

        if let Some(chain) = response.chain() {
            self.chain = Some(chain.clone());
        }
    }
}

/// Per-question options passed to a conversation session's `ask`.
///
/// Empty `request_id` is replaced by a generated UUID and a missing
/// `created_at` defaults to now.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskOptions {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AskOptions {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(conversation: &str, message: &str) -> AskResponse {
        AskResponse::Plain {
            text: "hello".to_string(),
            conversation_id: conversation.to_string(),
            message_id: message.to_string(),
        }
    }

    fn chain(invocation_id: u32) -> ProviderChain {
        ProviderChain {
            invocation_id,
            client_id: "client-1".to_string(),
            conversation_signature: "sig".to_string(),
        }
    }

    #[test]
    fn test_turn_origin_roundtrip() {
        for origin in [TurnOrigin::User, TurnOrigin::Assistant] {
            let s = origin.to_string();
            let parsed: TurnOrigin = s.parse().unwrap();
            assert_eq!(origin, parsed);
        }
        assert!("robot".parse::<TurnOrigin>().is_err());
    }

    #[test]
    fn test_assistant_turn_gets_unique_id() {
        let a = ChatTurn::assistant("one", None);
        let b = ChatTurn::assistant("two", None);
        assert_ne!(a.id, b.id);
        assert!(!a.is_user());
        assert!(a.author.is_none());
    }

    #[test]
    fn test_fresh_state_has_no_continuation() {
        let state = ConversationState::new("chat-1");
        assert!(!state.is_active());
        assert!(state.continuation().is_none());
    }

    #[test]
    fn test_apply_plain_response_activates_state() {
        let mut state = ConversationState::new("chat-1");
        state.apply(&plain("conv-1", "msg-1"));

        assert!(state.is_active());
        let cont = state.continuation().unwrap();
        assert_eq!(cont.conversation_id, "conv-1");
        assert_eq!(cont.parent_message_id, "msg-1");
        assert!(cont.chain.is_none());
    }

    #[test]
    fn test_plain_response_keeps_previous_chain() {
        let mut state = ConversationState::new("chat-1");
        state.apply(&AskResponse::Chained {
            text: "hi".to_string(),
            conversation_id: "conv-1".to_string(),
            message_id: "msg-1".to_string(),
            chain: chain(1),
        });
        state.apply(&plain("conv-2", "msg-2"));

        assert_eq!(state.conversation_id.as_deref(), Some("conv-2"));
        assert_eq!(state.last_message_id.as_deref(), Some("msg-2"));
        assert_eq!(state.chain, Some(chain(1)));
    }

    #[test]
    fn test_chained_response_replaces_chain() {
        let mut state = ConversationState::new("chat-1");
        for n in [1, 2] {
            state.apply(&AskResponse::Chained {
                text: "hi".to_string(),
                conversation_id: "conv".to_string(),
                message_id: format!("msg-{n}"),
                chain: chain(n),
            });
        }
        assert_eq!(state.chain.unwrap().invocation_id, 2);
    }

    #[test]
    fn test_ask_options_builder() {
        let opts = AskOptions::new("evt-1").with_author("ou_123");
        assert_eq!(opts.request_id, "evt-1");
        assert_eq!(opts.author.as_deref(), Some("ou_123"));
        assert!(opts.created_at.is_none());
    }
}
