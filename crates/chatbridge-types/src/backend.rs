//! AI backend request/response types for chatbridge.
//!
//! These types model the single round-trip the bridge makes per question:
//! the question with optional continuation context going out, and the
//! answer with new continuation context coming back.

use serde::{Deserialize, Serialize};

/// Provider-specific chaining fields.
///
/// Some backends keep conversation memory keyed by more than an upstream
/// conversation id; they hand back an invocation counter, a client id and a
/// signature token that must all be echoed on the next turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderChain {
    pub invocation_id: u32,
    pub client_id: String,
    pub conversation_signature: String,
}

impl ProviderChain {
    /// Build a chain only when every field is present and meaningful.
    ///
    /// Partial data (zero counter, empty client id or signature) yields
    /// `None`: the response is then treated as a plain one.
    pub fn from_parts(
        invocation_id: Option<u32>,
        client_id: Option<String>,
        conversation_signature: Option<String>,
    ) -> Option<Self> {
        let invocation_id = invocation_id.filter(|n| *n > 0)?;
        let client_id = client_id.filter(|s| !s.is_empty())?;
        let conversation_signature = conversation_signature.filter(|s| !s.is_empty())?;

        Some(Self {
            invocation_id,
            client_id,
            conversation_signature,
        })
    }
}

/// Continuation context echoed to the backend on every non-first turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuation {
    pub conversation_id: String,
    pub parent_message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<ProviderChain>,
}

/// A question sent to the AI backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Rendered instruction context, sent on the first turn only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation: Option<Continuation>,
}

/// The backend's answer, tagged by whether it carries provider chaining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AskResponse {
    Plain {
        text: String,
        conversation_id: String,
        message_id: String,
    },
    Chained {
        text: String,
        conversation_id: String,
        message_id: String,
        chain: ProviderChain,
    },
}

impl AskResponse {
    pub fn text(&self) -> &str {
        match self {
            AskResponse::Plain { text, .. } | AskResponse::Chained { text, .. } => text,
        }
    }

    pub fn conversation_id(&self) -> &str {
        match self {
            AskResponse::Plain {
                conversation_id, ..
            }
            | AskResponse::Chained {
                conversation_id, ..
            } => conversation_id,
        }
    }

    pub fn message_id(&self) -> &str {
        match self {
            AskResponse::Plain { message_id, .. } | AskResponse::Chained { message_id, .. } => {
                message_id
            }
        }
    }

    /// Chaining fields, present only on `Chained` responses.
    pub fn chain(&self) -> Option<&ProviderChain> {
        match self {
            AskResponse::Plain { .. } => None,
            AskResponse::Chained { chain, .. } => Some(chain),
        }
    }
}

/// Errors from AI backend calls.
///
/// Every variant is retryable as far as the retry wrapper is concerned; the
/// classification only drives logging and HTTP status mapping.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
