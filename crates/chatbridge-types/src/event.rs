//! Inbound chat events, already decoded by the messaging platform layer.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Kind of chat an event was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// One-to-one chat with the bot.
    Direct,
    /// Group chat; the bot answers only when addressed.
    Group,
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatKind::Direct => write!(f, "direct"),
            ChatKind::Group => write!(f, "group"),
        }
    }
}

/// A mention attached to a group message.
///
/// `key` is the placeholder used in the message text (e.g. `@_user_1`),
/// `id` the identifier of the mentioned account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub key: String,
    pub id: String,
}

/// One inbound message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Platform event identifier; redelivered events keep the same id.
    pub event_id: String,
    pub chat_id: String,
    pub chat_kind: ChatKind,
    pub sender_id: String,
    pub text: String,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}
