//! Event pipeline: from an inbound chat event to a delivered answer.
//!
//! - `trigger`: decides whether an event addresses the bot and extracts the question
//! - `reply`: `Replier` trait for outbound delivery
//! - `handler`: `ConversationHandler`, one event end to end
//! - `dispatcher`: `EventDispatcher`, bounded and tracked background handling

pub mod dispatcher;
pub mod handler;
pub mod reply;
pub mod trigger;

pub use dispatcher::EventDispatcher;
pub use handler::{ConversationHandler, HandlerConfig, Outcome};
pub use reply::{BoxReplier, Replier};
pub use trigger::{TriggerRules, extract_question};
