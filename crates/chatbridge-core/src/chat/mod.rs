//! Conversation sessions and their owned state.
//!
//! - `MessageLog`: bounded, ordered, internally synchronized turn log
//! - `DedupLedger`: set of request identifiers a session has already processed
//! - `ConversationSession`: one chat's conversation with the AI backend
//! - `SessionManager`: bounded expiring cache of sessions keyed by chat id

pub mod dedup;
pub mod log;
pub mod manager;
pub mod session;

pub use dedup::DedupLedger;
pub use log::MessageLog;
pub use manager::{ManagerConfig, SessionManager};
pub use session::{ConversationSession, SessionConfig};
