//! Conversation session management for chatbridge.
//!
//! This crate holds the core of the bridge: the bounded expiring cache of
//! per-chat sessions, each session's message log and dedup ledger, the
//! retry wrapper, and the event pipeline that ties them to inbound events.
//! It defines the `AskBackend` and `Replier` traits that the infrastructure
//! layer implements, and never depends on `chatbridge-infra`.

pub mod backend;
pub mod bridge;
pub mod cache;
pub mod chat;
pub mod retry;

#[cfg(test)]
mod testing;
