//! Shared domain types for chatbridge.
//!
//! This crate contains the types used across the bridge: chat turns,
//! conversation state, AI backend request/response shapes, inbound events,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod backend;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
