//! Infrastructure layer for chatbridge.
//!
//! Implements the traits defined in `chatbridge-core` against the outside
//! world: the HTTP proxy AI backend, outbound reply delivery, config file
//! loading, and webhook bearer-token verification.

pub mod backend;
pub mod config;
pub mod reply;
pub mod webhook;
