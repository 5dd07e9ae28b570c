//! AI backend abstraction.
//!
//! - `AskBackend`: RPITIT trait implemented by concrete backends in
//!   `chatbridge-infra`
//! - `BoxAskBackend`: object-safe wrapper for runtime backend selection

pub mod box_backend;
pub mod provider;

pub use box_backend::BoxAskBackend;
pub use provider::AskBackend;
