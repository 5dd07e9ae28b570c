use thiserror::Error;

use crate::backend::BackendError;

/// Errors related to conversation session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The request identifier was already processed by this session.
    #[error("duplicate request (id: {0})")]
    DuplicateRequest(String),

    /// The AI backend round-trip failed.
    #[error("upstream call failed: {0}")]
    Upstream(#[from] BackendError),

    /// A new session could not be constructed.
    #[error("failed to create session: {0}")]
    Creation(String),
}

impl SessionError {
    /// Duplicate deliveries are expected under at-least-once delivery and
    /// should be ignored rather than surfaced to the end user.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, SessionError::DuplicateRequest(_))
    }
}

/// Errors from outbound reply delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery transport error: {0}")]
    Transport(String),

    #[error("delivery endpoint returned HTTP {0}")]
    Status(u16),
}
