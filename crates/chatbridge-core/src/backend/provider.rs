//! AskBackend trait definition.

use chatbridge_types::backend::{AskRequest, AskResponse, BackendError};

/// A conversational AI backend reachable in one round-trip per question.
///
/// The backend receives the question plus any continuation context from the
/// previous turn and returns the answer with new continuation context.
/// Implementations must not retry internally; retrying is the caller's job.
pub trait AskBackend: Send + Sync {
    /// Human-readable backend name, used in logs and spans.
    fn name(&self) -> &str;

    fn ask(
        &self,
        request: &AskRequest,
    ) -> impl std::future::Future<Output = Result<AskResponse, BackendError>> + Send;
}
