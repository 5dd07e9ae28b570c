//! BoxAskBackend -- object-safe dynamic dispatch wrapper for AskBackend.
//!
//! 1. `AskBackendDyn` is an object-safe mirror of `AskBackend` with boxed futures
//! 2. Every `T: AskBackend` gets `AskBackendDyn` through a blanket impl
//! 3. `BoxAskBackend` wraps `Box<dyn AskBackendDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use chatbridge_types::backend::{AskRequest, AskResponse, BackendError};

use super::provider::AskBackend;

/// Object-safe version of [`AskBackend`] with boxed futures.
pub trait AskBackendDyn: Send + Sync {
    fn name(&self) -> &str;

    fn ask_boxed<'a>(
        &'a self,
        request: &'a AskRequest,
    ) -> Pin<Box<dyn Future<Output = Result<AskResponse, BackendError>> + Send + 'a>>;
}

impl<T: AskBackend> AskBackendDyn for T {
    fn name(&self) -> &str {
        AskBackend::name(self)
    }

    fn ask_boxed<'a>(
        &'a self,
        request: &'a AskRequest,
    ) -> Pin<Box<dyn Future<Output = Result<AskResponse, BackendError>> + Send + 'a>> {
        Box::pin(self.ask(request))
    }
}

/// Type-erased AI backend.
///
/// `AskBackend` uses RPITIT and cannot be a trait object directly; this
/// wrapper lets the session layer hold any backend chosen at runtime.
pub struct BoxAskBackend {
    inner: Box<dyn AskBackendDyn + Send + Sync>,
}

impl BoxAskBackend {
    pub fn new<T: AskBackend + 'static>(backend: T) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        self.inner.ask_boxed(request).await
    }
}

impl std::fmt::Debug for BoxAskBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxAskBackend")
            .field("name", &self.name())
            .finish()
    }
}
