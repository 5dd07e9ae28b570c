//! Outbound delivery of answers to the chat platform.

use std::future::Future;
use std::pin::Pin;

use chatbridge_types::error::DeliveryError;
use chatbridge_types::event::InboundEvent;

/// Sends a text reply to the chat an event came from.
///
/// Implementations live in `chatbridge-infra` (HTTP delivery, log-only).
pub trait Replier: Send + Sync {
    fn name(&self) -> &str;

    fn reply(
        &self,
        event: &InboundEvent,
        text: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Object-safe version of [`Replier`] with boxed futures.
pub trait ReplierDyn: Send + Sync {
    fn name(&self) -> &str;

    fn reply_boxed<'a>(
        &'a self,
        event: &'a InboundEvent,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>>;
}

impl<T: Replier> ReplierDyn for T {
    fn name(&self) -> &str {
        Replier::name(self)
    }

    fn reply_boxed<'a>(
        &'a self,
        event: &'a InboundEvent,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        Box::pin(self.reply(event, text))
    }
}

/// Type-erased replier, chosen at startup from configuration.
pub struct BoxReplier {
    inner: Box<dyn ReplierDyn + Send + Sync>,
}

impl BoxReplier {
    pub fn new<T: Replier + 'static>(replier: T) -> Self {
        Self {
            inner: Box::new(replier),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn reply(&self, event: &InboundEvent, text: &str) -> Result<(), DeliveryError> {
        self.inner.reply_boxed(event, text).await
    }
}
