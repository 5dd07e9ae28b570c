//! Outbound reply delivery.
//!
//! - `HttpReplier` POSTs each reply as JSON to a configured endpoint
//! - `LogReplier` only logs replies (used when no endpoint is configured)

use std::time::Duration;

use serde::Serialize;

use chatbridge_core::bridge::{BoxReplier, Replier};
use chatbridge_types::config::ServerConfig;
use chatbridge_types::error::DeliveryError;
use chatbridge_types::event::InboundEvent;

/// JSON body of an outbound text reply.
#[derive(Debug, Serialize)]
pub struct ReplyPayload<'a> {
    pub chat_id: &'a str,
    /// Event the reply answers.
    pub reply_to: &'a str,
    pub msg_type: &'static str,
    pub content: &'a str,
}

pub struct HttpReplier {
    client: reqwest::Client,
    url: String,
}

impl HttpReplier {
    pub fn new(url: impl Into<String>) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DeliveryError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Replier for HttpReplier {
    fn name(&self) -> &str {
        "http"
    }

    async fn reply(&self, event: &InboundEvent, text: &str) -> Result<(), DeliveryError> {
        let payload = ReplyPayload {
            chat_id: &event.chat_id,
            reply_to: &event.event_id,
            msg_type: "text",
            content: text,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LogReplier;

impl Replier for LogReplier {
    fn name(&self) -> &str {
        "log"
    }

    async fn reply(&self, event: &InboundEvent, text: &str) -> Result<(), DeliveryError> {
        tracing::info!(chat_id = %event.chat_id, reply_to = %event.event_id, reply = text, "reply");
        Ok(())
    }
}

/// HTTP delivery when `reply_url` is configured, log-only otherwise.
pub fn build_replier(config: &ServerConfig) -> Result<BoxReplier, DeliveryError> {
    match config.reply_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => Ok(BoxReplier::new(HttpReplier::new(url)?)),
        None => Ok(BoxReplier::new(LogReplier)),
    }
}
