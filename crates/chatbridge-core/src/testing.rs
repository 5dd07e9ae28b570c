//! Scripted backend shared by the unit tests of this crate.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatbridge_types::backend::{AskRequest, AskResponse, BackendError, ProviderChain};
use chatbridge_types::error::DeliveryError;
use chatbridge_types::event::{ChatKind, InboundEvent};

use crate::backend::{AskBackend, BoxAskBackend};
use crate::bridge::Replier;

pub(crate) fn plain(text: &str, conversation_id: &str, message_id: &str) -> AskResponse {
    AskResponse::Plain {
        text: text.to_string(),
        conversation_id: conversation_id.to_string(),
        message_id: message_id.to_string(),
    }
}

pub(crate) fn chained(
    text: &str,
    conversation_id: &str,
    message_id: &str,
    invocation_id: u32,
) -> AskResponse {
    AskResponse::Chained {
        text: text.to_string(),
        conversation_id: conversation_id.to_string(),
        message_id: message_id.to_string(),
        chain: ProviderChain {
            invocation_id,
            client_id: "client-1".to_string(),
            conversation_signature: "sig-1".to_string(),
        },
    }
}

/// Backend that records every request and replays scripted results.
///
/// Once the script runs out it answers `"answer to {question}"` in
/// conversation `conv-1` with message id `msg-{n}` (n = 1-based call count).
/// A question of `"panic"` panics inside the backend call.
#[derive(Clone, Default)]
pub(crate) struct StubBackend {
    requests: Arc<Mutex<Vec<AskRequest>>>,
    script: Arc<Mutex<VecDeque<Result<AskResponse, BackendError>>>>,
    calls: Arc<AtomicU32>,
    latency: Option<Duration>,
}

impl StubBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub(crate) fn boxed(&self) -> Arc<BoxAskBackend> {
        Arc::new(BoxAskBackend::new(self.clone()))
    }

    pub(crate) fn push(&self, result: Result<AskResponse, BackendError>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub(crate) fn requests(&self) -> Vec<AskRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AskBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, BackendError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if request.question == "panic" {
            panic!("stub backend asked to panic");
        }

        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(plain(
                &format!("answer to {}", request.question),
                "conv-1",
                &format!("msg-{n}"),
            ))
        })
    }
}

/// Replier that records every delivered reply, optionally failing instead.
#[derive(Clone, Default)]
pub(crate) struct RecordingReplier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingReplier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// `(chat_id, text)` pairs in delivery order.
    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Replier for RecordingReplier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn reply(&self, event: &InboundEvent, text: &str) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Status(500));
        }
        self.sent
            .lock()
            .unwrap()
            .push((event.chat_id.clone(), text.to_string()));
        Ok(())
    }
}

pub(crate) fn direct_event(event_id: &str, chat_id: &str, text: &str) -> InboundEvent {
    InboundEvent {
        event_id: event_id.to_string(),
        chat_id: chat_id.to_string(),
        chat_kind: ChatKind::Direct,
        sender_id: "ou_user".to_string(),
        text: text.to_string(),
        mentions: Vec::new(),
    }
}
