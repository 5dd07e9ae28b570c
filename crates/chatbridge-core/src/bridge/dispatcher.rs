//! EventDispatcher -- bounded, tracked background handling of inbound events.
//!
//! The webhook acknowledges an event immediately and hands it here. Each
//! event runs as its own task in a `JoinSet`:
//! - a `Semaphore` caps how many events are handled at once
//! - a panicking task is logged and counted; other tasks keep running
//! - a `CancellationToken` stops queued and in-flight work on shutdown
//! - `drain()` awaits every submitted task

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span};

use chatbridge_types::event::InboundEvent;

use super::handler::{ConversationHandler, Outcome};

/// Counters of finished event tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub completed: usize,
    pub panicked: usize,
    pub cancelled: usize,
}

#[derive(Default)]
struct Counters {
    completed: AtomicUsize,
    panicked: AtomicUsize,
    cancelled: AtomicUsize,
}

impl Counters {
    fn record(&self, result: Result<Outcome, JoinError>) {
        match result {
            Ok(Outcome::Cancelled) => {
                self.cancelled.fetch_add(1, Ordering::Relaxed);
            }
            Ok(outcome) => {
                debug!(?outcome, "event task finished");
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) if e.is_panic() => {
                error!(error = %e, "event task panicked");
                self.panicked.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                debug!(error = %e, "event task aborted");
                self.cancelled.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            completed: self.completed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

pub struct EventDispatcher {
    handler: Arc<ConversationHandler>,
    permits: Arc<Semaphore>,
    tasks: Mutex<JoinSet<Outcome>>,
    cancel: CancellationToken,
    counters: Counters,
}

impl EventDispatcher {
    pub fn new(handler: Arc<ConversationHandler>, max_concurrent: usize) -> Self {
        Self {
            handler,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            tasks: Mutex::new(JoinSet::new()),
            cancel: CancellationToken::new(),
            counters: Counters::default(),
        }
    }

    /// Queue an event for background handling.
    ///
    /// Returns `false` once the dispatcher has been cancelled.
    pub fn submit(&self, event: InboundEvent) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        let handler = Arc::clone(&self.handler);
        let permits = Arc::clone(&self.permits);
        let cancel = self.cancel.clone();
        let span = info_span!("event", event_id = %event.event_id, chat_id = %event.chat_id);

        let mut tasks = self.tasks.lock().expect("dispatcher task lock poisoned");
        // Reap finished tasks so the set only holds live work.
        while let Some(result) = tasks.try_join_next() {
            self.counters.record(result);
        }

        tasks.spawn(
            async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Outcome::Cancelled,
                    permit = permits.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return Outcome::Cancelled,
                    },
                };

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Outcome::Cancelled,
                    outcome = handler.handle(&event) => outcome,
                }
            }
            .instrument(span),
        );
        true
    }

    /// Number of submitted tasks not yet reaped.
    pub fn pending(&self) -> usize {
        self.tasks.lock().expect("dispatcher task lock poisoned").len()
    }

    /// Stop accepting events and signal in-flight handling to stop.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Await every submitted task and return the cumulative counters.
    pub async fn drain(&self) -> DispatchStats {
        loop {
            let mut tasks = {
                let mut guard = self.tasks.lock().expect("dispatcher task lock poisoned");
                std::mem::take(&mut *guard)
            };
            if tasks.is_empty() {
                break;
            }
            while let Some(result) = tasks.join_next().await {
                self.counters.record(result);
            }
        }
        self.counters.snapshot()
    }

    /// Cancel, then drain.
    pub async fn shutdown(&self) -> DispatchStats {
        self.cancel();
        self.drain().await
    }

    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }
}
