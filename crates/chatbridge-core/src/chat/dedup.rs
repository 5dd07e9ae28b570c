//! Request-id ledger used to suppress redelivered events.

use dashmap::DashSet;

/// Set of request identifiers a session has already processed.
///
/// Entries are never evicted; the ledger lives exactly as long as its session.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: DashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, request_id: &str) -> bool {
        self.seen.contains(request_id)
    }

    /// Record `request_id` as processed.
    ///
    /// Returns `true` if the id was newly recorded and `false` if it was
    /// already present. The check and insert are a single atomic step, so of
    /// several concurrent callers with the same id exactly one sees `true`.
    pub fn mark_seen(&self, request_id: &str) -> bool {
        self.seen.insert(request_id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
