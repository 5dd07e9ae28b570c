//! Bounded message log for a conversation session.

use std::collections::VecDeque;
use std::sync::Mutex;

use chatbridge_types::chat::ChatTurn;

/// Ordered, capped log of chat turns.
///
/// Appends go to the tail; once the log grows past `max_messages` the oldest
/// turns are dropped from the head. Readers get an owned snapshot, so
/// iterating never holds the lock.
#[derive(Debug)]
pub struct MessageLog {
    turns: Mutex<VecDeque<ChatTurn>>,
    max_messages: usize,
}

impl MessageLog {
    /// Create an empty log retaining at most `max_messages` turns (minimum 1).
    pub fn new(max_messages: usize) -> Self {
        let max_messages = max_messages.max(1);
        Self {
            turns: Mutex::new(VecDeque::with_capacity(max_messages.min(64))),
            max_messages,
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn append(&self, turn: ChatTurn) {
        let mut turns = self.turns.lock().expect("message log lock poisoned");
        turns.push_back(turn);
        while turns.len() > self.max_messages {
            turns.pop_front();
        }
    }

    /// Snapshot of the retained turns, oldest first.
    pub fn list(&self) -> Vec<ChatTurn> {
        let turns = self.turns.lock().expect("message log lock poisoned");
        turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.lock().expect("message log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
