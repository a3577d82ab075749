//! Bounded whole-buffer snapshot history for plain-mode undo/redo.

use std::collections::VecDeque;

/// Default number of snapshots kept in `past`
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Two-stack snapshot history.
///
/// `past` is bounded (oldest snapshot evicted first); `future` holds states
/// that were undone and is cleared by any new edit.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<String>,
    future: Vec<String>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record the state before a direct edit.
    ///
    /// Clears the redo stack. A snapshot equal to the latest `past` entry is
    /// not stored twice.
    pub fn record(&mut self, snapshot: &str) {
        self.future.clear();
        self.push_past(snapshot.to_string());
    }

    /// Step back: returns the restored content, moving `current` onto the
    /// redo stack. `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &str) -> Option<String> {
        let previous = self.past.pop_back()?;
        self.future.push(current.to_string());
        Some(previous)
    }

    /// Step forward: returns the restored content, moving `current` back
    /// onto the undo stack. `None` when there is nothing to redo.
    pub fn redo(&mut self, current: &str) -> Option<String> {
        let next = self.future.pop()?;
        self.push_past(current.to_string());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.past.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop the redo stack after content changed outside the history
    pub fn clear_future(&mut self) {
        self.future.clear();
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn push_past(&mut self, snapshot: String) {
        if self.past.back() == Some(&snapshot) {
            return;
        }
        self.past.push_back(snapshot);
        while self.past.len() > self.capacity {
            self.past.pop_front();
        }
    }
}
