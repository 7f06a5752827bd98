//! Single-step undo over full-state snapshots.

use std::collections::VecDeque;

/// Stack of snapshots. With a limit, the oldest entry is dropped when a
/// push would exceed it.
#[derive(Debug, Clone)]
pub struct UndoLog<S> {
    entries: VecDeque<S>,
    limit: Option<usize>,
}

impl<S> Default for UndoLog<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> UndoLog<S> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            limit: None,
        }
    }

    /// `limit` of 0 means unbounded.
    pub fn bounded(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: (limit > 0).then_some(limit),
        }
    }

    pub fn push(&mut self, snapshot: S) {
        if let Some(limit) = self.limit {
            while self.entries.len() >= limit {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<S> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo() {
        let mut log = UndoLog::new();
        log.push(1);
        log.push(2);
        assert_eq!(log.pop(), Some(2));
        assert_eq!(log.pop(), Some(1));
        assert_eq!(log.pop(), None);
    }

    #[test]
    fn test_bounded_drops_oldest() {
        let mut log = UndoLog::bounded(2);
        for i in 0..5 {
            log.push(i);
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.pop(), Some(4));
        assert_eq!(log.pop(), Some(3));
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        let mut log = UndoLog::bounded(0);
        for i in 0..100 {
            log.push(i);
        }
        assert_eq!(log.len(), 100);
        log.clear();
        assert!(log.is_empty());
    }
}
