//! Bounded transcript of processed commands and their responses.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// A command line received from the peer.
    Received,
    /// A response sent back to the peer.
    Sent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub text: String,
}

/// Append-only, most-recent-first. The oldest entry is evicted at capacity.
#[derive(Debug, Clone)]
pub struct Transcript {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Transcript {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, direction: Direction, text: &str) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(LogEntry {
            timestamp: Utc::now(),
            direction,
            text: text.to_string(),
        });
    }

    /// Entries, most recent first.
    pub fn history(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) -> usize {
        let cleared = self.entries.len();
        self.entries.clear();
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_recent_first() {
        let mut log = Transcript::default();
        log.record(Direction::Received, "^SU");
        log.record(Direction::Sent, ">");

        let history = log.history();
        assert_eq!(history[0].text, ">");
        assert_eq!(history[0].direction, Direction::Sent);
        assert_eq!(history[1].text, "^SU");
    }

    #[test]
    fn test_evicts_oldest() {
        let mut log = Transcript::with_capacity(3);
        for idx in 0..5 {
            log.record(Direction::Received, &format!("m{idx}"));
        }
        let texts: Vec<_> = log.history().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["m4", "m3", "m2"]);
    }

    #[test]
    fn test_clear_returns_removed_count() {
        let mut log = Transcript::default();
        log.record(Direction::Received, "a");
        log.record(Direction::Sent, "b");
        assert_eq!(log.clear(), 2);
        assert!(log.history().is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut log = Transcript::with_capacity(0);
        log.record(Direction::Received, "a");
        log.record(Direction::Received, "b");
        let texts: Vec<_> = log.history().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["b"]);
    }
}
