// src/memory/mod.rs

use crate::protocol::HistoryEntry;
use serde::Serialize;
use std::collections::VecDeque;

/// A trait for session-scoped storage of finished commands.
pub trait Memory {
    fn record(&mut self, entry: HistoryEntry);
    fn read_all(&self) -> Vec<HistoryEntry>;
}

/// Append-only history, newest first.
#[derive(Default, Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CommandHistory {
    entries: VecDeque<HistoryEntry>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

impl Memory for CommandHistory {
    fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
    }

    fn read_all(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HistoryStatus;

    fn entry(id: &str, command: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.into(),
            command: command.into(),
            timestamp: 0,
            status: HistoryStatus::Completed,
            steps: vec![],
            results: vec![],
        }
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut history = CommandHistory::new();
        history.record(entry("1", "first"));
        history.record(entry("2", "second"));
        history.record(entry("3", "third"));

        let commands: Vec<_> = history.iter().map(|e| e.command.as_str()).collect();
        assert_eq!(commands, vec!["third", "second", "first"]);
        assert_eq!(history.len(), 3);
        assert_eq!(history.read_all().len(), 3);
    }

    #[test]
    fn starts_empty() {
        let history = CommandHistory::new();
        assert!(history.is_empty());
        assert!(history.read_all().is_empty());
    }
}
