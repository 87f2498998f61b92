//! Render journal.
//!
//! Every scene update writes one page: a single `info` entry describing the
//! scene and the renderers that drew it, then `terminate`. Host tooling that
//! traces render calls reads these pages. The journal keeps the newest
//! [`JOURNAL_CAPACITY`] pages by default.

use std::collections::VecDeque;

use serde::Serialize;
use serde_json::Value;

/// Pages kept by [`Journal::new`]. Older pages are dropped first.
pub const JOURNAL_CAPACITY: usize = 256;

/// Log scope handed to a render pass.
pub trait LogContext {
    /// Records `message` with a structured payload.
    fn info(&mut self, message: &str, payload: Value);

    /// Closes the scope. Later entries are dropped.
    fn terminate(&mut self);
}

/// One recorded entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalEntry {
    pub message: String,
    pub payload: Value,
}

/// A titled log scope.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JournalPage {
    pub title: String,
    pub entries: Vec<JournalEntry>,
    pub terminated: bool,
}

impl JournalPage {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl LogContext for JournalPage {
    fn info(&mut self, message: &str, payload: Value) {
        if self.terminated {
            log::warn!("journal page '{}' is terminated, dropping '{message}'", self.title);
            return;
        }
        log::info!("[{}] {message}: {payload}", self.title);
        self.entries.push(JournalEntry {
            message: message.to_string(),
            payload,
        });
    }

    fn terminate(&mut self) {
        self.terminated = true;
    }
}

/// The most recent pages written by a module, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct Journal {
    pages: VecDeque<JournalPage>,
    #[serde(skip)]
    capacity: usize,
}

impl Default for Journal {
    fn default() -> Self {
        Self::with_capacity(JOURNAL_CAPACITY)
    }
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A journal keeping at most `capacity` pages (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pages: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Opens a new page and returns it for writing, dropping the oldest page
    /// when the journal is full.
    pub fn add_page(&mut self, title: impl Into<String>) -> &mut JournalPage {
        while self.pages.len() >= self.capacity {
            self.pages.pop_front();
        }
        self.pages.push_back(JournalPage::new(title));
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn pages(&self) -> &VecDeque<JournalPage> {
        &self.pages
    }

    pub fn last_page(&self) -> Option<&JournalPage> {
        self.pages.back()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    /// Serializes every page, for dumping to disk.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entries_after_terminate_are_dropped() {
        let mut journal = Journal::new();
        let page = journal.add_page("render");
        page.info("Scene updated", json!({ "nodes": 3 }));
        page.terminate();
        page.info("late", Value::Null);

        let page = journal.last_page().unwrap();
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].payload["nodes"], 3);
        assert!(page.terminated);
    }

    #[test]
    fn test_pages_accumulate() {
        let mut journal = Journal::new();
        journal.add_page("render").terminate();
        journal.add_page("render");
        assert_eq!(journal.len(), 2);
        assert!(journal.pages()[0].terminated);
        assert!(!journal.pages()[1].terminated);
        assert!(journal.to_json().unwrap().contains("\"title\": \"render\""));
    }

    #[test]
    fn test_oldest_pages_are_dropped() {
        let mut journal = Journal::with_capacity(3);
        for i in 0..5 {
            journal.add_page(format!("page {i}"));
        }
        assert_eq!(journal.len(), 3);
        let titles: Vec<&str> = journal.pages().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["page 2", "page 3", "page 4"]);
        assert!(!journal.to_json().unwrap().contains("capacity"));
    }
}
