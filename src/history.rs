//! Recent single-text analyses for an interactive session.

use std::collections::VecDeque;

/// Entries kept by [`History::default`].
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// One analyzed text and its primary emotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Text as the user entered it.
    pub text: String,
    /// Top label for that text.
    pub label: String,
}

/// Bounded most-recent-first list of analyses.
///
/// Recording past capacity evicts the oldest entry.
///
/// ```rust
/// use emotion_pipelines::history::History;
///
/// let mut history = History::new(2);
/// history.record("first", "joy");
/// history.record("second", "fear");
/// history.record("third", "anger");
///
/// let texts: Vec<_> = history.iter().map(|e| e.text.as_str()).collect();
/// assert_eq!(texts, ["third", "second"]);
/// ```
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    /// Creates an empty history holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Adds an entry at the front, evicting from the back on overflow.
    pub fn record(&mut self, text: impl Into<String>, label: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(HistoryEntry {
            text: text.into(),
            label: label.into(),
        });
        self.entries.truncate(self.capacity);
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
