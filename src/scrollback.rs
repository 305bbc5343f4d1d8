//! Scrollback buffer
//!
//! Holds every line written to the console, newest first, already wrapped
//! against the current cell metrics. The buffer is bounded by wrapped rows
//! rather than entries: after each append the oldest entries are evicted
//! until the row total fits the limit again. The newest entry is always
//! kept, even when it alone is taller than the limit.

use std::collections::VecDeque;

use crate::color::Color;
use crate::wrap::{wrap_chars, TextFragment};

/// Where an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Text written by the host program
    Output,
    /// A submitted prompt line echoed back
    Input,
}

/// One logical block of console content and its wrapped rows
#[derive(Debug, Clone)]
pub struct TextEntry {
    pub id: u64,
    pub kind: EntryKind,
    pub color: Option<Color>,
    chars: Vec<char>,
    fragments: Vec<TextFragment>,
}

impl TextEntry {
    pub fn new(
        id: u64,
        kind: EntryKind,
        text: &str,
        color: Option<Color>,
        cell_width: i32,
        viewport_width: i32,
    ) -> Self {
        let mut entry = Self {
            id,
            kind,
            color,
            chars: text.chars().collect(),
            fragments: Vec::new(),
        };
        entry.rewrap(cell_width, viewport_width);
        entry
    }

    /// Rebuild the fragments for a new layout
    pub fn rewrap(&mut self, cell_width: i32, viewport_width: i32) {
        self.fragments = wrap_chars(&self.chars, cell_width, viewport_width);
        if self.fragments.is_empty() {
            // An empty line still takes a row
            self.fragments.push(TextFragment {
                text: String::new(),
                index: 0,
                start: 0,
                end: 0,
                span_end: 0,
                terminator: None,
            });
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn fragments(&self) -> &[TextFragment] {
        &self.fragments
    }

    /// Wrapped row count, always at least 1
    pub fn rows(&self) -> usize {
        self.fragments.len()
    }
}

/// A row looked up from the bottom of the buffer
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    /// Position of the entry, 0 = newest
    pub entry_index: usize,
    pub entry: &'a TextEntry,
    pub fragment: &'a TextFragment,
}

/// Bounded, newest-first list of wrapped entries
#[derive(Debug, Clone)]
pub struct ScrollbackBuffer {
    entries: VecDeque<TextEntry>,
    rows: usize,
    limit: usize,
    next_id: u64,
}

impl ScrollbackBuffer {
    /// Create a buffer holding at most `limit` wrapped rows
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            rows: 0,
            limit,
            next_id: 0,
        }
    }

    /// Wrap `text` and add it as the newest entry. Returns the rows added.
    pub fn push(
        &mut self,
        kind: EntryKind,
        text: &str,
        color: Option<Color>,
        cell_width: i32,
        viewport_width: i32,
    ) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.append(TextEntry::new(
            id,
            kind,
            text,
            color,
            cell_width,
            viewport_width,
        ))
    }

    /// Add an already wrapped entry as the newest. Returns its row count.
    pub fn append(&mut self, entry: TextEntry) -> usize {
        let added = entry.rows();
        self.next_id = self.next_id.max(entry.id + 1);
        self.rows += added;
        self.entries.push_front(entry);
        self.trim();
        added
    }

    fn trim(&mut self) {
        while self.rows > self.limit && self.entries.len() > 1 {
            match self.entries.pop_back() {
                Some(old) => self.rows -= old.rows(),
                None => break,
            }
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Change the row limit, evicting old entries right away
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.trim();
    }

    /// Re-wrap every entry for new metrics or a new viewport width
    pub fn rewrap(&mut self, cell_width: i32, viewport_width: i32) {
        let mut rows = 0;
        for entry in &mut self.entries {
            entry.rewrap(cell_width, viewport_width);
            rows += entry.rows();
        }
        self.rows = rows;
        self.trim();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.rows = 0;
    }

    /// Total wrapped rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by position, 0 = newest
    pub fn get(&self, index: usize) -> Option<&TextEntry> {
        self.entries.get(index)
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &TextEntry> {
        self.entries.iter()
    }

    /// The fragment displayed `n` rows above the bottom (0 = last row of
    /// the newest entry)
    pub fn row(&self, n: usize) -> Option<RowRef<'_>> {
        if n >= self.rows {
            return None;
        }
        let mut remaining = n;
        for (entry_index, entry) in self.entries.iter().enumerate() {
            let rows = entry.rows();
            if remaining < rows {
                let fragment = &entry.fragments[rows - 1 - remaining];
                return Some(RowRef {
                    entry_index,
                    entry,
                    fragment,
                });
            }
            remaining -= rows;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn texts(buf: &ScrollbackBuffer) -> Vec<String> {
        buf.iter().map(|e| e.text()).collect()
    }

    #[test]
    fn test_newest_first() {
        let mut buf = ScrollbackBuffer::new(100);
        buf.push(EntryKind::Output, "one", None, 1, 80);
        buf.push(EntryKind::Output, "two", None, 1, 80);
        assert_eq!(texts(&buf), vec!["two", "one"]);
        assert_eq!(buf.get(0).map(|e| e.id), Some(1));
        assert_eq!(buf.rows(), 2);
    }

    #[test]
    fn test_empty_entry_takes_a_row() {
        let mut buf = ScrollbackBuffer::new(100);
        assert_eq!(buf.push(EntryKind::Output, "", None, 8, 800), 1);
        assert_eq!(buf.rows(), 1);
        assert_eq!(buf.row(0).map(|r| r.fragment.text.as_str()), Some(""));
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut buf = ScrollbackBuffer::new(3);
        for i in 0..5 {
            buf.push(EntryKind::Output, &format!("line {}", i), None, 1, 80);
        }
        assert_eq!(buf.rows(), 3);
        assert_eq!(texts(&buf), vec!["line 4", "line 3", "line 2"]);
    }

    #[test]
    fn test_newest_kept_when_taller_than_limit() {
        let mut buf = ScrollbackBuffer::new(2);
        buf.push(EntryKind::Output, "old", None, 1, 80);
        buf.push(EntryKind::Output, "a\nb\nc\nd", None, 1, 80);
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.rows(), 4);
        assert_eq!(texts(&buf), vec!["a\nb\nc\nd"]);
    }

    #[test]
    fn test_set_limit_trims_immediately() {
        let mut buf = ScrollbackBuffer::new(10);
        for i in 0..6 {
            buf.push(EntryKind::Output, &i.to_string(), None, 1, 80);
        }
        buf.set_limit(2);
        assert_eq!(texts(&buf), vec!["5", "4"]);
    }

    #[test]
    fn test_row_lookup_from_bottom() {
        let mut buf = ScrollbackBuffer::new(100);
        buf.push(EntryKind::Output, "first", None, 1, 80);
        buf.push(EntryKind::Output, "x\ny", None, 1, 80);

        let row = |n| buf.row(n).map(|r| (r.entry_index, r.fragment.text.clone()));
        assert_eq!(row(0), Some((0, "y".to_string())));
        assert_eq!(row(1), Some((0, "x".to_string())));
        assert_eq!(row(2), Some((1, "first".to_string())));
        assert_eq!(row(3), None);
    }

    #[test]
    fn test_rewrap_recounts_rows() {
        let mut buf = ScrollbackBuffer::new(100);
        buf.push(EntryKind::Output, "the quick brown fox", None, 1, 40);
        assert_eq!(buf.rows(), 1);
        buf.rewrap(1, 9);
        assert_eq!(buf.rows(), 4);
        buf.rewrap(1, 40);
        assert_eq!(buf.rows(), 1);
    }

    #[test]
    fn test_clear() {
        let mut buf = ScrollbackBuffer::new(100);
        buf.push(EntryKind::Input, "> hi", None, 1, 80);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.rows(), 0);
        assert!(buf.row(0).is_none());
    }

    proptest! {
        #[test]
        fn test_rows_bounded_and_newest_kept(
            lines in proptest::collection::vec("[a-z \n]{0,30}", 1..40),
            limit in 1usize..20,
        ) {
            let mut buf = ScrollbackBuffer::new(limit);
            for line in &lines {
                buf.push(EntryKind::Output, line, None, 1, 8);
                let newest = buf.get(0).map(|e| e.text());
                prop_assert_eq!(newest.as_deref(), Some(line.as_str()));
                prop_assert!(buf.rows() <= limit || buf.len() == 1);
                let total: usize = buf.iter().map(|e| e.rows()).sum();
                prop_assert_eq!(total, buf.rows());
            }
        }
    }
}
