//! Text search over the scrollback
//!
//! Matches are located in each entry's source text and then mapped onto
//! the entry's fragments, so a match that wraps across rows yields one
//! highlight per row.

use crate::scrollback::ScrollbackBuffer;
use crate::wrap::TextFragment;

/// One highlighted span on one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub entry_id: u64,
    pub fragment: usize,
    /// Columns `[start_col, end_col)` within the fragment's displayed text
    pub start_col: usize,
    pub end_col: usize,
}

#[derive(Debug, Default)]
pub struct TextFinder {
    needle: Vec<char>,
    matches: Vec<Match>,
}

impl TextFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn needle(&self) -> String {
        self.needle.iter().collect()
    }

    /// Search for `needle`; an empty needle clears the matches
    pub fn find(&mut self, buffer: &ScrollbackBuffer, needle: &str) -> usize {
        self.needle = needle.chars().collect();
        self.refresh(buffer)
    }

    /// Search again with the current needle after the buffer changed
    pub fn refresh(&mut self, buffer: &ScrollbackBuffer) -> usize {
        self.matches.clear();
        if self.needle.is_empty() {
            return 0;
        }

        for entry in buffer.iter() {
            for offset in occurrences(entry.chars(), &self.needle) {
                map_to_fragments(
                    entry.id,
                    entry.fragments(),
                    offset,
                    offset + self.needle.len(),
                    &mut self.matches,
                );
            }
        }
        log::debug!(
            "Find {:?}: {} highlighted spans",
            self.needle(),
            self.matches.len()
        );
        self.matches.len()
    }

    pub fn clear(&mut self) {
        self.needle.clear();
        self.matches.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Matches on one row
    pub fn matches_on(&self, entry_id: u64, fragment: usize) -> impl Iterator<Item = &Match> {
        self.matches
            .iter()
            .filter(move |m| m.entry_id == entry_id && m.fragment == fragment)
    }
}

/// Start offsets of every occurrence of `needle`, overlapping ones included
fn occurrences(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, w)| *w == needle)
        .map(|(i, _)| i)
        .collect()
}

fn map_to_fragments(
    entry_id: u64,
    fragments: &[TextFragment],
    start: usize,
    end: usize,
    out: &mut Vec<Match>,
) {
    for frag in fragments {
        let from = start.max(frag.start);
        let to = end.min(frag.end);
        if from >= to {
            continue;
        }
        out.push(Match {
            entry_id,
            fragment: frag.index,
            start_col: from - frag.start,
            end_col: to - frag.start,
        });
    }
}
