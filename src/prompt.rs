//! Prompt line editor
//!
//! The editor owns the live input line: the prompt text, the input buffer
//! with its cursor, and the command history. History is append-only; the
//! slot after the newest entry is the live slot, whose draft survives
//! browsing through older entries. Recalled entries are edited as copies.
//!
//! The prompt and input are wrapped together as one entry so the output
//! pane can draw them below the scrollback like any other text.

use crate::event::{BackendEvent, Key, Modifiers, UiEvent};
use crate::event_bus::EventBus;
use crate::font::Metrics;
use crate::scrollback::{EntryKind, TextEntry};
use crate::text;
use crate::wrap::TextFragment;

/// Entry id of the live prompt line; sorts after every scrollback entry
pub const PROMPT_ENTRY_ID: u64 = u64::MAX;

#[derive(Debug)]
pub struct PromptEditor {
    prompt: String,
    input: Vec<char>,
    cursor: usize,
    history: Vec<Vec<char>>,
    /// Position in history; `history.len()` is the live slot
    index: usize,
    /// Live slot contents while an older entry is shown
    draft: Vec<char>,
    saved: Vec<char>,
    metrics: Metrics,
    viewport_width: i32,
    entry: TextEntry,
    bus: EventBus<UiEvent>,
}

impl PromptEditor {
    pub fn new(prompt: &str, bus: EventBus<UiEvent>) -> Self {
        let metrics = Metrics::default();
        Self {
            prompt: prompt.to_string(),
            input: Vec::new(),
            cursor: 0,
            history: Vec::new(),
            index: 0,
            draft: Vec::new(),
            saved: Vec::new(),
            metrics,
            viewport_width: 0,
            entry: TextEntry::new(
                PROMPT_ENTRY_ID,
                EntryKind::Input,
                prompt,
                None,
                metrics.char_width,
                0,
            ),
            bus,
        }
    }

    /// Bus the editor publishes `LineSubmitted` and `InputSaved` on
    pub fn bus(&self) -> &EventBus<UiEvent> {
        &self.bus
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt_text(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
        self.rewrap();
    }

    /// Current input, without the prompt
    pub fn input(&self) -> String {
        self.input.iter().collect()
    }

    /// Replace the input; the cursor moves to the end
    pub fn set_input(&mut self, input: &str) {
        self.input = text::to_chars(input);
        self.cursor = self.input.len();
        self.rewrap();
    }

    /// Prompt followed by input, as displayed
    pub fn text(&self) -> String {
        let mut s = self.prompt.clone();
        s.extend(self.input.iter());
        s
    }

    /// Cursor position within the input, in codepoints
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[Vec<char>] {
        &self.history
    }

    /// Whether the live slot (not a recalled entry) is being edited
    pub fn at_live_slot(&self) -> bool {
        self.index == self.history.len()
    }

    pub fn insert_at_cursor(&mut self, s: &str) {
        self.cursor = text::insert_at(&mut self.input, self.cursor, s);
        self.rewrap();
    }

    /// Delete the codepoint before the cursor; no-op at the start
    pub fn erase_before_cursor(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = text::backspace(&mut self.input, self.cursor);
        self.rewrap();
    }

    /// Delete the codepoint under the cursor; no-op at the end
    pub fn erase_at_cursor(&mut self) {
        if self.cursor >= self.input.len() {
            return;
        }
        self.input.remove(self.cursor);
        self.rewrap();
    }

    /// Move the cursor by `delta` codepoints, clamped to the input
    pub fn move_cursor(&mut self, delta: isize) {
        let pos = self.cursor as isize + delta;
        self.cursor = pos.clamp(0, self.input.len() as isize) as usize;
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.input.len();
    }

    pub fn word_left(&mut self) {
        self.cursor = text::word_left(&self.input, self.cursor);
    }

    pub fn word_right(&mut self) {
        self.cursor = text::word_right(&self.input, self.cursor);
    }

    /// Submit the input.
    ///
    /// `LineSubmitted` is published even for an empty line. A non-empty line
    /// is appended to history and the live slot starts over.
    pub fn submit(&mut self) -> String {
        let line: String = self.input.iter().collect();
        log::debug!("Prompt submitted {} characters", self.input.len());
        self.bus.publish(&UiEvent::LineSubmitted(line.clone()));

        if !self.input.is_empty() {
            self.history.push(std::mem::take(&mut self.input));
        }
        self.input.clear();
        self.draft.clear();
        self.index = self.history.len();
        self.cursor = 0;
        self.rewrap();
        line
    }

    /// Show the previous history slot; stays on the oldest
    pub fn history_prev(&mut self) {
        if self.index == 0 {
            return;
        }
        self.recall(self.index - 1);
    }

    /// Show the next history slot; stays on the live slot
    pub fn history_next(&mut self) {
        if self.at_live_slot() {
            return;
        }
        self.recall(self.index + 1);
    }

    fn recall(&mut self, index: usize) {
        if self.at_live_slot() {
            self.draft = std::mem::take(&mut self.input);
        }
        self.index = index;
        self.input = match self.history.get(index) {
            Some(entry) => entry.clone(),
            None => std::mem::take(&mut self.draft),
        };
        self.cursor = self.input.len();
        self.rewrap();
    }

    /// Replace the history with `entries` (oldest first) and start a fresh
    /// live slot
    pub fn set_command_history<S: AsRef<str>>(&mut self, entries: &[S]) {
        self.history = entries.iter().map(|e| text::to_chars(e.as_ref())).collect();
        self.index = self.history.len();
        self.input.clear();
        self.draft.clear();
        self.cursor = 0;
        self.rewrap();
    }

    /// Stash the input, publish `InputSaved` and clear the line
    pub fn save(&mut self) {
        let line: String = self.input.iter().collect();
        self.saved = std::mem::take(&mut self.input);
        self.bus.publish(&UiEvent::InputSaved(line));
        self.cursor = 0;
        self.rewrap();
    }

    /// Bring back the input stashed by `save`
    pub fn restore(&mut self) {
        self.input = self.saved.clone();
        self.cursor = self.input.len();
        self.rewrap();
    }

    /// Ctrl-C: mark the line as interrupted and stash it
    pub fn interrupt(&mut self) {
        self.input.extend("^C".chars());
        self.save();
    }

    /// Re-wrap for new metrics or viewport width
    pub fn wrap(&mut self, metrics: Metrics, viewport_width: i32) {
        self.metrics = metrics;
        self.viewport_width = viewport_width;
        self.rewrap();
    }

    fn rewrap(&mut self) {
        self.entry = TextEntry::new(
            PROMPT_ENTRY_ID,
            EntryKind::Input,
            &self.text(),
            None,
            self.metrics.char_width,
            self.viewport_width,
        );
    }

    /// The wrapped prompt line
    pub fn entry(&self) -> &TextEntry {
        &self.entry
    }

    pub fn fragments(&self) -> &[TextFragment] {
        self.entry.fragments()
    }

    pub fn rows(&self) -> usize {
        self.entry.rows()
    }

    /// Fragment index and column where the cursor is drawn
    pub fn cursor_cell(&self) -> (usize, usize) {
        let pos = self.prompt.chars().count() + self.cursor;
        let frag = self
            .fragments()
            .iter()
            .rev()
            .find(|f| f.start <= pos)
            .or_else(|| self.fragments().first());
        match frag {
            Some(f) => (f.index, pos - f.start.min(pos)),
            None => (0, pos),
        }
    }

    /// Apply a key press; returns true when the key was handled
    pub fn handle_key(&mut self, key: Key, mods: Modifiers) -> bool {
        match key {
            Key::Enter => {
                self.submit();
            }
            Key::Backspace => self.erase_before_cursor(),
            Key::Delete => self.erase_at_cursor(),
            Key::Left => self.move_cursor(-1),
            Key::Right => self.move_cursor(1),
            Key::Home => self.move_to_start(),
            Key::End => self.move_to_end(),
            Key::Up => self.history_prev(),
            Key::Down => self.history_next(),
            Key::Char(c) if mods.ctrl => match c.to_ascii_lowercase() {
                'b' => self.word_left(),
                'f' => self.word_right(),
                'c' => self.interrupt(),
                _ => return false,
            },
            _ => return false,
        }
        true
    }

    /// Keyboard and text events; other events are left alone
    pub fn handle_event(&mut self, event: &BackendEvent) -> bool {
        match event {
            BackendEvent::KeyDown { key, mods } => self.handle_key(*key, *mods),
            BackendEvent::TextInput(s) if !s.is_empty() => {
                self.insert_at_cursor(s);
                true
            }
            _ => false,
        }
    }
}
