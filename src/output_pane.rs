//! Output pane
//!
//! The pane stacks the scrollback above the live prompt line and draws the
//! visible window of rows from the bottom up. Row 0 is the last prompt row;
//! `scroll_offset` rows are skipped before drawing starts.
//!
//! Input reaches the pane through its own event bus. Subscribers only
//! record what happened into a mailbox; the pane applies the mailbox after
//! each publish, so callbacks never need a borrow of the pane itself. The
//! pointer-motion subscription is parked until a press lands in the text
//! area and parked again on release.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::canvas::Canvas;
use crate::clipboard::Clipboard;
use crate::color::{Color, Palette};
use crate::event::{BackendEvent, EventKind, Key, Modifiers, MouseButton, UiEvent, UiTag};
use crate::event_bus::{EventBus, Subscription};
use crate::finder::TextFinder;
use crate::font::Metrics;
use crate::geometry::{floor_to, Point, Rect};
use crate::prompt::{PromptEditor, PROMPT_ENTRY_ID};
use crate::scrollback::{EntryKind, ScrollbackBuffer};
use crate::scrollbar::{Scrollbar, SCROLLBAR_WIDTH};
use crate::selection::{compute_rects, Anchor, TextSelection};
use crate::text;
use crate::wrap::TextFragment;

/// Space between the pane edge and the text
pub const MARGIN: i32 = 4;

/// Width of the prompt cursor bar
const CURSOR_WIDTH: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAction {
    /// One row towards older content
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    /// Positive is towards older content
    Lines(i32),
    /// Back to the prompt
    Bottom,
    To(usize),
}

/// Work recorded by bus subscribers
#[derive(Debug)]
enum Pending {
    Key(Key, Modifiers),
    Text(String),
    Press { pos: Point, clicks: u8 },
    Drag(Point),
    Release,
    Wheel(i32),
    Echo(String),
    Find(String),
    ScrollTo(i32),
}

type Mailbox = Rc<RefCell<VecDeque<Pending>>>;

fn post(mailbox: &Mailbox, pending: Pending) {
    mailbox.borrow_mut().push_back(pending);
}

/// One row in the visible window
struct VisibleRow<'a> {
    y: i32,
    entry_id: u64,
    color: Option<Color>,
    kind: EntryKind,
    fragment: &'a TextFragment,
}

pub struct OutputPane {
    buffer: ScrollbackBuffer,
    prompt: PromptEditor,
    selection: TextSelection,
    /// Last selection state announced on the UI bus
    selection_shown: bool,
    finder: TextFinder,
    scrollbar: Scrollbar,
    scroll_offset: usize,
    frame: Rect,
    content: Rc<Cell<Rect>>,
    metrics: Metrics,
    laid_out: bool,
    input: EventBus<BackendEvent>,
    ui: EventBus<UiEvent>,
    motion: Subscription,
    mailbox: Mailbox,
    clipboard: Box<dyn Clipboard>,
}

impl fmt::Debug for OutputPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputPane")
            .field("entries", &self.buffer.len())
            .field("rows", &self.buffer.rows())
            .field("scroll_offset", &self.scroll_offset)
            .field("content", &self.content.get())
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl OutputPane {
    pub fn new(
        prompt: &str,
        scrollback: usize,
        ui: EventBus<UiEvent>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let input = EventBus::new();
        let mailbox: Mailbox = Rc::new(RefCell::new(VecDeque::new()));
        let content = Rc::new(Cell::new(Rect::default()));

        let mb = mailbox.clone();
        let motion = input.connect_parked(EventKind::MouseMove, move |env| {
            match env.event() {
                Some(BackendEvent::MouseMove { pos }) => {
                    post(&mb, Pending::Drag(*pos));
                    true
                }
                _ => false,
            }
        });

        let mb = mailbox.clone();
        input.connect(EventKind::KeyDown, move |env| match env.event() {
            Some(BackendEvent::KeyDown { key, mods }) => {
                post(&mb, Pending::Key(*key, *mods));
                true
            }
            _ => false,
        });

        let mb = mailbox.clone();
        input.connect(EventKind::TextInput, move |env| match env.event() {
            Some(BackendEvent::TextInput(s)) if !s.is_empty() => {
                post(&mb, Pending::Text(s.clone()));
                true
            }
            _ => false,
        });

        let (mb, bus, area) = (mailbox.clone(), input.downgrade(), content.clone());
        input.connect(EventKind::MouseDown, move |env| match env.event() {
            Some(BackendEvent::MouseDown {
                pos,
                button: MouseButton::Left,
                clicks,
            }) if area.get().contains(*pos) => {
                post(
                    &mb,
                    Pending::Press {
                        pos: *pos,
                        clicks: *clicks,
                    },
                );
                if let Some(bus) = bus.upgrade() {
                    bus.attach(&motion);
                }
                true
            }
            _ => false,
        });

        let (mb, bus) = (mailbox.clone(), input.downgrade());
        input.connect(EventKind::MouseUp, move |env| {
            let Some(bus) = bus.upgrade() else {
                return false;
            };
            match env.event() {
                Some(BackendEvent::MouseUp {
                    button: MouseButton::Left,
                    ..
                }) if bus.is_attached(&motion) => {
                    bus.detach(&motion);
                    post(&mb, Pending::Release);
                    true
                }
                _ => false,
            }
        });

        let mb = mailbox.clone();
        input.connect(EventKind::Wheel, move |env| match env.event() {
            Some(BackendEvent::Wheel { lines }) => {
                post(&mb, Pending::Wheel(*lines));
                true
            }
            _ => false,
        });

        // Submitted and stashed lines are echoed into the scrollback
        for tag in [UiTag::LineSubmitted, UiTag::InputSaved] {
            let mb = mailbox.clone();
            ui.connect(tag, move |env| match env.event() {
                Some(UiEvent::LineSubmitted(line)) | Some(UiEvent::InputSaved(line)) => {
                    post(&mb, Pending::Echo(line.clone()));
                    true
                }
                _ => false,
            });
        }

        let mb = mailbox.clone();
        ui.connect(UiTag::Find, move |env| match env.event() {
            Some(UiEvent::Find(needle)) => {
                post(&mb, Pending::Find(needle.clone()));
                true
            }
            _ => false,
        });

        let scrollbar = Scrollbar::new();
        let mb = mailbox.clone();
        scrollbar
            .bus()
            .connect(EventKind::ValueChanged, move |env| match env.payload::<i32>() {
                Some(offset) => {
                    post(&mb, Pending::ScrollTo(*offset));
                    true
                }
                None => false,
            });

        Self {
            buffer: ScrollbackBuffer::new(scrollback),
            prompt: PromptEditor::new(prompt, ui.clone()),
            selection: TextSelection::new(),
            selection_shown: false,
            finder: TextFinder::new(),
            scrollbar,
            scroll_offset: 0,
            frame: Rect::default(),
            content,
            metrics: Metrics::default(),
            laid_out: false,
            input,
            ui,
            motion,
            mailbox,
            clipboard,
        }
    }

    /// Bus the pane receives window events on
    pub fn input_bus(&self) -> &EventBus<BackendEvent> {
        &self.input
    }

    pub fn buffer(&self) -> &ScrollbackBuffer {
        &self.buffer
    }

    pub fn prompt(&self) -> &PromptEditor {
        &self.prompt
    }

    pub fn finder(&self) -> &TextFinder {
        &self.finder
    }

    pub fn clipboard_mut(&mut self) -> &mut dyn Clipboard {
        &mut *self.clipboard
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Text area in window coordinates
    pub fn content_frame(&self) -> Rect {
        self.content.get()
    }

    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    pub fn columns(&self) -> i32 {
        self.metrics.columns_in(self.content.get().w)
    }

    pub fn rows(&self) -> i32 {
        self.metrics.rows_in(self.content.get().h)
    }

    /// Scrollback rows plus prompt rows
    pub fn total_rows(&self) -> usize {
        self.buffer.rows() + self.prompt.rows()
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_active()
    }

    /// Width entries are wrapped against; unbounded until the first layout
    fn wrap_width(&self) -> i32 {
        if self.laid_out {
            self.content.get().w
        } else {
            i32::MAX
        }
    }

    // -- Input --------------------------------------------------------------

    /// Route a window event; returns true when something consumed it
    pub fn handle_event(&mut self, event: &BackendEvent) -> bool {
        let mut handled = self.scrollbar.handle_event(event);
        if !handled {
            handled = self.input.publish(event);
        }
        self.pump();
        handled
    }

    /// Apply everything subscribers have recorded so far
    pub fn pump(&mut self) {
        loop {
            let batch: Vec<Pending> = self.mailbox.borrow_mut().drain(..).collect();
            if batch.is_empty() {
                break;
            }
            for pending in batch {
                self.apply(pending);
            }
        }
        self.clamp_scroll();
        self.sync_selection();
    }

    fn apply(&mut self, pending: Pending) {
        match pending {
            Pending::Key(key, mods) => self.on_key(key, mods),
            Pending::Text(s) => {
                self.prompt.insert_at_cursor(&s);
                self.scroll(ScrollAction::Bottom);
            }
            Pending::Press { pos, clicks } => self.on_press(pos, clicks),
            Pending::Drag(pos) => self.on_drag(pos),
            Pending::Release => log::trace!("Selection drag finished"),
            Pending::Wheel(lines) => self.scroll(ScrollAction::Lines(lines)),
            Pending::Echo(line) => self.new_input(&line),
            Pending::Find(needle) => self.find(&needle),
            Pending::ScrollTo(offset) => self.scroll(ScrollAction::To(offset.max(0) as usize)),
        }
    }

    fn on_key(&mut self, key: Key, mods: Modifiers) {
        if mods.command() {
            if let Key::Char(c) = key {
                match c.to_ascii_lowercase() {
                    'c' if self.selection.is_active() => {
                        self.copy_selection();
                        return;
                    }
                    'v' => {
                        self.paste();
                        return;
                    }
                    _ => {}
                }
            }
        }

        match key {
            Key::PageUp => self.scroll(ScrollAction::PageUp),
            Key::PageDown => self.scroll(ScrollAction::PageDown),
            Key::Escape => self.clear_selection(),
            _ => {
                if self.prompt.handle_key(key, mods) {
                    self.scroll(ScrollAction::Bottom);
                }
            }
        }
    }

    fn on_press(&mut self, pos: Point, clicks: u8) {
        let columns = self.columns().max(0) as usize;
        let Some((at, fragment)) = self.hit(pos) else {
            return;
        };

        match clicks {
            2 => {
                let chars = text::to_chars(&fragment.text);
                match text::find_run(&chars, at.column) {
                    Some((start, end)) => self.selection.set(
                        Anchor::new(at.entry_id, at.fragment, start),
                        Anchor::new(at.entry_id, at.fragment, end),
                    ),
                    None => self.selection.start(at),
                }
            }
            3 => self.selection.set(
                Anchor::new(at.entry_id, at.fragment, 0),
                Anchor::new(at.entry_id, at.fragment, columns),
            ),
            _ => self.selection.start(at),
        }
    }

    fn on_drag(&mut self, pos: Point) {
        let content = self.content.get();
        if pos.y < content.y {
            self.scroll(ScrollAction::LineUp);
        } else if pos.y >= content.bottom() {
            self.scroll(ScrollAction::LineDown);
        }
        if let Some((at, _)) = self.hit(pos) {
            self.selection.update(at);
        }
    }

    // -- Content ------------------------------------------------------------

    /// Append program output. A scrolled view keeps showing the same rows.
    pub fn new_output(&mut self, text: &str, color: Option<Color>) {
        let added = self.buffer.push(
            EntryKind::Output,
            text,
            color,
            self.metrics.char_width,
            self.wrap_width(),
        );
        self.after_append(added);
    }

    /// Echo a submitted line behind the current prompt
    pub fn new_input(&mut self, line: &str) {
        let mut echoed = self.prompt.prompt_text().to_string();
        echoed.push_str(line);
        let added = self.buffer.push(
            EntryKind::Input,
            &echoed,
            None,
            self.metrics.char_width,
            self.wrap_width(),
        );
        self.after_append(added);
    }

    fn after_append(&mut self, added: usize) {
        if self.scroll_offset > 0 {
            self.scroll_offset += added;
        }
        self.prune_selection();
        self.finder.refresh(&self.buffer);
        self.clamp_scroll();
        self.sync_selection();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scroll_offset = 0;
        self.clear_selection();
        self.finder.refresh(&self.buffer);
        self.update_scrollbar();
    }

    pub fn set_scrollback(&mut self, rows: usize) {
        self.buffer.set_limit(rows);
        self.prune_selection();
        self.finder.refresh(&self.buffer);
        self.clamp_scroll();
        self.sync_selection();
    }

    /// Highlight every occurrence of `needle`; empty clears
    pub fn find(&mut self, needle: &str) {
        let count = self.finder.find(&self.buffer, needle);
        log::debug!("Find {:?} matched {} spans", needle, count);
    }

    // -- Prompt -------------------------------------------------------------

    pub fn set_prompt_text(&mut self, prompt: &str) {
        self.prompt.set_prompt_text(prompt);
        self.pump();
    }

    pub fn set_prompt_input(&mut self, input: &str) {
        self.prompt.set_input(input);
        self.pump();
    }

    /// Stash the prompt input; the stashed line is echoed
    pub fn save_prompt(&mut self) {
        self.prompt.save();
        self.pump();
    }

    pub fn restore_prompt(&mut self) {
        self.prompt.restore();
        self.pump();
    }

    pub fn set_command_history<S: AsRef<str>>(&mut self, entries: &[S]) {
        self.prompt.set_command_history(entries);
        self.pump();
    }

    // -- Layout -------------------------------------------------------------

    /// Lay the pane out in `frame` (window coordinates, scrollbar included)
    pub fn resize(&mut self, frame: Rect) {
        self.layout(frame, false);
    }

    /// Switch to new font metrics; everything is re-wrapped
    pub fn set_metrics(&mut self, metrics: Metrics) {
        if metrics == self.metrics {
            return;
        }
        self.metrics = metrics;
        if self.laid_out {
            self.layout(self.frame, true);
        }
    }

    fn layout(&mut self, frame: Rect, force: bool) {
        let cw = self.metrics.char_width.max(1);
        let lh = self.metrics.line_height.max(1);
        self.frame = frame;

        let old = self.content.get();
        let content = Rect::new(
            frame.x + MARGIN,
            frame.y + MARGIN,
            floor_to((frame.w - SCROLLBAR_WIDTH - 2 * MARGIN).max(0), cw),
            floor_to((frame.h - 2 * MARGIN).max(0), lh),
        );
        self.content.set(content);
        self.scrollbar.resize(Rect::new(
            frame.right() - SCROLLBAR_WIDTH,
            frame.y,
            SCROLLBAR_WIDTH,
            frame.h,
        ));

        if force || !self.laid_out || old.w != content.w {
            self.laid_out = true;
            self.rewrap();
        }
        log::debug!(
            "Output pane laid out: {}x{} cells in {:?}",
            self.columns(),
            self.rows(),
            content
        );
        self.clamp_scroll();
        self.sync_selection();
    }

    fn rewrap(&mut self) {
        let width = self.wrap_width();
        self.buffer.rewrap(self.metrics.char_width, width);
        self.prompt.wrap(self.metrics, width);
        // Fragment indices changed under the anchors
        self.selection.clear();
        self.finder.refresh(&self.buffer);
    }

    // -- Scrolling ----------------------------------------------------------

    fn max_scroll(&self) -> usize {
        self.total_rows().saturating_sub(1)
    }

    pub fn scroll(&mut self, action: ScrollAction) {
        let current = self.scroll_offset as i64;
        let page = self.rows().max(1) as i64;
        let target = match action {
            ScrollAction::LineUp => current + 1,
            ScrollAction::LineDown => current - 1,
            ScrollAction::PageUp => current + page,
            ScrollAction::PageDown => current - page,
            ScrollAction::Lines(n) => current + n as i64,
            ScrollAction::Bottom => 0,
            ScrollAction::To(n) => n as i64,
        };
        self.scroll_offset = target.clamp(0, self.max_scroll() as i64) as usize;
        self.update_scrollbar();
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        self.update_scrollbar();
    }

    fn update_scrollbar(&mut self) {
        self.scrollbar.set_content_size(self.total_rows() as i32);
        self.scrollbar.set_page_size(self.rows());
        self.scrollbar.set_scroll_offset(self.scroll_offset as i32);
    }

    // -- Rows ---------------------------------------------------------------

    /// Entry id and fragment at bottom-relative row `n`
    fn row(&self, n: usize) -> Option<(u64, Option<Color>, EntryKind, &TextFragment)> {
        let prompt_rows = self.prompt.rows();
        if n < prompt_rows {
            let entry = self.prompt.entry();
            return entry
                .fragments()
                .get(prompt_rows - 1 - n)
                .map(|f| (PROMPT_ENTRY_ID, None, entry.kind, f));
        }
        self.buffer
            .row(n - prompt_rows)
            .map(|r| (r.entry.id, r.entry.color, r.entry.kind, r.fragment))
    }

    /// Bottom-relative row of an anchor, if its entry still exists
    fn row_of(&self, anchor: Anchor) -> Option<usize> {
        if anchor.entry_id == PROMPT_ENTRY_ID {
            let rows = self.prompt.rows();
            return (anchor.fragment < rows).then(|| rows - 1 - anchor.fragment);
        }
        let mut below = self.prompt.rows();
        for entry in self.buffer.iter() {
            let rows = entry.rows();
            if entry.id == anchor.entry_id {
                return (anchor.fragment < rows).then(|| below + rows - 1 - anchor.fragment);
            }
            below += rows;
        }
        None
    }

    fn visible_rows(&self) -> Vec<VisibleRow<'_>> {
        let content = self.content.get();
        let lh = self.metrics.line_height;
        let mut rows = Vec::new();
        for i in 0..self.rows().max(0) as usize {
            let Some((entry_id, color, kind, fragment)) = self.row(self.scroll_offset + i) else {
                break;
            };
            rows.push(VisibleRow {
                y: content.bottom() - (i as i32 + 1) * lh,
                entry_id,
                color,
                kind,
                fragment,
            });
        }
        rows
    }

    /// Anchor under a window point. Points above or below the text area
    /// resolve to its first or last row.
    fn hit(&self, pos: Point) -> Option<(Anchor, &TextFragment)> {
        let content = self.content.get();
        let lh = self.metrics.line_height.max(1);
        let cw = self.metrics.char_width.max(1);
        let rows = self.rows().max(1);

        let local = content.to_local(pos);
        let y = local.y.clamp(0, rows * lh - 1);
        let from_top = y / lh;
        let n = (self.scroll_offset + (rows - 1 - from_top) as usize).min(self.max_scroll());
        let (entry_id, _, _, fragment) = self.row(n)?;
        let column = (local.x / cw).clamp(0, self.columns()) as usize;
        Some((Anchor::new(entry_id, fragment.index, column), fragment))
    }

    // -- Selection ----------------------------------------------------------

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.sync_selection();
    }

    /// Drop the selection once either end has been evicted
    fn prune_selection(&mut self) {
        if let Some((top, bottom)) = self.selection.span() {
            if self.row_of(top).is_none() || self.row_of(bottom).is_none() {
                self.selection.clear();
            }
        }
    }

    fn sync_selection(&mut self) {
        let active = self.selection.is_active();
        if active != self.selection_shown {
            self.selection_shown = active;
            self.ui.publish(&UiEvent::SelectionChanged(active));
        }
    }

    /// Pane-local pixel position of an anchor: its column's left edge,
    /// halfway down its row
    fn anchor_point(&self, anchor: Anchor) -> Option<Point> {
        let n = self.row_of(anchor)? as i32;
        let lh = self.metrics.line_height;
        let from_top = self.rows() - 1 - (n - self.scroll_offset as i32);
        Some(Point::new(
            anchor.column as i32 * self.metrics.char_width,
            from_top * lh + lh / 2,
        ))
    }

    /// Highlight rectangles in window coordinates
    pub fn selection_rects(&self) -> Vec<Rect> {
        if !self.selection.is_active() {
            return Vec::new();
        }
        let Some((top, bottom)) = self.selection.span() else {
            return Vec::new();
        };
        let (Some(begin), Some(end)) = (self.anchor_point(top), self.anchor_point(bottom)) else {
            return Vec::new();
        };
        let content = self.content.get();
        compute_rects(
            begin,
            end,
            self.metrics.line_height,
            self.metrics.char_width,
            content.w,
        )
        .into_iter()
        .map(|r| r.offset(content.x, content.y))
        .collect()
    }

    /// Selected text, top to bottom, one line per row
    pub fn selected_text(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for entry in self.buffer.iter().collect::<Vec<_>>().into_iter().rev() {
            lines.extend(self.selection.selected_rows(entry.id, entry.fragments()));
        }
        lines.extend(
            self.selection
                .selected_rows(PROMPT_ENTRY_ID, self.prompt.fragments()),
        );
        lines.join("\n")
    }

    /// Put the selected text on the clipboard
    pub fn copy_selection(&mut self) -> bool {
        let text = self.selected_text();
        if text.is_empty() {
            return false;
        }
        self.clipboard.set_text(&text)
    }

    /// Insert the clipboard text at the prompt cursor
    pub fn paste(&mut self) {
        if let Some(text) = self.clipboard.get_text().into_insertable() {
            self.prompt.insert_at_cursor(&text);
            self.scroll(ScrollAction::Bottom);
        }
    }

    // -- Drawing ------------------------------------------------------------

    pub fn draw(&self, canvas: &mut dyn Canvas, palette: &Palette) {
        let content = self.content.get();
        let cw = self.metrics.char_width;
        let lh = self.metrics.line_height;

        canvas.fill_rect(self.frame, palette.background);
        canvas.set_clip(Some(content));

        let rows = self.visible_rows();
        for row in &rows {
            for m in self.finder.matches_on(row.entry_id, row.fragment.index) {
                canvas.fill_rect(
                    Rect::new(
                        content.x + m.start_col as i32 * cw,
                        row.y,
                        (m.end_col - m.start_col) as i32 * cw,
                        lh,
                    ),
                    palette.find,
                );
            }
        }
        for rect in self.selection_rects() {
            canvas.fill_rect(rect, palette.selection);
        }
        for row in &rows {
            if row.fragment.text.is_empty() {
                continue;
            }
            let color = match (row.color, row.kind) {
                (Some(c), _) => c,
                (None, EntryKind::Input) if row.entry_id != PROMPT_ENTRY_ID => palette.input,
                (None, _) => palette.foreground,
            };
            canvas.draw_text(Point::new(content.x, row.y), &row.fragment.text, color);
        }

        let (fragment, column) = self.prompt.cursor_cell();
        let n = self.prompt.rows().saturating_sub(1 + fragment);
        if n >= self.scroll_offset && n < self.scroll_offset + self.rows().max(0) as usize {
            let y = content.bottom() - (n - self.scroll_offset + 1) as i32 * lh;
            canvas.fill_rect(
                Rect::new(content.x + column as i32 * cw, y, CURSOR_WIDTH, lh),
                palette.cursor,
            );
        }

        canvas.set_clip(None);
        self.scrollbar.draw(canvas, palette.panel, palette.thumb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::clipboard::{ClipboardText, MemoryClipboard};
    use crate::geometry::Size;

    const METRICS: Metrics = Metrics::new(8, 16);
    // 10 columns by 5 rows of text
    const FRAME: Rect = Rect::new(0, 0, 80 + SCROLLBAR_WIDTH + 2 * MARGIN, 80 + 2 * MARGIN);

    struct Fixture {
        pane: OutputPane,
        ui: Rc<RefCell<Vec<UiEvent>>>,
    }

    fn pane() -> Fixture {
        let bus: EventBus<UiEvent> = EventBus::new();
        let ui = Rc::new(RefCell::new(Vec::new()));
        for tag in [UiTag::LineSubmitted, UiTag::SelectionChanged] {
            let seen = ui.clone();
            bus.connect(tag, move |env| {
                if let Some(e) = env.event() {
                    seen.borrow_mut().push(e.clone());
                }
                true
            });
        }
        let mut pane = OutputPane::new("> ", 1000, bus, Box::new(MemoryClipboard::new()));
        pane.set_metrics(METRICS);
        pane.resize(FRAME);
        Fixture { pane, ui }
    }

    /// Top y of the row `n` rows above the bottom, when not scrolled
    fn row_y(n: i32) -> i32 {
        MARGIN + 80 - (n + 1) * 16 + 2
    }

    fn col_x(c: i32) -> i32 {
        MARGIN + c * 8 + 1
    }

    fn press(pane: &mut OutputPane, pos: Point, clicks: u8) {
        pane.handle_event(&BackendEvent::MouseDown {
            pos,
            button: MouseButton::Left,
            clicks,
        });
    }

    fn release(pane: &mut OutputPane, pos: Point) {
        pane.handle_event(&BackendEvent::MouseUp {
            pos,
            button: MouseButton::Left,
        });
    }

    fn drag(pane: &mut OutputPane, from: Point, to: Point) {
        press(pane, from, 1);
        pane.handle_event(&BackendEvent::MouseMove { pos: to });
        release(pane, to);
    }

    fn key(pane: &mut OutputPane, key: Key) {
        pane.handle_event(&BackendEvent::KeyDown {
            key,
            mods: Modifiers::NONE,
        });
    }

    fn canvas() -> RecordingCanvas {
        RecordingCanvas::new(Size::new(FRAME.w, FRAME.h), METRICS)
    }

    #[test]
    fn test_layout() {
        let f = pane();
        assert_eq!(f.pane.columns(), 10);
        assert_eq!(f.pane.rows(), 5);
        assert_eq!(f.pane.content_frame(), Rect::new(4, 4, 80, 80));
    }

    #[test]
    fn test_rows_drawn_from_the_bottom() {
        let mut f = pane();
        f.pane.new_output("one", None);
        f.pane.new_output("two", Some(Color::rgb(1, 2, 3)));
        let mut c = canvas();
        f.pane.draw(&mut c, &Palette::default());
        assert_eq!(c.texts(), vec!["> ", "two", "one"]);
        assert!(c
            .ops
            .contains(&crate::canvas::DrawOp::Text(Point::new(4, 52), "two".into(), Color::rgb(1, 2, 3))));
    }

    #[test]
    fn test_long_output_wraps_to_columns() {
        let mut f = pane();
        f.pane.new_output("abcdefghijklmnop", None);
        assert_eq!(f.pane.buffer().rows(), 2);
        assert_eq!(f.pane.total_rows(), 3);
    }

    #[test]
    fn test_scroll_clamps() {
        let mut f = pane();
        for i in 0..10 {
            f.pane.new_output(&format!("line {}", i), None);
        }
        f.pane.scroll(ScrollAction::PageUp);
        assert_eq!(f.pane.scroll_offset(), 5);
        f.pane.scroll(ScrollAction::Lines(100));
        assert_eq!(f.pane.scroll_offset(), 10);
        f.pane.scroll(ScrollAction::LineDown);
        assert_eq!(f.pane.scroll_offset(), 9);
        f.pane.scroll(ScrollAction::PageDown);
        f.pane.scroll(ScrollAction::PageDown);
        assert_eq!(f.pane.scroll_offset(), 0);
    }

    #[test]
    fn test_scroll_past_drag_range_keeps_thumb_at_top() {
        let mut f = pane();
        for i in 0..10 {
            f.pane.new_output(&format!("line {}", i), None);
        }
        let palette = Palette::default();
        let thumb_top = |pane: &OutputPane| {
            let mut c = canvas();
            pane.draw(&mut c, &palette);
            c.fills_with(palette.thumb).last().map(|r| r.y)
        };

        // 11 rows with a 5 row page: the wheel reaches 10, a drag only 6
        f.pane.scroll(ScrollAction::Lines(100));
        assert_eq!(f.pane.scroll_offset(), 10);
        assert_eq!(thumb_top(&f.pane), Some(1));
        f.pane.scroll(ScrollAction::To(6));
        assert_eq!(thumb_top(&f.pane), Some(1));

        f.pane.scroll(ScrollAction::Bottom);
        let track_x = FRAME.right() - SCROLLBAR_WIDTH / 2;
        press(&mut f.pane, Point::new(track_x, 0), 1);
        assert_eq!(f.pane.scroll_offset(), 6);
        release(&mut f.pane, Point::new(track_x, 0));
    }

    #[test]
    fn test_scrolled_view_stays_on_its_rows() {
        let mut f = pane();
        for i in 0..10 {
            f.pane.new_output(&format!("line {}", i), None);
        }
        f.pane.scroll(ScrollAction::Lines(2));
        f.pane.new_output("more", None);
        assert_eq!(f.pane.scroll_offset(), 3);

        f.pane.scroll(ScrollAction::Bottom);
        f.pane.new_output("again", None);
        assert_eq!(f.pane.scroll_offset(), 0);
    }

    #[test]
    fn test_wheel_and_page_keys() {
        let mut f = pane();
        for i in 0..20 {
            f.pane.new_output(&format!("{}", i), None);
        }
        f.pane.handle_event(&BackendEvent::Wheel { lines: 3 });
        assert_eq!(f.pane.scroll_offset(), 3);
        key(&mut f.pane, Key::PageUp);
        assert_eq!(f.pane.scroll_offset(), 8);
        // Typing goes back to the prompt
        f.pane.handle_event(&BackendEvent::TextInput("x".into()));
        assert_eq!(f.pane.scroll_offset(), 0);
    }

    #[test]
    fn test_scrollback_limit() {
        let mut f = pane();
        f.pane.set_scrollback(3);
        for i in 0..5 {
            f.pane.new_output(&format!("{}", i), None);
        }
        assert_eq!(f.pane.buffer().len(), 3);
        assert_eq!(f.pane.buffer().get(0).map(|e| e.text()), Some("4".into()));
    }

    #[test]
    fn test_submit_echoes_line() {
        let mut f = pane();
        f.pane.handle_event(&BackendEvent::TextInput("ls".into()));
        key(&mut f.pane, Key::Enter);
        assert_eq!(f.pane.buffer().get(0).map(|e| e.text()), Some("> ls".into()));
        assert_eq!(f.pane.buffer().get(0).map(|e| e.kind), Some(EntryKind::Input));
        assert_eq!(f.pane.prompt().input(), "");
        assert_eq!(
            f.ui.borrow().as_slice(),
            &[UiEvent::LineSubmitted("ls".into())]
        );
    }

    #[test]
    fn test_save_prompt_echoes_and_restores() {
        let mut f = pane();
        f.pane.set_prompt_input("abc");
        f.pane.save_prompt();
        assert_eq!(f.pane.buffer().get(0).map(|e| e.text()), Some("> abc".into()));
        assert_eq!(f.pane.prompt().input(), "");
        f.pane.restore_prompt();
        assert_eq!(f.pane.prompt().input(), "abc");
    }

    #[test]
    fn test_drag_selects_and_copies() {
        let mut f = pane();
        f.pane.new_output("alpha", None);
        f.pane.new_output("beta", None);

        let from = Point::new(col_x(1), row_y(2));
        let to = Point::new(col_x(2), row_y(1));
        drag(&mut f.pane, from, to);

        assert!(f.pane.has_selection());
        assert_eq!(f.pane.selected_text(), "lpha\nbe");
        assert!(f.pane.copy_selection());
        assert_eq!(
            f.pane.clipboard_mut().get_text(),
            ClipboardText::Text("lpha\nbe".into())
        );
        assert!(f
            .ui
            .borrow()
            .contains(&UiEvent::SelectionChanged(true)));

        assert_eq!(
            f.pane.selection_rects(),
            vec![Rect::new(12, 36, 72, 16), Rect::new(4, 52, 16, 16)]
        );
    }

    #[test]
    fn test_plain_click_clears_selection() {
        let mut f = pane();
        f.pane.new_output("alpha", None);
        drag(
            &mut f.pane,
            Point::new(col_x(0), row_y(1)),
            Point::new(col_x(3), row_y(1)),
        );
        assert_eq!(f.pane.selected_text(), "alp");

        let p = Point::new(col_x(1), row_y(1));
        press(&mut f.pane, p, 1);
        release(&mut f.pane, p);
        assert!(!f.pane.has_selection());
        assert_eq!(
            f.ui.borrow().last(),
            Some(&UiEvent::SelectionChanged(false))
        );
    }

    #[test]
    fn test_double_and_triple_click() {
        let mut f = pane();
        f.pane.new_output("foo bar", None);
        let p = Point::new(col_x(5), row_y(1));

        press(&mut f.pane, p, 2);
        release(&mut f.pane, p);
        assert_eq!(f.pane.selected_text(), "bar");

        press(&mut f.pane, p, 3);
        release(&mut f.pane, p);
        assert_eq!(f.pane.selected_text(), "foo bar");
    }

    #[test]
    fn test_motion_ignored_without_press() {
        let mut f = pane();
        f.pane.new_output("alpha", None);
        assert!(!f.pane.handle_event(&BackendEvent::MouseMove {
            pos: Point::new(col_x(3), row_y(1))
        }));
        assert!(!f.pane.has_selection());
        assert!(!f.pane.input_bus().is_attached(&f.pane.motion));
    }

    #[test]
    fn test_drag_past_top_autoscrolls() {
        let mut f = pane();
        for i in 0..10 {
            f.pane.new_output(&format!("line {}", i), None);
        }
        press(&mut f.pane, Point::new(col_x(0), row_y(1)), 1);
        f.pane.handle_event(&BackendEvent::MouseMove {
            pos: Point::new(col_x(0), -5),
        });
        f.pane.handle_event(&BackendEvent::MouseMove {
            pos: Point::new(col_x(0), -5),
        });
        assert_eq!(f.pane.scroll_offset(), 2);
        release(&mut f.pane, Point::new(col_x(0), -5));
        assert!(f.pane.has_selection());
        // From line 9 up to the top visible row at offset 2
        assert_eq!(
            f.pane.selected_text(),
            "line 4\nline 5\nline 6\nline 7\nline 8"
        );
    }

    #[test]
    fn test_selection_follows_scroll() {
        let mut f = pane();
        f.pane.new_output("alpha", None);
        f.pane.new_output("beta", None);
        drag(
            &mut f.pane,
            Point::new(col_x(0), row_y(2)),
            Point::new(col_x(2), row_y(2)),
        );
        assert_eq!(f.pane.selection_rects(), vec![Rect::new(4, 36, 16, 16)]);
        f.pane.scroll(ScrollAction::LineUp);
        assert_eq!(f.pane.selection_rects(), vec![Rect::new(4, 52, 16, 16)]);
        f.pane.new_output("gamma", None);
        assert_eq!(f.pane.selected_text(), "al");
    }

    #[test]
    fn test_eviction_clears_selection() {
        let mut f = pane();
        f.pane.set_scrollback(2);
        f.pane.new_output("alpha", None);
        drag(
            &mut f.pane,
            Point::new(col_x(0), row_y(1)),
            Point::new(col_x(2), row_y(1)),
        );
        assert!(f.pane.has_selection());
        f.pane.new_output("b", None);
        f.pane.new_output("c", None);
        assert!(!f.pane.has_selection());
    }

    #[test]
    fn test_ctrl_c_copies_or_interrupts() {
        let mut f = pane();
        let ctrl = Modifiers {
            ctrl: true,
            logo: true,
            ..Modifiers::NONE
        };
        f.pane.new_output("alpha", None);
        f.pane.set_prompt_input("run");
        drag(
            &mut f.pane,
            Point::new(col_x(0), row_y(1)),
            Point::new(col_x(2), row_y(1)),
        );
        f.pane.handle_event(&BackendEvent::KeyDown {
            key: Key::Char('c'),
            mods: ctrl,
        });
        assert_eq!(
            f.pane.clipboard_mut().get_text(),
            ClipboardText::Text("al".into())
        );
        assert_eq!(f.pane.prompt().input(), "run");

        f.pane.clear_selection();
        f.pane.handle_event(&BackendEvent::KeyDown {
            key: Key::Char('c'),
            mods: ctrl,
        });
        assert_eq!(f.pane.prompt().input(), "");
        assert_eq!(f.pane.buffer().get(0).map(|e| e.text()), Some("> run^C".into()));
    }

    #[test]
    fn test_paste_into_prompt() {
        let mut f = pane();
        f.pane.clipboard_mut().set_text("pasted");
        f.pane.paste();
        assert_eq!(f.pane.prompt().input(), "pasted");
    }

    #[test]
    fn test_paste_unreadable_inserts_placeholder() {
        let mut clip = MemoryClipboard::new();
        clip.set_unreadable();
        let mut pane = OutputPane::new("> ", 100, EventBus::new(), Box::new(clip));
        pane.resize(FRAME);
        pane.paste();
        assert_eq!(pane.prompt().input(), "?u8?");
    }

    #[test]
    fn test_find_highlights_matches() {
        let mut f = pane();
        f.pane.new_output("alpha", None);
        f.pane.new_output("beta", None);
        let palette = Palette::default();

        f.pane.ui.publish(&UiEvent::Find("ta".into()));
        f.pane.pump();
        let mut c = canvas();
        f.pane.draw(&mut c, &palette);
        assert_eq!(c.fills_with(palette.find), vec![Rect::new(20, 52, 16, 16)]);

        f.pane.find("");
        let mut c = canvas();
        f.pane.draw(&mut c, &palette);
        assert!(c.fills_with(palette.find).is_empty());
    }

    #[test]
    fn test_cursor_drawn_after_prompt() {
        let mut f = pane();
        f.pane.set_prompt_input("ab");
        let palette = Palette::default();
        let mut c = canvas();
        f.pane.draw(&mut c, &palette);
        assert_eq!(
            c.fills_with(palette.cursor),
            vec![Rect::new(4 + 4 * 8, 68, CURSOR_WIDTH, 16)]
        );
    }

    #[test]
    fn test_resize_rewraps_and_clears_selection() {
        let mut f = pane();
        f.pane.new_output("abcdefghijklmnop", None);
        drag(
            &mut f.pane,
            Point::new(col_x(0), row_y(1)),
            Point::new(col_x(2), row_y(1)),
        );
        assert!(f.pane.has_selection());

        f.pane.resize(Rect::new(0, 0, 200 + SCROLLBAR_WIDTH + 2 * MARGIN, FRAME.h));
        assert_eq!(f.pane.columns(), 25);
        assert_eq!(f.pane.buffer().rows(), 1);
        assert!(!f.pane.has_selection());
    }

    #[test]
    fn test_font_change_rewraps() {
        let mut f = pane();
        f.pane.new_output("abcdefgh", None);
        assert_eq!(f.pane.buffer().rows(), 1);
        f.pane.set_metrics(Metrics::new(16, 32));
        assert_eq!(f.pane.columns(), 5);
        assert_eq!(f.pane.rows(), 2);
        assert_eq!(f.pane.buffer().rows(), 2);
    }

    #[test]
    fn test_clear() {
        let mut f = pane();
        for i in 0..10 {
            f.pane.new_output(&format!("{}", i), None);
        }
        f.pane.scroll(ScrollAction::PageUp);
        f.pane.clear();
        assert!(f.pane.buffer().is_empty());
        assert_eq!(f.pane.scroll_offset(), 0);
        assert_eq!(f.pane.total_rows(), 1);
    }

    #[test]
    fn test_output_before_layout_keeps_lines_whole() {
        let mut pane = OutputPane::new("> ", 100, EventBus::new(), Box::new(MemoryClipboard::new()));
        pane.new_output("a line longer than any viewport", None);
        assert_eq!(pane.buffer().rows(), 1);
        pane.resize(FRAME);
        assert_eq!(pane.buffer().rows(), 4);
    }
}
