//! Selection
//!
//! Turns two pixel positions in the output pane into the highlight
//! rectangles covering the text between them. Rectangles snap to row and
//! cell boundaries so that the highlight always covers whole cells.
//!
//! The selection itself is stored as text anchors; the pane maps them to
//! pixels against the current layout whenever it draws.

use crate::geometry::{ceil_to, floor_to, Point, Rect};
use crate::wrap::TextFragment;

/// Highlight rectangles between two points.
///
/// The earlier point (by row, then column) is the top. A selection inside
/// one row gives one rectangle; otherwise a first-row rectangle to the right
/// edge, an optional block of full rows, and a last-row rectangle from the
/// left edge.
pub fn compute_rects(
    begin: Point,
    end: Point,
    row_height: i32,
    cell_width: i32,
    viewport_width: i32,
) -> Vec<Rect> {
    let (top, bottom) = if (begin.y, begin.x) <= (end.y, end.x) {
        (begin, end)
    } else {
        (end, begin)
    };

    let top_y = floor_to(top.y, row_height);
    let mut bottom_y = ceil_to(bottom.y, row_height);
    if bottom_y == top_y {
        // A point on a row boundary still selects the row it starts
        bottom_y = top_y + row_height.max(1);
    }

    if bottom_y - top_y <= row_height {
        let left = floor_to(top.x.min(bottom.x), cell_width);
        let right = ceil_to(top.x.max(bottom.x), cell_width);
        return vec![Rect::new(left, top_y, right - left, bottom_y - top_y)];
    }

    let rows = if row_height > 0 {
        (bottom_y - top_y) / row_height
    } else {
        1
    };
    let mut rects = Vec::with_capacity(3);

    let first_x = floor_to(top.x, cell_width);
    rects.push(Rect::new(
        first_x,
        top_y,
        (viewport_width - first_x).max(0),
        row_height,
    ));

    if rows > 2 {
        rects.push(Rect::new(
            0,
            top_y + row_height,
            viewport_width,
            (rows - 2) * row_height,
        ));
    }

    let last_y = bottom_y - row_height;
    rects.push(Rect::new(
        0,
        last_y,
        ceil_to(bottom.x, cell_width).max(0),
        row_height,
    ));

    rects
}

/// A selection endpoint anchored to text rather than pixels, so it stays on
/// the same characters while the pane scrolls
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Anchor {
    /// Entry id; newer entries have larger ids
    pub entry_id: u64,
    /// Fragment index within the entry, top row first
    pub fragment: usize,
    /// Column within the fragment's displayed text
    pub column: usize,
}

impl Anchor {
    pub const fn new(entry_id: u64, fragment: usize, column: usize) -> Self {
        Self {
            entry_id,
            fragment,
            column,
        }
    }
}

/// Text selection state
#[derive(Debug, Clone, Default)]
pub struct TextSelection {
    begin: Option<Anchor>,
    end: Option<Anchor>,
}

impl TextSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new selection at the given anchor
    pub fn start(&mut self, at: Anchor) {
        self.begin = Some(at);
        self.end = Some(at);
    }

    /// Move the free end of the selection
    pub fn update(&mut self, at: Anchor) {
        if self.begin.is_some() {
            self.end = Some(at);
        }
    }

    /// Select an explicit span (double/triple click)
    pub fn set(&mut self, begin: Anchor, end: Anchor) {
        self.begin = Some(begin);
        self.end = Some(end);
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.begin = None;
        self.end = None;
    }

    /// Check if there is a non-empty selection
    pub fn is_active(&self) -> bool {
        matches!((self.begin, self.end), (Some(b), Some(e)) if b != e)
    }

    /// Ordered (top, bottom) anchors
    pub fn span(&self) -> Option<(Anchor, Anchor)> {
        let (b, e) = (self.begin?, self.end?);
        Some((b.min(e), b.max(e)))
    }

    /// Whether an anchor refers to `entry_id`
    pub fn touches(&self, entry_id: u64) -> bool {
        [self.begin, self.end]
            .into_iter()
            .flatten()
            .any(|a| a.entry_id == entry_id)
    }

    /// The selected part of each row of `entry`, top row first.
    ///
    /// `fragments` are the entry's rows. Rows outside the selection are
    /// skipped, as are rows where the selected column range is empty.
    pub fn selected_rows<'a>(
        &self,
        entry_id: u64,
        fragments: &'a [TextFragment],
    ) -> Vec<&'a str> {
        let Some((top, bottom)) = self.span().filter(|_| self.is_active()) else {
            return Vec::new();
        };
        if entry_id < top.entry_id || entry_id > bottom.entry_id {
            return Vec::new();
        }

        let mut rows = Vec::new();
        for frag in fragments {
            let pos = (entry_id, frag.index);
            if pos < (top.entry_id, top.fragment) || pos > (bottom.entry_id, bottom.fragment) {
                continue;
            }

            let len = frag.len();
            let mut from = 0;
            let mut to = len;
            if pos == (top.entry_id, top.fragment) {
                from = top.column.min(len);
            }
            if pos == (bottom.entry_id, bottom.fragment) {
                to = bottom.column.min(len);
            }
            if from >= to {
                continue;
            }
            rows.push(column_slice(&frag.text, from, to));
        }
        rows
    }
}

/// Byte slice of `text` covering codepoint columns `[from, to)`
pub fn column_slice(text: &str, from: usize, to: usize) -> &str {
    let mut indices = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
    let start = indices.clone().nth(from).unwrap_or(text.len());
    let end = indices.nth(to).unwrap_or(text.len());
    &text[start..end.max(start)]
}
