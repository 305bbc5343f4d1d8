//! Word wrapping into fixed-width rows
//!
//! Text is split into fragments, one per displayed row. A fragment never
//! needs more than `viewport_width` pixels at `cell_width` pixels per
//! codepoint. Breaks prefer the last space or tab in the row; a row with no
//! whitespace is hard-broken.
//!
//! Fragments keep enough bookkeeping (`span_end`, `terminator`) that the
//! source can be rebuilt exactly, which selection and find rely on.

use crate::text::{is_newline, is_whitespace, slice_string};

/// One displayed row of a wrapped string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    /// Displayed text (`source[start..end]`)
    pub text: String,
    /// Row number within the source, counting from 0 at the top
    pub index: usize,
    /// First codepoint of the row in the source
    pub start: usize,
    /// One past the last displayed codepoint
    pub end: usize,
    /// One past the last codepoint consumed by this row, including
    /// whitespace dropped at a soft break
    pub span_end: usize,
    /// The newline that closed this row, if any
    pub terminator: Option<char>,
}

impl TextFragment {
    /// Number of displayed codepoints
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

struct Builder<'a> {
    chars: &'a [char],
    fragments: Vec<TextFragment>,
}

impl<'a> Builder<'a> {
    fn emit(&mut self, start: usize, end: usize, span_end: usize, terminator: Option<char>) {
        let index = self.fragments.len();
        self.fragments.push(TextFragment {
            text: slice_string(self.chars, start, end),
            index,
            start,
            end,
            span_end,
            terminator,
        });
    }

    fn absorb_terminator(&mut self, at: usize, c: char) -> bool {
        match self.fragments.last_mut() {
            Some(last) if last.terminator.is_none() && last.span_end == at => {
                last.terminator = Some(c);
                true
            }
            _ => false,
        }
    }
}

/// Split `text` into rows that fit `viewport_width` pixels.
///
/// A non-positive cell width or a viewport narrower than one cell puts
/// every codepoint on its own row.
pub fn wrap(text: &str, cell_width: i32, viewport_width: i32) -> Vec<TextFragment> {
    let chars: Vec<char> = text.chars().collect();
    wrap_chars(&chars, cell_width, viewport_width)
}

pub fn wrap_chars(chars: &[char], cell_width: i32, viewport_width: i32) -> Vec<TextFragment> {
    let mut b = Builder {
        chars,
        fragments: Vec::new(),
    };
    let degenerate = cell_width <= 0 || viewport_width < cell_width;

    let mut start = 0usize;
    let mut last_ws: Option<usize> = None;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];

        if is_newline(c) {
            // A newline right after a width break ends that row instead of
            // opening an empty one
            if start != i || !b.absorb_terminator(i, c) {
                b.emit(start, i, i, Some(c));
            }
            start = i + 1;
            last_ws = None;
            i += 1;
            continue;
        }

        if degenerate {
            b.emit(i, i + 1, i + 1, None);
            start = i + 1;
            i += 1;
            continue;
        }

        if is_whitespace(c) {
            last_ws = Some(i);
        }

        let columns = (i - start + 1) as i64;
        if columns * cell_width as i64 >= viewport_width as i64 {
            match last_ws {
                Some(ws) if ws > start => {
                    b.emit(start, ws, ws + 1, None);
                    start = ws + 1;
                    last_ws = None;
                }
                _ => {
                    b.emit(start, i + 1, i + 1, None);
                    start = i + 1;
                    last_ws = None;
                }
            }
        }

        i += 1;
    }

    if start < chars.len() {
        b.emit(start, chars.len(), chars.len(), None);
    }

    b.fragments
}

/// Number of rows `text` occupies; at least 1
pub fn row_count(fragments: &[TextFragment]) -> usize {
    fragments.len().max(1)
}

/// Rebuild the source text from its fragments
pub fn reassemble(source: &[char], fragments: &[TextFragment]) -> String {
    let mut out = String::new();
    for f in fragments {
        out.extend(&source[f.start..f.span_end]);
        if let Some(t) = f.terminator {
            out.push(t);
        }
    }
    out
}
