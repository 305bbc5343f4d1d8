//! Drawing surface used by the widgets
//!
//! Widgets draw through this trait rather than touching pixels, so the
//! same layout code renders into the softbuffer frame and into a
//! `RecordingCanvas` in tests.

use crate::color::Color;
use crate::font::Metrics;
use crate::geometry::{Point, Rect, Size};

pub trait Canvas {
    /// Size of the drawable area in pixels
    fn size(&self) -> Size;

    /// Cell metrics of the font `draw_text` uses
    fn metrics(&self) -> Metrics;

    /// Extent of `text` drawn with `draw_text`
    fn size_text(&self, text: &str) -> Size {
        self.metrics().size_text(text)
    }

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn outline_rect(&mut self, rect: Rect, color: Color);

    /// Draw one row of text with its top-left corner at `origin`
    fn draw_text(&mut self, origin: Point, text: &str, color: Color);

    /// Restrict drawing to `clip`; `None` lifts the restriction
    fn set_clip(&mut self, clip: Option<Rect>);
}

/// A recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill(Rect, Color),
    Outline(Rect, Color),
    Text(Point, String, Color),
    Clip(Option<Rect>),
}

/// Canvas that records calls instead of drawing
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: Size,
    metrics: Metrics,
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(size: Size, metrics: Metrics) -> Self {
        Self {
            size,
            metrics,
            ops: Vec::new(),
        }
    }

    /// Every text run drawn, in order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(_, text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every rectangle filled with `color`
    pub fn fills_with(&self, color: Color) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill(rect, c) if *c == color => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> Size {
        self.size
    }

    fn metrics(&self) -> Metrics {
        self.metrics
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::Fill(rect, color));
    }

    fn outline_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::Outline(rect, color));
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        self.ops.push(DrawOp::Text(origin, text.to_string(), color));
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.ops.push(DrawOp::Clip(clip));
    }
}
