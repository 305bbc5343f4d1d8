//! Vertical scrollbar for the output pane
//!
//! Sizes are in rows. Offset 0 is the newest content, drawn with the thumb
//! at the bottom of the track; the maximum offset puts it at the top. While
//! the thumb is dragged the scrollbar publishes `ValueChanged` on its bus
//! with the new offset (`i32`) as payload.

use std::any::Any;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::event::{BackendEvent, EventKind, MouseButton};
use crate::event_bus::EventBus;
use crate::geometry::{Point, Rect};

/// Width of the scrollbar in pixels
pub const SCROLLBAR_WIDTH: i32 = 16;
/// Thumb never gets shorter than this, unless the track is
pub const MIN_THUMB_HEIGHT: i32 = 30;

#[derive(Debug)]
pub struct Scrollbar {
    frame: Rect,
    content: i32,
    page: i32,
    offset: i32,
    /// Pointer distance from the thumb center while dragging
    grab: Option<i32>,
    bus: EventBus<BackendEvent>,
}

impl Default for Scrollbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Scrollbar {
    pub fn new() -> Self {
        Self {
            frame: Rect::default(),
            content: 0,
            page: 0,
            offset: 0,
            grab: None,
            bus: EventBus::new(),
        }
    }

    /// Bus carrying `ValueChanged` notifications
    pub fn bus(&self) -> &EventBus<BackendEvent> {
        &self.bus
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn resize(&mut self, frame: Rect) {
        self.frame = frame;
    }

    pub fn set_content_size(&mut self, rows: i32) {
        self.content = rows.max(0);
    }

    pub fn set_page_size(&mut self, rows: i32) {
        self.page = rows.max(0);
    }

    pub fn set_scroll_offset(&mut self, offset: i32) {
        self.offset = offset.max(0);
    }

    pub fn scroll_offset(&self) -> i32 {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    fn max_offset(&self) -> i32 {
        (self.content - self.page).max(0)
    }

    pub fn thumb_height(&self) -> i32 {
        let track = self.frame.h.max(0);
        if self.content <= 0 {
            return track;
        }
        let h = (track as f64 * self.page as f64 / self.content as f64).round() as i32;
        h.max(MIN_THUMB_HEIGHT).min(track)
    }

    /// Thumb rectangle in window coordinates
    pub fn thumb_rect(&self) -> Rect {
        let h = self.thumb_height();
        let travel = (self.frame.h - h).max(0);
        let max = self.max_offset();
        let from_bottom = if max > 0 {
            (travel as f64 * self.offset.min(max) as f64 / max as f64).round() as i32
        } else {
            0
        };
        Rect::new(self.frame.x, self.frame.y + travel - from_bottom, self.frame.w, h)
    }

    /// Map a thumb center y to an offset and publish it
    fn drag_to(&mut self, center_y: i32) {
        let h = self.thumb_height();
        let travel = self.frame.h - h;
        let max = self.max_offset();
        let offset = if travel <= 0 || max == 0 {
            0
        } else {
            let top = center_y - h / 2 - self.frame.y;
            let ratio = (top as f64 / travel as f64).clamp(0.0, 1.0);
            (((1.0 - ratio) * max as f64).round() as i32).clamp(0, max)
        };

        self.offset = offset;
        self.bus
            .publish_internal(EventKind::ValueChanged, Some(&offset as &dyn Any));
    }

    /// Route a window event; returns true when the scrollbar consumed it
    pub fn handle_event(&mut self, event: &BackendEvent) -> bool {
        match event {
            BackendEvent::MouseDown {
                pos,
                button: MouseButton::Left,
                ..
            } if self.frame.contains(*pos) => {
                let thumb = self.thumb_rect();
                let center = thumb.y + thumb.h / 2;
                // Grabbing the thumb keeps it under the pointer; clicking the
                // track jumps the thumb center to the pointer
                let grab = if thumb.contains(*pos) { pos.y - center } else { 0 };
                self.grab = Some(grab);
                self.drag_to(pos.y - grab);
                true
            }
            BackendEvent::MouseMove { pos } => match self.grab {
                Some(grab) => {
                    self.drag_to(pos.y - grab);
                    true
                }
                None => false,
            },
            BackendEvent::MouseUp {
                button: MouseButton::Left,
                ..
            } => self.grab.take().is_some(),
            _ => false,
        }
    }

    pub fn hit(&self, p: Point) -> bool {
        self.frame.contains(p)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, track: Color, thumb: Color) {
        canvas.fill_rect(self.frame, track);
        let rect = self.thumb_rect().inset(1);
        canvas.fill_rect(rect, thumb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn bar(content: i32, page: i32) -> Scrollbar {
        let mut sb = Scrollbar::new();
        sb.resize(Rect::new(100, 0, SCROLLBAR_WIDTH, 200));
        sb.set_content_size(content);
        sb.set_page_size(page);
        sb
    }

    #[test]
    fn test_thumb_height() {
        assert_eq!(bar(0, 10).thumb_height(), 200);
        assert_eq!(bar(100, 50).thumb_height(), 100);
        // Clamped to the minimum
        assert_eq!(bar(1000, 10).thumb_height(), MIN_THUMB_HEIGHT);
        // Never taller than the track
        assert_eq!(bar(5, 50).thumb_height(), 200);
    }

    #[test]
    fn test_thumb_height_rounds_then_clamps() {
        // round(200 * 10 / 100) = 20, raised to the 30px minimum
        assert_eq!(bar(100, 10).thumb_height(), 30);
        // round(200 * 10 / 60) = 33, above the minimum
        assert_eq!(bar(60, 10).thumb_height(), 33);
        // round(200 * 10 / 3) = 667, cut down to the track
        assert_eq!(bar(3, 10).thumb_height(), 200);

        let mut short = bar(100, 10);
        short.resize(Rect::new(0, 0, SCROLLBAR_WIDTH, 20));
        assert_eq!(short.thumb_height(), 20);
        assert_eq!(short.thumb_rect(), Rect::new(0, 0, SCROLLBAR_WIDTH, 20));
    }

    #[test]
    fn test_offset_beyond_drag_range_pins_thumb_to_top() {
        let mut sb = bar(100, 10);
        sb.set_scroll_offset(90);
        assert_eq!(sb.thumb_rect().y, 0);
        sb.set_scroll_offset(99);
        assert_eq!(sb.scroll_offset(), 99);
        assert_eq!(sb.thumb_rect().y, 0);
    }

    #[test]
    fn test_thumb_position_follows_offset() {
        let mut sb = bar(100, 50);
        assert_eq!(sb.thumb_rect(), Rect::new(100, 100, SCROLLBAR_WIDTH, 100));
        sb.set_scroll_offset(50);
        assert_eq!(sb.thumb_rect().y, 0);
        sb.set_scroll_offset(25);
        assert_eq!(sb.thumb_rect().y, 50);
    }

    #[test]
    fn test_drag_publishes_offsets() {
        let mut sb = bar(100, 50);
        let seen = Rc::new(Cell::new(-1));
        let s = seen.clone();
        sb.bus().connect(EventKind::ValueChanged, move |env| {
            if let Some(v) = env.payload::<i32>() {
                s.set(*v);
            }
            true
        });

        // Grab the thumb at its center (bottom half of the track)
        assert!(sb.handle_event(&BackendEvent::MouseDown {
            pos: Point::new(105, 150),
            button: MouseButton::Left,
            clicks: 1,
        }));
        assert_eq!(seen.get(), 0);

        // Drag to the top
        assert!(sb.handle_event(&BackendEvent::MouseMove {
            pos: Point::new(105, 10)
        }));
        assert_eq!(seen.get(), 50);
        assert_eq!(sb.scroll_offset(), 50);

        // Halfway
        sb.handle_event(&BackendEvent::MouseMove {
            pos: Point::new(105, 100),
        });
        assert_eq!(seen.get(), 25);

        assert!(sb.handle_event(&BackendEvent::MouseUp {
            pos: Point::new(105, 100),
            button: MouseButton::Left,
        }));
        assert!(!sb.handle_event(&BackendEvent::MouseMove {
            pos: Point::new(105, 180)
        }));
        assert_eq!(seen.get(), 25);
    }

    #[test]
    fn test_press_outside_is_ignored() {
        let mut sb = bar(100, 50);
        assert!(!sb.handle_event(&BackendEvent::MouseDown {
            pos: Point::new(10, 10),
            button: MouseButton::Left,
            clicks: 1,
        }));
        assert!(!sb.is_dragging());
    }

    #[test]
    fn test_content_smaller_than_page_stays_at_zero() {
        let mut sb = bar(10, 50);
        sb.handle_event(&BackendEvent::MouseDown {
            pos: Point::new(105, 5),
            button: MouseButton::Left,
            clicks: 1,
        });
        assert_eq!(sb.scroll_offset(), 0);
    }
}
