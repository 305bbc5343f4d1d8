//! Toolbar above the output pane
//!
//! Buttons publish an internal `Clicked` event with their `ToolbarAction`
//! as payload on the toolbar's bus. The find field sits to the right of the
//! buttons and publishes `UiEvent::Find` whenever its text changes.

use std::any::Any;

use crate::canvas::Canvas;
use crate::color::{named, Color};
use crate::event::{BackendEvent, EventKind, Key, MouseButton, UiEvent};
use crate::event_bus::EventBus;
use crate::font::Metrics;
use crate::geometry::{Point, Rect, Size};

const SPACING: i32 = 4;
const HOT: Color = Color::rgb(0, 128, 128);
const FIND_COLUMNS: i32 = 24;
const FIND_LABEL: &str = "Find: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Copy,
    Paste,
    Find,
    ZoomIn,
    ZoomOut,
}

impl ToolbarAction {
    pub fn label(self) -> &'static str {
        match self {
            ToolbarAction::Copy => "Copy",
            ToolbarAction::Paste => "Paste",
            ToolbarAction::Find => "Find",
            ToolbarAction::ZoomIn => "A+",
            ToolbarAction::ZoomOut => "A-",
        }
    }
}

#[derive(Debug)]
pub struct Button {
    action: ToolbarAction,
    frame: Rect,
    depressed: bool,
    hovered: bool,
    enabled: bool,
    bus: EventBus<BackendEvent>,
}

impl Button {
    pub fn new(action: ToolbarAction, bus: EventBus<BackendEvent>) -> Self {
        Self {
            action,
            frame: Rect::default(),
            depressed: false,
            hovered: false,
            enabled: true,
            bus,
        }
    }

    pub fn action(&self) -> ToolbarAction {
        self.action
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.depressed = false;
        }
    }

    /// Label plus one cell of padding on each side, two rows tall
    pub fn preferred_size(&self, metrics: Metrics) -> Size {
        let label = metrics.size_text(self.action.label());
        Size::new(label.w + 2 * metrics.char_width, label.h * 2)
    }

    /// Returns true when the event was inside the button or completed a click
    pub fn handle_event(&mut self, event: &BackendEvent) -> bool {
        match event {
            BackendEvent::MouseMove { pos } => {
                self.hovered = self.frame.contains(*pos);
                false
            }
            BackendEvent::MouseDown {
                pos,
                button: MouseButton::Left,
                ..
            } if self.frame.contains(*pos) => {
                if self.enabled {
                    self.depressed = true;
                }
                true
            }
            BackendEvent::MouseUp {
                pos,
                button: MouseButton::Left,
            } if self.depressed => {
                self.depressed = false;
                if self.frame.contains(*pos) {
                    log::debug!("Toolbar button {:?} clicked", self.action);
                    self.bus
                        .publish_internal(EventKind::Clicked, Some(&self.action as &dyn Any));
                }
                true
            }
            _ => false,
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, foreground: Color, background: Color) {
        let text = canvas.size_text(self.action.label());
        let fill = if self.enabled && (self.hovered || self.depressed) {
            HOT
        } else {
            background
        };
        canvas.fill_rect(self.frame, fill);
        canvas.outline_rect(self.frame, named::DARK_GRAY);

        let label = if self.enabled {
            foreground
        } else {
            named::DARK_GRAY
        };
        canvas.draw_text(
            Point::new(
                self.frame.x + (self.frame.w - text.w) / 2,
                self.frame.y + (self.frame.h - text.h) / 2,
            ),
            self.action.label(),
            label,
        );
    }
}

/// Single-line text field for the find needle
#[derive(Debug, Default)]
struct FindField {
    frame: Rect,
    active: bool,
    text: String,
}

#[derive(Debug)]
pub struct Toolbar {
    frame: Rect,
    buttons: Vec<Button>,
    find: FindField,
    bus: EventBus<BackendEvent>,
    ui: EventBus<UiEvent>,
}

impl Toolbar {
    pub fn new(ui: EventBus<UiEvent>) -> Self {
        let bus = EventBus::new();
        let buttons = [
            ToolbarAction::Copy,
            ToolbarAction::Paste,
            ToolbarAction::Find,
            ToolbarAction::ZoomIn,
            ToolbarAction::ZoomOut,
        ]
        .into_iter()
        .map(|action| Button::new(action, bus.clone()))
        .collect();

        let mut toolbar = Self {
            frame: Rect::default(),
            buttons,
            find: FindField::default(),
            bus,
            ui,
        };
        // Nothing to copy until something is selected
        toolbar.set_enabled(ToolbarAction::Copy, false);
        toolbar
    }

    /// Bus carrying the buttons' `Clicked` events
    pub fn bus(&self) -> &EventBus<BackendEvent> {
        &self.bus
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    pub fn height(metrics: Metrics) -> i32 {
        metrics.line_height * 2
    }

    pub fn button(&self, action: ToolbarAction) -> Option<&Button> {
        self.buttons.iter().find(|b| b.action == action)
    }

    pub fn set_enabled(&mut self, action: ToolbarAction, enabled: bool) {
        if let Some(b) = self.buttons.iter_mut().find(|b| b.action == action) {
            b.set_enabled(enabled);
        }
    }

    /// Lay the buttons out left to right inside `frame`
    pub fn layout(&mut self, frame: Rect, metrics: Metrics) {
        self.frame = frame;
        let mut x = frame.x + SPACING;
        for button in &mut self.buttons {
            let size = button.preferred_size(metrics);
            button.set_frame(Rect::new(x, frame.y, size.w, size.h.min(frame.h)));
            x += size.w + SPACING;
        }
        let width = (FIND_COLUMNS * metrics.char_width).min((frame.right() - x - SPACING).max(0));
        self.find.frame = Rect::new(x, frame.y, width, frame.h);
    }

    pub fn is_finding(&self) -> bool {
        self.find.active
    }

    pub fn find_text(&self) -> &str {
        &self.find.text
    }

    /// Show or hide the find field. Hiding it clears the highlight.
    pub fn toggle_find(&mut self) {
        self.find.active = !self.find.active;
        if !self.find.active {
            self.set_find_text(String::new());
        }
    }

    fn set_find_text(&mut self, text: String) {
        if text != self.find.text {
            self.find.text = text;
            self.ui.publish(&UiEvent::Find(self.find.text.clone()));
        }
    }

    /// Keyboard input for the find field while it is shown
    fn handle_find_event(&mut self, event: &BackendEvent) -> bool {
        match event {
            BackendEvent::TextInput(s) => {
                let mut text = self.find.text.clone();
                text.push_str(s);
                self.set_find_text(text);
                true
            }
            BackendEvent::KeyDown {
                key: Key::Backspace,
                ..
            } => {
                let mut text = self.find.text.clone();
                text.pop();
                self.set_find_text(text);
                true
            }
            BackendEvent::KeyDown {
                key: Key::Escape, ..
            } => {
                self.toggle_find();
                true
            }
            // The field has no cursor of its own; keep these away from the prompt
            BackendEvent::KeyDown {
                key: Key::Enter | Key::Left | Key::Right | Key::Home | Key::End,
                ..
            } => true,
            _ => false,
        }
    }

    /// Route an event to the buttons and the find field
    pub fn handle_event(&mut self, event: &BackendEvent) -> bool {
        if self.find.active && self.handle_find_event(event) {
            return true;
        }
        let mut handled = false;
        for button in &mut self.buttons {
            handled |= button.handle_event(event);
        }
        handled
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, foreground: Color, background: Color) {
        canvas.fill_rect(self.frame, background);
        for button in &self.buttons {
            button.draw(canvas, foreground, background);
        }
        if self.find.active && !self.find.frame.is_empty() {
            let metrics = canvas.metrics();
            canvas.outline_rect(self.find.frame, foreground);
            let mut shown = String::from(FIND_LABEL);
            shown.push_str(&self.find.text);
            let columns = (self.find.frame.w / metrics.char_width.max(1) - 1).max(0) as usize;
            let skip = shown.chars().count().saturating_sub(columns);
            let visible: String = shown.chars().skip(skip).collect();
            canvas.draw_text(
                Point::new(
                    self.find.frame.x + metrics.char_width / 2,
                    self.find.frame.y + metrics.line_height / 2,
                ),
                &visible,
                foreground,
            );
        }
    }
}
