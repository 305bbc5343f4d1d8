//! Events flowing through the console
//!
//! `BackendEvent` is what the windowing backend delivers (already translated
//! out of winit types so widgets can be driven headlessly). `UiEvent` is what
//! widgets announce to each other.

use std::time::{Duration, Instant};

use crate::event_bus::Event;
use crate::font::Metrics;
use crate::geometry::{Point, Size};

/// Keys the console reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    /// A printable key, used together with modifiers (Ctrl+C and friends)
    Char(char),
    Other,
}

/// Keyboard modifier state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub logo: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        logo: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        logo: false,
    };

    /// Ctrl on Linux/Windows, Cmd on macOS
    pub fn command(&self) -> bool {
        if cfg!(target_os = "macos") {
            self.logo
        } else {
            self.ctrl
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other,
}

/// Input delivered by the graphics backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    KeyDown { key: Key, mods: Modifiers },
    TextInput(String),
    MouseDown {
        pos: Point,
        button: MouseButton,
        clicks: u8,
    },
    MouseUp { pos: Point, button: MouseButton },
    MouseMove { pos: Point },
    /// Positive scrolls towards older output
    Wheel { lines: i32 },
    Resized(Size),
    Focused(bool),
    Occluded(bool),
    CloseRequested,
}

/// Subscription tag for backend and widget-internal events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    TextInput,
    MouseDown,
    MouseUp,
    MouseMove,
    Wheel,
    Resized,
    Focused,
    Occluded,
    CloseRequested,
    /// A button was activated
    Clicked,
    /// A widget's value changed (scrollbar offset, edit text)
    ValueChanged,
}

impl Event for BackendEvent {
    type Tag = EventKind;

    fn tag(&self) -> EventKind {
        match self {
            BackendEvent::KeyDown { .. } => EventKind::KeyDown,
            BackendEvent::TextInput(_) => EventKind::TextInput,
            BackendEvent::MouseDown { .. } => EventKind::MouseDown,
            BackendEvent::MouseUp { .. } => EventKind::MouseUp,
            BackendEvent::MouseMove { .. } => EventKind::MouseMove,
            BackendEvent::Wheel { .. } => EventKind::Wheel,
            BackendEvent::Resized(_) => EventKind::Resized,
            BackendEvent::Focused(_) => EventKind::Focused,
            BackendEvent::Occluded(_) => EventKind::Occluded,
            BackendEvent::CloseRequested => EventKind::CloseRequested,
        }
    }
}

/// Notifications published by widgets
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The prompt submitted a line (possibly empty)
    LineSubmitted(String),
    /// The prompt stashed its input (Ctrl-C or `save_prompt`)
    InputSaved(String),
    /// Selection became non-empty or was cleared
    SelectionChanged(bool),
    /// Font size changed and layout must be rebuilt
    FontSizeChanged(Metrics),
    /// Find text changed
    Find(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiTag {
    LineSubmitted,
    InputSaved,
    SelectionChanged,
    FontSizeChanged,
    Find,
}

impl Event for UiEvent {
    type Tag = UiTag;

    fn tag(&self) -> UiTag {
        match self {
            UiEvent::LineSubmitted(_) => UiTag::LineSubmitted,
            UiEvent::InputSaved(_) => UiTag::InputSaved,
            UiEvent::SelectionChanged(_) => UiTag::SelectionChanged,
            UiEvent::FontSizeChanged(_) => UiTag::FontSizeChanged,
            UiEvent::Find(_) => UiTag::Find,
        }
    }
}

/// Counts consecutive clicks at one spot for double/triple click selection
#[derive(Debug)]
pub struct ClickTracker {
    last_time: Option<Instant>,
    last_pos: Point,
    count: u8,
    threshold: Duration,
    slop: i32,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self {
            last_time: None,
            last_pos: Point::default(),
            count: 0,
            threshold: Duration::from_millis(500),
            slop: 4,
        }
    }
}

impl ClickTracker {
    /// Register a press and return its click count (1, 2 or 3, then wraps to 1)
    pub fn press(&mut self, pos: Point, now: Instant) -> u8 {
        let near = (pos.x - self.last_pos.x).abs() <= self.slop
            && (pos.y - self.last_pos.y).abs() <= self.slop;
        let quick = self
            .last_time
            .is_some_and(|t| now.duration_since(t) < self.threshold);

        self.count = if near && quick {
            (self.count % 3) + 1
        } else {
            1
        };
        self.last_time = Some(now);
        self.last_pos = pos;
        self.count
    }
}

/// Frame pacing for the render pass
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Target frame rate while the window is visible
    pub shown_fps: u32,
    /// Target frame rate while minimized or occluded
    pub minimized_fps: u32,
    last_render: Option<Instant>,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            shown_fps: 20,
            minimized_fps: 1,
            last_render: None,
        }
    }
}

impl FrameTiming {
    pub fn new(shown_fps: u32, minimized_fps: u32) -> Self {
        Self {
            shown_fps,
            minimized_fps,
            last_render: None,
        }
    }

    /// Get frame duration
    pub fn frame_duration(&self, minimized: bool) -> Duration {
        let fps = if minimized {
            self.minimized_fps
        } else {
            self.shown_fps
        };
        Duration::from_secs_f64(1.0 / fps.max(1) as f64)
    }

    /// Whether enough time has passed since the last rendered frame
    pub fn should_render(&mut self, now: Instant, minimized: bool) -> bool {
        let due = match self.last_render {
            None => true,
            Some(last) => now.duration_since(last) >= self.frame_duration(minimized),
        };
        if due {
            self.last_render = Some(now);
        }
        due
    }
}
