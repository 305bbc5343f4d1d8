//! Mochi Console Library
//!
//! An embeddable interactive console window drawn entirely by the crate:
//! a scrolling output pane, a line editor with history, mouse selection,
//! find, copy and paste. This crate provides:
//!
//! - `console`: lifecycle state machine and the thread-safe `ConsoleHandle`
//! - `output_pane`, `prompt`, `scrollbar`, `toolbar`: the widgets
//! - `wrap`, `scrollback`, `selection`, `finder`: text layout and state
//! - `event_bus`, `task_queue`, `line_pipe`: plumbing between widgets and threads
//! - `window`, `renderer`, `font`: winit window, softbuffer frames, fontdue glyphs

pub mod canvas;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod console;
pub mod error;
pub mod event;
pub mod event_bus;
pub mod finder;
pub mod font;
pub mod geometry;
pub mod line_pipe;
pub mod output_pane;
pub mod prompt;
pub mod renderer;
pub mod scrollback;
pub mod scrollbar;
pub mod selection;
pub mod task_queue;
pub mod text;
pub mod toolbar;
pub mod window;
pub mod wrap;

pub use color::Color;
pub use config::{CliArgs, Config};
pub use console::{Console, ConsoleHandle, ConsoleState};
pub use error::{ConsoleError, Result};
pub use event::BackendEvent;
