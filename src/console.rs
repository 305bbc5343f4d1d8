//! Console lifecycle and the thread-safe API
//!
//! `Console` lives on the render thread: it owns the event loop, the window
//! and the widget tree, and is deliberately `!Send`. `ConsoleHandle` is the
//! cloneable, `Send + Sync` side that any thread may use. Handles never touch
//! widgets; they queue a `Command` that the render thread applies on its
//! next `update()`, and they read submitted lines from the line pipe.
//!
//! State machine:
//!
//! ```text
//! Inactive --init ok--> Active --shutdown--> Shutdown
//! Inactive --init err-> Shutdown
//! Shutdown --destroy + reset--> Inactive
//! ```

use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread;
use std::time::Duration;

use winit::event::Event;
use winit::event_loop::{EventLoop, EventLoopBuilder};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};

use crate::clipboard::SystemClipboard;
use crate::color::Color;
use crate::config::Config;
use crate::error::{ConsoleError, Result};
use crate::event::{BackendEvent, UiEvent, UiTag};
use crate::line_pipe::LinePipe;
use crate::task_queue::TaskQueue;
use crate::text::decode_utf8;
use crate::window::{ConsoleUi, MainWindow};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConsoleState {
    Inactive = 0,
    Active = 1,
    Shutdown = 2,
}

impl ConsoleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConsoleState::Inactive,
            1 => ConsoleState::Active,
            _ => ConsoleState::Shutdown,
        }
    }
}

/// Work queued by any thread and applied on the render thread
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    WriteLine { text: String, color: Option<Color> },
    Clear,
    SetPrompt(String),
    SetScrollback(usize),
    SetPromptInput(String),
    SavePrompt,
    RestorePrompt,
    SetCommandHistory(Vec<String>),
    ShowWindow,
    HideWindow,
}

/// Channels shared between the render thread and the handles for one
/// init/destroy cycle
#[derive(Debug, Default)]
struct Session {
    commands: TaskQueue<Command>,
    lines: LinePipe,
}

#[derive(Debug)]
struct Core {
    state: AtomicU8,
    prompt: Mutex<String>,
    columns: AtomicI32,
    rows: AtomicI32,
    session: Mutex<Weak<Session>>,
}

impl Core {
    fn new(prompt: &str) -> Self {
        Self {
            state: AtomicU8::new(ConsoleState::Inactive as u8),
            prompt: Mutex::new(prompt.to_string()),
            columns: AtomicI32::new(-1),
            rows: AtomicI32::new(-1),
            session: Mutex::new(Weak::new()),
        }
    }

    fn state(&self) -> ConsoleState {
        ConsoleState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ConsoleState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn lock_session(&self) -> MutexGuard<'_, Weak<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_prompt(&self) -> MutexGuard<'_, String> {
        self.prompt
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The live session, unless the console has shut down
    fn session(&self) -> Option<Arc<Session>> {
        if self.state() == ConsoleState::Shutdown {
            return None;
        }
        self.lock_session().upgrade()
    }

    fn shutdown(&self) {
        let previous = self
            .state
            .swap(ConsoleState::Shutdown as u8, Ordering::AcqRel);
        if previous != ConsoleState::Shutdown as u8 {
            log::info!("Console shutting down");
        }
        // Wake every reader blocked in get_line
        if let Some(session) = self.lock_session().upgrade() {
            session.lines.shutdown();
        }
    }

    fn set_grid(&self, columns: i32, rows: i32) {
        self.columns.store(columns, Ordering::Release);
        self.rows.store(rows, Ordering::Release);
    }
}

/// Thread-safe access to a console
#[derive(Debug, Clone)]
pub struct ConsoleHandle {
    core: Arc<Core>,
}

impl ConsoleHandle {
    pub fn state(&self) -> ConsoleState {
        self.core.state()
    }

    fn send(&self, command: Command) -> bool {
        match self.core.session() {
            Some(session) => {
                session.commands.push(command);
                true
            }
            None => false,
        }
    }

    /// Queue a line of output. Returns false once the console has shut down.
    pub fn write_line(&self, text: &str, color: Option<Color>) -> bool {
        self.send(Command::WriteLine {
            text: text.to_string(),
            color,
        })
    }

    /// Queue raw output bytes; invalid UTF-8 shows up as `?u8?`
    pub fn write_bytes(&self, bytes: &[u8], color: Option<Color>) -> bool {
        self.write_line(&decode_utf8(bytes), color)
    }

    /// Block until the user submits a line. `None` once the console shuts
    /// down, including for calls made after shutdown.
    pub fn get_line(&self) -> Option<String> {
        let session = self.core.session()?;
        session.lines.wait_get()
    }

    /// Like `get_line`, writing into `out`. Returns the line's length in
    /// bytes, or -1 on shutdown.
    pub fn get_line_into(&self, out: &mut String) -> i32 {
        out.clear();
        match self.get_line() {
            Some(line) => {
                out.push_str(&line);
                i32::try_from(out.len()).unwrap_or(i32::MAX)
            }
            None => -1,
        }
    }

    /// Request shutdown from any thread
    pub fn shutdown(&self) {
        self.core.shutdown();
    }

    pub fn show_window(&self) {
        self.send(Command::ShowWindow);
    }

    pub fn hide_window(&self) {
        self.send(Command::HideWindow);
    }

    pub fn clear(&self) {
        self.send(Command::Clear);
    }

    pub fn set_prompt(&self, prompt: &str) {
        if self.send(Command::SetPrompt(prompt.to_string())) {
            *self.core.lock_prompt() = prompt.to_string();
        }
    }

    pub fn get_prompt(&self) -> String {
        self.core.lock_prompt().clone()
    }

    pub fn set_scrollback(&self, rows: usize) {
        self.send(Command::SetScrollback(rows));
    }

    /// Columns of text that fit in the pane, -1 before the first layout
    pub fn get_columns(&self) -> i32 {
        self.core.columns.load(Ordering::Acquire)
    }

    /// Rows of text that fit in the pane, -1 before the first layout
    pub fn get_rows(&self) -> i32 {
        self.core.rows.load(Ordering::Acquire)
    }

    /// Replace the text being edited at the prompt
    pub fn set_prompt_input(&self, input: &str) {
        self.send(Command::SetPromptInput(input.to_string()));
    }

    pub fn save_prompt(&self) {
        self.send(Command::SavePrompt);
    }

    pub fn restore_prompt(&self) {
        self.send(Command::RestorePrompt);
    }

    /// Seed the prompt history, oldest first
    pub fn set_command_history<S: AsRef<str>>(&self, entries: &[S]) {
        let entries = entries.iter().map(|e| e.as_ref().to_string()).collect();
        self.send(Command::SetCommandHistory(entries));
    }
}

/// The console on its render thread
pub struct Console {
    core: Arc<Core>,
    config: Config,
    session: Option<Arc<Session>>,
    // Dropped before the event loop it was created on
    window: Option<MainWindow>,
    event_loop: Option<EventLoop<()>>,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("state", &self.state())
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl Console {
    pub fn new(config: Config) -> Self {
        let core = Arc::new(Core::new(&config.prompt));
        let mut console = Self {
            core,
            config,
            session: None,
            window: None,
            event_loop: None,
        };
        console.open_session();
        console
    }

    fn open_session(&mut self) {
        let session = Arc::new(Session::default());
        *self.core.lock_session() = Arc::downgrade(&session);
        self.session = Some(session);
    }

    pub fn handle(&self) -> ConsoleHandle {
        ConsoleHandle {
            core: self.core.clone(),
        }
    }

    pub fn state(&self) -> ConsoleState {
        self.core.state()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn window(&self) -> Option<&MainWindow> {
        self.window.as_ref()
    }

    /// Create the window and widgets. On failure everything acquired so far
    /// is released and the console is left in `Shutdown`.
    pub fn init(&mut self) -> Result<()> {
        if self.state() != ConsoleState::Inactive {
            return Err(ConsoleError::NotActive);
        }

        match self.create_window() {
            Ok(window) => {
                self.window = Some(window);
                self.publish_grid();
                self.core.set_state(ConsoleState::Active);
                log::info!("Console initialized");
                Ok(())
            }
            Err(e) => {
                log::error!("Console init failed: {}", e);
                self.core.shutdown();
                self.release();
                Err(e)
            }
        }
    }

    fn create_window(&mut self) -> Result<MainWindow> {
        let event_loop = match self.event_loop.take() {
            Some(event_loop) => event_loop,
            None => build_event_loop()?,
        };
        let window = MainWindow::new(
            &event_loop,
            &self.config,
            Box::new(SystemClipboard::new()),
        );
        // Only one event loop may exist per process; keep it for reuse
        self.event_loop = Some(event_loop);
        let window = window?;

        if let Some(session) = &self.session {
            connect_line_pipe(window.ui(), Arc::downgrade(session));
        }
        Ok(window)
    }

    /// One frame: pump window events, apply queued commands, render
    pub fn update(&mut self) {
        if self.state() != ConsoleState::Active {
            return;
        }

        let mut events = Vec::new();
        if let Some(event_loop) = self.event_loop.as_mut() {
            let status = event_loop.pump_events(Some(Duration::ZERO), |event, _| {
                if let Event::WindowEvent { event, .. } = event {
                    events.push(event);
                }
            });
            if let PumpStatus::Exit(code) = status {
                log::info!("Event loop exited with code {}", code);
                self.core.shutdown();
            }
        }

        let Some(window) = self.window.as_mut() else {
            return;
        };
        for event in &events {
            let translated = window.handle_window_event(event);
            if translated.contains(&BackendEvent::CloseRequested) {
                self.core.shutdown();
            }
        }

        if let Some(session) = &self.session {
            session.commands.drain_and_run(|command| match command {
                Command::ShowWindow => window.set_visible(true),
                Command::HideWindow => window.set_visible(false),
                command => apply_command(window.ui_mut(), command),
            });
        }

        let (columns, rows) = (window.ui().pane().columns(), window.ui().pane().rows());
        self.core.set_grid(columns, rows);

        if let Err(e) = window.render() {
            log::warn!("Render error: {:?}", e);
        }
    }

    /// Feed an already translated backend event to the widgets
    pub fn handle_backend_event(&mut self, event: &BackendEvent) -> bool {
        if *event == BackendEvent::CloseRequested {
            self.core.shutdown();
            return true;
        }
        let Some(window) = self.window.as_mut() else {
            return false;
        };
        let handled = window.handle_event(event);
        self.publish_grid();
        handled
    }

    fn publish_grid(&self) {
        if let Some(window) = &self.window {
            let pane = window.ui().pane();
            if pane.is_laid_out() {
                self.core.set_grid(pane.columns(), pane.rows());
            }
        }
    }

    /// Shut down, wait for other threads to let go of the session, then
    /// free the widgets and the window. Returns false if already released.
    pub fn destroy(&mut self) -> bool {
        if self.session.is_none() && self.window.is_none() {
            return false;
        }
        self.core.shutdown();
        self.release();
        log::info!("Console destroyed");
        true
    }

    fn release(&mut self) {
        if let Some(session) = self.session.take() {
            let weak = Arc::downgrade(&session);
            drop(session);
            while weak.strong_count() > 0 {
                thread::sleep(Duration::from_millis(1));
            }
        }
        // Widgets and glyphs, then the surface, then the window
        self.window = None;
        self.core.set_grid(-1, -1);
    }

    /// Make a destroyed console usable again. Returns false unless the
    /// console was shut down and released.
    pub fn reset(&mut self) -> bool {
        if self.state() != ConsoleState::Shutdown || self.session.is_some() {
            return false;
        }
        *self.core.lock_prompt() = self.config.prompt.clone();
        self.open_session();
        self.core.set_state(ConsoleState::Inactive);
        log::debug!("Console reset");
        true
    }

    pub fn write_line(&self, text: &str, color: Option<Color>) -> bool {
        self.handle().write_line(text, color)
    }

    pub fn write_bytes(&self, bytes: &[u8], color: Option<Color>) -> bool {
        self.handle().write_bytes(bytes, color)
    }

    pub fn shutdown(&self) {
        self.core.shutdown();
    }

    pub fn show_window(&self) {
        self.handle().show_window();
    }

    pub fn hide_window(&self) {
        self.handle().hide_window();
    }

    pub fn clear(&self) {
        self.handle().clear();
    }

    pub fn set_prompt(&self, prompt: &str) {
        self.handle().set_prompt(prompt);
    }

    pub fn get_prompt(&self) -> String {
        self.handle().get_prompt()
    }

    pub fn set_scrollback(&self, rows: usize) {
        self.handle().set_scrollback(rows);
    }

    pub fn get_columns(&self) -> i32 {
        self.handle().get_columns()
    }

    pub fn get_rows(&self) -> i32 {
        self.handle().get_rows()
    }

    pub fn set_prompt_input(&self, input: &str) {
        self.handle().set_prompt_input(input);
    }

    pub fn save_prompt(&self) {
        self.handle().save_prompt();
    }

    pub fn restore_prompt(&self) {
        self.handle().restore_prompt();
    }

    pub fn set_command_history<S: AsRef<str>>(&self, entries: &[S]) {
        self.handle().set_command_history(entries);
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn build_event_loop() -> Result<EventLoop<()>> {
    #[allow(unused_mut)]
    let mut builder = EventLoopBuilder::new();
    // The render thread is whichever thread owns the console
    #[cfg(all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))))]
    {
        use winit::platform::x11::EventLoopBuilderExtX11;
        builder.with_any_thread(true);
    }
    #[cfg(windows)]
    {
        use winit::platform::windows::EventLoopBuilderExtWindows;
        builder.with_any_thread(true);
    }
    Ok(builder.build()?)
}

/// Forward every submitted line, empty ones included, to `get_line` readers
fn connect_line_pipe(ui: &ConsoleUi, session: Weak<Session>) {
    ui.ui_bus()
        .connect(UiTag::LineSubmitted, move |env| match env.event() {
            Some(UiEvent::LineSubmitted(line)) => {
                if let Some(session) = session.upgrade() {
                    session.lines.push(line.clone());
                }
                false
            }
            _ => false,
        });
}

/// Apply a queued command to the widgets
fn apply_command(ui: &mut ConsoleUi, command: Command) {
    let pane = ui.pane_mut();
    match command {
        Command::WriteLine { text, color } => pane.new_output(&text, color),
        Command::Clear => pane.clear(),
        Command::SetPrompt(prompt) => pane.set_prompt_text(&prompt),
        Command::SetScrollback(rows) => pane.set_scrollback(rows),
        Command::SetPromptInput(input) => pane.set_prompt_input(&input),
        Command::SavePrompt => pane.save_prompt(),
        Command::RestorePrompt => pane.restore_prompt(),
        Command::SetCommandHistory(entries) => pane.set_command_history(&entries),
        Command::ShowWindow | Command::HideWindow => {
            log::trace!("Window visibility change without a window")
        }
    }
}
