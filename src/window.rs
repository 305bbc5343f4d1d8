//! Console main window
//!
//! `ConsoleUi` is the widget tree (toolbar on top, output pane below) and
//! knows nothing about winit, so it can be driven headlessly. `MainWindow`
//! owns the winit window, the softbuffer renderer and the font, translates
//! winit events into `BackendEvent`s and paces rendering.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoopWindowTarget;
use winit::keyboard::{Key as WinitKey, ModifiersState, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::canvas::Canvas;
use crate::clipboard::Clipboard;
use crate::color::Palette;
use crate::config::Config;
use crate::error::Result;
use crate::event::{
    BackendEvent, ClickTracker, EventKind, FrameTiming, Key, Modifiers, MouseButton, UiEvent,
    UiTag,
};
use crate::event_bus::EventBus;
use crate::font::{FontProvider, Metrics};
use crate::geometry::{Point, Rect, Size};
use crate::output_pane::OutputPane;
use crate::renderer::Renderer;
use crate::toolbar::{Toolbar, ToolbarAction};

/// Toolbar and output pane, laid out top to bottom
#[derive(Debug)]
pub struct ConsoleUi {
    ui: EventBus<UiEvent>,
    toolbar: Toolbar,
    pane: OutputPane,
    metrics: Metrics,
    size: Size,
    /// Toolbar clicks waiting to be applied
    actions: Rc<RefCell<Vec<ToolbarAction>>>,
    /// Last `SelectionChanged` seen, until the Copy button picks it up
    selection: Rc<Cell<Option<bool>>>,
    clipboard_available: bool,
    zoom: i32,
    focused: bool,
    minimized: bool,
}

impl ConsoleUi {
    pub fn new(prompt: &str, scrollback: usize, clipboard: Box<dyn Clipboard>) -> Self {
        let ui = EventBus::new();
        let mut toolbar = Toolbar::new(ui.clone());
        let clipboard_available = clipboard.is_available();
        if !clipboard_available {
            log::warn!("No clipboard; Copy and Paste are disabled");
            toolbar.set_enabled(ToolbarAction::Paste, false);
        }
        let pane = OutputPane::new(prompt, scrollback, ui.clone(), clipboard);

        let actions = Rc::new(RefCell::new(Vec::new()));
        let queued = actions.clone();
        toolbar
            .bus()
            .connect(EventKind::Clicked, move |env| match env.payload::<ToolbarAction>() {
                Some(action) => {
                    queued.borrow_mut().push(*action);
                    true
                }
                None => false,
            });

        let selection = Rc::new(Cell::new(None));
        let seen = selection.clone();
        ui.connect(UiTag::SelectionChanged, move |env| match env.event() {
            Some(UiEvent::SelectionChanged(active)) => {
                seen.set(Some(*active));
                false
            }
            _ => false,
        });

        Self {
            ui,
            toolbar,
            pane,
            metrics: Metrics::default(),
            size: Size::default(),
            actions,
            selection,
            clipboard_available,
            zoom: 0,
            focused: true,
            minimized: false,
        }
    }

    /// Bus carrying `UiEvent`s between the widgets
    pub fn ui_bus(&self) -> &EventBus<UiEvent> {
        &self.ui
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn pane(&self) -> &OutputPane {
        &self.pane
    }

    pub fn pane_mut(&mut self) -> &mut OutputPane {
        &mut self.pane
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Net zoom steps requested since the last call (positive is larger)
    pub fn take_zoom(&mut self) -> i32 {
        std::mem::take(&mut self.zoom)
    }

    /// Place the toolbar across the top and give the pane the rest
    pub fn layout(&mut self, size: Size) {
        if size.w <= 0 || size.h <= 0 {
            return;
        }
        self.size = size;
        let toolbar_h = Toolbar::height(self.metrics).min(size.h);
        self.toolbar
            .layout(Rect::new(0, 0, size.w, toolbar_h), self.metrics);
        self.pane.resize(Rect::new(
            0,
            toolbar_h,
            size.w,
            (size.h - toolbar_h).max(0),
        ));
        log::debug!(
            "Layout {}x{}: {} columns, {} rows",
            size.w,
            size.h,
            self.pane.columns(),
            self.pane.rows()
        );
    }

    /// New cell metrics: announce them and lay everything out again
    pub fn set_metrics(&mut self, metrics: Metrics) {
        self.metrics = metrics;
        self.pane.set_metrics(metrics);
        self.layout(self.size);
        self.ui.publish(&UiEvent::FontSizeChanged(metrics));
        self.pane.pump();
    }

    /// Route one backend event; returns true when a widget consumed it
    pub fn handle_event(&mut self, event: &BackendEvent) -> bool {
        let handled = match event {
            BackendEvent::Resized(size) => {
                self.minimized = size.w <= 0 || size.h <= 0;
                if !self.minimized {
                    self.layout(*size);
                }
                true
            }
            BackendEvent::Focused(focused) => {
                self.focused = *focused;
                true
            }
            BackendEvent::Occluded(occluded) => {
                self.minimized = *occluded;
                true
            }
            BackendEvent::CloseRequested => false,
            BackendEvent::KeyDown {
                key: Key::Char(c),
                mods,
            } if mods.command() && matches!(c, '=' | '+' | '-') => {
                self.zoom += if *c == '-' { -1 } else { 1 };
                true
            }
            _ => {
                let mut handled = self.toolbar.handle_event(event);
                if !handled {
                    handled = self.pane.handle_event(event);
                }
                handled
            }
        };

        self.pane.pump();
        self.apply_actions();
        handled
    }

    fn apply_actions(&mut self) {
        let actions: Vec<ToolbarAction> = self.actions.borrow_mut().drain(..).collect();
        for action in actions {
            match action {
                ToolbarAction::Copy => {
                    self.pane.copy_selection();
                }
                ToolbarAction::Paste => self.pane.paste(),
                ToolbarAction::Find => self.toolbar.toggle_find(),
                ToolbarAction::ZoomIn => self.zoom += 1,
                ToolbarAction::ZoomOut => self.zoom -= 1,
            }
            self.pane.pump();
        }

        if let Some(active) = self.selection.take() {
            self.toolbar
                .set_enabled(ToolbarAction::Copy, active && self.clipboard_available);
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, palette: &Palette) {
        self.toolbar
            .draw(canvas, palette.foreground, palette.panel);
        self.pane.draw(canvas, palette);
    }
}

/// Translates winit window events into `BackendEvent`s
#[derive(Debug, Default)]
pub struct InputTranslator {
    cursor: Point,
    modifiers: Modifiers,
    clicks: ClickTracker,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Vec<BackendEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return Vec::new();
                }
                let mods = self.modifiers;
                let mut out = vec![BackendEvent::KeyDown {
                    key: map_key(&event.logical_key),
                    mods,
                }];
                if let Some(text) = &event.text {
                    if is_insertable(text, mods) {
                        out.push(BackendEvent::TextInput(text.to_string()));
                    }
                }
                out
            }
            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = map_modifiers(m.state());
                Vec::new()
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Point::new(position.x as i32, position.y as i32);
                vec![BackendEvent::MouseMove { pos: self.cursor }]
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_button(*button);
                match state {
                    ElementState::Pressed => {
                        let clicks = if button == MouseButton::Left {
                            self.clicks.press(self.cursor, Instant::now())
                        } else {
                            1
                        };
                        vec![BackendEvent::MouseDown {
                            pos: self.cursor,
                            button,
                            clicks,
                        }]
                    }
                    ElementState::Released => vec![BackendEvent::MouseUp {
                        pos: self.cursor,
                        button,
                    }],
                }
            }
            WindowEvent::MouseWheel { delta, .. } => match wheel_lines(delta) {
                0 => Vec::new(),
                lines => vec![BackendEvent::Wheel { lines }],
            },
            WindowEvent::Resized(size) => vec![BackendEvent::Resized(physical_size(*size))],
            WindowEvent::Focused(focused) => vec![BackendEvent::Focused(*focused)],
            WindowEvent::Occluded(occluded) => vec![BackendEvent::Occluded(*occluded)],
            WindowEvent::CloseRequested => vec![BackendEvent::CloseRequested],
            _ => Vec::new(),
        }
    }
}

fn physical_size(size: PhysicalSize<u32>) -> Size {
    Size::new(size.width as i32, size.height as i32)
}

fn map_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        logo: state.super_key(),
    }
}

fn map_key(key: &WinitKey) -> Key {
    match key {
        WinitKey::Named(named) => map_named_key(*named),
        WinitKey::Character(s) => s.chars().next().map(Key::Char).unwrap_or(Key::Other),
        _ => Key::Other,
    }
}

fn map_named_key(key: NamedKey) -> Key {
    match key {
        NamedKey::Enter => Key::Enter,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Delete => Key::Delete,
        NamedKey::Tab => Key::Tab,
        NamedKey::Escape => Key::Escape,
        NamedKey::ArrowLeft => Key::Left,
        NamedKey::ArrowRight => Key::Right,
        NamedKey::ArrowUp => Key::Up,
        NamedKey::ArrowDown => Key::Down,
        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,
        NamedKey::Space => Key::Char(' '),
        _ => Key::Other,
    }
}

fn map_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Right => MouseButton::Right,
        _ => MouseButton::Other,
    }
}

/// Rows to scroll for a wheel delta, positive towards older output
fn wheel_lines(delta: &MouseScrollDelta) -> i32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y.round() as i32,
        MouseScrollDelta::PixelDelta(pos) => (pos.y / 20.0) as i32,
    }
}

/// Typed text is inserted unless a shortcut modifier is held
fn is_insertable(text: &str, mods: Modifiers) -> bool {
    !text.is_empty() && !mods.ctrl && !mods.logo && !text.chars().any(char::is_control)
}

/// The console window and everything drawn into it
pub struct MainWindow {
    // Field order is drop order: widgets and glyphs go before the
    // surface, the surface before the window it was created for.
    ui: ConsoleUi,
    font: FontProvider,
    renderer: Renderer,
    window: Rc<Window>,
    input: InputTranslator,
    timing: FrameTiming,
    palette: Palette,
}

impl std::fmt::Debug for MainWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainWindow")
            .field("ui", &self.ui)
            .field("font", &self.font)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl MainWindow {
    /// Create the window, its renderer and font, and lay out the widgets
    pub fn new(
        target: &EventLoopWindowTarget<()>,
        config: &Config,
        clipboard: Box<dyn Clipboard>,
    ) -> Result<Self> {
        let mut builder = WindowBuilder::new()
            .with_title(&config.window.title)
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));
        if let (Some(x), Some(y)) = (config.window.x, config.window.y) {
            builder = builder.with_position(LogicalPosition::new(x, y));
        }
        let window = Rc::new(builder.build(target)?);

        let mut font = FontProvider::open(
            config.font.path.as_deref(),
            config.font.size,
            config.font.line_spacing,
        )?;
        font.set_scale(window.scale_factor() as f32);
        let renderer = Renderer::new(window.clone())?;

        let mut ui = ConsoleUi::new(&config.prompt, config.scrollback, clipboard);
        ui.set_metrics(font.metrics());
        ui.layout(physical_size(window.inner_size()));

        log::info!(
            "Window created: {} columns x {} rows, cell {:?}",
            ui.pane().columns(),
            ui.pane().rows(),
            font.metrics()
        );

        Ok(Self {
            ui,
            font,
            renderer,
            window,
            input: InputTranslator::new(),
            timing: FrameTiming::new(config.window.fps, config.window.minimized_fps),
            palette: config.effective_colors().palette(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn ui(&self) -> &ConsoleUi {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut ConsoleUi {
        &mut self.ui
    }

    pub fn set_visible(&self, visible: bool) {
        self.window.set_visible(visible);
    }

    /// Feed one winit event through the widgets. Returns the translated
    /// events so the caller can react to `CloseRequested`.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Vec<BackendEvent> {
        if let WindowEvent::ScaleFactorChanged { scale_factor, .. } = event {
            let metrics = self.font.set_scale(*scale_factor as f32);
            self.ui.set_metrics(metrics);
        }
        let events = self.input.translate(event);
        for event in &events {
            self.handle_event(event);
        }
        events
    }

    /// Route a backend event, applying zoom requests and resizes
    pub fn handle_event(&mut self, event: &BackendEvent) -> bool {
        if let BackendEvent::Resized(size) = event {
            if size.w > 0 && size.h > 0 {
                self.renderer.resize(size.w as u32, size.h as u32);
            }
        }
        let handled = self.ui.handle_event(event);
        self.apply_zoom();
        handled
    }

    fn apply_zoom(&mut self) {
        let steps = self.ui.take_zoom();
        if steps == 0 {
            return;
        }
        let old = self.font.size();
        for _ in 0..steps.unsigned_abs() {
            if steps > 0 {
                self.font.increase();
            } else {
                self.font.decrease();
            }
        }
        if (self.font.size() - old).abs() > f32::EPSILON {
            log::info!("Font size changed: {} -> {}", old, self.font.size());
            self.ui.set_metrics(self.font.metrics());
        }
    }

    /// Draw a frame if the frame limiter allows one
    pub fn render(&mut self) -> Result<()> {
        if !self.timing.should_render(Instant::now(), self.ui.is_minimized()) {
            return Ok(());
        }
        let ui = &self.ui;
        let palette = self.palette;
        self.renderer
            .render(&mut self.font, palette.background, |frame| {
                ui.draw(frame, &palette)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardText, MemoryClipboard};
    use winit::dpi::PhysicalPosition;

    const METRICS: Metrics = Metrics::new(8, 16);

    /// 200x200 window: toolbar 32 px tall, pane content at (4, 36) with
    /// 22 columns and 10 rows
    fn ui_with(clipboard: MemoryClipboard) -> ConsoleUi {
        let mut ui = ConsoleUi::new("> ", 1000, Box::new(clipboard));
        ui.set_metrics(METRICS);
        ui.handle_event(&BackendEvent::Resized(Size::new(200, 200)));
        ui
    }

    fn ui() -> ConsoleUi {
        ui_with(MemoryClipboard::new())
    }

    fn click(ui: &mut ConsoleUi, pos: Point) {
        ui.handle_event(&BackendEvent::MouseDown {
            pos,
            button: MouseButton::Left,
            clicks: 1,
        });
        ui.handle_event(&BackendEvent::MouseUp {
            pos,
            button: MouseButton::Left,
        });
    }

    fn center(ui: &ConsoleUi, action: ToolbarAction) -> Point {
        let frame = ui.toolbar().button(action).map(|b| b.frame()).unwrap_or_default();
        Point::new(frame.x + frame.w / 2, frame.y + frame.h / 2)
    }

    #[test]
    fn test_layout_stacks_toolbar_over_pane() {
        let ui = ui();
        assert_eq!(ui.toolbar().frame(), Rect::new(0, 0, 200, 32));
        assert_eq!(ui.pane().content_frame(), Rect::new(4, 36, 176, 160));
        assert_eq!(ui.pane().columns(), 22);
        assert_eq!(ui.pane().rows(), 10);
    }

    #[test]
    fn test_zero_size_means_minimized() {
        let mut ui = ui();
        ui.handle_event(&BackendEvent::Resized(Size::new(0, 0)));
        assert!(ui.is_minimized());
        assert_eq!(ui.pane().columns(), 22);

        ui.handle_event(&BackendEvent::Resized(Size::new(200, 200)));
        assert!(!ui.is_minimized());
        ui.handle_event(&BackendEvent::Occluded(true));
        assert!(ui.is_minimized());
        ui.handle_event(&BackendEvent::Focused(false));
        assert!(!ui.is_focused());
    }

    #[test]
    fn test_typing_reaches_prompt() {
        let mut ui = ui();
        ui.handle_event(&BackendEvent::TextInput("ls".to_string()));
        assert_eq!(ui.pane().prompt().text(), "> ls");
        assert!(!ui.handle_event(&BackendEvent::CloseRequested));
    }

    #[test]
    fn test_selection_enables_copy_button() {
        let mut ui = ui();
        ui.pane_mut().new_output("hello world", None);
        assert_eq!(
            ui.toolbar().button(ToolbarAction::Copy).map(|b| b.is_enabled()),
            Some(false)
        );

        // Row 1 from the bottom starts at y = 36 + 160 - 32
        let y = 166;
        ui.handle_event(&BackendEvent::MouseDown {
            pos: Point::new(5, y),
            button: MouseButton::Left,
            clicks: 1,
        });
        ui.handle_event(&BackendEvent::MouseMove {
            pos: Point::new(45, y),
        });
        ui.handle_event(&BackendEvent::MouseUp {
            pos: Point::new(45, y),
            button: MouseButton::Left,
        });
        assert_eq!(
            ui.toolbar().button(ToolbarAction::Copy).map(|b| b.is_enabled()),
            Some(true)
        );

        let copy = center(&ui, ToolbarAction::Copy);
        click(&mut ui, copy);
        assert_eq!(
            ui.pane_mut().clipboard_mut().get_text(),
            ClipboardText::Text("hello".to_string())
        );

        ui.handle_event(&BackendEvent::KeyDown {
            key: Key::Escape,
            mods: Modifiers::NONE,
        });
        assert_eq!(
            ui.toolbar().button(ToolbarAction::Copy).map(|b| b.is_enabled()),
            Some(false)
        );
    }

    /// A clipboard that could not be opened
    struct NoClipboard;

    impl Clipboard for NoClipboard {
        fn get_text(&mut self) -> ClipboardText {
            ClipboardText::Empty
        }

        fn set_text(&mut self, _text: &str) -> bool {
            false
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_missing_clipboard_disables_copy_and_paste() {
        let mut ui = ConsoleUi::new("> ", 1000, Box::new(NoClipboard));
        ui.set_metrics(METRICS);
        ui.handle_event(&BackendEvent::Resized(Size::new(200, 200)));
        ui.pane_mut().new_output("hello world", None);
        assert_eq!(
            ui.toolbar().button(ToolbarAction::Paste).map(|b| b.is_enabled()),
            Some(false)
        );

        // Selecting text still leaves Copy disabled
        ui.handle_event(&BackendEvent::MouseDown {
            pos: Point::new(5, 166),
            button: MouseButton::Left,
            clicks: 2,
        });
        assert!(!ui.pane().selected_text().is_empty());
        assert_eq!(
            ui.toolbar().button(ToolbarAction::Copy).map(|b| b.is_enabled()),
            Some(false)
        );
        assert!(MemoryClipboard::new().is_available());
    }

    #[test]
    fn test_paste_button() {
        let mut clipboard = MemoryClipboard::new();
        clipboard.set_text("echo hi");
        let mut ui = ui_with(clipboard);
        let paste = center(&ui, ToolbarAction::Paste);
        click(&mut ui, paste);
        assert_eq!(ui.pane().prompt().text(), "> echo hi");
    }

    #[test]
    fn test_find_button_and_field() {
        let mut ui = ui();
        ui.pane_mut().new_output("hello world", None);
        let find = center(&ui, ToolbarAction::Find);
        click(&mut ui, find);
        assert!(ui.toolbar().is_finding());

        // Typing goes to the find field, not the prompt
        ui.handle_event(&BackendEvent::TextInput("wor".to_string()));
        assert_eq!(ui.toolbar().find_text(), "wor");
        assert_eq!(ui.pane().prompt().text(), "> ");
        assert_eq!(ui.pane().finder().matches().len(), 1);

        ui.handle_event(&BackendEvent::KeyDown {
            key: Key::Escape,
            mods: Modifiers::NONE,
        });
        assert!(!ui.toolbar().is_finding());
        assert!(ui.pane().finder().is_empty());
    }

    #[test]
    fn test_cursor_keys_stay_in_find_field() {
        let mut ui = ui();
        ui.handle_event(&BackendEvent::TextInput("ab".to_string()));
        let find = center(&ui, ToolbarAction::Find);
        click(&mut ui, find);

        for key in [Key::Left, Key::Home] {
            assert!(ui.handle_event(&BackendEvent::KeyDown {
                key,
                mods: Modifiers::NONE,
            }));
        }
        assert_eq!(ui.pane().prompt().cursor(), 2);

        ui.handle_event(&BackendEvent::KeyDown {
            key: Key::Escape,
            mods: Modifiers::NONE,
        });
        ui.handle_event(&BackendEvent::TextInput("c".to_string()));
        assert_eq!(ui.pane().prompt().text(), "> abc");
    }

    #[test]
    fn test_zoom_requests() {
        let mut ui = ui();
        let zoom_in = center(&ui, ToolbarAction::ZoomIn);
        let zoom_out = center(&ui, ToolbarAction::ZoomOut);
        click(&mut ui, zoom_in);
        click(&mut ui, zoom_in);
        click(&mut ui, zoom_out);
        assert_eq!(ui.take_zoom(), 1);
        assert_eq!(ui.take_zoom(), 0);

        let mods = Modifiers {
            ctrl: true,
            logo: true,
            ..Modifiers::NONE
        };
        ui.handle_event(&BackendEvent::KeyDown {
            key: Key::Char('-'),
            mods,
        });
        assert_eq!(ui.take_zoom(), -1);
    }

    #[test]
    fn test_font_change_is_announced() {
        let mut ui = ui();
        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        ui.ui_bus().connect(UiTag::FontSizeChanged, move |env| {
            if let Some(UiEvent::FontSizeChanged(m)) = env.event() {
                s.set(Some(*m));
            }
            true
        });
        ui.set_metrics(Metrics::new(10, 20));
        assert_eq!(seen.get(), Some(Metrics::new(10, 20)));
        assert_eq!(ui.toolbar().frame(), Rect::new(0, 0, 200, 40));
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(map_named_key(NamedKey::Enter), Key::Enter);
        assert_eq!(map_named_key(NamedKey::ArrowUp), Key::Up);
        assert_eq!(map_named_key(NamedKey::Space), Key::Char(' '));
        assert_eq!(map_named_key(NamedKey::F1), Key::Other);
        assert_eq!(map_key(&WinitKey::Character("c".into())), Key::Char('c'));
    }

    #[test]
    fn test_wheel_lines() {
        assert_eq!(wheel_lines(&MouseScrollDelta::LineDelta(0.0, 3.0)), 3);
        assert_eq!(wheel_lines(&MouseScrollDelta::LineDelta(0.0, -1.0)), -1);
        assert_eq!(
            wheel_lines(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 45.0))),
            2
        );
    }

    #[test]
    fn test_text_input_filter() {
        assert!(is_insertable("a", Modifiers::NONE));
        assert!(is_insertable(
            "A",
            Modifiers {
                shift: true,
                ..Modifiers::NONE
            }
        ));
        assert!(!is_insertable("c", Modifiers::CTRL));
        assert!(!is_insertable("\r", Modifiers::NONE));
        assert!(!is_insertable("", Modifiers::NONE));
    }

    #[test]
    fn test_modifier_mapping() {
        let mods = map_modifiers(ModifiersState::SHIFT | ModifiersState::CONTROL);
        assert!(mods.shift && mods.ctrl && !mods.alt && !mods.logo);
    }
}
