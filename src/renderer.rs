//! Console renderer using softbuffer (CPU rendering)
//!
//! Every frame is drawn into the window's software buffer through `Frame`,
//! which implements `Canvas` on top of a plain `[u32]` pixel slice.

use std::num::NonZeroU32;
use std::rc::Rc;

use softbuffer::{Context, Surface};
use winit::window::Window;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::Result;
use crate::font::{FontProvider, Glyph, Metrics};
use crate::geometry::{Point, Rect, Size};

/// Outline thickness in pixels
const OUTLINE: i32 = 2;

/// Console renderer
pub struct Renderer {
    /// Declared before the context so it is released first
    surface: Surface<Rc<Window>, Rc<Window>>,
    #[allow(dead_code)]
    context: Context<Rc<Window>>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(window: Rc<Window>) -> Result<Self> {
        let context = Context::new(window.clone())?;
        let surface = Surface::new(&context, window.clone())?;
        let size = window.inner_size();
        log::debug!("Renderer created at {}x{}", size.width, size.height);

        Ok(Self {
            surface,
            context,
            width: size.width,
            height: size.height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as i32, self.height as i32)
    }

    /// Clear to `background`, let `draw` paint the frame, then present it
    pub fn render<F>(&mut self, font: &mut FontProvider, background: Color, draw: F) -> Result<()>
    where
        F: FnOnce(&mut Frame<'_>),
    {
        let (Some(w), Some(h)) = (NonZeroU32::new(self.width), NonZeroU32::new(self.height))
        else {
            return Ok(());
        };

        self.surface.resize(w, h)?;
        let mut buffer = self.surface.buffer_mut()?;
        buffer.fill(background.to_pixel());
        {
            let mut frame = Frame::new(&mut buffer, self.width, self.height, Some(font));
            draw(&mut frame);
        }
        buffer.present()?;
        Ok(())
    }
}

/// One frame's pixels
pub struct Frame<'a> {
    pixels: &'a mut [u32],
    width: u32,
    height: u32,
    clip: Option<Rect>,
    font: Option<&'a mut FontProvider>,
}

impl<'a> Frame<'a> {
    /// Wrap a pixel buffer. Without a font, text is not drawn.
    pub fn new(
        pixels: &'a mut [u32],
        width: u32,
        height: u32,
        font: Option<&'a mut FontProvider>,
    ) -> Self {
        Self {
            pixels,
            width,
            height,
            clip: None,
            font,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        self.pixels
            .get((y as u32 * self.width + x as u32) as usize)
            .map(|p| Color::from_pixel(*p))
    }

    /// Drawable area: the buffer, narrowed by the clip rect
    fn bounds(&self) -> Rect {
        let full = Rect::new(0, 0, self.width as i32, self.height as i32);
        match self.clip {
            Some(clip) => full.intersect(&clip),
            None => full,
        }
    }

    fn put(&mut self, x: i32, y: i32, pixel: u32) {
        let idx = (y as u32 * self.width + x as u32) as usize;
        if let Some(p) = self.pixels.get_mut(idx) {
            *p = pixel;
        }
    }
}

/// Paint `rect ∩ bounds`
fn fill(frame: &mut Frame<'_>, rect: Rect, color: Color) {
    let area = rect.intersect(&frame.bounds());
    if area.is_empty() {
        return;
    }
    let pixel = color.to_pixel();
    for py in area.y..area.bottom() {
        for px in area.x..area.right() {
            frame.put(px, py, pixel);
        }
    }
}

fn draw_glyph(frame: &mut Frame<'_>, origin: Point, baseline: i32, glyph: &Glyph, color: Color) {
    if glyph.width == 0 || glyph.height == 0 {
        return;
    }
    let bounds = frame.bounds();
    let gx = origin.x + glyph.xmin;
    let gy = origin.y + baseline - glyph.ymin - glyph.height as i32;

    for dy in 0..glyph.height {
        let py = gy + dy as i32;
        for dx in 0..glyph.width {
            let px = gx + dx as i32;
            if !bounds.contains(Point::new(px, py)) {
                continue;
            }
            let alpha = glyph.bitmap[dy * glyph.width + dx];
            if alpha == 0 {
                continue;
            }
            let Some(existing) = frame.pixel(px, py) else {
                continue;
            };
            frame.put(px, py, color.over(existing, alpha).to_pixel());
        }
    }
}

impl Canvas for Frame<'_> {
    fn size(&self) -> Size {
        Size::new(self.width as i32, self.height as i32)
    }

    fn metrics(&self) -> Metrics {
        self.font
            .as_ref()
            .map(|f| f.metrics())
            .unwrap_or_default()
    }

    fn size_text(&self, text: &str) -> Size {
        match self.font.as_ref() {
            Some(font) => font.size_text(text),
            None => self.metrics().size_text(text),
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        fill(self, rect, color);
    }

    fn outline_rect(&mut self, rect: Rect, color: Color) {
        let t = OUTLINE.min(rect.w / 2).min(rect.h / 2).max(1);
        fill(self, Rect::new(rect.x, rect.y, rect.w, t), color);
        fill(self, Rect::new(rect.x, rect.bottom() - t, rect.w, t), color);
        fill(self, Rect::new(rect.x, rect.y + t, t, rect.h - 2 * t), color);
        fill(self, Rect::new(rect.right() - t, rect.y + t, t, rect.h - 2 * t), color);
    }

    fn draw_text(&mut self, origin: Point, text: &str, color: Color) {
        let Some(font) = self.font.take() else {
            return;
        };
        font.cache_text(text);
        let cw = font.metrics().char_width;
        let baseline = font.baseline();
        let right = self.bounds().right();

        let mut x = origin.x;
        for c in text.chars() {
            if x >= right {
                break;
            }
            if c != ' ' {
                if let Some(glyph) = font.glyph(c) {
                    draw_glyph(self, Point::new(x, origin.y), baseline, glyph, color);
                }
            }
            x += cw;
        }
        self.font = Some(font);
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }
}
