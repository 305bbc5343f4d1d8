//! Monospace font loading and glyph rasterization
//!
//! Fonts are loaded from disk with fontdue. Every codepoint occupies one
//! cell of `char_width` pixels; there is no shaping. Rasterized glyphs are
//! cached per size and the cache is dropped whenever the size changes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};

use crate::error::{ConsoleError, Result};
use crate::geometry::Size;

/// Cell dimensions in whole pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub char_width: i32,
    pub line_height: i32,
}

impl Metrics {
    pub const fn new(char_width: i32, line_height: i32) -> Self {
        Self {
            char_width,
            line_height,
        }
    }

    /// Whole columns that fit in `width` pixels
    pub fn columns_in(&self, width: i32) -> i32 {
        if self.char_width <= 0 {
            return 0;
        }
        (width / self.char_width).max(0)
    }

    /// Pixel extent of `text` laid out on one row
    pub fn size_text(&self, text: &str) -> Size {
        let count = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
        Size::new(count.saturating_mul(self.char_width), self.line_height)
    }

    /// Whole rows that fit in `height` pixels
    pub fn rows_in(&self, height: i32) -> i32 {
        if self.line_height <= 0 {
            return 0;
        }
        (height / self.line_height).max(0)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(8, 16)
    }
}

/// A rasterized glyph (alpha coverage)
#[derive(Debug, Clone)]
pub struct Glyph {
    pub bitmap: Vec<u8>,
    pub width: usize,
    pub height: usize,
    /// X offset from the cell origin
    pub xmin: i32,
    /// Y offset from the baseline
    pub ymin: i32,
}

/// Smallest and largest size reachable with the zoom buttons
pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 72.0;
/// Zoom step in points
pub const FONT_SIZE_STEP: f32 = 2.0;

/// Monospace fonts probed when no font is configured
pub fn default_font_paths() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &[
            "/System/Library/Fonts/Menlo.ttc",
            "/System/Library/Fonts/Monaco.ttf",
            "/Library/Fonts/DejaVuSansMono.ttf",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            "C:\\Windows\\Fonts\\consola.ttf",
            "C:\\Windows\\Fonts\\cour.ttf",
            "C:\\Windows\\Fonts\\lucon.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
            "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
            "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
            "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
        ]
    }
}

/// Clamp a requested size into the zoomable range
pub fn clamp_size(size: f32) -> f32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Pixel size to rasterize at for a logical point size on a display with
/// the given scale factor. The zoom range applies to the logical size.
pub fn raster_size(size: f32, scale: f32) -> f32 {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    clamp_size(size) * scale
}

/// The console's font, its metrics and glyph cache
pub struct FontProvider {
    font: Font,
    path: PathBuf,
    /// Logical size in points
    size: f32,
    scale: f32,
    line_spacing: f32,
    metrics: Metrics,
    baseline: i32,
    glyphs: HashMap<char, Glyph>,
}

impl std::fmt::Debug for FontProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontProvider")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("scale", &self.scale)
            .field("metrics", &self.metrics)
            .field("cached_glyphs", &self.glyphs.len())
            .finish()
    }
}

impl FontProvider {
    /// Load the configured font, or the first default font that exists
    pub fn open(path: Option<&Path>, size: f32, line_spacing: f32) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path, size, line_spacing);
        }

        let candidates = default_font_paths();
        for candidate in candidates {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            match Self::load(path, size, line_spacing) {
                Ok(provider) => return Ok(provider),
                Err(e) => log::warn!("Skipping font {}: {}", candidate, e),
            }
        }

        Err(ConsoleError::FontNotFound {
            tried: candidates.len(),
        })
    }

    /// Load a specific font file
    pub fn load(path: &Path, size: f32, line_spacing: f32) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| ConsoleError::FontLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
            ConsoleError::FontLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        log::debug!("Loaded font {} at {}pt", path.display(), size);

        let mut provider = Self {
            font,
            path: path.to_path_buf(),
            size: 0.0,
            scale: 1.0,
            line_spacing,
            metrics: Metrics::default(),
            baseline: 0,
            glyphs: HashMap::with_capacity(128),
        };
        provider.set_size(size);
        Ok(provider)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Distance from the top of a row to the baseline
    pub fn baseline(&self) -> i32 {
        self.baseline
    }

    /// Pixel extent of `text` on one row
    pub fn size_text(&self, text: &str) -> Size {
        self.metrics.size_text(text)
    }

    /// Change the logical font size and recompute the cell metrics
    pub fn set_size(&mut self, size: f32) -> Metrics {
        let size = clamp_size(size);
        if (size - self.size).abs() < f32::EPSILON {
            return self.metrics;
        }
        self.size = size;
        self.rebuild()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Change the display scale factor; the logical size is kept
    pub fn set_scale(&mut self, scale: f32) -> Metrics {
        if !scale.is_finite() || scale <= 0.0 || (scale - self.scale).abs() < f32::EPSILON {
            return self.metrics;
        }
        self.scale = scale;
        self.rebuild()
    }

    fn rebuild(&mut self) -> Metrics {
        let px = raster_size(self.size, self.scale);
        let advance = self.font.metrics('M', px).advance_width;
        let line_metrics = self.font.horizontal_line_metrics(px);
        let line_height = line_metrics.map_or(px * 1.2, |lm| lm.new_line_size);
        self.metrics = Metrics::new(
            advance.ceil().max(1.0) as i32,
            (line_height * self.line_spacing).ceil().max(1.0) as i32,
        );
        self.baseline = line_metrics.map_or(px.ceil() as i32, |lm| lm.ascent.ceil() as i32);

        // Glyphs rasterized at the old size are useless now
        self.clear_cache();
        for c in ' '..='~' {
            self.cache_glyph(c);
        }

        log::debug!("Font size {}pt x{} -> cell {:?}", self.size, self.scale, self.metrics);
        self.metrics
    }

    pub fn increase(&mut self) -> Metrics {
        self.set_size(self.size + FONT_SIZE_STEP)
    }

    pub fn decrease(&mut self) -> Metrics {
        self.set_size(self.size - FONT_SIZE_STEP)
    }

    /// Rasterize every glyph of `text` that is not cached yet
    pub fn cache_text(&mut self, text: &str) {
        for c in text.chars() {
            if c != ' ' {
                self.cache_glyph(c);
            }
        }
    }

    fn cache_glyph(&mut self, c: char) {
        if self.glyphs.contains_key(&c) {
            return;
        }
        // Index 0 is the font's missing-glyph box; rasterizing it is the fallback
        if self.font.lookup_glyph_index(c) == 0 {
            log::trace!("No glyph for {:?}, using the missing glyph", c);
        }
        let (metrics, bitmap) = self.font.rasterize(c, raster_size(self.size, self.scale));
        self.glyphs.insert(
            c,
            Glyph {
                bitmap,
                width: metrics.width,
                height: metrics.height,
                xmin: metrics.xmin,
                ymin: metrics.ymin,
            },
        );
    }

    /// A cached glyph; call `cache_text` first
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Drop every cached bitmap
    pub fn clear_cache(&mut self) {
        self.glyphs.clear();
    }
}
