//! RGB colors used for text, backgrounds and highlights

use serde::{Deserialize, Serialize};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self { r, g, b })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Pack into a 0RGB pixel as expected by softbuffer
    pub fn to_pixel(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    pub fn from_pixel(pixel: u32) -> Self {
        Self {
            r: ((pixel >> 16) & 0xFF) as u8,
            g: ((pixel >> 8) & 0xFF) as u8,
            b: (pixel & 0xFF) as u8,
        }
    }

    /// Linear blend towards `other`; `t = 0` keeps self, `t = 1` gives other
    pub fn blend(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Blend a glyph coverage value over an existing pixel
    pub fn over(self, background: Color, alpha: u8) -> Color {
        match alpha {
            0 => background,
            255 => self,
            a => {
                let a = a as u32;
                let ia = 255 - a;
                Color {
                    r: ((self.r as u32 * a + background.r as u32 * ia) / 255) as u8,
                    g: ((self.g as u32 * a + background.g as u32 * ia) / 255) as u8,
                    b: ((self.b as u32 * a + background.b as u32 * ia) / 255) as u8,
                }
            }
        }
    }
}

/// Named colors the widgets draw with
pub mod named {
    use super::Color;

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const LIGHT_GRAY: Color = Color::rgb(192, 192, 192);
    pub const DARK_GRAY: Color = Color::rgb(64, 64, 64);
    pub const GOLD: Color = Color::rgb(255, 215, 0);
    pub const HIGHLIGHT: Color = Color::rgb(38, 79, 120);
    pub const FIND_MATCH: Color = Color::rgb(120, 100, 20);
}

/// Resolved colors for one frame of drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub foreground: Color,
    pub background: Color,
    pub cursor: Color,
    pub selection: Color,
    /// Echoed prompt lines
    pub input: Color,
    pub find: Color,
    /// Toolbar and scrollbar track
    pub panel: Color,
    pub thumb: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: Color::rgb(212, 212, 212),
            background: Color::rgb(30, 30, 30),
            cursor: named::WHITE,
            selection: named::HIGHLIGHT,
            input: named::GOLD,
            find: named::FIND_MATCH,
            panel: Color::rgb(45, 45, 45),
            thumb: named::LIGHT_GRAY,
        }
    }
}

/// The 16-color ANSI palette, indexed 0-15
pub const ANSI: [Color; 16] = [
    Color::rgb(0, 0, 0),       // Black
    Color::rgb(205, 49, 49),   // Red
    Color::rgb(13, 188, 121),  // Green
    Color::rgb(229, 229, 16),  // Yellow
    Color::rgb(36, 114, 200),  // Blue
    Color::rgb(188, 63, 188),  // Magenta
    Color::rgb(17, 168, 205),  // Cyan
    Color::rgb(229, 229, 229), // White
    Color::rgb(102, 102, 102), // Bright Black
    Color::rgb(241, 76, 76),   // Bright Red
    Color::rgb(35, 209, 139),  // Bright Green
    Color::rgb(245, 245, 67),  // Bright Yellow
    Color::rgb(59, 142, 234),  // Bright Blue
    Color::rgb(214, 112, 214), // Bright Magenta
    Color::rgb(41, 184, 219),  // Bright Cyan
    Color::rgb(255, 255, 255), // Bright White
];
