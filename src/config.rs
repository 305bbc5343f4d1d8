//! Configuration for the console
//!
//! This module provides the configuration layer with:
//! - Config file under the platform config directory
//! - CLI argument overrides
//! - Environment variable support
//! - Config precedence: CLI > env > file > defaults
//! - Validation with field-level error messages

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::{Color, Palette};
use crate::error::{ConsoleError, Result};

/// CLI arguments for the demo console
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "mochi-console")]
#[command(author = "Mochi Team")]
#[command(version)]
#[command(about = "An interactive console window with scrollback and line editing", long_about = None)]
pub struct CliArgs {
    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to a monospace TTF/OTF font
    #[arg(long, value_name = "FONT")]
    pub font: Option<PathBuf>,

    /// Font size in points
    #[arg(long, value_name = "SIZE")]
    pub font_size: Option<f32>,

    /// Maximum wrapped rows kept in scrollback
    #[arg(long, value_name = "ROWS")]
    pub scrollback: Option<usize>,

    /// Prompt text shown before the input line
    #[arg(short, long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Initial window width in pixels
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Initial window height in pixels
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Window title
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Theme name (dark, light, solarized-dark, dracula, nord)
    #[arg(short, long, value_name = "THEME")]
    pub theme: Option<String>,
}

/// Built-in color themes, plus `Custom` for the `[colors]` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
    SolarizedDark,
    Dracula,
    Nord,
    Custom,
}

impl ThemeName {
    const NAMES: [(&'static str, ThemeName); 6] = [
        ("dark", ThemeName::Dark),
        ("light", ThemeName::Light),
        ("solarized-dark", ThemeName::SolarizedDark),
        ("dracula", ThemeName::Dracula),
        ("nord", ThemeName::Nord),
        ("custom", ThemeName::Custom),
    ];

    /// Case-insensitive; `_` and `-` are interchangeable
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::NAMES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, theme)| *theme)
    }

    /// Colors for a built-in theme; `None` for `Custom`
    pub fn scheme(self) -> Option<ColorScheme> {
        match self {
            ThemeName::Dark => Some(ColorScheme::dark()),
            ThemeName::Light => Some(ColorScheme::light()),
            ThemeName::SolarizedDark => Some(ColorScheme::solarized_dark()),
            ThemeName::Dracula => Some(ColorScheme::dracula()),
            ThemeName::Nord => Some(ColorScheme::nord()),
            ThemeName::Custom => None,
        }
    }
}

/// Font configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// Font file; the platform monospace fonts are searched when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Font size in points
    #[serde(default = "default_font_size")]
    pub size: f32,
    /// Line height multiplier (1.0 = normal)
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
}

fn default_font_size() -> f32 {
    14.0
}
fn default_line_spacing() -> f32 {
    1.0
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            size: default_font_size(),
            line_spacing: default_line_spacing(),
        }
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Inner width in logical pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Inner height in logical pixels
    #[serde(default = "default_height")]
    pub height: u32,
    /// Initial position; the window manager decides when unset
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    /// Redraw rate while visible
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Redraw rate while minimized or occluded
    #[serde(default = "default_minimized_fps")]
    pub minimized_fps: u32,
}

fn default_title() -> String {
    "Mochi Console".to_string()
}
fn default_width() -> u32 {
    640
}
fn default_height() -> u32 {
    480
}
fn default_fps() -> u32 {
    20
}
fn default_minimized_fps() -> u32 {
    1
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            x: None,
            y: None,
            fps: default_fps(),
            minimized_fps: default_minimized_fps(),
        }
    }
}

/// Hex colors used to draw the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub foreground: String,
    pub background: String,
    pub cursor: String,
    pub selection: String,
    /// Echoed prompt lines
    pub input: String,
    /// Find highlight
    pub find: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::dark()
    }
}

/// Console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum wrapped rows kept in scrollback
    #[serde(default = "default_scrollback")]
    pub scrollback: usize,

    /// Prompt shown before the input line
    #[serde(default = "default_prompt")]
    pub prompt: String,

    #[serde(default)]
    pub window: WindowConfig,

    #[serde(default)]
    pub font: FontConfig,

    /// Theme name
    #[serde(default)]
    pub theme: ThemeName,

    /// Custom color scheme (used when theme is "custom")
    #[serde(default)]
    pub colors: ColorScheme,
}

fn default_scrollback() -> usize {
    1000
}
fn default_prompt() -> String {
    "> ".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scrollback: default_scrollback(),
            prompt: default_prompt(),
            window: WindowConfig::default(),
            font: FontConfig::default(),
            theme: ThemeName::Dark,
            colors: ColorScheme::default(),
        }
    }
}

impl Config {
    /// Build the effective configuration. Later sources win:
    /// defaults, then the config file, then `MOCHI_CONSOLE_*` variables,
    /// then command line flags.
    pub fn load_with_args(args: &CliArgs) -> Result<Self> {
        let path = args.config.clone().or_else(Self::default_config_path);
        let mut config = match path.as_deref().filter(|p| p.exists()) {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::warn!("Ignoring config file: {}", e);
                Config::default()
            }),
            None => Config::default(),
        };

        config.apply_env_vars();
        config.apply_cli_args(args);
        config.validate()?;
        log::debug!("Effective config: {:?}", config);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConsoleError::ConfigFile {
            path: path.to_path_buf(),
            message: format!("Failed to read config file: {}", e),
        })?;

        toml::from_str(&content).map_err(|e| ConsoleError::ConfigFile {
            path: path.to_path_buf(),
            message: format!("Failed to parse config file: {}", e),
        })
    }

    /// Apply environment variables to config
    fn apply_env_vars(&mut self) {
        self.apply_env_from(|key| env::var(key).ok());
    }

    fn apply_env_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("MOCHI_CONSOLE_FONT") {
            self.font.path = Some(PathBuf::from(val));
        }
        if let Some(val) = var("MOCHI_CONSOLE_FONT_SIZE") {
            if let Ok(size) = val.parse() {
                self.font.size = size;
            }
        }
        if let Some(val) = var("MOCHI_CONSOLE_SCROLLBACK") {
            if let Ok(rows) = val.parse() {
                self.scrollback = rows;
            }
        }
        if let Some(val) = var("MOCHI_CONSOLE_PROMPT") {
            self.prompt = val;
        }
        if let Some(val) = var("MOCHI_CONSOLE_THEME") {
            if let Some(theme) = ThemeName::parse(&val) {
                self.theme = theme;
            }
        }
    }

    /// Apply CLI arguments to config
    fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(font) = &args.font {
            self.font.path = Some(font.clone());
        }
        if let Some(size) = args.font_size {
            self.font.size = size;
        }
        if let Some(scrollback) = args.scrollback {
            self.scrollback = scrollback;
        }
        if let Some(prompt) = &args.prompt {
            self.prompt = prompt.clone();
        }
        if let Some(width) = args.width {
            self.window.width = width;
        }
        if let Some(height) = args.height {
            self.window.height = height;
        }
        if let Some(title) = &args.title {
            self.window.title = title.clone();
        }
        if let Some(theme_str) = &args.theme {
            match ThemeName::parse(theme_str) {
                Some(theme) => self.theme = theme,
                None => log::warn!("Unknown theme '{}', keeping {:?}", theme_str, self.theme),
            }
        }
    }

    /// Check every value is usable; the first bad field is reported
    pub fn validate(&self) -> Result<()> {
        check_range("font.size", self.font.size, 4.0, 200.0)?;
        check_range("font.line_spacing", self.font.line_spacing, 0.5, 3.0)?;
        check_range("window.width", self.window.width, 64, u32::MAX)?;
        check_range("window.height", self.window.height, 48, u32::MAX)?;
        check_range("window.fps", self.window.fps, 1, 1000)?;
        check_range("window.minimized_fps", self.window.minimized_fps, 1, 1000)?;
        check_range("scrollback", self.scrollback, 0, MAX_SCROLLBACK)?;

        for (field, hex) in self.colors.fields() {
            if Color::from_hex(hex).is_none() {
                return Err(ConsoleError::config(
                    format!("colors.{}", field),
                    format!("Invalid hex color '{}'. Expected format: #RRGGBB", hex),
                ));
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mochi-console").join("config.toml"))
    }

    /// The theme's colors, or the `[colors]` table for a custom theme
    pub fn effective_colors(&self) -> ColorScheme {
        self.theme.scheme().unwrap_or_else(|| self.colors.clone())
    }
}

const MAX_SCROLLBACK: usize = 10_000_000;

fn check_range<T>(field: &str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min {
        return Err(ConsoleError::config(
            field,
            format!("must be at least {} (got {})", min, value),
        ));
    }
    if value > max {
        return Err(ConsoleError::config(
            field,
            format!("must be at most {} (got {})", max, value),
        ));
    }
    Ok(())
}

impl ColorScheme {
    fn from_hex_list([foreground, background, cursor, selection, input, find]: [&str; 6]) -> Self {
        Self {
            foreground: foreground.to_string(),
            background: background.to_string(),
            cursor: cursor.to_string(),
            selection: selection.to_string(),
            input: input.to_string(),
            find: find.to_string(),
        }
    }

    pub fn dark() -> Self {
        Self::from_hex_list(["#d4d4d4", "#1e1e1e", "#ffffff", "#264f78", "#ffd700", "#786414"])
    }

    pub fn light() -> Self {
        Self::from_hex_list(["#333333", "#ffffff", "#000000", "#add6ff", "#0451a5", "#f5e08a"])
    }

    pub fn solarized_dark() -> Self {
        Self::from_hex_list(["#839496", "#002b36", "#93a1a1", "#073642", "#b58900", "#586e75"])
    }

    pub fn dracula() -> Self {
        Self::from_hex_list(["#f8f8f2", "#282a36", "#f8f8f2", "#44475a", "#f1fa8c", "#6272a4"])
    }

    pub fn nord() -> Self {
        Self::from_hex_list(["#d8dee9", "#2e3440", "#d8dee9", "#434c5e", "#ebcb8b", "#5e81ac"])
    }

    /// `(name, hex)` for every color, in declaration order
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("foreground", &self.foreground),
            ("background", &self.background),
            ("cursor", &self.cursor),
            ("selection", &self.selection),
            ("input", &self.input),
            ("find", &self.find),
        ]
    }

    /// Resolve every color once for drawing. Unparseable entries fall back
    /// to the default dark palette.
    pub fn palette(&self) -> Palette {
        let fallback = Palette::default();
        let parse = |hex: &str, default: Color| Color::from_hex(hex).unwrap_or(default);
        let background = parse(&self.background, fallback.background);
        let foreground = parse(&self.foreground, fallback.foreground);
        Palette {
            foreground,
            background,
            cursor: parse(&self.cursor, fallback.cursor),
            selection: parse(&self.selection, fallback.selection),
            input: parse(&self.input, fallback.input),
            find: parse(&self.find, fallback.find),
            panel: background.blend(foreground, 0.1),
            thumb: background.blend(foreground, 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_palette_resolves_scheme() {
        let palette = ColorScheme::dark().palette();
        assert_eq!(palette.foreground, Color::rgb(212, 212, 212));
        assert_eq!(palette.selection, Color::rgb(38, 79, 120));
        assert_ne!(palette.panel, palette.background);

        let mut broken = ColorScheme::dark();
        broken.cursor = "oops".to_string();
        assert_eq!(broken.palette().cursor, Palette::default().cursor);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.font.size, 14.0);
        assert_eq!(config.scrollback, 1000);
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.window.title, "Mochi Console");
        assert_eq!((config.window.width, config.window.height), (640, 480));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!(ThemeName::parse("dark"), Some(ThemeName::Dark));
        assert_eq!(ThemeName::parse(" Light "), Some(ThemeName::Light));
        assert_eq!(
            ThemeName::parse("Solarized_Dark"),
            Some(ThemeName::SolarizedDark)
        );
        assert_eq!(ThemeName::Custom.scheme(), None);
        assert_eq!(ThemeName::parse("invalid"), None);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.font.size = 2.0;
        assert!(config.validate().is_err());
        config.font.size = 14.0;

        config.window.width = 10;
        assert!(config.validate().is_err());
        config.window.width = 640;

        config.font.line_spacing = 4.0;
        assert!(config.validate().is_err());
        config.font.line_spacing = 1.0;

        config.window.fps = 0;
        assert!(config.validate().is_err());
        config.window.fps = 20;

        config.colors.find = "nope".to_string();
        match config.validate() {
            Err(ConsoleError::Config { field, .. }) => assert_eq!(field, "colors.find"),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_config_toml_parsing() {
        let toml_str = r##"
            scrollback = 5000
            prompt = "$ "
            theme = "dracula"

            [window]
            title = "Debug"
            width = 800

            [font]
            size = 16.0
        "##;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.scrollback, 5000);
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.theme, ThemeName::Dracula);
        assert_eq!(config.window.title, "Debug");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.font.size, 16.0);
        assert_eq!(config.font.line_spacing, 1.0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "scrollback = 42\n").unwrap();
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.scrollback, 42);

        fs::write(&path, "scrollback = \"lots\"\n").unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConsoleError::ConfigFile { .. })
        ));
    }

    #[test]
    fn test_precedence_cli_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "scrollback = 42\nprompt = \"file> \"\n").unwrap();

        let args = CliArgs {
            config: Some(path),
            prompt: Some("cli> ".to_string()),
            ..Default::default()
        };
        let config = Config::load_with_args(&args).unwrap();
        assert_eq!(config.scrollback, 42);
        assert_eq!(config.prompt, "cli> ");
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is not toml [").unwrap();

        let args = CliArgs {
            config: Some(path),
            ..Default::default()
        };
        let config = Config::load_with_args(&args).unwrap();
        assert_eq!(config.window.title, "Mochi Console");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MOCHI_CONSOLE_FONT_SIZE", "18"),
            ("MOCHI_CONSOLE_SCROLLBACK", "77"),
            ("MOCHI_CONSOLE_THEME", "nord"),
            ("MOCHI_CONSOLE_PROMPT", "# "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_from(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.font.size, 18.0);
        assert_eq!(config.scrollback, 77);
        assert_eq!(config.theme, ThemeName::Nord);
        assert_eq!(config.prompt, "# ");
    }

    #[test]
    fn test_effective_colors() {
        let mut config = Config::default();
        config.theme = ThemeName::Light;
        assert_eq!(
            config.effective_colors().palette().background,
            Color::rgb(255, 255, 255)
        );
        config.theme = ThemeName::Custom;
        config.colors.background = "#010203".to_string();
        assert_eq!(
            config.effective_colors().palette().background,
            Color::rgb(1, 2, 3)
        );
    }
}
