//! Error types for the console
//!
//! Only resource creation can fail in a way the caller sees. Everything else
//! degrades: malformed text becomes a placeholder, out-of-range lookups return
//! `None`, and calls made after shutdown are no-ops.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while bringing the console up or loading its configuration
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The windowing event loop could not be created
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The OS window could not be created
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The software frame buffer could not be attached to the window
    #[error("failed to create render surface: {0}")]
    Surface(#[from] softbuffer::SoftBufferError),

    /// A font file was found but could not be parsed
    #[error("failed to load font {path:?}: {message}")]
    FontLoad { path: PathBuf, message: String },

    /// None of the candidate font files exist
    #[error("no usable monospace font found (tried {tried} locations)")]
    FontNotFound { tried: usize },

    /// Invalid configuration value
    #[error("config error in '{field}': {message}")]
    Config { field: String, message: String },

    /// Config file could not be read or parsed
    #[error("failed to load config {path:?}: {message}")]
    ConfigFile { path: PathBuf, message: String },

    /// Operation requires an initialized console
    #[error("console is not active")]
    NotActive,
}

impl ConsoleError {
    /// Build a validation error for a config field
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConsoleError::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from acquiring a window, surface or font
    pub fn is_resource_failure(&self) -> bool {
        matches!(
            self,
            ConsoleError::EventLoop(_)
                | ConsoleError::Window(_)
                | ConsoleError::Surface(_)
                | ConsoleError::FontLoad { .. }
                | ConsoleError::FontNotFound { .. }
        )
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConsoleError::config("font.size", "Font size must be at least 4.0");
        assert_eq!(
            err.to_string(),
            "config error in 'font.size': Font size must be at least 4.0"
        );
        assert!(!err.is_resource_failure());
    }

    #[test]
    fn test_font_errors_are_resource_failures() {
        assert!(ConsoleError::FontNotFound { tried: 3 }.is_resource_failure());
        let err = ConsoleError::FontLoad {
            path: PathBuf::from("/nope.ttf"),
            message: "bad table".to_string(),
        };
        assert!(err.is_resource_failure());
        assert!(err.to_string().contains("bad table"));
    }
}
