//! Clipboard access
//!
//! The output pane copies and pastes through the `Clipboard` trait. The
//! window uses the system clipboard (arboard); tests use `MemoryClipboard`.

use crate::text::INVALID_PLACEHOLDER;

/// Result of reading the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardText {
    Text(String),
    /// The clipboard holds something that is not valid text
    Unreadable,
    Empty,
}

impl ClipboardText {
    /// Text to insert at the prompt; unreadable contents become the
    /// placeholder so the user sees that something was there
    pub fn into_insertable(self) -> Option<String> {
        match self {
            ClipboardText::Text(text) => Some(text),
            ClipboardText::Unreadable => Some(INVALID_PLACEHOLDER.to_string()),
            ClipboardText::Empty => None,
        }
    }
}

pub trait Clipboard {
    fn get_text(&mut self) -> ClipboardText;

    /// Returns false when the text could not be stored
    fn set_text(&mut self, text: &str) -> bool;

    /// False when no clipboard could be reached at all
    fn is_available(&self) -> bool {
        true
    }
}

/// The desktop clipboard; degrades to a no-op when unavailable
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                log::warn!("Clipboard not available: {}", e);
                None
            }
        };
        Self { inner }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&mut self) -> ClipboardText {
        let Some(clipboard) = &mut self.inner else {
            log::warn!("Clipboard not available");
            return ClipboardText::Empty;
        };
        match clipboard.get_text() {
            Ok(text) if text.is_empty() => ClipboardText::Empty,
            Ok(text) => ClipboardText::Text(text),
            Err(arboard::Error::ConversionFailure) => ClipboardText::Unreadable,
            Err(arboard::Error::ContentNotAvailable) => ClipboardText::Empty,
            Err(e) => {
                log::warn!("Failed to read clipboard: {}", e);
                ClipboardText::Empty
            }
        }
    }

    fn set_text(&mut self, text: &str) -> bool {
        let Some(clipboard) = &mut self.inner else {
            log::warn!("Clipboard not available");
            return false;
        };
        match clipboard.set_text(text) {
            Ok(()) => {
                log::debug!("Copied {} characters to clipboard", text.chars().count());
                true
            }
            Err(e) => {
                log::warn!("Failed to copy to clipboard: {}", e);
                false
            }
        }
    }

    fn is_available(&self) -> bool {
        self.inner.is_some()
    }
}

/// Process-local clipboard
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<ClipboardText>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the clipboard holds non-text data
    pub fn set_unreadable(&mut self) {
        self.contents = Some(ClipboardText::Unreadable);
    }
}

impl Clipboard for MemoryClipboard {
    fn get_text(&mut self) -> ClipboardText {
        self.contents.clone().unwrap_or(ClipboardText::Empty)
    }

    fn set_text(&mut self, text: &str) -> bool {
        self.contents = Some(ClipboardText::Text(text.to_string()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_round_trip() {
        let mut clip = MemoryClipboard::new();
        assert_eq!(clip.get_text(), ClipboardText::Empty);
        assert!(clip.set_text("hello"));
        assert_eq!(clip.get_text(), ClipboardText::Text("hello".into()));
    }

    #[test]
    fn test_unreadable_becomes_placeholder() {
        let mut clip = MemoryClipboard::new();
        clip.set_unreadable();
        assert_eq!(clip.get_text().into_insertable().as_deref(), Some("?u8?"));
        assert_eq!(ClipboardText::Empty.into_insertable(), None);
    }
}
