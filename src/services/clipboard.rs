//! Clipboard access.
//!
//! The controller only talks to [`ClipboardService`]; the system clipboard
//! (via `arboard`) is one implementation, an in-process buffer is another.

use std::sync::{Arc, Mutex};

/// Errors reported by a clipboard backend
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard access failed: {0}")]
    Access(String),
}

/// Host clipboard capability
pub trait ClipboardService {
    /// Plain text payload
    fn read_text(&mut self) -> Result<String, ClipboardError>;

    /// HTML payload, if the clipboard currently holds one
    fn read_html(&mut self) -> Result<Option<String>, ClipboardError>;

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Default)]
struct MemoryContents {
    text: String,
    html: Option<String>,
}

/// In-process clipboard.
///
/// Cloning shares the same contents, so a test can keep a handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<MemoryContents>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a plain text payload
    pub fn set_text(&self, text: &str) {
        let mut contents = self.lock();
        contents.text = text.to_string();
        contents.html = None;
    }

    /// Replace the contents with an HTML payload and its text alternative
    pub fn set_html(&self, html: &str, alt_text: &str) {
        let mut contents = self.lock();
        contents.text = alt_text.to_string();
        contents.html = Some(html.to_string());
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryContents> {
        // A poisoned lock only means a panicking test; the data is still usable
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ClipboardService for MemoryClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        Ok(self.lock().text.clone())
    }

    fn read_html(&mut self) -> Result<Option<String>, ClipboardError> {
        Ok(self.lock().html.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.set_text(text);
        Ok(())
    }
}

/// System clipboard backed by `arboard`.
///
/// Clipboard access is best effort: headless sessions and some terminals
/// have no clipboard, in which case an in-process fallback is used so copy
/// and paste still work inside the editor.
#[cfg(feature = "runtime")]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    fallback: MemoryClipboard,
}

#[cfg(feature = "runtime")]
impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                tracing::warn!("System clipboard unavailable, using internal clipboard: {}", e);
                None
            }
        };
        Self {
            inner,
            fallback: MemoryClipboard::new(),
        }
    }
}

#[cfg(feature = "runtime")]
impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "runtime")]
impl ClipboardService for SystemClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .get_text()
                .map_err(|e| ClipboardError::Access(e.to_string())),
            None => self.fallback.read_text(),
        }
    }

    fn read_html(&mut self) -> Result<Option<String>, ClipboardError> {
        match self.inner.as_mut() {
            Some(clipboard) => match clipboard.get().html() {
                Ok(html) => Ok(Some(html)),
                Err(arboard::Error::ContentNotAvailable) => Ok(None),
                // Platforms without HTML support fall back to text
                Err(arboard::Error::ClipboardNotSupported) => Ok(None),
                Err(e) => Err(ClipboardError::Access(e.to_string())),
            },
            None => self.fallback.read_html(),
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ClipboardError::Access(e.to_string())),
            None => self.fallback.write_text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_shares_contents() {
        let handle = MemoryClipboard::new();
        let mut owned = handle.clone();
        owned.write_text("copied").unwrap();
        assert_eq!(handle.text(), "copied");
        assert_eq!(owned.read_html().unwrap(), None);
    }

    #[test]
    fn test_memory_clipboard_html_payload() {
        let mut clipboard = MemoryClipboard::new();
        clipboard.set_html("<b>x</b>", "x");
        assert_eq!(clipboard.read_html().unwrap().as_deref(), Some("<b>x</b>"));
        assert_eq!(clipboard.read_text().unwrap(), "x");

        clipboard.write_text("plain").unwrap();
        assert_eq!(clipboard.read_html().unwrap(), None);
    }
}
