use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Clipboard capability with an explicit availability probe. Reads never
/// block and never error: any failure (headless session, missing display
/// server) surfaces as absence, with a one-time warning.
pub struct Clipboard {
    inner: Option<Mutex<arboard::Clipboard>>,
    warned: AtomicBool,
}

impl Clipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(Mutex::new(clipboard)),
            Err(err) => {
                tracing::warn!("clipboard unavailable: {err}");
                None
            }
        };
        Self {
            inner,
            warned: AtomicBool::new(false),
        }
    }

    pub fn available(&self) -> bool {
        self.inner.is_some()
    }

    /// Current clipboard text, trimmed; `None` if unavailable or empty.
    pub fn read(&self) -> Option<String> {
        let inner = match &self.inner {
            Some(inner) => inner,
            None => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    println!("Clipboard unavailable: auto-capture disabled.");
                }
                return None;
            }
        };

        let mut clipboard = inner.lock().ok()?;
        match clipboard.get_text() {
            Ok(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Err(err) => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!("clipboard read failed: {err}");
                }
                None
            }
        }
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}
