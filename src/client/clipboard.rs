//! Clipboard-write capability.
//!
//! The platform clipboard context is acquired per write and dropped at
//! scope end on both success and failure paths.

use std::sync::{Arc, Mutex};

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Clipboard error: {0}")]
pub struct ClipboardError(pub String);

pub trait ClipboardWriter: Send {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard via copypasta.
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
        use copypasta::{ClipboardContext, ClipboardProvider};
        let mut ctx = ClipboardContext::new().map_err(|e| ClipboardError(e.to_string()))?;
        ctx.set_contents(text.to_owned())
            .map_err(|e| ClipboardError(e.to_string()))
    }
}

/// In-memory clipboard for tests. Clones share contents, so a test can
/// keep a handle while the session owns the writer.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
    fail: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every write fails.
    pub fn failing() -> Self {
        Self {
            contents: Arc::new(Mutex::new(None)),
            fail: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap().clone()
    }
}

impl ClipboardWriter for MemoryClipboard {
    fn write(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError("clipboard unavailable".to_string()));
        }
        *self.contents.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}
