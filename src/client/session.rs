//! Capture session state.
//!
//! All UI-visible state lives in one [`SessionState`] struct, and every
//! transition is a [`SessionEvent`] applied by the pure [`reduce`]
//! function, so the whole flow is testable without a rendering
//! environment. [`ExtractorSession`] is the driver that turns user
//! intents into events, wiring the page renderer, the relay client, and
//! the clipboard capability together.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value;
use tracing::warn;

use crate::client::api::RelayClient;
use crate::client::clipboard::ClipboardWriter;
use crate::client::render::PageRenderer;
use crate::models::ExtractedProduct;

pub const UNSUPPORTED_FILE_MESSAGE: &str = "Please select a valid PDF file.";

/// How long the copy confirmation stays visible before the driver
/// expires it.
pub const COPY_NOTICE_TTL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyNotice {
    Copied,
    Failed,
}

impl CopyNotice {
    pub fn message(&self) -> &'static str {
        match self {
            CopyNotice::Copied => "Copied!",
            CopyNotice::Failed => "Failed to copy.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub pdf_path: Option<PathBuf>,
    pub num_pages: Option<usize>,
    /// 1-based; always within [1, num_pages] once the page count is known.
    pub current_page: usize,
    pub extracted: Option<Value>,
    pub error: Option<String>,
    pub loading: bool,
    pub copy_notice: Option<CopyNotice>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            pdf_path: None,
            num_pages: None,
            current_page: 1,
            extracted: None,
            error: None,
            loading: false,
            copy_notice: None,
        }
    }
}

impl SessionState {
    /// Typed view of the extraction result, when the model actually
    /// produced the product shape. Arbitrary JSON yields `None`.
    pub fn products(&self) -> Option<Vec<ExtractedProduct>> {
        self.extracted
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    FileSelected { path: PathBuf },
    FileRejected,
    DocumentLoaded { num_pages: usize },
    DocumentFailed { message: String },
    PrevPage,
    NextPage,
    ExtractionStarted,
    ExtractionSucceeded { data: Value },
    ExtractionFailed { message: String },
    CopyFinished { notice: CopyNotice },
    CopyNoticeExpired,
}

/// Apply one event to the state. Pure: no I/O, no clocks.
pub fn reduce(state: &mut SessionState, event: SessionEvent) {
    match event {
        SessionEvent::FileSelected { path } => {
            // A new document resets everything downstream of the picker.
            state.pdf_path = Some(path);
            state.num_pages = None;
            state.current_page = 1;
            state.extracted = None;
            state.error = None;
            state.copy_notice = None;
        }
        SessionEvent::FileRejected => {
            state.pdf_path = None;
            state.error = Some(UNSUPPORTED_FILE_MESSAGE.to_string());
        }
        SessionEvent::DocumentLoaded { num_pages } => {
            state.num_pages = Some(num_pages);
            state.current_page = state.current_page.clamp(1, num_pages.max(1));
        }
        SessionEvent::DocumentFailed { message } => {
            state.num_pages = None;
            state.error = Some(message);
        }
        SessionEvent::PrevPage => {
            state.current_page = state.current_page.saturating_sub(1).max(1);
        }
        SessionEvent::NextPage => {
            if let Some(num_pages) = state.num_pages {
                state.current_page = (state.current_page + 1).min(num_pages);
            }
        }
        SessionEvent::ExtractionStarted => {
            // Optimistic clear: the previous result is gone the moment a
            // new extraction begins.
            state.loading = true;
            state.error = None;
            state.extracted = None;
        }
        SessionEvent::ExtractionSucceeded { data } => {
            state.extracted = Some(data);
            state.loading = false;
        }
        SessionEvent::ExtractionFailed { message } => {
            state.error = Some(message);
            state.loading = false;
        }
        SessionEvent::CopyFinished { notice } => {
            state.copy_notice = Some(notice);
        }
        SessionEvent::CopyNoticeExpired => {
            state.copy_notice = None;
        }
    }
}

/// Drives one capture session: file selection, page navigation, one
/// extraction at a time, clipboard copy.
pub struct ExtractorSession {
    state: SessionState,
    pdf_bytes: Option<Vec<u8>>,
    renderer: Box<dyn PageRenderer>,
    relay: RelayClient,
    clipboard: Box<dyn ClipboardWriter>,
}

impl ExtractorSession {
    pub fn new(
        renderer: Box<dyn PageRenderer>,
        relay: RelayClient,
        clipboard: Box<dyn ClipboardWriter>,
    ) -> Self {
        Self {
            state: SessionState::default(),
            pdf_bytes: None,
            renderer,
            relay,
            clipboard,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        reduce(&mut self.state, event);
    }

    /// Select a local file. Anything that does not look like a PDF is
    /// rejected without touching the loaded document's bytes.
    pub fn select_file(&mut self, path: &Path) {
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            self.pdf_bytes = None;
            self.dispatch(SessionEvent::FileRejected);
            return;
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read PDF");
                self.pdf_bytes = None;
                self.dispatch(SessionEvent::DocumentFailed {
                    message: format!("Failed to read {}: {}", path.display(), e),
                });
                return;
            }
        };

        self.dispatch(SessionEvent::FileSelected {
            path: path.to_path_buf(),
        });

        match self.renderer.page_count(&bytes) {
            Ok(num_pages) => {
                self.pdf_bytes = Some(bytes);
                self.dispatch(SessionEvent::DocumentLoaded { num_pages });
            }
            Err(e) => {
                self.pdf_bytes = None;
                self.dispatch(SessionEvent::DocumentFailed {
                    message: e.to_string(),
                });
            }
        }
    }

    pub fn prev_page(&mut self) {
        self.dispatch(SessionEvent::PrevPage);
    }

    pub fn next_page(&mut self) {
        self.dispatch(SessionEvent::NextPage);
    }

    /// Render the current page, ship it to the relay, store the result.
    /// No-op without a loaded document or while an extraction is in
    /// flight. The loading flag clears on every outcome.
    pub async fn extract(&mut self) {
        if self.state.loading {
            return;
        }
        let Some(bytes) = self.pdf_bytes.clone() else {
            return;
        };

        self.dispatch(SessionEvent::ExtractionStarted);

        let page = self.state.current_page;
        let png = match self.renderer.render_page_png(&bytes, page) {
            Ok(png) => png,
            Err(e) => {
                self.dispatch(SessionEvent::ExtractionFailed {
                    message: e.to_string(),
                });
                return;
            }
        };

        let image_base64 = BASE64.encode(&png);

        match self.relay.extract(&image_base64).await {
            Ok(data) => self.dispatch(SessionEvent::ExtractionSucceeded { data }),
            Err(e) => self.dispatch(SessionEvent::ExtractionFailed {
                message: e.to_string(),
            }),
        }
    }

    /// Copy the current result to the clipboard as pretty-printed JSON.
    /// No-op without a result.
    pub fn copy_to_clipboard(&mut self) {
        let Some(data) = self.state.extracted.as_ref() else {
            return;
        };

        let notice = match serde_json::to_string_pretty(data) {
            Ok(json) => match self.clipboard.write(&json) {
                Ok(()) => CopyNotice::Copied,
                Err(e) => {
                    warn!(error = %e, "Clipboard write failed");
                    CopyNotice::Failed
                }
            },
            Err(e) => {
                warn!(error = %e, "Failed to serialize extraction result");
                CopyNotice::Failed
            }
        };

        self.dispatch(SessionEvent::CopyFinished { notice });
    }

    /// Called by the driver once [`COPY_NOTICE_TTL`] has elapsed.
    pub fn expire_copy_notice(&mut self) {
        self.dispatch(SessionEvent::CopyNoticeExpired);
    }
}
