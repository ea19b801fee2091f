//! Capture-and-display client: session state, page rendering, relay
//! access, clipboard.

pub mod api;
pub mod clipboard;
pub mod render;
pub mod session;

pub use api::{RelayClient, RelayError};
pub use clipboard::{ClipboardWriter, MemoryClipboard, SystemClipboard};
pub use render::{MockPageRenderer, PageRenderer, PdfiumRenderer, RenderError};
pub use session::{
    reduce, CopyNotice, ExtractorSession, SessionEvent, SessionState, COPY_NOTICE_TTL,
};
