//! PDF page rasterization via Google PDFium.
//!
//! Each extraction renders the current page once at a fixed 2x scale and
//! encodes it as PNG; nothing is cached between extractions.
//!
//! `PdfiumRenderer` is stateless. Each operation creates a fresh `Pdfium`
//! instance because the upstream type is `!Send`. The OS caches
//! `dlopen`/`LoadLibrary` calls, so repeat loads are near-free.

use std::io::Cursor;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Fixed scale factor for page rasterization: one PDF point becomes two
/// pixels, matching a 2x browser viewport render.
pub const RENDER_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {0}")]
    LibraryUnavailable(String),

    #[error("Failed to load PDF: {0}")]
    DocumentLoad(String),

    #[error("Page {page} out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    #[error("Failed to render page {page}: {reason}")]
    Rendering { page: usize, reason: String },

    #[error("PNG encoding failed: {0}")]
    PngEncode(String),
}

/// Renders one page of an in-memory PDF to a PNG. Pages are 1-based, as
/// the session counts them.
pub trait PageRenderer: Send {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, RenderError>;
    fn render_page_png(&self, pdf_bytes: &[u8], page: usize) -> Result<Vec<u8>, RenderError>;
}

pub struct PdfiumRenderer;

impl PdfiumRenderer {
    /// Create a renderer, verifying the PDFium library is loadable.
    pub fn new() -> Result<Self, RenderError> {
        let _ = load_pdfium()?;
        Ok(Self)
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to library file)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, RenderError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path)
            .map_err(|e| RenderError::LibraryUnavailable(format!("{path}: {e}")))?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "Loaded PDFium from executable directory");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| RenderError::LibraryUnavailable(e.to_string()))?;
    Ok(Pdfium::new(bindings))
}

impl PageRenderer for PdfiumRenderer {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, RenderError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| RenderError::DocumentLoad(e.to_string()))?;
        Ok(document.pages().len() as usize)
    }

    fn render_page_png(&self, pdf_bytes: &[u8], page: usize) -> Result<Vec<u8>, RenderError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| RenderError::DocumentLoad(e.to_string()))?;

        let pages = document.pages();
        let total = pages.len() as usize;

        let page_index = page
            .checked_sub(1)
            .and_then(|i| u16::try_from(i).ok())
            .filter(|i| (*i as usize) < total)
            .ok_or(RenderError::PageOutOfRange { page, total })?;

        let pdf_page = pages
            .get(page_index)
            .map_err(|_| RenderError::PageOutOfRange { page, total })?;

        let (target_w, target_h) = scaled_dimensions(
            pdf_page.width().value,
            pdf_page.height().value,
        );

        let config = PdfRenderConfig::new()
            .set_target_width(target_w)
            .set_maximum_height(target_h);

        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| RenderError::Rendering {
                page,
                reason: e.to_string(),
            })?;

        let mut cursor = Cursor::new(Vec::new());
        bitmap
            .as_image()
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;

        let png_bytes = cursor.into_inner();

        debug!(
            page,
            width = target_w,
            height = target_h,
            png_size = png_bytes.len(),
            "Rendered PDF page to PNG"
        );

        Ok(png_bytes)
    }
}

/// Pixel dimensions of a page rendered at the fixed scale, floored at 1px.
fn scaled_dimensions(width_points: f32, height_points: f32) -> (i32, i32) {
    let w = (width_points * RENDER_SCALE).round().max(1.0) as i32;
    let h = (height_points * RENDER_SCALE).round().max(1.0) as i32;
    (w, h)
}

// ── Mock for testing ─────────────────────────────────────────────────────────

/// 1x1 transparent PNG, enough for anything that only ships bytes onward.
const MINIMAL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
    b'R', 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, b'I', b'D', b'A', b'T', 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, b'I',
    b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82,
];

/// Mock page renderer returning a minimal PNG for each valid page. Lets
/// session and integration tests run without the PDFium binary.
pub struct MockPageRenderer {
    page_count: usize,
}

impl MockPageRenderer {
    pub fn new(page_count: usize) -> Self {
        Self { page_count }
    }
}

impl PageRenderer for MockPageRenderer {
    fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, RenderError> {
        Ok(self.page_count)
    }

    fn render_page_png(&self, _pdf_bytes: &[u8], page: usize) -> Result<Vec<u8>, RenderError> {
        if page == 0 || page > self.page_count {
            return Err(RenderError::PageOutOfRange {
                page,
                total: self.page_count,
            });
        }
        Ok(MINIMAL_PNG.to_vec())
    }
}
