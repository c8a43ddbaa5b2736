//! PDF access via Google PDFium.
//!
//! Reads each page's native text layer and rasterizes pages that need OCR.
//! `PdfiumBackend` is stateless (`Send + Sync`). Each operation binds a
//! fresh `Pdfium` instance because the upstream type is `!Send`; the OS
//! caches the `dlopen`, so repeat binds are cheap.

use std::io::Cursor;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::types::PdfBackend;
use super::ExtractionError;

/// Largest rendered edge in pixels. Guards OCR against absurd page sizes.
const MAX_DIMENSION_PX: u32 = 4096;

/// PDFium-backed implementation of [`PdfBackend`].
pub struct PdfiumBackend;

impl PdfiumBackend {
    /// Create a backend, verifying the PDFium library is loadable (fail-fast).
    pub fn new() -> Result<Self, ExtractionError> {
        let _ = load_pdfium()?;
        Ok(Self)
    }
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to the library file)
/// 2. Alongside the running executable, or its `lib/` sibling
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            ExtractionError::PdfiumUnavailable(format!("failed to load {path}: {e}"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let candidates = [exe_dir.to_path_buf(), exe_dir.join("..").join("lib")];
            for dir in &candidates {
                let lib_path = Pdfium::pdfium_platform_library_name_at_path(
                    dir.to_string_lossy().as_ref(),
                );
                if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                    debug!(dir = %dir.display(), "Loaded PDFium next to executable");
                    return Ok(Pdfium::new(bindings));
                }
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        ExtractionError::PdfiumUnavailable(format!(
            "set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

fn map_load_error(e: PdfiumError) -> ExtractionError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("password") || lower.contains("encrypt") {
        ExtractionError::PdfEncrypted
    } else {
        ExtractionError::PdfParsing(msg)
    }
}

/// Pixel size for a page rendered at `scale` × its point size.
///
/// Both edges are clamped to [1, MAX_DIMENSION_PX], preserving aspect ratio.
fn scaled_dimensions(width_points: f32, height_points: f32, scale: f32) -> (u32, u32) {
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let longest = raw_w.max(raw_h);
    if longest > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / longest;
        (
            ((raw_w * ratio) as u32).clamp(1, MAX_DIMENSION_PX),
            ((raw_h * ratio) as u32).clamp(1, MAX_DIMENSION_PX),
        )
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PdfBackend for PdfiumBackend {
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;

        let mut texts = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let text = page.text().map(|t| t.all()).map_err(|e| {
                ExtractionError::PdfParsing(format!("text layer of page {}: {e}", index + 1))
            })?;
            texts.push(text);
        }
        Ok(texts)
    }

    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<Vec<u8>, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(map_load_error)?;
        let pages = document.pages();

        let index = u16::try_from(page_index).map_err(|_| ExtractionError::PdfRendering {
            page: page_index + 1,
            reason: "page index exceeds u16".into(),
        })?;
        let page = pages.get(index).map_err(|_| ExtractionError::PdfRendering {
            page: page_index + 1,
            reason: format!("out of range (document has {} pages)", pages.len()),
        })?;

        let (target_w, target_h) = scaled_dimensions(page.width().value, page.height().value, scale);
        if target_w == MAX_DIMENSION_PX || target_h == MAX_DIMENSION_PX {
            warn!(page = page_index + 1, target_w, target_h, "Rendered page size capped");
        }

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ExtractionError::PdfRendering {
                page: page_index + 1,
                reason: e.to_string(),
            })?;

        let mut cursor = Cursor::new(Vec::new());
        bitmap
            .as_image()
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("PNG encoding failed: {e}")))?;
        let png = cursor.into_inner();

        debug!(
            page = page_index + 1,
            width = target_w,
            height = target_h,
            png_size = png.len(),
            "Rendered PDF page for OCR"
        );
        Ok(png)
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Mock PDF backend with scripted text layers.
///
/// Records every render request so tests can assert which pages were
/// rasterized and at what scale.
pub struct MockPdfBackend {
    pages: Vec<String>,
    fail_parse: bool,
    renders: std::sync::Mutex<Vec<(usize, f32)>>,
}

impl MockPdfBackend {
    pub fn with_pages(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            fail_parse: false,
            renders: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A backend that rejects every document as corrupt.
    pub fn corrupt() -> Self {
        Self {
            fail_parse: true,
            ..Self::with_pages(&[])
        }
    }

    /// `(page_index, scale)` of every render so far.
    pub fn renders(&self) -> Vec<(usize, f32)> {
        self.renders.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl PdfBackend for MockPdfBackend {
    fn page_texts(&self, _pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        if self.fail_parse {
            return Err(ExtractionError::PdfParsing("mock: not a PDF".into()));
        }
        Ok(self.pages.clone())
    }

    fn render_page(
        &self,
        _pdf_bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<Vec<u8>, ExtractionError> {
        if page_index >= self.pages.len() {
            return Err(ExtractionError::PdfRendering {
                page: page_index + 1,
                reason: format!("out of range (mock has {} pages)", self.pages.len()),
            });
        }
        if let Ok(mut renders) = self.renders.lock() {
            renders.push((page_index, scale));
        }
        let img = image::GrayImage::from_pixel(16, 16, image::Luma([255u8]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut buf, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(e.to_string()))?;
        Ok(buf.into_inner())
    }
}
