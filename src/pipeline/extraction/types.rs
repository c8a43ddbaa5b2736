use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Raw upload payload handed to the extractor.
#[derive(Debug, Clone)]
pub enum SourceInput {
    Pdf(Vec<u8>),
    Text(String),
}

/// Result of text extraction from a single document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub pages: Vec<PageExtraction>,
    pub full_text: String,
}

impl ExtractionResult {
    /// Number of pages whose text came from OCR rather than the text layer.
    pub fn ocr_page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.method == ExtractionMethod::Ocr)
            .count()
    }
}

/// How text was extracted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionMethod {
    PdfTextLayer,
    Ocr,
    PlainText,
}

/// Per-page extraction result. `page_number` is 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageExtraction {
    pub page_number: usize,
    pub method: ExtractionMethod,
    pub text: String,
    pub char_count: usize,
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine {
    /// Recognize text in a PNG image. `page_number` is only used for error context.
    fn ocr_image(&self, image_bytes: &[u8], page_number: usize) -> Result<String, ExtractionError>;
}

/// PDF access abstraction: native text layer plus page rasterization.
pub trait PdfBackend {
    /// Native text layer of every page, in page order.
    fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;

    /// Render one page (0-based) to PNG at `scale` × its natural size.
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<Vec<u8>, ExtractionError>;
}

/// Decides whether a page's text layer is too thin to trust.
///
/// Swappable so a stronger page-quality classifier can replace the
/// length heuristic without touching the extraction loop.
pub trait ScanDetector {
    fn is_scanned(&self, page_text: &str) -> bool;
}

/// Treats a page as scanned when its trimmed text layer is shorter than `min_chars`.
#[derive(Debug, Clone, Copy)]
pub struct MinTextLengthDetector {
    pub min_chars: usize,
}

impl Default for MinTextLengthDetector {
    fn default() -> Self {
        Self {
            min_chars: crate::config::SCANNED_PAGE_MIN_CHARS,
        }
    }
}

impl ScanDetector for MinTextLengthDetector {
    fn is_scanned(&self, page_text: &str) -> bool {
        page_text.trim().chars().count() < self.min_chars
    }
}
