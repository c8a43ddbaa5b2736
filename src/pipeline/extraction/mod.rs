pub mod types;
pub mod ocr;
pub mod pdfium;
pub mod orchestrator;

pub use types::*;
pub use ocr::*;
pub use pdfium::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDFium library unavailable: {0}")]
    PdfiumUnavailable(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF is password-protected")]
    PdfEncrypted,

    #[error("PDF page {page} rendering failed: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("OCR engine initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed on page {page}: {reason}")]
    OcrProcessing { page: usize, reason: String },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),
}
