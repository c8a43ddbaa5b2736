use super::types::{
    ExtractionMethod, ExtractionResult, MinTextLengthDetector, OcrEngine, PageExtraction,
    PdfBackend, ScanDetector, SourceInput,
};
use super::ExtractionError;
use crate::config::SCANNED_PAGE_RENDER_SCALE;

/// Concrete text extractor.
/// Uses trait objects for OCR, PDF access and scan detection, enabling dependency injection.
pub struct DocumentExtractor {
    ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    pdf_backend: Box<dyn PdfBackend + Send + Sync>,
    scan_detector: Box<dyn ScanDetector + Send + Sync>,
}

impl DocumentExtractor {
    pub fn new(
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
        pdf_backend: Box<dyn PdfBackend + Send + Sync>,
    ) -> Self {
        Self {
            ocr_engine,
            pdf_backend,
            scan_detector: Box::new(MinTextLengthDetector::default()),
        }
    }

    /// Replace the default text-length heuristic.
    pub fn with_scan_detector(mut self, detector: Box<dyn ScanDetector + Send + Sync>) -> Self {
        self.scan_detector = detector;
        self
    }

    /// Turn an upload into a single document string.
    ///
    /// Plain text is trimmed and returned. PDFs are read page by page:
    /// pages the scan detector flags are rendered and OCR'd, the rest keep
    /// their text layer verbatim. Pages are joined with `\n` and the whole
    /// document is trimmed. Any page failure fails the document.
    pub fn extract(&self, source: &SourceInput) -> Result<ExtractionResult, ExtractionError> {
        match source {
            SourceInput::Text(text) => {
                let full_text = text.trim().to_string();
                Ok(ExtractionResult {
                    pages: vec![PageExtraction {
                        page_number: 1,
                        method: ExtractionMethod::PlainText,
                        char_count: full_text.chars().count(),
                        text: full_text.clone(),
                    }],
                    full_text,
                })
            }
            SourceInput::Pdf(bytes) => self.extract_pdf(bytes),
        }
    }

    fn extract_pdf(&self, pdf_bytes: &[u8]) -> Result<ExtractionResult, ExtractionError> {
        let layers = self.pdf_backend.page_texts(pdf_bytes)?;
        tracing::info!(pages = layers.len(), "Extracting PDF");

        let mut pages = Vec::with_capacity(layers.len());
        for (index, layer) in layers.into_iter().enumerate() {
            let page_number = index + 1;
            let (method, text) = if self.scan_detector.is_scanned(&layer) {
                let png = self
                    .pdf_backend
                    .render_page(pdf_bytes, index, SCANNED_PAGE_RENDER_SCALE)?;
                (ExtractionMethod::Ocr, self.ocr_engine.ocr_image(&png, page_number)?)
            } else {
                (ExtractionMethod::PdfTextLayer, layer)
            };

            tracing::debug!(page = page_number, ?method, chars = text.len(), "Page extracted");
            pages.push(PageExtraction {
                page_number,
                method,
                char_count: text.chars().count(),
                text,
            });
        }

        let full_text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        let result = ExtractionResult { pages, full_text };
        tracing::info!(
            pages = result.pages.len(),
            ocr_pages = result.ocr_page_count(),
            chars = result.full_text.len(),
            "PDF extraction complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::ocr::MockOcrEngine;
    use crate::pipeline::extraction::pdfium::MockPdfBackend;
    use std::sync::Arc;

    /// Shares the mock backend so tests can inspect recorded renders.
    struct SharedBackend(Arc<MockPdfBackend>);

    impl PdfBackend for SharedBackend {
        fn page_texts(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
            self.0.page_texts(pdf_bytes)
        }

        fn render_page(
            &self,
            pdf_bytes: &[u8],
            page_index: usize,
            scale: f32,
        ) -> Result<Vec<u8>, ExtractionError> {
            self.0.render_page(pdf_bytes, page_index, scale)
        }
    }

    fn extractor(pages: &[&str], ocr: MockOcrEngine) -> (DocumentExtractor, Arc<MockPdfBackend>) {
        let backend = Arc::new(MockPdfBackend::with_pages(pages));
        let extractor =
            DocumentExtractor::new(Box::new(ocr), Box::new(SharedBackend(backend.clone())));
        (extractor, backend)
    }

    #[test]
    fn plain_text_is_trimmed() {
        let (ex, _) = extractor(&[], MockOcrEngine::new("unused"));
        let result = ex
            .extract(&SourceInput::Text("\n  Patient stable.  \n".into()))
            .unwrap();
        assert_eq!(result.full_text, "Patient stable.");
        assert_eq!(result.pages[0].method, ExtractionMethod::PlainText);
    }

    #[test]
    fn digital_pages_keep_text_layer() {
        let (ex, backend) = extractor(
            &["Discharge summary page one.", "Follow-up in two weeks."],
            MockOcrEngine::new("SHOULD NOT APPEAR"),
        );
        let result = ex.extract(&SourceInput::Pdf(b"%PDF".to_vec())).unwrap();
        assert_eq!(
            result.full_text,
            "Discharge summary page one.\nFollow-up in two weeks."
        );
        assert_eq!(result.ocr_page_count(), 0);
        assert!(backend.renders().is_empty());
    }

    #[test]
    fn short_page_is_rendered_at_double_scale_and_ocrd() {
        let (ex, backend) = extractor(
            &["Typed history and physical.", "  12 ", "Signed by attending."],
            MockOcrEngine::new("Scanned lab report"),
        );
        let result = ex.extract(&SourceInput::Pdf(b"%PDF".to_vec())).unwrap();

        assert_eq!(
            result.full_text,
            "Typed history and physical.\nScanned lab report\nSigned by attending."
        );
        assert_eq!(result.pages[1].method, ExtractionMethod::Ocr);
        assert_eq!(result.pages[1].page_number, 2);
        assert_eq!(backend.renders(), vec![(1, 2.0)]);
    }

    #[test]
    fn text_layer_used_verbatim() {
        let (ex, _) = extractor(
            &["  Line one\nLine two  ", "Second page body"],
            MockOcrEngine::new(""),
        );
        let result = ex.extract(&SourceInput::Pdf(vec![])).unwrap();
        assert_eq!(result.pages[0].text, "  Line one\nLine two  ");
        // Only the joined document is trimmed
        assert_eq!(result.full_text, "Line one\nLine two  \nSecond page body");
    }

    #[test]
    fn ocr_failure_fails_whole_document() {
        let (ex, _) = extractor(&["Readable first page.", ""], MockOcrEngine::failing());
        let err = ex.extract(&SourceInput::Pdf(vec![])).unwrap_err();
        assert!(matches!(err, ExtractionError::OcrProcessing { page: 2, .. }));
    }

    #[test]
    fn corrupt_pdf_is_parsing_error() {
        let ex = DocumentExtractor::new(
            Box::new(MockOcrEngine::new("")),
            Box::new(MockPdfBackend::corrupt()),
        );
        let err = ex.extract(&SourceInput::Pdf(b"junk".to_vec())).unwrap_err();
        assert!(matches!(err, ExtractionError::PdfParsing(_)));
    }

    #[test]
    fn custom_scan_detector_forces_ocr() {
        struct AlwaysScanned;
        impl ScanDetector for AlwaysScanned {
            fn is_scanned(&self, _page_text: &str) -> bool {
                true
            }
        }

        let (ex, backend) = extractor(
            &["A perfectly good text layer."],
            MockOcrEngine::new("ocr text"),
        );
        let ex = ex.with_scan_detector(Box::new(AlwaysScanned));
        let result = ex.extract(&SourceInput::Pdf(vec![])).unwrap();
        assert_eq!(result.full_text, "ocr text");
        assert_eq!(backend.renders().len(), 1);
    }

    #[test]
    fn empty_pdf_yields_empty_text() {
        let (ex, _) = extractor(&[], MockOcrEngine::new(""));
        let result = ex.extract(&SourceInput::Pdf(vec![])).unwrap();
        assert!(result.full_text.is_empty());
        assert!(result.pages.is_empty());
    }
}
