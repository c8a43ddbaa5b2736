//! Process-wide application state.
//!
//! `CoreState` is built once during startup (extraction backends, the
//! ready summarization engine, the document store) and then shared as
//! `Arc<CoreState>` by every request. Nothing in it is mutated while
//! serving, so no locks are needed.

use crate::config::AppConfig;
use crate::pipeline::extraction::{
    DocumentExtractor, ExtractionError, OcrEngine, PdfiumBackend, TesseractCli,
};
use crate::pipeline::processor::DocumentProcessor;
use crate::pipeline::storage::{DocumentStore, FileDocumentStore, StorageError};
use crate::pipeline::summarize::{ModelBackend, OllamaBackend, SummarizationEngine, SummarizeError};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    extractor: DocumentExtractor,
    engine: SummarizationEngine,
    store: Box<dyn DocumentStore + Send + Sync>,
}

impl CoreState {
    /// Assemble state from already-built components.
    pub fn new(
        extractor: DocumentExtractor,
        engine: SummarizationEngine,
        store: Box<dyn DocumentStore + Send + Sync>,
    ) -> Self {
        Self {
            extractor,
            engine,
            store,
        }
    }

    /// Build production state: PDFium, tesseract, Ollama and the file store.
    ///
    /// Blocking: runs the model lifecycle (which may pull and derive
    /// models) and must be called outside the async runtime.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let pdf_backend = PdfiumBackend::new()?;

        let ocr = TesseractCli::new(&config.tesseract_binary, &config.ocr_lang);
        if let Err(e) = ocr.probe() {
            // Text-layer PDFs and plain text still work without OCR
            tracing::warn!(error = %e, "Tesseract unavailable; scanned pages will fail");
        }

        let store = FileDocumentStore::open(&config.storage_dir())?;

        let backend: Box<dyn ModelBackend + Send + Sync> = Box::new(OllamaBackend::new(
            &config.ollama_host,
            config.ollama_timeout_secs,
            &config.base_model,
            &config.tuned_model,
        )?);
        let engine =
            SummarizationEngine::initialize(backend, &config.artifact_dir(), &config.corpus_path)?;

        let ocr: Box<dyn OcrEngine + Send + Sync> = Box::new(ocr);
        Ok(Self::new(
            DocumentExtractor::new(ocr, Box::new(pdf_backend)),
            engine,
            Box::new(store),
        ))
    }

    pub fn engine(&self) -> &SummarizationEngine {
        &self.engine
    }

    /// Per-request view over the shared components.
    pub fn processor(&self) -> DocumentProcessor<'_> {
        DocumentProcessor::new(&self.extractor, &self.engine, self.store.as_ref())
    }
}

/// Startup failures. Any of these aborts the process.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("PDF backend unavailable: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("Document store unavailable: {0}")]
    Storage(#[from] StorageError),
    #[error("Summarization engine failed to start: {0}")]
    Summarizer(#[from] SummarizeError),
}
