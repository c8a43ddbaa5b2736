//! Document processing orchestrator.
//!
//! Two entry points drive the pipeline:
//! - ingest: extract → normalize → segment → store
//! - summarize: resolve stored or inline text → generate ×2 → attribute ×2
//!
//! Engines are borrowed from the caller so the processor stays a thin,
//! testable composition over trait-backed components.

use serde::Serialize;

use crate::config::SECTIONS_PREVIEW_LEN;
use crate::pipeline::extraction::{DocumentExtractor, ExtractionError, SourceInput};
use crate::pipeline::normalize::normalize;
use crate::pipeline::provenance::{attribute, ProvenanceEntry};
use crate::pipeline::readability::flesch_kincaid_grade;
use crate::pipeline::segment::{segment, Section};
use crate::pipeline::storage::{DocumentId, DocumentRecord, DocumentStore, StorageError};
use crate::pipeline::summarize::{SummarizationEngine, SummarizeError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Extraction failure surfaced at the pipeline boundary, cause attached.
#[derive(Debug, thiserror::Error)]
#[error("Preprocessing failed: {0}")]
pub struct PreprocessingError(#[from] pub ExtractionError);

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// Caller supplied nothing usable. Nothing was created.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    #[error("Summary generation failed: {0}")]
    Generation(#[from] SummarizeError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub doc_id: String,
    pub section_count: usize,
    pub sections_preview: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudienceProvenance {
    pub patient: Vec<ProvenanceEntry>,
    pub clinician: Vec<ProvenanceEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutcome {
    pub patient_summary: String,
    pub clinician_summary: String,
    pub provenance: AudienceProvenance,
    pub patient_reading_grade: f32,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

pub struct DocumentProcessor<'a> {
    extractor: &'a DocumentExtractor,
    engine: &'a SummarizationEngine,
    store: &'a dyn DocumentStore,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(
        extractor: &'a DocumentExtractor,
        engine: &'a SummarizationEngine,
        store: &'a dyn DocumentStore,
    ) -> Self {
        Self {
            extractor,
            engine,
            store,
        }
    }

    /// Ingest a PDF or non-blank text and persist it under a new id.
    ///
    /// A non-empty PDF wins over text. Input and preprocessing failures
    /// persist nothing.
    pub fn ingest(
        &self,
        pdf: Option<Vec<u8>>,
        text: Option<&str>,
    ) -> Result<IngestOutcome, ProcessingError> {
        let source = match (pdf.filter(|bytes| !bytes.is_empty()), non_blank(text)) {
            (Some(bytes), _) => SourceInput::Pdf(bytes),
            (None, Some(text)) => SourceInput::Text(text.to_string()),
            (None, None) => {
                return Err(ProcessingError::InvalidInput(
                    "Provide a PDF file or non-empty text.".into(),
                ))
            }
        };

        let extraction = self
            .extractor
            .extract(&source)
            .map_err(PreprocessingError::from)?;

        let sections = segment(&extraction.full_text);
        let record = DocumentRecord {
            normalized_text: normalize(&extraction.full_text),
            raw_text: extraction.full_text,
            sections,
        };

        let id = DocumentId::new();
        self.store.save(&id, &record)?;

        tracing::info!(
            doc_id = %id,
            pages = extraction.pages.len(),
            sections = record.sections.len(),
            "Document ingested"
        );

        Ok(IngestOutcome {
            doc_id: id.to_string(),
            section_count: record.sections.len(),
            sections_preview: record
                .sections
                .into_iter()
                .take(SECTIONS_PREVIEW_LEN)
                .collect(),
        })
    }

    /// Summarize a stored document (by id) or inline text.
    ///
    /// A non-blank id takes precedence and must resolve; the model then sees
    /// the stored normalized text. Inline text is trimmed and given to the
    /// model as written, and segmented exactly as at ingestion.
    pub fn summarize(
        &self,
        doc_id: Option<&str>,
        text: Option<&str>,
    ) -> Result<SummaryOutcome, ProcessingError> {
        let (model_input, sections) = match (non_blank(doc_id), non_blank(text)) {
            (Some(raw_id), _) => {
                let record = DocumentId::parse(raw_id)
                    .map(|id| self.store.load(&id))
                    .transpose()?
                    .flatten()
                    .ok_or_else(|| ProcessingError::NotFound("Document not found.".into()))?;
                let input = if record.normalized_text.trim().is_empty() {
                    record.raw_text
                } else {
                    record.normalized_text
                };
                (input, record.sections)
            }
            (None, Some(text)) => {
                let trimmed = text.trim();
                (trimmed.to_string(), segment(trimmed))
            }
            (None, None) => {
                return Err(ProcessingError::InvalidInput(
                    "Provide doc_id or non-empty text.".into(),
                ))
            }
        };

        let patient_summary = self.engine.generate_patient_summary(&model_input)?;
        let clinician_summary = self.engine.generate_clinician_summary(&model_input)?;

        let provenance = AudienceProvenance {
            patient: attribute(&patient_summary, &sections),
            clinician: attribute(&clinician_summary, &sections),
        };

        tracing::info!(
            sections = sections.len(),
            patient_sentences = provenance.patient.len(),
            clinician_sentences = provenance.clinician.len(),
            "Summaries generated"
        );

        Ok(SummaryOutcome {
            patient_reading_grade: flesch_kincaid_grade(&patient_summary),
            patient_summary,
            clinician_summary,
            provenance,
        })
    }
}
