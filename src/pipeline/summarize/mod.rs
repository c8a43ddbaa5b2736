pub mod artifact;
pub mod backend;
pub mod corpus;
pub mod lifecycle;
pub mod ollama;

pub use artifact::{tuned_artifact_present, ArtifactManifest};
pub use backend::{MockModelBackend, ModelBackend, ModelHandle, ModelOrigin};
pub use corpus::{load_training_corpus, CorpusError, TrainingExample};
pub use lifecycle::{LifecycleState, LifecycleTransition, ModelLifecycle};
pub use ollama::OllamaBackend;

use std::path::Path;

use thiserror::Error;

use crate::config::{
    CLINICIAN_MAX_TOKENS, CLINICIAN_PROMPT_PREFIX, PATIENT_MAX_TOKENS, PATIENT_PROMPT_PREFIX,
};

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Cannot connect to Ollama at {0}")]
    OllamaConnection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Ollama returned error {status}: {body}")]
    OllamaError { status: u16, body: String },

    #[error("Response parsing failed: {0}")]
    ResponseParsing(String),

    #[error("Model not available: {0}")]
    ModelMissing(String),

    #[error("Training corpus unavailable: {0}")]
    TrainingUnavailable(#[from] CorpusError),

    #[error("Artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Base model failed to load: {0}")]
    FallbackFailed(String),
}

/// Who a summary is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Patient,
    Clinician,
}

impl Audience {
    pub fn prompt_prefix(self) -> &'static str {
        match self {
            Audience::Patient => PATIENT_PROMPT_PREFIX,
            Audience::Clinician => CLINICIAN_PROMPT_PREFIX,
        }
    }

    /// Ceiling on generated tokens.
    pub fn max_tokens(self) -> u32 {
        match self {
            Audience::Patient => PATIENT_MAX_TOKENS,
            Audience::Clinician => CLINICIAN_MAX_TOKENS,
        }
    }
}

/// The process-wide summarizer.
///
/// Built once at startup by running the model lifecycle to Ready, then
/// shared read-only across requests. Generation keeps no per-call state.
pub struct SummarizationEngine {
    backend: Box<dyn ModelBackend + Send + Sync>,
    model: ModelHandle,
    transitions: Vec<LifecycleTransition>,
}

impl SummarizationEngine {
    /// Run the lifecycle (tuned → train → base) and return a ready engine.
    ///
    /// Fails only when the base model cannot be loaded either.
    pub fn initialize(
        backend: Box<dyn ModelBackend + Send + Sync>,
        artifact_dir: &Path,
        corpus_path: &Path,
    ) -> Result<Self, SummarizeError> {
        let outcome = ModelLifecycle::new(backend.as_ref(), artifact_dir, corpus_path).run()?;
        Ok(Self {
            backend,
            model: outcome.model,
            transitions: outcome.transitions,
        })
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn transitions(&self) -> &[LifecycleTransition] {
        &self.transitions
    }

    pub fn generate(&self, audience: Audience, text: &str) -> Result<String, SummarizeError> {
        let prompt = format!("{}{}", audience.prompt_prefix(), text);
        let summary = self
            .backend
            .generate(&self.model, &prompt, audience.max_tokens())?;
        tracing::debug!(?audience, chars = summary.len(), "Summary generated");
        Ok(summary)
    }

    pub fn generate_patient_summary(&self, text: &str) -> Result<String, SummarizeError> {
        self.generate(Audience::Patient, text)
    }

    pub fn generate_clinician_summary(&self, text: &str) -> Result<String, SummarizeError> {
        self.generate(Audience::Clinician, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> (tempfile::TempDir, SummarizationEngine) {
        let dir = tempfile::tempdir().unwrap();
        let engine = SummarizationEngine::initialize(
            Box::new(MockModelBackend::new()),
            &dir.path().join("models"),
            &dir.path().join("missing.json"),
        )
        .unwrap();
        (dir, engine)
    }

    #[test]
    fn audiences_have_fixed_prefix_and_ceiling() {
        assert_eq!(Audience::Patient.prompt_prefix(), "summarize for patient in plain words: ");
        assert_eq!(
            Audience::Clinician.prompt_prefix(),
            "summarize clinically with medical terms: "
        );
        assert_eq!(Audience::Patient.max_tokens(), 160);
        assert_eq!(Audience::Clinician.max_tokens(), 200);
    }

    #[test]
    fn prompts_are_prefixed_per_audience() {
        let (_dir, engine) = engine();
        let patient = engine.generate_patient_summary("fever cough").unwrap();
        let clinician = engine.generate_clinician_summary("fever cough").unwrap();
        assert_eq!(patient, "[mock-base] summarize for patient in plain words: fever cough");
        assert_eq!(
            clinician,
            "[mock-base] summarize clinically with medical terms: fever cough"
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let (_dir, engine) = engine();
        let text = "patient mild fever . no symptom report .";
        assert_eq!(
            engine.generate_patient_summary(text).unwrap(),
            engine.generate_patient_summary(text).unwrap()
        );
        assert_eq!(
            engine.generate_clinician_summary(text).unwrap(),
            engine.generate_clinician_summary(text).unwrap()
        );
    }

    #[test]
    fn output_respects_token_ceiling() {
        let (_dir, engine) = engine();
        let long = vec!["word"; 500].join(" ");
        let patient = engine.generate_patient_summary(&long).unwrap();
        // mock echoes at most max_tokens prompt words after the model tag
        assert_eq!(patient.split_whitespace().count(), 1 + 160);
    }

    #[test]
    fn engine_reports_fallback_origin() {
        let (_dir, engine) = engine();
        assert_eq!(engine.model().origin, ModelOrigin::Base);
        assert_eq!(engine.transitions().len(), 3);
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SummarizationEngine>();
    }
}
