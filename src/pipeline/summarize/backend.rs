use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;

use super::artifact::{read_manifest, write_artifact, ArtifactManifest};
use super::corpus::TrainingExample;
use super::SummarizeError;

/// Where the serving model came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOrigin {
    /// Loaded from a previously persisted fine-tuning run.
    Tuned,
    /// Fine-tuned during this startup.
    Trained,
    /// Untuned base model.
    Base,
}

/// Immutable reference to a loaded model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHandle {
    pub name: String,
    pub origin: ModelOrigin,
}

/// Generative model provider (allows mocking for tests).
///
/// Implementations must be deterministic: equal prompts against the same
/// handle produce equal output.
pub trait ModelBackend {
    /// Load a fine-tuned model persisted in `artifact_dir`.
    fn load_tuned(&self, artifact_dir: &Path) -> Result<ModelHandle, SummarizeError>;

    /// Fine-tune the base model on `examples` (one pass) and persist the
    /// resulting artifact in `artifact_dir`.
    fn fine_tune(
        &self,
        examples: &[TrainingExample],
        artifact_dir: &Path,
    ) -> Result<ModelHandle, SummarizeError>;

    /// Load the untuned base model. Nothing is persisted.
    fn load_base(&self) -> Result<ModelHandle, SummarizeError>;

    /// Generate at most `max_tokens` tokens for `prompt`.
    fn generate(
        &self,
        model: &ModelHandle,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, SummarizeError>;
}

/// Mock backend for testing.
///
/// Each lifecycle step can be made to fail. `generate` echoes the model
/// name and the first `max_tokens` words of the prompt, so output is
/// deterministic and shows which prefix was applied.
pub struct MockModelBackend {
    pub fail_tuned: bool,
    pub fail_training: bool,
    pub fail_base: bool,
    pub fail_generate: bool,
    calls: Mutex<Vec<String>>,
}

impl MockModelBackend {
    pub fn new() -> Self {
        Self {
            fail_tuned: false,
            fail_training: false,
            fail_base: false,
            fail_generate: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_tuned(mut self) -> Self {
        self.fail_tuned = true;
        self
    }

    pub fn failing_training(mut self) -> Self {
        self.fail_training = true;
        self
    }

    pub fn failing_base(mut self) -> Self {
        self.fail_base = true;
        self
    }

    pub fn failing_generate(mut self) -> Self {
        self.fail_generate = true;
        self
    }

    /// Names of backend methods invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.to_string());
        }
    }
}

impl Default for MockModelBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBackend for MockModelBackend {
    fn load_tuned(&self, artifact_dir: &Path) -> Result<ModelHandle, SummarizeError> {
        self.record("load_tuned");
        if self.fail_tuned {
            return Err(SummarizeError::ModelMissing("mock tuned model".into()));
        }
        let manifest = read_manifest(artifact_dir)?;
        Ok(ModelHandle {
            name: manifest.model,
            origin: ModelOrigin::Tuned,
        })
    }

    fn fine_tune(
        &self,
        examples: &[TrainingExample],
        artifact_dir: &Path,
    ) -> Result<ModelHandle, SummarizeError> {
        self.record("fine_tune");
        if self.fail_training {
            return Err(SummarizeError::HttpClient("mock training failure".into()));
        }
        let manifest = ArtifactManifest {
            model: "mock-tuned".into(),
            base_model: "mock-base".into(),
            examples: examples.len(),
            created_at: Utc::now(),
        };
        write_artifact(artifact_dir, &manifest, None)?;
        Ok(ModelHandle {
            name: manifest.model,
            origin: ModelOrigin::Trained,
        })
    }

    fn load_base(&self) -> Result<ModelHandle, SummarizeError> {
        self.record("load_base");
        if self.fail_base {
            return Err(SummarizeError::ModelMissing("mock-base".into()));
        }
        Ok(ModelHandle {
            name: "mock-base".into(),
            origin: ModelOrigin::Base,
        })
    }

    fn generate(
        &self,
        model: &ModelHandle,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, SummarizeError> {
        self.record("generate");
        if self.fail_generate {
            return Err(SummarizeError::OllamaConnection("mock".into()));
        }
        let words: Vec<&str> = prompt.split_whitespace().take(max_tokens as usize).collect();
        Ok(format!("[{}] {}", model.name, words.join(" ")))
    }
}
