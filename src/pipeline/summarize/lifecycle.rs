//! Startup lifecycle of the serving model.
//!
//! ```text
//! LoadTuned ──artifact loaded──────────────▶ Ready
//!     │ no artifact / load failed
//!     ▼
//!   Train ────corpus ok + fine-tune ok─────▶ Ready
//!     │ corpus unavailable / fine-tune failed
//!     ▼
//! Fallback ───base loaded──────────────────▶ Ready
//!     │ base failed
//!     ▼
//!   fatal
//! ```
//!
//! Runs once per process. Ready is terminal.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::artifact::tuned_artifact_present;
use super::backend::{ModelBackend, ModelHandle};
use super::corpus::load_training_corpus;
use super::SummarizeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    LoadTuned,
    Train,
    Fallback,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleTransition {
    pub from: LifecycleState,
    pub to: LifecycleState,
    pub reason: String,
}

/// Result of a completed lifecycle run.
#[derive(Debug, Clone)]
pub struct LifecycleOutcome {
    pub model: ModelHandle,
    pub transitions: Vec<LifecycleTransition>,
}

enum Step {
    Ready(ModelHandle, String),
    Next(LifecycleState, String),
}

/// Drives the model to Ready against a backend.
pub struct ModelLifecycle<'a> {
    backend: &'a dyn ModelBackend,
    artifact_dir: PathBuf,
    corpus_path: PathBuf,
    transitions: Vec<LifecycleTransition>,
}

impl<'a> ModelLifecycle<'a> {
    pub fn new(backend: &'a dyn ModelBackend, artifact_dir: &Path, corpus_path: &Path) -> Self {
        Self {
            backend,
            artifact_dir: artifact_dir.to_path_buf(),
            corpus_path: corpus_path.to_path_buf(),
            transitions: Vec::new(),
        }
    }

    /// Run to Ready. Only a failing base model is an error.
    pub fn run(mut self) -> Result<LifecycleOutcome, SummarizeError> {
        let mut state = LifecycleState::LoadTuned;
        let mut serving = None;

        while state != LifecycleState::Ready {
            let step = match state {
                LifecycleState::LoadTuned => self.load_tuned_step(),
                LifecycleState::Train => self.train_step(),
                LifecycleState::Fallback => self.fallback_step()?,
                LifecycleState::Ready => break,
            };
            state = match step {
                Step::Ready(model, reason) => {
                    self.record(state, LifecycleState::Ready, reason);
                    serving = Some(model);
                    LifecycleState::Ready
                }
                Step::Next(next, reason) => {
                    self.record(state, next, reason);
                    next
                }
            };
        }

        let model = serving.ok_or_else(|| {
            SummarizeError::FallbackFailed("lifecycle finished without a model".into())
        })?;
        tracing::info!(model = %model.name, origin = ?model.origin, "Summarization model ready");
        Ok(LifecycleOutcome {
            model,
            transitions: self.transitions,
        })
    }

    fn record(&mut self, from: LifecycleState, to: LifecycleState, reason: String) {
        tracing::info!(?from, ?to, reason = %reason, "Model lifecycle transition");
        self.transitions.push(LifecycleTransition { from, to, reason });
    }

    fn load_tuned_step(&self) -> Step {
        if !tuned_artifact_present(&self.artifact_dir) {
            return Step::Next(
                LifecycleState::Train,
                format!("no tuned artifact at {}", self.artifact_dir.display()),
            );
        }
        match self.backend.load_tuned(&self.artifact_dir) {
            Ok(model) => Step::Ready(model, "tuned artifact loaded".into()),
            Err(e) => {
                tracing::warn!(error = %e, "Tuned artifact present but unusable");
                Step::Next(LifecycleState::Train, format!("tuned artifact unusable: {e}"))
            }
        }
    }

    fn train_step(&self) -> Step {
        match self.train() {
            Ok((model, examples)) => {
                Step::Ready(model, format!("fine-tuned on {examples} examples"))
            }
            Err(e @ SummarizeError::TrainingUnavailable(_)) => {
                Step::Next(LifecycleState::Fallback, e.to_string())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Fine-tuning failed, falling back to base model");
                Step::Next(LifecycleState::Fallback, format!("fine-tuning failed: {e}"))
            }
        }
    }

    fn train(&self) -> Result<(ModelHandle, usize), SummarizeError> {
        let examples = load_training_corpus(&self.corpus_path)?;
        let model = self.backend.fine_tune(&examples, &self.artifact_dir)?;
        Ok((model, examples.len()))
    }

    fn fallback_step(&self) -> Result<Step, SummarizeError> {
        self.backend
            .load_base()
            .map(|model| Step::Ready(model, "untuned base model loaded".into()))
            .map_err(|e| SummarizeError::FallbackFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::summarize::artifact::{write_artifact, ArtifactManifest};
    use crate::pipeline::summarize::backend::{MockModelBackend, ModelOrigin};
    use chrono::Utc;

    struct Fixture {
        _dir: tempfile::TempDir,
        artifact_dir: PathBuf,
        corpus_path: PathBuf,
    }

    fn fixture(with_corpus: bool, with_artifact: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let artifact_dir = dir.path().join("models").join("clinsum-med");
        let corpus_path = dir.path().join("medical_qa.json");
        if with_corpus {
            std::fs::write(
                &corpus_path,
                r#"[{"question":"What is anemia?","answer":"Low red blood cell count."}]"#,
            )
            .unwrap();
        }
        if with_artifact {
            let manifest = ArtifactManifest {
                model: "clinsum-med".into(),
                base_model: "base".into(),
                examples: 1,
                created_at: Utc::now(),
            };
            write_artifact(&artifact_dir, &manifest, None).unwrap();
        }
        Fixture {
            _dir: dir,
            artifact_dir,
            corpus_path,
        }
    }

    fn states(outcome: &LifecycleOutcome) -> Vec<(LifecycleState, LifecycleState)> {
        outcome.transitions.iter().map(|t| (t.from, t.to)).collect()
    }

    #[test]
    fn existing_artifact_loads_directly() {
        let f = fixture(true, true);
        let backend = MockModelBackend::new();
        let outcome = ModelLifecycle::new(&backend, &f.artifact_dir, &f.corpus_path)
            .run()
            .unwrap();
        assert_eq!(outcome.model.origin, ModelOrigin::Tuned);
        assert_eq!(outcome.model.name, "clinsum-med");
        assert_eq!(states(&outcome), vec![(LifecycleState::LoadTuned, LifecycleState::Ready)]);
        assert_eq!(backend.calls(), vec!["load_tuned"]);
    }

    #[test]
    fn no_artifact_trains_and_persists() {
        let f = fixture(true, false);
        let backend = MockModelBackend::new();
        let outcome = ModelLifecycle::new(&backend, &f.artifact_dir, &f.corpus_path)
            .run()
            .unwrap();
        assert_eq!(outcome.model.origin, ModelOrigin::Trained);
        assert_eq!(
            states(&outcome),
            vec![
                (LifecycleState::LoadTuned, LifecycleState::Train),
                (LifecycleState::Train, LifecycleState::Ready),
            ]
        );
        assert!(tuned_artifact_present(&f.artifact_dir));
    }

    #[test]
    fn training_failure_falls_back_without_persisting() {
        let f = fixture(true, false);
        let backend = MockModelBackend::new().failing_training();
        let outcome = ModelLifecycle::new(&backend, &f.artifact_dir, &f.corpus_path)
            .run()
            .unwrap();
        assert_eq!(outcome.model.origin, ModelOrigin::Base);
        assert_eq!(
            states(&outcome),
            vec![
                (LifecycleState::LoadTuned, LifecycleState::Train),
                (LifecycleState::Train, LifecycleState::Fallback),
                (LifecycleState::Fallback, LifecycleState::Ready),
            ]
        );
        assert!(!tuned_artifact_present(&f.artifact_dir));
    }

    #[test]
    fn missing_corpus_skips_fine_tuning() {
        let f = fixture(false, false);
        let backend = MockModelBackend::new();
        let outcome = ModelLifecycle::new(&backend, &f.artifact_dir, &f.corpus_path)
            .run()
            .unwrap();
        assert_eq!(outcome.model.origin, ModelOrigin::Base);
        assert_eq!(backend.calls(), vec!["load_base"]);
        assert!(outcome.transitions[1]
            .reason
            .starts_with("Training corpus unavailable:"));
    }

    #[test]
    fn empty_corpus_reported_as_training_unavailable() {
        let f = fixture(false, false);
        std::fs::write(&f.corpus_path, "[]").unwrap();
        let backend = MockModelBackend::new();
        let outcome = ModelLifecycle::new(&backend, &f.artifact_dir, &f.corpus_path)
            .run()
            .unwrap();
        let reason = &outcome.transitions[1].reason;
        assert_eq!(outcome.transitions[1].to, LifecycleState::Fallback);
        assert!(reason.starts_with("Training corpus unavailable:"), "{reason}");
        assert!(!backend.calls().contains(&"fine_tune".to_string()));
    }

    #[test]
    fn unusable_artifact_proceeds_to_training() {
        let f = fixture(true, true);
        let backend = MockModelBackend::new().failing_tuned();
        let outcome = ModelLifecycle::new(&backend, &f.artifact_dir, &f.corpus_path)
            .run()
            .unwrap();
        assert_eq!(outcome.model.origin, ModelOrigin::Trained);
        assert_eq!(backend.calls(), vec!["load_tuned", "fine_tune"]);
    }

    #[test]
    fn base_failure_is_fatal() {
        let f = fixture(false, false);
        let backend = MockModelBackend::new().failing_base();
        let err = ModelLifecycle::new(&backend, &f.artifact_dir, &f.corpus_path)
            .run()
            .unwrap_err();
        assert!(matches!(err, SummarizeError::FallbackFailed(_)));
    }
}
