use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::{TRAIN_MAX_INPUT_TOKENS, TRAIN_MAX_TARGET_TOKENS};

/// Why fine-tuning cannot start.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("corpus not found at {0}")]
    Missing(String),

    #[error("corpus unreadable: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("corpus is not a JSON array of question/answer records: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("corpus has no usable records")]
    Empty,
}

/// One labeled record of the question/answer corpus.
#[derive(Debug, Clone, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
}

/// A rendered, truncated input/target pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub input: String,
    pub target: String,
}

impl TrainingExample {
    /// Render a record as `summarize: <question> <answer>` → `<answer>`,
    /// truncated to the training token limits.
    pub fn from_record(record: &QaRecord) -> Self {
        let input = format!("summarize: {} {}", record.question.trim(), record.answer.trim());
        Self {
            input: truncate_tokens(&input, TRAIN_MAX_INPUT_TOKENS),
            target: truncate_tokens(record.answer.trim(), TRAIN_MAX_TARGET_TOKENS),
        }
    }
}

/// Keep the first `max_tokens` whitespace-delimited tokens.
///
/// Text within the limit is returned unchanged; longer text is re-joined
/// with single spaces.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    if text.split_whitespace().count() <= max_tokens {
        return text.to_string();
    }
    text.split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Load and render the training corpus.
///
/// Records with a blank question or answer are skipped. A missing file,
/// bad JSON, or zero usable records is reported as [`CorpusError`].
pub fn load_training_corpus(path: &Path) -> Result<Vec<TrainingExample>, CorpusError> {
    if !path.is_file() {
        return Err(CorpusError::Missing(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    let records: Vec<QaRecord> = serde_json::from_str(&raw)?;

    let examples: Vec<TrainingExample> = records
        .iter()
        .filter(|r| !r.question.trim().is_empty() && !r.answer.trim().is_empty())
        .map(TrainingExample::from_record)
        .collect();

    if examples.is_empty() {
        return Err(CorpusError::Empty);
    }
    tracing::info!(
        path = %path.display(),
        records = records.len(),
        examples = examples.len(),
        "Training corpus loaded"
    );
    Ok(examples)
}
