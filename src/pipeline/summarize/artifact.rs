use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SummarizeError;

pub const MANIFEST_FILE: &str = "artifact.json";
pub const MODELFILE_FILE: &str = "Modelfile";

/// Record of a completed fine-tuning run, stored beside its Modelfile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    /// Name the tuned model is served under.
    pub model: String,
    pub base_model: String,
    pub examples: usize,
    pub created_at: DateTime<Utc>,
}

pub fn manifest_path(artifact_dir: &Path) -> PathBuf {
    artifact_dir.join(MANIFEST_FILE)
}

/// Whether a fine-tuned artifact has been persisted at `artifact_dir`.
pub fn tuned_artifact_present(artifact_dir: &Path) -> bool {
    manifest_path(artifact_dir).is_file()
}

pub fn read_manifest(artifact_dir: &Path) -> Result<ArtifactManifest, SummarizeError> {
    let raw = std::fs::read_to_string(manifest_path(artifact_dir))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Persist the manifest and, when given, the Modelfile that produced it.
///
/// The manifest is written last so a half-written artifact is never
/// reported as present.
pub fn write_artifact(
    artifact_dir: &Path,
    manifest: &ArtifactManifest,
    modelfile: Option<&str>,
) -> Result<(), SummarizeError> {
    std::fs::create_dir_all(artifact_dir)?;
    if let Some(modelfile) = modelfile {
        std::fs::write(artifact_dir.join(MODELFILE_FILE), modelfile)?;
    }
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(manifest_path(artifact_dir), json)?;
    tracing::info!(
        dir = %artifact_dir.display(),
        model = %manifest.model,
        examples = manifest.examples,
        "Tuned model artifact persisted"
    );
    Ok(())
}
