//! Shared types for the HTTP API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::pipeline::processor::AudienceProvenance;
use crate::pipeline::segment::Section;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes. Cheap to clone.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub doc_id: String,
    pub message: &'static str,
    pub disclaimer: &'static str,
    pub sections_preview: Vec<Section>,
}

/// `POST /summarize` body. Both fields optional; `doc_id` wins.
#[derive(Debug, Default, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub patient_summary: String,
    pub clinician_summary: String,
    pub provenance: AudienceProvenance,
    pub patient_reading_grade: f32,
    pub disclaimer: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub model_origin: crate::pipeline::summarize::ModelOrigin,
}
