//! `POST /summarize`: dual-audience summaries with provenance.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SummarizeRequest, SummarizeResponse};
use crate::config::DISCLAIMER;

/// Summarize a stored document by `doc_id`, or inline `text`.
pub async fn summarize(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let core = ctx.core.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        core.processor()
            .summarize(request.doc_id.as_deref(), request.text.as_deref())
    })
    .await??;

    Ok(Json(SummarizeResponse {
        patient_summary: outcome.patient_summary,
        clinician_summary: outcome.clinician_summary,
        provenance: outcome.provenance,
        patient_reading_grade: outcome.patient_reading_grade,
        disclaimer: DISCLAIMER,
    }))
}
