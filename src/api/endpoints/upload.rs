//! Document upload endpoint.
//!
//! `POST /upload`: multipart form with an optional `file` (PDF) and an
//! optional `text` field. The document is extracted, normalized,
//! segmented and stored; the response carries its id and a preview.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UploadResponse};
use crate::config::DISCLAIMER;

pub async fn upload(
    State(ctx): State<ApiContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut file: Option<Vec<u8>> = None;
    let mut text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let bytes = field.bytes().await.map_err(|e| {
                    tracing::warn!("Failed to read upload bytes: {e}");
                    ApiError::BadRequest("Failed to read file data.".into())
                })?;
                file = Some(bytes.to_vec());
            }
            "text" => {
                text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.body_text()))?,
                );
            }
            _ => {}
        }
    }

    tracing::info!(
        file_bytes = file.as_ref().map_or(0, Vec::len),
        text_chars = text.as_ref().map_or(0, String::len),
        "Upload received"
    );

    let core = ctx.core.clone();
    let outcome =
        tokio::task::spawn_blocking(move || core.processor().ingest(file, text.as_deref()))
            .await??;

    Ok(Json(UploadResponse {
        doc_id: outcome.doc_id,
        message: "Uploaded and processed successfully.",
        disclaimer: DISCLAIMER,
        sections_preview: outcome.sections_preview,
    }))
}
