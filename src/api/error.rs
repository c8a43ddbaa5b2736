//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::processor::ProcessingError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Preprocessing(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::Preprocessing(detail) => {
                tracing::warn!(detail = %detail, "Preprocessing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PREPROCESSING_FAILED",
                    detail,
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ProcessingError> for ApiError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ProcessingError::NotFound(msg) => ApiError::NotFound(msg),
            e @ ProcessingError::Preprocessing(_) => ApiError::Preprocessing(e.to_string()),
            e @ (ProcessingError::Generation(_) | ProcessingError::Storage(_)) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("Worker task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    use crate::pipeline::extraction::ExtractionError;
    use crate::pipeline::processor::PreprocessingError;
    use crate::pipeline::summarize::SummarizeError;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("Provide doc_id or non-empty text.".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert_eq!(json["error"]["message"], "Provide doc_id or non-empty text.");
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("Document not found.".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "Document not found.");
    }

    #[tokio::test]
    async fn preprocessing_returns_500_with_cause() {
        let err: ApiError = ProcessingError::from(PreprocessingError(ExtractionError::PdfParsing(
            "bad xref".into(),
        )))
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "PREPROCESSING_FAILED");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Preprocessing failed:"));
        assert!(message.contains("bad xref"));
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let err: ApiError =
            ProcessingError::from(SummarizeError::OllamaConnection("http://x".into())).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL");
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn processing_errors_map_by_kind() {
        assert!(matches!(
            ApiError::from(ProcessingError::InvalidInput("x".into())),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(ProcessingError::NotFound("x".into())),
            ApiError::NotFound(_)
        ));
    }
}
