//! Health check endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::types::{ApiContext, HealthResponse};

/// `GET /health`: liveness plus the model serving requests.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let model = ctx.core.engine().model();
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model: model.name.clone(),
        model_origin: model.origin,
    })
}
