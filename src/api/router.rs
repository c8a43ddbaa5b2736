//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Layers (outermost → innermost): CORS → trace → body limit → handler.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Largest accepted request body (PDF plus multipart overhead).
const MAX_BODY_BYTES: usize = 55 * 1024 * 1024;

/// Build the API router with the given browser origins allowed.
pub fn api_router(core: Arc<CoreState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/upload", post(endpoints::upload::upload))
        .route("/summarize", post(endpoints::summarize::summarize))
        .with_state(ApiContext::new(core))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

/// Listed origins only, credentials allowed, requested methods and
/// headers mirrored back.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
