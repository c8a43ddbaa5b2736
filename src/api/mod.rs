//! HTTP API.
//!
//! `api_router()` exposes ingestion (`POST /upload`), summarization
//! (`POST /summarize`) and a health check over the shared `CoreState`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::serve;
pub use types::ApiContext;
