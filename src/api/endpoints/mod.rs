//! API endpoint handlers.
//!
//! Handlers parse the request, hand the blocking pipeline work to
//! `spawn_blocking`, and shape the response. Business logic lives in
//! `pipeline::processor`.

pub mod health;
pub mod summarize;
pub mod upload;
