//! Health check endpoint
//!
//! Liveness only: the graph store is not consulted, so the
//! endpoint answers while the database is down.

use axum::{http::StatusCode, response::IntoResponse};
use tracing::debug;

/// Health check handler
pub async fn health_check() -> impl IntoResponse {
    debug!("Health check requested");
    (StatusCode::OK, "OK")
}
