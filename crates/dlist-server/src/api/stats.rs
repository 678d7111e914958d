//! Dataset statistics endpoint

use std::sync::Arc;

use axum::{extract::State, Json};

use dlist_kb::{GraphStats, TraceContext};

use crate::api::errors::ApiError;
use crate::server::DlistServer;

/// `GET /stats`
pub async fn stats_handler(
    State(server): State<Arc<DlistServer>>,
) -> Result<Json<GraphStats>, ApiError> {
    server
        .gateway()
        .stats(&TraceContext::new_root())
        .await
        .map(Json)
        .map_err(|e| ApiError::from_core(e, "Failed to fetch stats"))
}
