//! Poem listing endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use dlist_kb::{
    services::pagination::coerce_raw_limit, Page, PoemListing, RawNodeListing, TraceContext,
};

use crate::api::errors::ApiError;
use crate::server::DlistServer;

#[derive(Debug, Default, Deserialize)]
pub struct PoemParams {
    pub search: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawParams {
    pub limit: Option<String>,
}

/// `GET /poems`
pub async fn poems_handler(
    State(server): State<Arc<DlistServer>>,
    Query(params): Query<PoemParams>,
) -> Result<Json<PoemListing>, ApiError> {
    let trace_ctx = TraceContext::new_root();
    let page = Page::for_poems(params.limit.as_deref(), params.skip.as_deref());

    let listing = server
        .catalog()
        .list(&trace_ctx, params.search.as_deref(), page)
        .await
        .map_err(|e| ApiError::from_core(e, "Failed to fetch poems"))?;

    info!(
        trace_id = %trace_ctx.trace_id,
        "Returning {} poems (fallback: {})",
        listing.poems.len(),
        listing.is_fallback()
    );
    Ok(Json(listing))
}

/// `GET /poems/raw`: unfiltered poem nodes for debugging the data set.
pub async fn raw_poems_handler(
    State(server): State<Arc<DlistServer>>,
    Query(params): Query<RawParams>,
) -> Result<Json<RawNodeListing>, ApiError> {
    let limit = coerce_raw_limit(params.limit.as_deref());
    server
        .gateway()
        .raw_poems(&TraceContext::new_root(), limit)
        .await
        .map(Json)
        .map_err(|e| ApiError::with_detail(e, "Failed to fetch raw poems"))
}
