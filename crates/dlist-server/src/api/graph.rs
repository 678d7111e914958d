//! Knowledge graph endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use dlist_kb::{
    services::pagination::{coerce_depth, coerce_node_limit, parse_node_id},
    GraphView, NeighborhoodView, Page, TraceContext,
};

use crate::api::errors::ApiError;
use crate::server::DlistServer;

/// Query string of `GET /knowledgeGraph`. Numbers stay strings here so that
/// malformed values are coerced instead of rejected.
#[derive(Debug, Default, Deserialize)]
pub struct GraphParams {
    pub search: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NodeParams {
    pub depth: Option<String>,
    pub limit: Option<String>,
}

/// `GET /knowledgeGraph`
pub async fn knowledge_graph_handler(
    State(server): State<Arc<DlistServer>>,
    Query(params): Query<GraphParams>,
) -> Result<Json<GraphView>, ApiError> {
    let trace_ctx = TraceContext::new_root();
    let page = Page::for_graph(params.limit.as_deref(), params.skip.as_deref());
    info!(
        trace_id = %trace_ctx.trace_id,
        "Knowledge graph requested (search={:?}, skip={}, limit={})",
        params.search,
        page.skip,
        page.limit
    );

    server
        .gateway()
        .knowledge_graph(&trace_ctx, params.search.as_deref(), page)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_core(e, "Failed to fetch data"))
}

/// `GET /knowledgeGraph/node/:id`
pub async fn node_handler(
    State(server): State<Arc<DlistServer>>,
    Path(node_id): Path<String>,
    Query(params): Query<NodeParams>,
) -> Result<Json<NeighborhoodView>, ApiError> {
    let node_id =
        parse_node_id(&node_id).map_err(|e| ApiError::from_core(e, "Internal server error"))?;
    let depth = coerce_depth(params.depth.as_deref(), server.max_node_depth());
    let limit = coerce_node_limit(params.limit.as_deref());

    let trace_ctx = TraceContext::new_root();
    info!(
        trace_id = %trace_ctx.trace_id,
        "Node subgraph requested (node={}, depth={}, limit={})",
        node_id,
        depth,
        limit
    );

    server
        .gateway()
        .node_neighborhood(&trace_ctx, node_id, depth, limit)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_core(e, "Internal server error"))
}
