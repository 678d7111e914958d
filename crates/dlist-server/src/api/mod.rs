//! API module for the Dlist server
//!
//! Routes, the catch-all 404, panic recovery, CORS and request tracing.

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};

pub mod errors;
pub mod graph;
pub mod health;
pub mod poems;
pub mod stats;

use crate::server::DlistServer;

/// Build the router for API endpoints
pub fn build_router(server: Arc<DlistServer>) -> Router {
    let cors_origin = server.config.cors_origin.clone();
    let routes = Router::new()
        // Knowledge graph
        .route("/knowledgeGraph", get(graph::knowledge_graph_handler))
        .route("/knowledgeGraph/node/:id", get(graph::node_handler))
        // Poems
        .route("/poems", get(poems::poems_handler))
        .route("/poems/raw", get(poems::raw_poems_handler))
        // Dataset statistics
        .route("/stats", get(stats::stats_handler))
        // Health check
        .route("/health", get(health::health_check))
        .fallback(not_found)
        // Shared state
        .with_state(server);

    apply_middleware(routes, &cors_origin)
}

/// Wraps `router` in the panic, CORS and tracing layers.
pub fn apply_middleware(router: Router, cors_origin: &str) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, cross-origin requests will be refused", origin);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Sorry can't find that!")
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let reason = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("Request handler panicked: {}", reason);
    (StatusCode::INTERNAL_SERVER_ERROR, "Something broke!").into_response()
}
