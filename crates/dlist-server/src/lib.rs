//!
//! Dlist Server - HTTP API over the classical poetry knowledge graph
//!
//! This module exports all the components of the Dlist server.

use std::sync::Arc;

use tracing::info;

use dlist_kb::{GraphStore, MemoryGraphStore, Neo4jGraphStore};

/// API module
pub mod api;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Server module
pub mod server;

// Re-export key types
pub use config::{GraphBackend, LogFormat, LoggingConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::DlistServer;

/// Run function
///
/// Building the graph store is the only fatal startup step; an unreachable
/// database is logged and the server starts anyway.
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    let store = create_graph_store(&config).await?;
    let server = DlistServer::new(config, store);
    server.probe_store().await;
    server.run().await
}

/// Create the configured graph store
pub async fn create_graph_store(config: &ServerConfig) -> ServerResult<Arc<dyn GraphStore>> {
    match config.graph_backend {
        GraphBackend::Neo4j => {
            info!("Using Neo4j graph store at {}", config.neo4j.uri);
            let store = Neo4jGraphStore::connect(config.neo4j.clone()).await?;
            Ok(Arc::new(store))
        }
        GraphBackend::Memory => {
            let seed = config.graph_seed_file.as_deref().ok_or_else(|| {
                ServerError::ConfigError("GRAPH_BACKEND=memory requires GRAPH_SEED_FILE".to_string())
            })?;
            info!("Using in-memory graph store seeded from {}", seed.display());
            let store = MemoryGraphStore::from_seed_file(seed).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Initialize logging
///
/// `RUST_LOG` wins over the configured level. Safe to call more than once.
pub fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let result = match logging.format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).with_target(true).try_init(),
    };
    if result.is_err() {
        tracing::debug!("Global tracing subscriber already installed");
    }
}
