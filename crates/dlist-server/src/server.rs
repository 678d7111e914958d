//! Main Dlist server implementation
//!
//! [`DlistServer`] is the application state shared by all handlers. It owns
//! the gateway over the injected graph store and the poem catalog.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use dlist_kb::{
    FallbackPoemSource, GraphQueryGateway, GraphStore, PoemCatalog, TraceContext,
};

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Main server implementation
#[derive(Clone)]
pub struct DlistServer {
    /// Configuration
    pub config: ServerConfig,

    gateway: GraphQueryGateway,

    catalog: PoemCatalog,
}

/// Manual Debug implementation that doesn't try to debug the trait objects
impl std::fmt::Debug for DlistServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DlistServer")
            .field("config", &self.config)
            .field("backend", &self.gateway.store().backend())
            .finish()
    }
}

impl DlistServer {
    /// Create a new DlistServer over `store`
    pub fn new(config: ServerConfig, store: Arc<dyn GraphStore>) -> Self {
        let gateway = GraphQueryGateway::new(store);
        let catalog = PoemCatalog::new(
            gateway.clone(),
            FallbackPoemSource::new(config.fallback_poems_dir.clone()),
        );
        Self {
            config,
            gateway,
            catalog,
        }
    }

    pub fn gateway(&self) -> &GraphQueryGateway {
        &self.gateway
    }

    pub fn catalog(&self) -> &PoemCatalog {
        &self.catalog
    }

    pub fn max_node_depth(&self) -> u32 {
        self.config.max_node_depth
    }

    /// Runs `RETURN 1` against the store. A failure only degrades the
    /// service: graph endpoints will fail and the poem list falls back.
    pub async fn probe_store(&self) -> bool {
        match self.gateway.ping(&TraceContext::new_root()).await {
            Ok(()) => {
                info!("Graph store ({}) is reachable", self.gateway.store().backend());
                true
            }
            Err(e) => {
                warn!("Graph store connectivity check failed, starting degraded: {}", e);
                false
            }
        }
    }

    /// Run the server until Ctrl-C
    pub async fn run(self) -> ServerResult<()> {
        info!("Starting Dlist server");

        let app = crate::api::build_router(Arc::new(self.clone()));

        let listener =
            TcpListener::bind((self.config.bind_address.as_str(), self.config.port)).await?;
        let addr: SocketAddr = listener.local_addr()?;
        info!("Listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for the shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
