//! Dlist poetry knowledge graph core
//!
//! Graph query gateway, result normalization into `{nodes, links}` views,
//! pagination and the on-disk fallback poem source.

// Core modules
pub mod adapters;
pub mod data;
pub mod services;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenient usage
pub use data::errors::{CoreError, StoreError};
pub use data::trace_context::TraceContext;
pub use data::view::{
    GraphLink, GraphNode, GraphStats, GraphView, NeighborhoodMetadata, NeighborhoodView, NodeId,
    PoemListing, PoemListingMetadata, PoemRecord, RawNode, RawNodeListing, WriterCount,
};

// Re-export core traits
pub use traits::{CypherQuery, GraphStore, QueryKind};

// Re-export core services
pub use services::{FallbackPoemSource, GraphQueryGateway, Page, PoemCatalog};

pub use adapters::MemoryGraphStore;
#[cfg(feature = "neo4j")]
pub use adapters::{Neo4jConfig, Neo4jGraphStore};
