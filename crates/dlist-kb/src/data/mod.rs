//! Core data structures for the Dlist knowledge base

pub mod errors;
pub mod fields;
pub mod rows;
pub mod trace_context;
pub mod view;

/// Stored attributes of a node or fallback record.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// One result row keyed by column name.
pub type Record = serde_json::Map<String, serde_json::Value>;

pub use errors::{CoreError, StoreError};
pub use rows::{EntityRow, PathRelationshipRow, RelationshipRow};
pub use trace_context::TraceContext;
pub use view::{
    GraphLink, GraphNode, GraphStats, GraphView, NeighborhoodMetadata, NeighborhoodView, NodeId,
    PoemListing, PoemListingMetadata, PoemRecord, RawNode, RawNodeListing, WriterCount,
    UNKNOWN_NODE_TYPE,
};
