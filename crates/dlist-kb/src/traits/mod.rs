//! Trait definitions for the external collaborators of the knowledge base

pub mod graph_store;

pub use graph_store::{CypherQuery, GraphStore, QueryKind};
