//! Graph store implementations

pub mod memory_store;
#[cfg(feature = "neo4j")]
pub mod neo4j_store;

pub use memory_store::{MemoryGraph, MemoryGraphStore, MemoryNode, MemoryRelationship};
#[cfg(feature = "neo4j")]
pub use neo4j_store::{Neo4jConfig, Neo4jGraphStore};
