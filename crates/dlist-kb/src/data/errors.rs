//! Error types for the Dlist knowledge base

use std::path::PathBuf;

use thiserror::Error;

/// Base error type for gateway, normalizer and fallback operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Entity not found: type={entity_type} id={id}")]
    NotFound { entity_type: String, id: String },

    #[error("Graph store failure: {0}")]
    UpstreamFailure(#[from] StoreError),

    #[error("Failed to parse fallback file {}: {reason}", file.display())]
    PartialParseFailure { file: PathBuf, reason: String },

    #[error("Fallback data unavailable: {0}")]
    FallbackUnavailable(String),

}

impl CoreError {
    /// Helper to create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// True when the error originated in the graph store.
    pub fn is_upstream(&self) -> bool {
        matches!(self, CoreError::UpstreamFailure(_))
    }
}

/// Specific error type for the graph store (database interaction).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Graph database connection error: {0}")]
    ConnectionError(String),
    #[error("Graph query execution error: {0}")]
    QueryError(String),
    #[error("Data mapping error from graph result: {0}")]
    MappingError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Graph store unavailable: {0}")]
    Unavailable(String),
}
