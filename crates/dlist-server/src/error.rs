//! Error types for the Dlist server
//!
//! Startup and configuration failures. Per-request failures are translated
//! to HTTP responses in [`crate::api::errors`].

use thiserror::Error;

use dlist_kb::StoreError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Graph store could not be created
    #[error("Graph store error: {0}")]
    StoreError(#[from] StoreError),

    /// Socket or file system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;
