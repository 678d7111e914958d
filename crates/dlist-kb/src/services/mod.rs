//! Core services for the Dlist knowledge base

pub mod fallback;
pub mod normalizer;
pub mod pagination;
pub mod poems;
pub mod query;

// Re-exports
pub use fallback::FallbackPoemSource;
pub use pagination::Page;
pub use poems::PoemCatalog;
pub use query::GraphQueryGateway;
