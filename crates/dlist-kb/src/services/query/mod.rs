//! Graph query gateway: parameterized statements and their execution

pub mod service;
pub mod statements;

#[cfg(test)]
mod tests;

pub use service::{GraphQueryGateway, TOP_WRITERS};
