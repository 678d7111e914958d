//! GraphStore trait definition for graph database interaction

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::data::{errors::StoreError, trace_context::TraceContext, Record};

/// Which gateway statement a query is.
///
/// Backends that cannot compile Cypher (the in-memory store) evaluate the
/// statement from its kind and parameters instead of its text. Values that
/// Cypher cannot bind as parameters, such as labels and path-length bounds,
/// are carried here as well as in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    /// Connectivity probe.
    Ping,
    /// Relationships anchored at `Poet` nodes in random order.
    PoetRelationships,
    /// Relationships whose endpoints' name/title contain `$searchTerm`.
    RelationshipSearch,
    /// Existence check for the node with identity `$nodeId`.
    NodeExists,
    /// Distinct nodes on paths of length `1..depth` from `$nodeId`.
    NeighborhoodNodes { depth: u32 },
    /// Distinct relationships on paths of length `1..depth` from `$nodeId`.
    NeighborhoodRelationships { depth: u32 },
    /// `Poem` nodes in random order.
    Poems,
    /// `Poem` nodes with a searchable property containing `$q`.
    PoemSearch,
    /// First `$limit` `Poem` nodes, unfiltered.
    RawPoems,
    /// Number of nodes carrying `label`.
    CountByLabel { label: String },
    /// Poets ranked by number of `WROTE` relationships to poems.
    TopWriters { limit: u32 },
}

/// A parameterized Cypher statement plus the columns it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    pub kind: QueryKind,
    pub text: String,
    pub params: BTreeMap<String, Value>,
    pub columns: Vec<&'static str>,
    pub(crate) paginated: bool,
}

impl CypherQuery {
    pub fn new(kind: QueryKind, text: impl Into<String>, columns: &[&'static str]) -> Self {
        Self {
            kind,
            text: text.into(),
            params: BTreeMap::new(),
            columns: columns.to_vec(),
            paginated: false,
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn param_i64(&self, key: &str) -> Option<i64> {
        self.params.get(key).and_then(Value::as_i64)
    }

    pub fn param_u64(&self, key: &str) -> Option<u64> {
        self.params.get(key).and_then(Value::as_u64)
    }

    pub fn is_paginated(&self) -> bool {
        self.paginated
    }
}

/// Represents the interface for reading from the graph database.
///
/// Implementations acquire a connection per call and release it before
/// returning, on success and on error alike.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Executes a query and returns its rows keyed by `query.columns`.
    async fn run(
        &self,
        trace_ctx: &TraceContext,
        query: &CypherQuery,
    ) -> Result<Vec<Record>, StoreError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
