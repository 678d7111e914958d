use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::data::{errors::StoreError, trace_context::TraceContext, Record};
use crate::traits::graph_store::{CypherQuery, GraphStore};

/// A store whose every query fails with a connection error.
#[derive(Debug, Default)]
pub struct FailingGraphStore {
    calls: AtomicUsize,
}

impl FailingGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queries attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GraphStore for FailingGraphStore {
    async fn run(
        &self,
        _trace_ctx: &TraceContext,
        query: &CypherQuery,
    ) -> Result<Vec<Record>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::ConnectionError(format!(
            "connection refused while running {:?}",
            query.kind
        )))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
