use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::{
    data::{
        rows::{self, columns},
        CoreError, EntityRow, GraphStats, GraphView, NeighborhoodView, PathRelationshipRow,
        PoemRecord, RawNode, RawNodeListing, Record, RelationshipRow, StoreError, TraceContext,
        WriterCount,
    },
    services::{normalizer, pagination::Page, query::statements},
    traits::{CypherQuery, GraphStore},
};

/// Number of poets listed in the stats ranking.
pub const TOP_WRITERS: u32 = 20;

/// Builds parameterized queries, runs them on the graph store and hands the
/// rows to the normalizer.
#[derive(Clone)]
pub struct GraphQueryGateway {
    store: Arc<dyn GraphStore>,
}

impl GraphQueryGateway {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Runs one statement and logs failures with the statement kind.
    async fn fetch(
        &self,
        trace_ctx: &TraceContext,
        query: &CypherQuery,
    ) -> Result<Vec<Record>, CoreError> {
        debug!(
            kind = ?query.kind,
            params = ?query.params,
            "[{}][trace:{}] {}",
            self.store.backend(),
            trace_ctx.trace_id,
            query.text
        );
        self.store.run(trace_ctx, query).await.map_err(|e| {
            error!("Graph query {:?} failed: {}", query.kind, e);
            CoreError::UpstreamFailure(e)
        })
    }

    /// Relationship rows matching `search`, or a random poet-anchored sample
    /// when the term is missing or blank.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn knowledge_graph(
        &self,
        trace_ctx: &TraceContext,
        search: Option<&str>,
        page: Page,
    ) -> Result<GraphView, CoreError> {
        let query = match search.filter(|term| !term.trim().is_empty()) {
            Some(term) => statements::relationship_search(term),
            None => statements::poet_relationships(),
        }
        .paginate(page);

        let records = self.fetch(trace_ctx, &query).await?;
        let rows = decode(&records, RelationshipRow::from_record)?;
        let view = normalizer::normalize_relationship_rows(rows);
        info!(
            "Knowledge graph: {} rows -> {} nodes, {} links",
            records.len(),
            view.nodes.len(),
            view.links.len()
        );
        Ok(view)
    }

    /// Subgraph of everything reachable from `node_id` within `depth` hops.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn node_neighborhood(
        &self,
        trace_ctx: &TraceContext,
        node_id: i64,
        depth: u32,
        limit: u64,
    ) -> Result<NeighborhoodView, CoreError> {
        let exists = self
            .fetch(&trace_ctx.new_child(), &statements::node_exists(node_id))
            .await?;
        if exists.is_empty() {
            return Err(CoreError::not_found("Node", node_id.to_string()));
        }

        let node_records = self
            .fetch(
                &trace_ctx.new_child(),
                &statements::neighborhood_nodes(node_id, depth, limit),
            )
            .await?;
        let rel_records = self
            .fetch(
                &trace_ctx.new_child(),
                &statements::neighborhood_relationships(node_id, depth, limit),
            )
            .await?;

        let nodes = decode(&node_records, EntityRow::from_record)?;
        let rels = decode(&rel_records, PathRelationshipRow::from_record)?;
        let view = normalizer::normalize_neighborhood(nodes, rels);
        Ok(NeighborhoodView::new(view, node_id, depth))
    }

    /// Poem nodes, optionally filtered by a trimmed search term, randomized
    /// and paginated.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn poems(
        &self,
        trace_ctx: &TraceContext,
        search: Option<&str>,
        page: Page,
    ) -> Result<Vec<PoemRecord>, CoreError> {
        let query = match search.map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => statements::poem_search(term),
            None => statements::poems(),
        }
        .paginate(page);

        let records = self.fetch(trace_ctx, &query).await?;
        let nodes = decode(&records, EntityRow::from_record)?;
        Ok(normalizer::normalize_poems(nodes))
    }

    /// First `limit` poem nodes with labels and raw properties.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn raw_poems(
        &self,
        trace_ctx: &TraceContext,
        limit: u64,
    ) -> Result<RawNodeListing, CoreError> {
        let records = self.fetch(trace_ctx, &statements::raw_poems(limit)).await?;
        let rows: Vec<RawNode> = decode(&records, EntityRow::from_record)?
            .into_iter()
            .map(|entity| RawNode {
                id: entity.identity,
                labels: entity.labels,
                properties: entity.properties,
            })
            .collect();
        Ok(RawNodeListing {
            count: rows.len(),
            rows,
        })
    }

    /// Poet and poem counts plus the most prolific poets.
    #[instrument(skip(self, trace_ctx), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn stats(&self, trace_ctx: &TraceContext) -> Result<GraphStats, CoreError> {
        let poets = self.count(trace_ctx, "Poet").await?;
        let poems = self.count(trace_ctx, "Poem").await?;

        let records = self
            .fetch(&trace_ctx.new_child(), &statements::top_writers(TOP_WRITERS))
            .await?;
        let top_wrote = decode(&records, |record| {
            Ok(WriterCount {
                poet: rows::optional_str(record, columns::POET)?,
                count: rows::required_i64(record, columns::WROTE_COUNT)?,
            })
        })?;

        Ok(GraphStats {
            poets,
            poems,
            top_wrote,
        })
    }

    async fn count(&self, trace_ctx: &TraceContext, label: &str) -> Result<i64, CoreError> {
        let records = self
            .fetch(&trace_ctx.new_child(), &statements::count_by_label(label))
            .await?;
        let record = records.first().ok_or_else(|| {
            CoreError::UpstreamFailure(StoreError::MappingError(format!(
                "count of {} returned no rows",
                label
            )))
        })?;
        Ok(rows::required_i64(record, columns::COUNT)?)
    }

    /// Connectivity probe used at startup.
    pub async fn ping(&self, trace_ctx: &TraceContext) -> Result<(), CoreError> {
        self.fetch(trace_ctx, &statements::ping()).await.map(|_| ())
    }
}

fn decode<T, F>(records: &[Record], decode_one: F) -> Result<Vec<T>, CoreError>
where
    F: Fn(&Record) -> Result<T, StoreError>,
{
    records
        .iter()
        .map(|record| decode_one(record).map_err(CoreError::from))
        .collect()
}
