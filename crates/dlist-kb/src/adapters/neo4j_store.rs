use std::sync::Arc;

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    data::{errors::StoreError, trace_context::TraceContext, Record},
    traits::graph_store::{CypherQuery, GraphStore},
};

macro_rules! trace_neo4j {
    ($trace_ctx:expr, $($arg:tt)*) => {
        debug!("[Neo4j][trace:{}] {}", $trace_ctx.trace_id, format!($($arg)*));
    };
}

/// Configuration for the Neo4j connection pool
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: Option<String>,
    pub pool_size: usize,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: "password".to_string(),
            database: None,
            pool_size: 10,
        }
    }
}

/// Neo4j implementation of the `GraphStore` trait
///
/// The driver keeps a bounded connection pool; each `run` borrows one
/// connection for the duration of the statement.
pub struct Neo4jGraphStore {
    graph: Arc<Graph>,
    config: Neo4jConfig,
}

impl Neo4jGraphStore {
    /// Builds the driver. Fails only on invalid configuration or when the
    /// pool cannot be created; the server is not probed here.
    pub async fn connect(config: Neo4jConfig) -> Result<Self, StoreError> {
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .max_connections(config.pool_size);
        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }

        let neo4j_config = builder.build().map_err(|e| {
            StoreError::ConnectionError(format!("Failed to build Neo4j config: {}", e))
        })?;
        let graph = Graph::connect(neo4j_config).await.map_err(|e| {
            StoreError::ConnectionError(format!("Failed to create Neo4j driver for {}: {}", config.uri, e))
        })?;

        info!(
            "Neo4j driver ready for {} (pool size {})",
            config.uri, config.pool_size
        );
        Ok(Self {
            graph: Arc::new(graph),
            config,
        })
    }

    pub fn config(&self) -> &Neo4jConfig {
        &self.config
    }

    fn build_query(query: &CypherQuery) -> Query {
        let mut q = Query::new(query.text.clone());
        for (key, value) in &query.params {
            q = match value {
                Value::Null => q,
                Value::Bool(b) => q.param(key, *b),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => q.param(key, i),
                    None => q.param(key, n.as_f64().unwrap_or_default()),
                },
                Value::String(s) => q.param(key, s.as_str()),
                Value::Array(items) => {
                    let strings: Vec<String> = items
                        .iter()
                        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                        .collect();
                    q.param(key, strings)
                }
                Value::Object(_) => {
                    warn!("Skipping object parameter: {}", key);
                    q
                }
            };
        }
        q
    }

    fn row_to_record(row: &neo4rs::Row, columns: &[&'static str]) -> Result<Record, StoreError> {
        let mut record = Record::new();
        for column in columns {
            let value = row.get::<Value>(column).map_err(|e| {
                StoreError::MappingError(format!("column '{}' could not be read: {}", column, e))
            })?;
            record.insert((*column).to_string(), value);
        }
        Ok(record)
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    #[instrument(skip(self, query), fields(trace_id = %trace_ctx.trace_id, kind = ?query.kind))]
    async fn run(
        &self,
        trace_ctx: &TraceContext,
        query: &CypherQuery,
    ) -> Result<Vec<Record>, StoreError> {
        trace_neo4j!(trace_ctx, "{} {:?}", query.text, query.params);

        let mut stream = self
            .graph
            .execute(Self::build_query(query))
            .await
            .map_err(|e| StoreError::QueryError(format!("Failed to execute query: {}", e)))?;

        let mut records = Vec::new();
        while let Some(row) = stream
            .next()
            .await
            .map_err(|e| StoreError::QueryError(format!("Failed to read result row: {}", e)))?
        {
            records.push(Self::row_to_record(&row, &query.columns)?);
        }

        trace_neo4j!(trace_ctx, "{} rows", records.len());
        Ok(records)
    }

    fn backend(&self) -> &'static str {
        "neo4j"
    }
}
