//! In-memory graph store
//!
//! Holds a small property graph and answers every gateway statement by
//! evaluating its [`QueryKind`] against the graph. Used for local development
//! (seeded from a JSON file) and as the store behind tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::{
    data::{errors::StoreError, fields, rows::columns, trace_context::TraceContext, Properties, Record},
    traits::graph_store::{CypherQuery, GraphStore, QueryKind},
};

const SEARCHABLE_NAME_KEYS: &[&str] = &["name", "title"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryNode {
    pub id: i64,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Properties,
}

impl MemoryNode {
    fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    fn record(&self) -> Record {
        let mut record = Record::new();
        record.insert(columns::ID.to_string(), json!(self.id));
        record.insert(columns::LABELS.to_string(), json!(self.labels));
        record.insert(columns::PROPERTIES.to_string(), Value::Object(self.properties.clone()));
        record
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRelationship {
    /// Assigned on load when absent.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub properties: Properties,
}

/// Seed file layout: `{"nodes": [...], "relationships": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryGraph {
    #[serde(default)]
    pub nodes: Vec<MemoryNode>,
    #[serde(default)]
    pub relationships: Vec<MemoryRelationship>,
}

pub struct MemoryGraphStore {
    graph: RwLock<MemoryGraph>,
    next_id: AtomicI64,
    available: AtomicBool,
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self {
            graph: RwLock::new(MemoryGraph::default()),
            next_id: AtomicI64::new(0),
            available: AtomicBool::new(true),
        }
    }

    /// Builds a store from a parsed seed, checking identities and endpoints.
    pub fn from_graph(mut graph: MemoryGraph) -> Result<Self, StoreError> {
        let mut node_ids = HashSet::new();
        for node in &graph.nodes {
            if !node_ids.insert(node.id) {
                return Err(StoreError::InvalidInput(format!("duplicate node id {}", node.id)));
            }
        }
        for rel in &graph.relationships {
            for endpoint in [rel.start, rel.end] {
                if !node_ids.contains(&endpoint) {
                    return Err(StoreError::InvalidInput(format!(
                        "relationship {} references unknown node {}",
                        rel.rel_type, endpoint
                    )));
                }
            }
        }

        let max_id = graph
            .nodes
            .iter()
            .map(|n| n.id)
            .chain(graph.relationships.iter().filter_map(|r| r.id))
            .max()
            .unwrap_or(-1);
        let mut next_id = max_id + 1;
        for rel in graph.relationships.iter_mut().filter(|r| r.id.is_none()) {
            rel.id = Some(next_id);
            next_id += 1;
        }

        Ok(Self {
            graph: RwLock::new(graph),
            next_id: AtomicI64::new(next_id),
            available: AtomicBool::new(true),
        })
    }

    pub async fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            StoreError::ConnectionError(format!("cannot read seed file {}: {}", path.display(), e))
        })?;
        let graph: MemoryGraph = serde_json::from_str(&content).map_err(|e| {
            StoreError::InvalidInput(format!("invalid seed file {}: {}", path.display(), e))
        })?;
        let store = Self::from_graph(graph)?;
        {
            let graph = store.graph.read();
            info!(
                "Loaded in-memory graph from {}: {} nodes, {} relationships",
                path.display(),
                graph.nodes.len(),
                graph.relationships.len()
            );
        }
        Ok(store)
    }

    /// Adds a node and returns its identity. Non-object `properties` are
    /// stored as an empty map.
    pub fn insert_node(&self, labels: &[&str], properties: Value) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let properties = match properties {
            Value::Object(map) => map,
            _ => Properties::new(),
        };
        self.graph.write().nodes.push(MemoryNode {
            id,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties,
        });
        id
    }

    pub fn insert_relationship(&self, start: i64, rel_type: &str, end: i64) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.graph.write().relationships.push(MemoryRelationship {
            id: Some(id),
            rel_type: rel_type.to_string(),
            start,
            end,
            properties: Properties::new(),
        });
        id
    }

    /// Simulates the database going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MemoryGraph {
        self.graph.read().clone()
    }

    fn evaluate(&self, query: &CypherQuery) -> Result<Vec<Record>, StoreError> {
        let graph = self.graph.read();
        let records = match &query.kind {
            QueryKind::Ping => vec![count_record(columns::COUNT, 1)],
            QueryKind::PoetRelationships => {
                let mut rows = relationship_records(&graph, |start, _| start.has_label("Poet"));
                rows.shuffle(&mut rand::thread_rng());
                window(rows, query)
            }
            QueryKind::RelationshipSearch => {
                let term = required_str(query, "searchTerm")?;
                let rows = relationship_records(&graph, |start, end| {
                    contains_term(start, SEARCHABLE_NAME_KEYS, term)
                        || contains_term(end, SEARCHABLE_NAME_KEYS, term)
                });
                window(rows, query)
            }
            QueryKind::NodeExists => {
                let node_id = required_i64(query, "nodeId")?;
                graph
                    .nodes
                    .iter()
                    .find(|n| n.id == node_id)
                    .map(|n| vec![count_record(columns::ID, n.id)])
                    .unwrap_or_default()
            }
            QueryKind::NeighborhoodNodes { depth } => {
                let start = required_i64(query, "nodeId")?;
                let distances = hop_distances(&graph, start, *depth);
                let rows = distances
                    .order
                    .iter()
                    .filter(|id| **id != start || distances.start_on_path)
                    .filter_map(|id| graph.nodes.iter().find(|n| n.id == *id))
                    .map(MemoryNode::record)
                    .collect();
                window(rows, query)
            }
            QueryKind::NeighborhoodRelationships { depth } => {
                let start = required_i64(query, "nodeId")?;
                let distances = hop_distances(&graph, start, *depth);
                let rows = graph
                    .relationships
                    .iter()
                    .filter(|rel| {
                        let nearest = [rel.start, rel.end]
                            .iter()
                            .filter_map(|id| distances.of.get(id))
                            .min()
                            .copied();
                        matches!(nearest, Some(d) if d < *depth)
                    })
                    .map(path_relationship_record)
                    .collect();
                window(rows, query)
            }
            QueryKind::Poems => {
                let mut rows: Vec<Record> = graph
                    .nodes
                    .iter()
                    .filter(|n| n.has_label("Poem"))
                    .map(MemoryNode::record)
                    .collect();
                rows.shuffle(&mut rand::thread_rng());
                window(rows, query)
            }
            QueryKind::PoemSearch => {
                let term = required_str(query, "q")?;
                let mut rows: Vec<Record> = graph
                    .nodes
                    .iter()
                    .filter(|n| n.has_label("Poem") && contains_term(n, fields::POEM_SEARCH_KEYS, term))
                    .map(MemoryNode::record)
                    .collect();
                rows.shuffle(&mut rand::thread_rng());
                window(rows, query)
            }
            QueryKind::RawPoems => {
                let rows = graph
                    .nodes
                    .iter()
                    .filter(|n| n.has_label("Poem"))
                    .map(MemoryNode::record)
                    .collect();
                window(rows, query)
            }
            QueryKind::CountByLabel { label } => {
                let count = graph.nodes.iter().filter(|n| n.has_label(label)).count();
                vec![count_record(columns::COUNT, count as i64)]
            }
            QueryKind::TopWriters { limit } => top_writers(&graph, *limit as usize),
        };
        Ok(records)
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    #[instrument(skip(self, query), fields(trace_id = %trace_ctx.trace_id, kind = ?query.kind))]
    async fn run(
        &self,
        trace_ctx: &TraceContext,
        query: &CypherQuery,
    ) -> Result<Vec<Record>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory graph is switched off".to_string(),
            ));
        }
        let records = self.evaluate(query)?;
        debug!("[memory][trace:{}] {} rows", trace_ctx.trace_id, records.len());
        Ok(records)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

fn required_str<'q>(query: &'q CypherQuery, key: &str) -> Result<&'q str, StoreError> {
    query
        .param_str(key)
        .ok_or_else(|| StoreError::InvalidInput(format!("missing string parameter ${}", key)))
}

fn required_i64(query: &CypherQuery, key: &str) -> Result<i64, StoreError> {
    query
        .param_i64(key)
        .ok_or_else(|| StoreError::InvalidInput(format!("missing integer parameter ${}", key)))
}

/// Applies `$skip` and `$limit` when the statement binds them.
fn window(rows: Vec<Record>, query: &CypherQuery) -> Vec<Record> {
    let skip = query.param_u64("skip").unwrap_or(0);
    let limit = query.param_u64("limit").unwrap_or(u64::MAX);
    rows.into_iter()
        .skip(usize::try_from(skip).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect()
}

fn count_record(column: &str, value: i64) -> Record {
    let mut record = Record::new();
    record.insert(column.to_string(), json!(value));
    record
}

/// `CONTAINS` semantics: only string properties can match.
fn contains_term(node: &MemoryNode, keys: &[&str], term: &str) -> bool {
    keys.iter().any(|key| {
        node.properties
            .get(*key)
            .and_then(Value::as_str)
            .map(|value| value.contains(term))
            .unwrap_or(false)
    })
}

fn relationship_records<F>(graph: &MemoryGraph, keep: F) -> Vec<Record>
where
    F: Fn(&MemoryNode, &MemoryNode) -> bool,
{
    let nodes: HashMap<i64, &MemoryNode> = graph.nodes.iter().map(|n| (n.id, n)).collect();
    graph
        .relationships
        .iter()
        .filter_map(|rel| {
            let start = nodes.get(&rel.start)?;
            let end = nodes.get(&rel.end)?;
            keep(start, end).then(|| {
                let mut record = Record::new();
                record.insert(columns::SOURCE_ID.to_string(), json!(start.id));
                record.insert(columns::SOURCE_LABELS.to_string(), json!(start.labels));
                record.insert(
                    columns::SOURCE_PROPS.to_string(),
                    Value::Object(start.properties.clone()),
                );
                record.insert(columns::REL_TYPE.to_string(), json!(rel.rel_type));
                record.insert(columns::TARGET_ID.to_string(), json!(end.id));
                record.insert(columns::TARGET_LABELS.to_string(), json!(end.labels));
                record.insert(
                    columns::TARGET_PROPS.to_string(),
                    Value::Object(end.properties.clone()),
                );
                record
            })
        })
        .collect()
}

fn path_relationship_record(rel: &MemoryRelationship) -> Record {
    let mut record = Record::new();
    record.insert(columns::ID.to_string(), json!(rel.id));
    record.insert(columns::REL_TYPE.to_string(), json!(rel.rel_type));
    record.insert(columns::START_ID.to_string(), json!(rel.start));
    record.insert(columns::END_ID.to_string(), json!(rel.end));
    record
}

struct HopDistances {
    /// Discovery order, start node first.
    order: Vec<i64>,
    of: HashMap<i64, u32>,
    /// Whether the start node lies on any path of length one or more.
    start_on_path: bool,
}

/// Undirected breadth-first search bounded by `depth` hops.
fn hop_distances(graph: &MemoryGraph, start: i64, depth: u32) -> HopDistances {
    let mut adjacency: HashMap<i64, Vec<i64>> = HashMap::new();
    for rel in &graph.relationships {
        adjacency.entry(rel.start).or_default().push(rel.end);
        adjacency.entry(rel.end).or_default().push(rel.start);
    }

    let mut distances = HopDistances {
        order: vec![start],
        of: HashMap::from([(start, 0)]),
        start_on_path: adjacency.contains_key(&start),
    };
    if depth == 0 {
        return distances;
    }

    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        let current_distance = distances.of[&current];
        if current_distance >= depth {
            continue;
        }
        for next in adjacency.get(&current).into_iter().flatten() {
            if !distances.of.contains_key(next) {
                distances.of.insert(*next, current_distance + 1);
                distances.order.push(*next);
                queue.push_back(*next);
            }
        }
    }
    distances
}

/// Poets grouped by name with their number of `WROTE` relationships to poems.
fn top_writers(graph: &MemoryGraph, limit: usize) -> Vec<Record> {
    let nodes: HashMap<i64, &MemoryNode> = graph.nodes.iter().map(|n| (n.id, n)).collect();
    let mut counts: Vec<(Value, i64)> = Vec::new();
    for rel in graph.relationships.iter().filter(|r| r.rel_type == "WROTE") {
        let (Some(poet), Some(poem)) = (nodes.get(&rel.start), nodes.get(&rel.end)) else {
            continue;
        };
        if !poet.has_label("Poet") || !poem.has_label("Poem") {
            continue;
        }
        let name = poet.properties.get("name").cloned().unwrap_or(Value::Null);
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(name, count)| {
            let mut record = Record::new();
            record.insert(columns::POET.to_string(), name);
            record.insert(columns::WROTE_COUNT.to_string(), json!(count));
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::query::statements;
    use pretty_assertions::assert_eq;

    fn chain() -> (MemoryGraphStore, Vec<i64>) {
        // a - b - c - d, plus an isolated node e
        let store = MemoryGraphStore::new();
        let ids: Vec<i64> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|name| store.insert_node(&["Poet"], json!({ "name": name })))
            .collect();
        store.insert_relationship(ids[0], "KNOWS", ids[1]);
        store.insert_relationship(ids[2], "KNOWS", ids[1]);
        store.insert_relationship(ids[2], "KNOWS", ids[3]);
        (store, ids)
    }

    async fn run(store: &MemoryGraphStore, query: CypherQuery) -> Vec<Record> {
        store.run(&TraceContext::new_root(), &query).await.unwrap()
    }

    #[tokio::test]
    async fn test_neighborhood_follows_both_directions() {
        let (store, ids) = chain();

        let one = run(&store, statements::neighborhood_nodes(ids[1], 1, 200)).await;
        let one: Vec<i64> = one.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(one, vec![ids[1], ids[0], ids[2]]);

        let rels = run(&store, statements::neighborhood_relationships(ids[1], 1, 200)).await;
        assert_eq!(rels.len(), 2);

        let rels = run(&store, statements::neighborhood_relationships(ids[1], 2, 200)).await;
        assert_eq!(rels.len(), 3);
    }

    #[tokio::test]
    async fn test_isolated_node_has_empty_neighborhood() {
        let (store, ids) = chain();
        let nodes = run(&store, statements::neighborhood_nodes(ids[4], 3, 200)).await;
        assert!(nodes.is_empty());
        let exists = run(&store, statements::node_exists(ids[4])).await;
        assert_eq!(exists.len(), 1);
    }

    #[tokio::test]
    async fn test_relationship_search_matches_either_endpoint() {
        let (store, _) = chain();
        let rows = run(&store, statements::relationship_search("d")).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["targetProps"]["name"], json!("d"));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let (store, _) = chain();
        store.set_available(false);
        let result = store.run(&TraceContext::new_root(), &statements::ping()).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_top_writers_group_by_name() {
        let store = MemoryGraphStore::new();
        let du = store.insert_node(&["Poet"], json!({"name": "杜甫"}));
        let li = store.insert_node(&["Poet"], json!({"name": "李白"}));
        for title in ["春望", "登高"] {
            let poem = store.insert_node(&["Poem"], json!({ "title": title }));
            store.insert_relationship(du, "WROTE", poem);
        }
        let poem = store.insert_node(&["Poem"], json!({"title": "静夜思"}));
        store.insert_relationship(li, "WROTE", poem);
        store.insert_relationship(li, "ADMIRES", du);

        let rows = run(&store, statements::top_writers(20)).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["poet"], json!("杜甫"));
        assert_eq!(rows[0]["cnt"], json!(2));
        assert_eq!(rows[1]["cnt"], json!(1));
    }

    #[test]
    fn test_seed_rejects_dangling_relationship() {
        let graph: MemoryGraph = serde_json::from_value(json!({
            "nodes": [{"id": 1, "labels": ["Poet"], "properties": {"name": "李白"}}],
            "relationships": [{"type": "WROTE", "start": 1, "end": 2}]
        }))
        .unwrap();
        assert!(matches!(
            MemoryGraphStore::from_graph(graph),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_seed_assigns_relationship_ids() {
        let graph: MemoryGraph = serde_json::from_value(json!({
            "nodes": [{"id": 4, "labels": ["Poet"]}, {"id": 9, "labels": ["Poem"]}],
            "relationships": [{"type": "WROTE", "start": 4, "end": 9}]
        }))
        .unwrap();
        let store = MemoryGraphStore::from_graph(graph).unwrap();
        assert_eq!(store.snapshot().relationships[0].id, Some(10));
        assert_eq!(store.insert_node(&[], Value::Null), 11);
    }
}
