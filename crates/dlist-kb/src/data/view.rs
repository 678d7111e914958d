//! View model returned to the presentation layer
//!
//! Everything in this module is built fresh per request from query rows or
//! fallback files and serialized unchanged into the HTTP response.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::Properties;

/// Node type used when a node carries no labels.
pub const UNKNOWN_NODE_TYPE: &str = "unknown";

/// Identifier of a node within one response.
///
/// The internal database identity is preferred; nodes without one are keyed
/// by their resolved display label. `Internal(5)` and `Label("5")` are
/// different ids, matching how the front end compares them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Internal(i64),
    Label(String),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Internal(id) => write!(f, "{}", id),
            NodeId::Label(label) => f.write_str(label),
        }
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        NodeId::Internal(id)
    }
}

/// A node of the force-directed graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub group: String,
    pub properties: Properties,
    pub neo4j_id: Option<i64>,
}

/// A directed link between two nodes of the same response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub link_type: String,
}

/// `{nodes, links}` payload of the knowledge graph endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphView {
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodMetadata {
    pub node_count: usize,
    pub link_count: usize,
}

/// Subgraph centered on one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodView {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub description: String,
    pub metadata: NeighborhoodMetadata,
}

impl NeighborhoodView {
    pub fn new(view: GraphView, node_id: i64, depth: u32) -> Self {
        let metadata = NeighborhoodMetadata {
            node_count: view.nodes.len(),
            link_count: view.links.len(),
        };
        Self {
            nodes: view.nodes,
            links: view.links,
            description: format!("与节点 {}（深度 {}）相关的子图", node_id, depth),
            metadata,
        }
    }
}

/// A poem as shown in the paginated poem list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoemRecord {
    /// Internal identity; `None` for fallback records.
    pub id: Option<i64>,
    /// The fallback record's own `id`/`_id` value, if any.
    pub source_id: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub dynasty: Option<String>,
    pub time: Option<String>,
    pub image: Option<String>,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoemListingMetadata {
    Page { count: usize, limit: u64, skip: u64 },
    Fallback { fallback: bool, count: usize },
}

/// Payload of `GET /poems`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoemListing {
    pub poems: Vec<PoemRecord>,
    pub metadata: PoemListingMetadata,
}

impl PoemListing {
    pub fn page(poems: Vec<PoemRecord>, limit: u64, skip: u64) -> Self {
        let count = poems.len();
        Self {
            poems,
            metadata: PoemListingMetadata::Page { count, limit, skip },
        }
    }

    /// `count` is the number of fallback records found, before truncation.
    pub fn fallback(poems: Vec<PoemRecord>, count: usize) -> Self {
        Self {
            poems,
            metadata: PoemListingMetadata::Fallback { fallback: true, count },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.metadata, PoemListingMetadata::Fallback { fallback: true, .. })
    }
}

/// One unfiltered poem node for the diagnostic listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: Option<i64>,
    pub labels: Vec<String>,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNodeListing {
    pub count: usize,
    pub rows: Vec<RawNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterCount {
    pub poet: Option<String>,
    pub count: i64,
}

/// Dataset statistics for `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub poets: i64,
    pub poems: i64,
    pub top_wrote: Vec<WriterCount>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_id_serializes_untagged() {
        assert_eq!(serde_json::to_value(NodeId::Internal(7)).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(NodeId::Label("李白".into())).unwrap(), json!("李白"));
    }

    #[test]
    fn test_internal_and_label_ids_differ() {
        assert_ne!(NodeId::Internal(5), NodeId::Label("5".into()));
    }

    #[test]
    fn test_graph_node_field_names() {
        let node = GraphNode {
            id: NodeId::Internal(1),
            label: "杜甫".into(),
            node_type: "Poet".into(),
            group: "Poet".into(),
            properties: Properties::new(),
            neo4j_id: Some(1),
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], json!("Poet"));
        assert_eq!(value["group"], json!("Poet"));
        assert_eq!(value["neo4jId"], json!(1));
    }

    #[test]
    fn test_poem_listing_metadata_shapes() {
        let page = serde_json::to_value(PoemListing::page(vec![], 50, 0)).unwrap();
        assert_eq!(page["metadata"], json!({"count": 0, "limit": 50, "skip": 0}));

        let fallback = PoemListing::fallback(vec![], 3);
        assert!(fallback.is_fallback());
        let value = serde_json::to_value(fallback).unwrap();
        assert_eq!(value["metadata"], json!({"fallback": true, "count": 3}));
    }

    #[test]
    fn test_neighborhood_metadata_counts() {
        let view = GraphView {
            nodes: vec![],
            links: vec![GraphLink {
                source: NodeId::Internal(1),
                target: NodeId::Internal(2),
                link_type: "WROTE".into(),
            }],
        };
        let hood = NeighborhoodView::new(view, 1, 2);
        let value = serde_json::to_value(&hood).unwrap();
        assert_eq!(value["metadata"], json!({"nodeCount": 0, "linkCount": 1}));
        assert_eq!(hood.description, "与节点 1（深度 2）相关的子图");
    }
}
