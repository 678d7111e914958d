//! Cypher statements issued by the gateway
//!
//! Every statement projects plain values under the column names in
//! [`crate::data::rows::columns`]. Path-length bounds cannot be parameters in
//! Cypher, so the hop depth is formatted into the neighborhood statements.

use crate::data::rows::columns;
use crate::traits::{CypherQuery, QueryKind};

const RELATIONSHIP_PROJECTION: &str = "RETURN id(n) AS sourceId, labels(n) AS sourceLabels, properties(n) AS sourceProps, \
     type(r) AS relType, \
     id(m) AS targetId, labels(m) AS targetLabels, properties(m) AS targetProps";

const POEM_PROJECTION: &str =
    "RETURN id(poem) AS id, labels(poem) AS labels, properties(poem) AS properties";

pub fn ping() -> CypherQuery {
    CypherQuery::new(QueryKind::Ping, "RETURN 1 AS c", &[columns::COUNT])
}

/// Relationships whose endpoints' name or title contain `term` (case-sensitive).
pub fn relationship_search(term: &str) -> CypherQuery {
    let text = format!(
        "MATCH (n)-[r]->(m) \
         WHERE n.name CONTAINS $searchTerm OR n.title CONTAINS $searchTerm \
         OR m.name CONTAINS $searchTerm OR m.title CONTAINS $searchTerm \
         {}",
        RELATIONSHIP_PROJECTION
    );
    CypherQuery::new(QueryKind::RelationshipSearch, text, columns::RELATIONSHIP)
        .param("searchTerm", term)
}

/// Relationships anchored at poets, shuffled so unscoped requests vary.
pub fn poet_relationships() -> CypherQuery {
    let text = format!(
        "MATCH (n:Poet)-[r]->(m) WITH n, r, m ORDER BY rand() {}",
        RELATIONSHIP_PROJECTION
    );
    CypherQuery::new(QueryKind::PoetRelationships, text, columns::RELATIONSHIP)
}

pub fn node_exists(node_id: i64) -> CypherQuery {
    CypherQuery::new(
        QueryKind::NodeExists,
        "MATCH (n) WHERE id(n) = $nodeId RETURN id(n) AS id LIMIT 1",
        &[columns::ID],
    )
    .param("nodeId", node_id)
}

pub fn neighborhood_nodes(node_id: i64, depth: u32, limit: u64) -> CypherQuery {
    let text = format!(
        "MATCH (start) WHERE id(start) = $nodeId \
         MATCH p = (start)-[*1..{depth}]-(m) \
         UNWIND nodes(p) AS nd \
         WITH DISTINCT nd \
         RETURN id(nd) AS id, labels(nd) AS labels, properties(nd) AS properties \
         LIMIT $limit",
        depth = depth
    );
    CypherQuery::new(QueryKind::NeighborhoodNodes { depth }, text, columns::NODE)
        .param("nodeId", node_id)
        .param("limit", limit)
}

pub fn neighborhood_relationships(node_id: i64, depth: u32, limit: u64) -> CypherQuery {
    let text = format!(
        "MATCH (start) WHERE id(start) = $nodeId \
         MATCH p = (start)-[*1..{depth}]-(m) \
         UNWIND relationships(p) AS rl \
         WITH DISTINCT rl \
         RETURN id(rl) AS id, type(rl) AS relType, id(startNode(rl)) AS startId, id(endNode(rl)) AS endId \
         LIMIT $limit",
        depth = depth
    );
    CypherQuery::new(
        QueryKind::NeighborhoodRelationships { depth },
        text,
        columns::PATH_RELATIONSHIP,
    )
    .param("nodeId", node_id)
    .param("limit", limit)
}

pub fn poems() -> CypherQuery {
    let text = format!(
        "MATCH (poem:Poem) WITH DISTINCT poem {} ORDER BY rand()",
        POEM_PROJECTION
    );
    CypherQuery::new(QueryKind::Poems, text, columns::NODE)
}

/// Poems with a title/name/text/content/body/author containing `term`.
pub fn poem_search(term: &str) -> CypherQuery {
    let text = format!(
        "MATCH (poem:Poem) \
         WHERE coalesce(poem.title, '') CONTAINS $q OR coalesce(poem.name, '') CONTAINS $q \
         OR coalesce(poem.text, '') CONTAINS $q OR coalesce(poem.content, '') CONTAINS $q \
         OR coalesce(poem.body, '') CONTAINS $q OR coalesce(poem.author, '') CONTAINS $q \
         WITH DISTINCT poem {} ORDER BY rand()",
        POEM_PROJECTION
    );
    CypherQuery::new(QueryKind::PoemSearch, text, columns::NODE).param("q", term)
}

pub fn raw_poems(limit: u64) -> CypherQuery {
    CypherQuery::new(
        QueryKind::RawPoems,
        "MATCH (p:Poem) RETURN id(p) AS id, labels(p) AS labels, properties(p) AS properties LIMIT $limit",
        columns::NODE,
    )
    .param("limit", limit)
}

/// Counts nodes with `label`; the label must be a plain identifier.
pub fn count_by_label(label: &str) -> CypherQuery {
    debug_assert!(label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    CypherQuery::new(
        QueryKind::CountByLabel {
            label: label.to_string(),
        },
        format!("MATCH (x:{}) RETURN count(x) AS c", label),
        &[columns::COUNT],
    )
}

pub fn top_writers(limit: u32) -> CypherQuery {
    CypherQuery::new(
        QueryKind::TopWriters { limit },
        format!(
            "MATCH (p:Poet)-[:WROTE]->(m:Poem) RETURN p.name AS poet, count(m) AS cnt ORDER BY cnt DESC LIMIT {}",
            limit
        ),
        &[columns::POET, columns::WROTE_COUNT],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_is_embedded_not_bound() {
        let query = neighborhood_nodes(7, 3, 50);
        assert!(query.text.contains("[*1..3]"));
        assert!(!query.params.contains_key("depth"));
        assert_eq!(query.kind, QueryKind::NeighborhoodNodes { depth: 3 });
        assert_eq!(query.param_i64("nodeId"), Some(7));
        assert_eq!(query.param_u64("limit"), Some(50));
    }

    #[test]
    fn test_search_term_is_a_parameter() {
        let query = relationship_search("') DETACH DELETE n //");
        assert!(!query.text.contains("DELETE"));
        assert_eq!(query.param_str("searchTerm"), Some("') DETACH DELETE n //"));
    }

    #[test]
    fn test_sampling_orders_before_pagination() {
        let query = poet_relationships();
        assert!(query.text.contains("ORDER BY rand()"));
        assert!(!query.is_paginated());
        assert_eq!(query.columns.len(), 7);
    }

    #[test]
    fn test_count_by_label() {
        let query = count_by_label("Poet");
        assert_eq!(query.text, "MATCH (x:Poet) RETURN count(x) AS c");
    }
}
