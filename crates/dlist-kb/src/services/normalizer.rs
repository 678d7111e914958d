//! Result normalizer: raw graph rows to the deduplicated `{nodes, links}` view
//!
//! Node identity is reconciled per response. A node is keyed by its internal
//! database identity when it has one and by its resolved display label
//! otherwise, so two anonymous entities that share a label collapse into one
//! node. The first occurrence of an id wins; later rows referencing the same id
//! only contribute links. Node order is first-appearance order.

use std::collections::HashSet;

use crate::data::{
    fields::{self, LABEL_KEYS},
    EntityRow, GraphLink, GraphNode, GraphView, NodeId, PathRelationshipRow, PoemRecord,
    Properties, RelationshipRow, UNKNOWN_NODE_TYPE,
};

/// Display label: `name`, then `title`, then `genre`, then the identity.
pub fn resolve_label(identity: Option<i64>, properties: &Properties) -> String {
    fields::first_non_empty(properties, LABEL_KEYS).unwrap_or_else(|| match identity {
        Some(id) => id.to_string(),
        None => "null".to_string(),
    })
}

pub fn resolve_node_id(identity: Option<i64>, label: &str) -> NodeId {
    match identity {
        Some(id) => NodeId::Internal(id),
        None => NodeId::Label(label.to_string()),
    }
}

/// Accumulates nodes and links for one response.
#[derive(Debug, Default)]
pub struct GraphAssembler {
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    seen: HashSet<NodeId>,
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the entity unless its id was already seen; returns the id either way.
    pub fn push_entity(&mut self, entity: EntityRow) -> NodeId {
        let label = resolve_label(entity.identity, &entity.properties);
        let id = resolve_node_id(entity.identity, &label);
        if self.seen.insert(id.clone()) {
            let node_type = entity
                .primary_label()
                .unwrap_or(UNKNOWN_NODE_TYPE)
                .to_string();
            self.nodes.push(GraphNode {
                id: id.clone(),
                label,
                group: node_type.clone(),
                node_type,
                properties: entity.properties,
                neo4j_id: entity.identity,
            });
        }
        id
    }

    pub fn push_link(&mut self, source: NodeId, target: NodeId, link_type: impl Into<String>) {
        self.links.push(GraphLink {
            source,
            target,
            link_type: link_type.into(),
        });
    }

    /// Both endpoints are added as nodes; the link is always appended.
    pub fn push_relationship_row(&mut self, row: RelationshipRow) {
        let source = self.push_entity(row.source);
        let target = self.push_entity(row.target);
        self.push_link(source, target, row.rel_type);
    }

    /// Appends a link from explicit endpoint identities; rows missing either
    /// endpoint are dropped.
    pub fn push_path_relationship(&mut self, row: PathRelationshipRow) {
        if let (Some(start), Some(end)) = (row.start, row.end) {
            self.push_link(NodeId::Internal(start), NodeId::Internal(end), row.rel_type);
        }
    }

    pub fn finish(self) -> GraphView {
        GraphView {
            nodes: self.nodes,
            links: self.links,
        }
    }
}

/// Normalizes `(source)-[r]->(target)` rows.
pub fn normalize_relationship_rows<I>(rows: I) -> GraphView
where
    I: IntoIterator<Item = RelationshipRow>,
{
    let mut assembler = GraphAssembler::new();
    for row in rows {
        assembler.push_relationship_row(row);
    }
    assembler.finish()
}

/// Normalizes the two result sets of a node-centered query.
pub fn normalize_neighborhood<N, R>(nodes: N, relationships: R) -> GraphView
where
    N: IntoIterator<Item = EntityRow>,
    R: IntoIterator<Item = PathRelationshipRow>,
{
    let mut assembler = GraphAssembler::new();
    for node in nodes {
        assembler.push_entity(node);
    }
    for rel in relationships {
        assembler.push_path_relationship(rel);
    }
    assembler.finish()
}

/// Builds a poem from a graph node.
pub fn poem_from_node(entity: EntityRow) -> PoemRecord {
    let mut poem = poem_from_properties(entity.properties);
    poem.id = entity.identity;
    poem
}

/// Builds a poem from a property map using the ordered alias lists.
pub fn poem_from_properties(properties: Properties) -> PoemRecord {
    PoemRecord {
        id: None,
        source_id: fields::first_non_empty(&properties, fields::ID_KEYS),
        author: fields::first_non_empty(&properties, fields::AUTHOR_KEYS),
        title: fields::first_non_empty(&properties, fields::TITLE_KEYS),
        text: fields::first_non_empty(&properties, fields::TEXT_KEYS),
        dynasty: fields::first_non_empty(&properties, fields::DYNASTY_KEYS),
        time: fields::first_non_empty(&properties, fields::TIME_KEYS),
        image: fields::first_non_empty(&properties, fields::IMAGE_KEYS),
        properties,
    }
}

/// Maps poem nodes to records, dropping repeats of an identity.
///
/// Nodes without an identity are never merged with each other.
pub fn normalize_poems<I>(nodes: I) -> Vec<PoemRecord>
where
    I: IntoIterator<Item = EntityRow>,
{
    let mut seen = HashSet::new();
    nodes
        .into_iter()
        .filter(|node| match node.identity {
            Some(id) => seen.insert(id),
            None => true,
        })
        .map(|node| {
            let mut poem = poem_from_node(node);
            // a graph node's own `id` property is not a fallback source id
            poem.source_id = None;
            poem
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn props(value: Value) -> Properties {
        value.as_object().cloned().unwrap_or_default()
    }

    fn entity(identity: Option<i64>, label: &str, properties: Value) -> EntityRow {
        EntityRow {
            identity,
            labels: if label.is_empty() { vec![] } else { vec![label.to_string()] },
            properties: props(properties),
        }
    }

    fn wrote(source: EntityRow, target: EntityRow) -> RelationshipRow {
        RelationshipRow {
            source,
            rel_type: "WROTE".to_string(),
            target,
        }
    }

    #[test]
    fn test_label_priority() {
        let both = props(json!({"name": "李白", "title": "诗仙"}));
        assert_eq!(resolve_label(Some(1), &both), "李白");

        let genre_only = props(json!({"genre": "边塞诗"}));
        assert_eq!(resolve_label(Some(2), &genre_only), "边塞诗");

        assert_eq!(resolve_label(Some(3), &Properties::new()), "3");
        assert_eq!(resolve_label(None, &Properties::new()), "null");
    }

    #[test]
    fn test_empty_name_falls_through_to_title() {
        let p = props(json!({"name": "", "title": "春晓"}));
        assert_eq!(resolve_label(Some(9), &p), "春晓");
    }

    #[test]
    fn test_poets_and_poems_scenario() {
        let poet_a = || entity(Some(1), "Poet", json!({"name": "PoetA"}));
        let poem_x = || entity(Some(10), "Poem", json!({"title": "PoemX"}));
        let poem_y = entity(Some(11), "Poem", json!({"title": "PoemY"}));
        let poet_b = entity(Some(2), "Poet", json!({"name": "PoetB"}));

        let view = normalize_relationship_rows(vec![
            wrote(poet_a(), poem_x()),
            wrote(poet_a(), poem_y),
            wrote(poet_b, poem_x()),
        ]);

        let labels: Vec<&str> = view.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["PoetA", "PoemX", "PoemY", "PoetB"]);
        assert_eq!(view.links.len(), 3);
        assert_eq!(view.links[2].source, NodeId::Internal(2));
        assert_eq!(view.links[2].target, NodeId::Internal(10));
    }

    #[test]
    fn test_first_occurrence_properties_win() {
        let first = entity(Some(1), "Poet", json!({"name": "王维", "style": "山水"}));
        let later = entity(Some(1), "Poet", json!({"name": "王维", "style": "田园"}));
        let poem = || entity(Some(5), "Poem", json!({"title": "山居秋暝"}));

        let view = normalize_relationship_rows(vec![wrote(first, poem()), wrote(later, poem())]);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.nodes[0].properties["style"], json!("山水"));
    }

    #[test]
    fn test_links_are_not_deduplicated() {
        let row = || {
            wrote(
                entity(Some(1), "Poet", json!({"name": "李白"})),
                entity(Some(2), "Poem", json!({"title": "将进酒"})),
            )
        };
        let view = normalize_relationship_rows(vec![row(), row()]);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.links.len(), 2);
        assert_eq!(view.links[0], view.links[1]);
    }

    #[test]
    fn test_unlabeled_node_is_unknown() {
        let mut assembler = GraphAssembler::new();
        assembler.push_entity(entity(Some(4), "", json!({"name": "无名"})));
        let view = assembler.finish();
        assert_eq!(view.nodes[0].node_type, "unknown");
        assert_eq!(view.nodes[0].group, "unknown");
    }

    // Anonymous entities sharing a display label collapse into one node. This
    // is the accepted identity approximation, asserted here so a change to it
    // is deliberate.
    #[test]
    fn test_anonymous_entities_with_same_label_collapse() {
        let row = RelationshipRow {
            source: entity(None, "Imagery", json!({"name": "月"})),
            rel_type: "RELATED".to_string(),
            target: entity(None, "Imagery", json!({"name": "月", "note": "another"})),
        };
        let view = normalize_relationship_rows(vec![row]);
        assert_eq!(view.nodes.len(), 1);
        assert_eq!(view.nodes[0].id, NodeId::Label("月".into()));
        assert_eq!(view.nodes[0].neo4j_id, None);
        assert_eq!(view.links[0].source, view.links[0].target);
    }

    #[test]
    fn test_internal_id_and_label_id_do_not_collide() {
        let row = RelationshipRow {
            source: entity(Some(5), "Poet", json!({})),
            rel_type: "RELATED".to_string(),
            target: entity(None, "Tag", json!({"name": "5"})),
        };
        let view = normalize_relationship_rows(vec![row]);
        assert_eq!(view.nodes.len(), 2);
    }

    #[test]
    fn test_neighborhood_uses_explicit_endpoints() {
        let nodes = vec![
            entity(Some(1), "Poet", json!({"name": "杜甫"})),
            entity(Some(2), "Poem", json!({"title": "春望"})),
            entity(Some(1), "Poet", json!({"name": "duplicate"})),
        ];
        let rels = vec![
            PathRelationshipRow { identity: Some(100), rel_type: "WROTE".into(), start: Some(1), end: Some(2) },
            PathRelationshipRow { identity: Some(101), rel_type: "WROTE".into(), start: None, end: Some(2) },
        ];
        let view = normalize_neighborhood(nodes, rels);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.nodes[0].label, "杜甫");
        assert_eq!(view.links.len(), 1);
        assert_eq!(view.links[0].link_type, "WROTE");
    }

    #[test]
    fn test_poem_fields_follow_alias_order() {
        let poem = poem_from_node(entity(
            Some(8),
            "Poem",
            json!({"name": "登高", "content": "风急天高猿啸哀", "author": "杜甫", "dynasty": "唐"}),
        ));
        assert_eq!(poem.id, Some(8));
        assert_eq!(poem.title.as_deref(), Some("登高"));
        assert_eq!(poem.text.as_deref(), Some("风急天高猿啸哀"));
        assert_eq!(poem.author.as_deref(), Some("杜甫"));
        assert_eq!(poem.time, None);
        assert_eq!(poem.image, None);
        assert_eq!(poem.properties.len(), 4);
    }

    #[test]
    fn test_poems_deduplicate_by_identity_only() {
        let poems = normalize_poems(vec![
            entity(Some(1), "Poem", json!({"title": "A"})),
            entity(Some(1), "Poem", json!({"title": "A again"})),
            entity(None, "Poem", json!({"title": "B"})),
            entity(None, "Poem", json!({"title": "B"})),
        ]);
        let titles: Vec<_> = poems.iter().map(|p| p.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["A", "B", "B"]);
        assert!(poems.iter().all(|p| p.source_id.is_none()));
    }
}
