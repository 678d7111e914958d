use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::data::{CoreError, NodeId, Record, StoreError, TraceContext};
use crate::services::pagination::Page;
use crate::services::query::GraphQueryGateway;
use crate::traits::{CypherQuery, GraphStore, QueryKind};

mock! {
    pub Store {}

    #[async_trait]
    impl GraphStore for Store {
        async fn run(
            &self,
            trace_ctx: &TraceContext,
            query: &CypherQuery,
        ) -> Result<Vec<Record>, StoreError>;

        fn backend(&self) -> &'static str;
    }
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

fn gateway(store: MockStore) -> GraphQueryGateway {
    GraphQueryGateway::new(Arc::new(store))
}

fn mock_store() -> MockStore {
    let mut store = MockStore::new();
    store.expect_backend().return_const("mock");
    store
}

#[tokio::test]
async fn test_blank_search_uses_poet_sample() {
    let mut store = mock_store();
    store
        .expect_run()
        .withf(|_, query| {
            query.kind == QueryKind::PoetRelationships
                && query.param_u64("skip") == Some(0)
                && query.param_u64("limit") == Some(200)
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![record(json!({
                "sourceId": 1, "sourceLabels": ["Poet"], "sourceProps": {"name": "李白"},
                "relType": "WROTE",
                "targetId": 2, "targetLabels": ["Poem"], "targetProps": {"title": "静夜思"}
            }))])
        });

    let view = gateway(store)
        .knowledge_graph(&TraceContext::new_root(), Some("   "), Page::new(0, 200))
        .await
        .unwrap();

    assert_eq!(view.nodes.len(), 2);
    assert_eq!(view.links.len(), 1);
    assert_eq!(view.links[0].source, NodeId::Internal(1));
    assert_eq!(view.links[0].link_type, "WROTE");
}

#[tokio::test]
async fn test_search_term_is_forwarded_untrimmed() {
    let mut store = mock_store();
    store
        .expect_run()
        .withf(|_, query| {
            query.kind == QueryKind::RelationshipSearch
                && query.param_str("searchTerm") == Some(" 李白")
                && query.param_u64("skip") == Some(10)
        })
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    let view = gateway(store)
        .knowledge_graph(&TraceContext::new_root(), Some(" 李白"), Page::new(10, 5))
        .await
        .unwrap();

    assert!(view.nodes.is_empty());
    assert!(view.links.is_empty());
}

#[tokio::test]
async fn test_store_failure_is_upstream_error() {
    let mut store = mock_store();
    store
        .expect_run()
        .returning(|_, _| Err(StoreError::ConnectionError("refused".to_string())));

    let result = gateway(store)
        .knowledge_graph(&TraceContext::new_root(), None, Page::new(0, 200))
        .await;

    assert!(matches!(
        result,
        Err(CoreError::UpstreamFailure(StoreError::ConnectionError(_)))
    ));
}

#[tokio::test]
async fn test_missing_node_is_not_found() {
    let mut store = mock_store();
    store
        .expect_run()
        .withf(|_, query| query.kind == QueryKind::NodeExists && query.param_i64("nodeId") == Some(999))
        .times(1)
        .returning(|_, _| Ok(Vec::new()));

    let result = gateway(store)
        .node_neighborhood(&TraceContext::new_root(), 999, 1, 200)
        .await;

    match result {
        Err(CoreError::NotFound { entity_type, id }) => {
            assert_eq!(entity_type, "Node");
            assert_eq!(id, "999");
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_neighborhood_runs_both_statements() {
    let mut store = mock_store();
    store
        .expect_run()
        .withf(|_, query| query.kind == QueryKind::NodeExists)
        .times(1)
        .returning(|_, _| Ok(vec![record(json!({"id": 1}))]));
    store
        .expect_run()
        .withf(|_, query| query.kind == QueryKind::NeighborhoodNodes { depth: 2 })
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                record(json!({"id": 1, "labels": ["Poet"], "properties": {"name": "李白"}})),
                record(json!({"id": 2, "labels": ["Poem"], "properties": {"title": "静夜思"}})),
            ])
        });
    store
        .expect_run()
        .withf(|_, query| {
            query.kind == QueryKind::NeighborhoodRelationships { depth: 2 }
                && query.param_u64("limit") == Some(30)
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![record(
                json!({"id": 10, "relType": "WROTE", "startId": 1, "endId": 2}),
            )])
        });

    let view = gateway(store)
        .node_neighborhood(&TraceContext::new_root(), 1, 2, 30)
        .await
        .unwrap();

    assert_eq!(view.nodes.len(), 2);
    assert_eq!(view.links.len(), 1);
    assert_eq!(view.metadata.node_count, 2);
    assert_eq!(view.metadata.link_count, 1);
    assert!(view.description.contains('1'));
}

#[tokio::test]
async fn test_poem_search_trims_term() {
    let mut store = mock_store();
    store
        .expect_run()
        .withf(|_, query| query.kind == QueryKind::PoemSearch && query.param_str("q") == Some("月"))
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                record(json!({"id": 5, "labels": ["Poem"], "properties": {"title": "月下独酌", "author": "李白"}})),
                record(json!({"id": 5, "labels": ["Poem"], "properties": {"title": "月下独酌", "author": "李白"}})),
            ])
        });

    let poems = gateway(store)
        .poems(&TraceContext::new_root(), Some("  月 "), Page::new(0, 50))
        .await
        .unwrap();

    assert_eq!(poems.len(), 1);
    assert_eq!(poems[0].id, Some(5));
    assert_eq!(poems[0].author.as_deref(), Some("李白"));
}

#[tokio::test]
async fn test_raw_poems_counts_rows() {
    let mut store = mock_store();
    store
        .expect_run()
        .withf(|_, query| query.kind == QueryKind::RawPoems && query.param_u64("limit") == Some(2))
        .returning(|_, _| {
            Ok(vec![
                record(json!({"id": 1, "labels": ["Poem"], "properties": {"title": "a"}})),
                record(json!({"id": 2, "labels": ["Poem", "Tang"], "properties": {}})),
            ])
        });

    let listing = gateway(store)
        .raw_poems(&TraceContext::new_root(), 2)
        .await
        .unwrap();

    assert_eq!(listing.count, 2);
    assert_eq!(listing.rows[1].labels, vec!["Poem", "Tang"]);
}

#[tokio::test]
async fn test_stats_combines_three_statements() {
    let mut store = mock_store();
    store
        .expect_run()
        .withf(|_, query| matches!(&query.kind, QueryKind::CountByLabel { label } if label == "Poet"))
        .returning(|_, _| Ok(vec![record(json!({"c": 3}))]));
    store
        .expect_run()
        .withf(|_, query| matches!(&query.kind, QueryKind::CountByLabel { label } if label == "Poem"))
        .returning(|_, _| Ok(vec![record(json!({"c": 12}))]));
    store
        .expect_run()
        .withf(|_, query| query.kind == QueryKind::TopWriters { limit: 20 })
        .returning(|_, _| {
            Ok(vec![
                record(json!({"poet": "杜甫", "cnt": 7})),
                record(json!({"poet": null, "cnt": 2})),
            ])
        });

    let stats = gateway(store).stats(&TraceContext::new_root()).await.unwrap();

    assert_eq!(stats.poets, 3);
    assert_eq!(stats.poems, 12);
    assert_eq!(stats.top_wrote.len(), 2);
    assert_eq!(stats.top_wrote[0].poet.as_deref(), Some("杜甫"));
    assert_eq!(stats.top_wrote[1].poet, None);
}

#[tokio::test]
async fn test_malformed_row_is_reported() {
    let mut store = mock_store();
    store
        .expect_run()
        .returning(|_, _| Ok(vec![record(json!({"id": 1, "labels": "Poem", "properties": {}}))]));

    let result = gateway(store)
        .poems(&TraceContext::new_root(), None, Page::new(0, 50))
        .await;

    assert!(matches!(
        result,
        Err(CoreError::UpstreamFailure(StoreError::MappingError(_)))
    ));
}
