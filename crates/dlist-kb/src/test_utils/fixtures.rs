use std::path::Path;

use serde_json::json;

use crate::adapters::memory_store::MemoryGraphStore;

/// Identities of the nodes created by [`poetry_scenario`].
#[derive(Debug, Clone, Copy)]
pub struct ScenarioIds {
    pub poet_a: i64,
    pub poem_x: i64,
    pub poem_y: i64,
    pub poet_b: i64,
}

/// `(PoetA)-[WROTE]->(PoemX)`, `(PoetA)-[WROTE]->(PoemY)`,
/// `(PoetB)-[WROTE]->(PoemX)`.
pub fn poetry_scenario() -> (MemoryGraphStore, ScenarioIds) {
    let store = MemoryGraphStore::new();
    let poet_a = store.insert_node(&["Poet"], json!({"name": "李白", "dynasty": "唐"}));
    let poem_x = store.insert_node(
        &["Poem"],
        json!({"title": "静夜思", "author": "李白", "text": "床前明月光"}),
    );
    let poem_y = store.insert_node(
        &["Poem"],
        json!({"title": "月下独酌", "author": "李白", "content": "花间一壶酒"}),
    );
    let poet_b = store.insert_node(&["Poet"], json!({"name": "杜甫", "dynasty": "唐"}));
    store.insert_relationship(poet_a, "WROTE", poem_x);
    store.insert_relationship(poet_a, "WROTE", poem_y);
    store.insert_relationship(poet_b, "WROTE", poem_x);
    (
        store,
        ScenarioIds {
            poet_a,
            poem_x,
            poem_y,
            poet_b,
        },
    )
}

/// Writes a snapshot file with three poems using the alternate field names.
pub fn write_fallback_poems(dir: &Path) -> std::io::Result<()> {
    let poems = json!([
        {"_id": "tang-1", "poet": "王维", "name": "山居秋暝", "content": "空山新雨后"},
        {"id": "tang-2", "author": "孟浩然", "title": "春晓", "text": "春眠不觉晓"},
        {"id": "song-1", "author": "苏轼", "title": "水调歌头", "body": "明月几时有", "dynasty": "宋"}
    ]);
    std::fs::write(dir.join("poems.json"), poems.to_string())
}
