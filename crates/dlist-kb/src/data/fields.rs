//! Ordered alias lists for logical fields stored under varying property names
//!
//! Graph nodes and fallback snapshots name the same thing differently
//! (`content` vs `text`, `poet` vs `author`). Each logical field has one
//! ordered candidate list; the first candidate holding a non-empty value wins.

use serde_json::Value;

use crate::data::Properties;

/// Candidate keys for a node's display label, before the identity fallback.
pub const LABEL_KEYS: &[&str] = &["name", "title", "genre"];

pub const ID_KEYS: &[&str] = &["id", "_id"];
pub const AUTHOR_KEYS: &[&str] = &["author", "poet"];
pub const TITLE_KEYS: &[&str] = &["title", "name"];
pub const TEXT_KEYS: &[&str] = &["text", "content", "body"];
pub const DYNASTY_KEYS: &[&str] = &["dynasty"];
pub const TIME_KEYS: &[&str] = &["time"];
pub const IMAGE_KEYS: &[&str] = &["image"];

/// Poem properties searched by the poem listing.
pub const POEM_SEARCH_KEYS: &[&str] = &["title", "name", "text", "content", "body", "author"];

/// Renders a property value for display, or `None` when it counts as empty.
///
/// Empty strings, `null`, `false` and zero are empty.
pub fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        _ => None,
    }
}

/// First non-empty value among `keys`, in order.
pub fn first_non_empty(properties: &Properties, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| properties.get(*key))
        .find_map(display_value)
}
