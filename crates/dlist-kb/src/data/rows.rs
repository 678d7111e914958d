//! Raw result rows as returned by the graph store
//!
//! Queries project plain values (identities, label lists, property maps) under
//! fixed column names so every store backend yields the same record shape.

use serde_json::Value;

use crate::data::{errors::StoreError, Properties, Record};

pub mod columns {
    pub const SOURCE_ID: &str = "sourceId";
    pub const SOURCE_LABELS: &str = "sourceLabels";
    pub const SOURCE_PROPS: &str = "sourceProps";
    pub const REL_TYPE: &str = "relType";
    pub const TARGET_ID: &str = "targetId";
    pub const TARGET_LABELS: &str = "targetLabels";
    pub const TARGET_PROPS: &str = "targetProps";

    pub const ID: &str = "id";
    pub const LABELS: &str = "labels";
    pub const PROPERTIES: &str = "properties";

    pub const START_ID: &str = "startId";
    pub const END_ID: &str = "endId";

    pub const COUNT: &str = "c";
    pub const POET: &str = "poet";
    pub const WROTE_COUNT: &str = "cnt";

    pub const RELATIONSHIP: &[&str] = &[
        SOURCE_ID, SOURCE_LABELS, SOURCE_PROPS, REL_TYPE, TARGET_ID, TARGET_LABELS, TARGET_PROPS,
    ];
    pub const NODE: &[&str] = &[ID, LABELS, PROPERTIES];
    pub const PATH_RELATIONSHIP: &[&str] = &[ID, REL_TYPE, START_ID, END_ID];
}

/// One endpoint entity of a row: identity, labels and stored attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityRow {
    pub identity: Option<i64>,
    pub labels: Vec<String>,
    pub properties: Properties,
}

impl EntityRow {
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        Self::from_columns(record, columns::ID, columns::LABELS, columns::PROPERTIES)
    }

    fn from_columns(
        record: &Record,
        id_col: &str,
        labels_col: &str,
        props_col: &str,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            identity: optional_i64(record, id_col)?,
            labels: string_list(record, labels_col)?,
            properties: property_map(record, props_col)?,
        })
    }

    /// The primary classification: first label, if any.
    pub fn primary_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }
}

/// `(source)-[relationship]->(target)` row of the unscoped/search query.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipRow {
    pub source: EntityRow,
    pub rel_type: String,
    pub target: EntityRow,
}

impl RelationshipRow {
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            source: EntityRow::from_columns(
                record,
                columns::SOURCE_ID,
                columns::SOURCE_LABELS,
                columns::SOURCE_PROPS,
            )?,
            rel_type: required_str(record, columns::REL_TYPE)?,
            target: EntityRow::from_columns(
                record,
                columns::TARGET_ID,
                columns::TARGET_LABELS,
                columns::TARGET_PROPS,
            )?,
        })
    }
}

/// A relationship collected from a neighborhood path, with explicit endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRelationshipRow {
    pub identity: Option<i64>,
    pub rel_type: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl PathRelationshipRow {
    pub fn from_record(record: &Record) -> Result<Self, StoreError> {
        Ok(Self {
            identity: optional_i64(record, columns::ID)?,
            rel_type: required_str(record, columns::REL_TYPE)?,
            start: optional_i64(record, columns::START_ID)?,
            end: optional_i64(record, columns::END_ID)?,
        })
    }
}

pub fn optional_i64(record: &Record, column: &str) -> Result<Option<i64>, StoreError> {
    match record.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            StoreError::MappingError(format!("column '{}' is not an integer: {}", column, value))
        }),
    }
}

pub fn required_i64(record: &Record, column: &str) -> Result<i64, StoreError> {
    optional_i64(record, column)?
        .ok_or_else(|| StoreError::MappingError(format!("column '{}' is missing", column)))
}

pub fn optional_str(record: &Record, column: &str) -> Result<Option<String>, StoreError> {
    match record.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(StoreError::MappingError(format!(
            "column '{}' is not a string: {}",
            column, other
        ))),
    }
}

fn required_str(record: &Record, column: &str) -> Result<String, StoreError> {
    optional_str(record, column)?
        .ok_or_else(|| StoreError::MappingError(format!("column '{}' is missing", column)))
}

fn string_list(record: &Record, column: &str) -> Result<Vec<String>, StoreError> {
    match record.get(column) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    StoreError::MappingError(format!("column '{}' holds a non-string label", column))
                })
            })
            .collect(),
        Some(other) => Err(StoreError::MappingError(format!(
            "column '{}' is not a list: {}",
            column, other
        ))),
    }
}

fn property_map(record: &Record, column: &str) -> Result<Properties, StoreError> {
    match record.get(column) {
        None | Some(Value::Null) => Ok(Properties::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(StoreError::MappingError(format!(
            "column '{}' is not a property map: {}",
            column, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_relationship_row_from_record() {
        let rec = record(json!({
            "sourceId": 1, "sourceLabels": ["Poet"], "sourceProps": {"name": "李白"},
            "relType": "WROTE",
            "targetId": 2, "targetLabels": ["Poem"], "targetProps": {"title": "静夜思"},
        }));
        let row = RelationshipRow::from_record(&rec).unwrap();
        assert_eq!(row.source.identity, Some(1));
        assert_eq!(row.source.primary_label(), Some("Poet"));
        assert_eq!(row.rel_type, "WROTE");
        assert_eq!(row.target.properties["title"], json!("静夜思"));
    }

    #[test]
    fn test_missing_identity_and_labels_are_tolerated() {
        let rec = record(json!({"labels": null, "properties": {"genre": "边塞"}}));
        let row = EntityRow::from_record(&rec).unwrap();
        assert_eq!(row.identity, None);
        assert!(row.labels.is_empty());
        assert_eq!(row.primary_label(), None);
    }

    #[test]
    fn test_wrong_types_are_mapping_errors() {
        let rec = record(json!({"id": "seven", "labels": [], "properties": {}}));
        assert!(matches!(EntityRow::from_record(&rec), Err(StoreError::MappingError(_))));

        let rec = record(json!({"id": 1, "relType": "WROTE", "startId": 1, "endId": []}));
        assert!(matches!(PathRelationshipRow::from_record(&rec), Err(StoreError::MappingError(_))));
    }
}
