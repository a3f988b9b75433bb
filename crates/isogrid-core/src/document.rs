//! Portable canvas documents: persisted payloads, export and import.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::items::{Arrow, Item, ItemId};
use crate::scene::{Scene, Snapshot};
use crate::settings::BoardSettings;

/// Everything persisted for one user's canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasData {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub arrows: Vec<Arrow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<BoardSettings>,
}

impl CanvasData {
    pub fn new(snapshot: Snapshot, settings: BoardSettings) -> Self {
        Self {
            items: snapshot.items,
            arrows: snapshot.arrows,
            settings: Some(settings),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: self.items.clone(),
            arrows: self.arrows.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Why an import was refused. Nothing is applied when any of these occur.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Missing '{0}' collection")]
    MissingCollection(&'static str),
    #[error("'{0}' must be an array")]
    NotAnArray(&'static str),
    #[error("Invalid record {index} in '{collection}': {source}")]
    InvalidRecord {
        collection: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Board hierarchy contains a cycle through {0}")]
    InvalidHierarchy(ItemId),
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    items: &'a [Item],
    arrows: &'a [Arrow],
}

/// Pretty-printed `{items, arrows}` document.
pub fn export_json(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportDocument {
        items: &snapshot.items,
        arrows: &snapshot.arrows,
    })
}

/// Parse and validate an exported document.
///
/// Both `items` and `arrows` must be present and array-shaped, every record
/// must parse, and the parent edges must not form a cycle.
pub fn parse_import(text: &str) -> Result<Snapshot, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let items = collection(&value, "items")?;
    let arrows = collection(&value, "arrows")?;

    let snapshot = Snapshot {
        items: records(items, "items")?,
        arrows: records(arrows, "arrows")?,
    };

    let scene = Scene::from_snapshot(snapshot.clone(), 0.0);
    if let Some(id) = scene.find_cycle() {
        return Err(ImportError::InvalidHierarchy(id));
    }
    Ok(snapshot)
}

fn collection<'a>(value: &'a Value, key: &'static str) -> Result<&'a Vec<Value>, ImportError> {
    match value.get(key) {
        None | Some(Value::Null) => Err(ImportError::MissingCollection(key)),
        Some(Value::Array(records)) => Ok(records),
        Some(_) => Err(ImportError::NotAnArray(key)),
    }
}

fn records<T: serde::de::DeserializeOwned>(values: &[Value], collection: &'static str) -> Result<Vec<T>, ImportError> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            T::deserialize(value).map_err(|source| ImportError::InvalidRecord {
                collection,
                index,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::items::{BoardRef, Endpoint, ItemType};
    use kurbo::Point;

    fn sample() -> Snapshot {
        let config = EngineConfig::default();
        let board = Item::create(ItemType::Board, Point::ZERO, BoardRef::Root, &config).with_id("b");
        let text = Item::create(ItemType::Text, Point::new(10.0, 10.0), BoardRef::board("b"), &config).with_id("t");
        Snapshot {
            items: vec![board, text],
            arrows: vec![Arrow::with_id("a", Endpoint::anchored("b"), Endpoint::Free(Point::ZERO), BoardRef::Root)],
        }
    }

    #[test]
    fn test_export_then_import() {
        let snapshot = sample();
        let json = export_json(&snapshot).unwrap();
        assert!(json.contains("\n  \"items\""));
        assert_eq!(parse_import(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_missing_and_misshaped_collections() {
        assert!(matches!(parse_import(r#"{"items": []}"#), Err(ImportError::MissingCollection("arrows"))));
        assert!(matches!(
            parse_import(r#"{"items": {}, "arrows": []}"#),
            Err(ImportError::NotAnArray("items"))
        ));
        assert!(matches!(parse_import("[1, 2"), Err(ImportError::InvalidJson(_))));
        assert!(matches!(parse_import("[]"), Err(ImportError::MissingCollection("items"))));
    }

    #[test]
    fn test_bad_record_reports_index() {
        let err = parse_import(r#"{"items": [{"id": "x", "type": "text"}, {"type": "text"}], "arrows": []}"#).unwrap_err();
        assert!(matches!(err, ImportError::InvalidRecord { collection: "items", index: 1, .. }));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let json = r#"{
            "items": [
                {"id": "p", "type": "board", "content": "P", "parentId": "q"},
                {"id": "q", "type": "board", "content": "Q", "parentId": "p"}
            ],
            "arrows": []
        }"#;
        assert!(matches!(parse_import(json), Err(ImportError::InvalidHierarchy(_))));
    }

    #[test]
    fn test_canvas_data_tolerates_missing_fields() {
        let data = CanvasData::from_json(r#"{"items": []}"#).unwrap();
        assert!(data.arrows.is_empty());
        assert!(data.settings.is_none());
    }
}
