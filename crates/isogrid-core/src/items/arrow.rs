//! Connectors between items or free points.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BoardRef, ItemId};

pub type ArrowId = String;

/// One end of an arrow.
///
/// Anchored ends carry only the item id; their position is recomputed from the
/// live item rectangle every time the arrow is routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Anchored {
        #[serde(rename = "itemId")]
        item_id: ItemId,
    },
    Free(Point),
}

impl Endpoint {
    pub fn anchored(item_id: impl Into<ItemId>) -> Self {
        Endpoint::Anchored {
            item_id: item_id.into(),
        }
    }

    pub fn anchor(&self) -> Option<&str> {
        match self {
            Endpoint::Anchored { item_id } => Some(item_id),
            Endpoint::Free(_) => None,
        }
    }

    pub fn is_anchored_to(&self, id: &str) -> bool {
        self.anchor() == Some(id)
    }
}

/// Wire tag written as `"type": "arrow"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ArrowTag {
    #[default]
    Arrow,
}

/// A connector living on one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrow {
    pub id: ArrowId,
    #[serde(rename = "type", default, skip_deserializing)]
    tag: ArrowTag,
    pub start: Endpoint,
    pub end: Endpoint,
    #[serde(rename = "parentId", default)]
    pub parent: BoardRef,
}

impl Arrow {
    pub fn new(start: Endpoint, end: Endpoint, parent: BoardRef) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tag: ArrowTag::Arrow,
            start,
            end,
            parent,
        }
    }

    /// Arrow with a caller-chosen id (imports, tests).
    pub fn with_id(id: impl Into<ArrowId>, start: Endpoint, end: Endpoint, parent: BoardRef) -> Self {
        Self {
            id: id.into(),
            ..Self::new(start, end, parent)
        }
    }

    pub fn touches(&self, item_id: &str) -> bool {
        self.start.is_anchored_to(item_id) || self.end.is_anchored_to(item_id)
    }

    /// Replace any endpoint anchored to `item_id` with a free point.
    pub fn detach(&mut self, item_id: &str, at: Point) {
        for endpoint in [&mut self.start, &mut self.end] {
            if endpoint.is_anchored_to(item_id) {
                *endpoint = Endpoint::Free(at);
            }
        }
    }
}
