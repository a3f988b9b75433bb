//! Selection sets, resize handles and resize math.

use std::collections::HashSet;

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::items::{ArrowId, ItemId};

/// Currently selected items and arrows.
///
/// A plain click selects one kind exclusively; only the additive modifier
/// toggles membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub items: HashSet<ItemId>,
    pub arrows: HashSet<ArrowId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.arrows.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.arrows.clear();
    }

    pub fn contains_item(&self, id: &str) -> bool {
        self.items.contains(id)
    }

    pub fn contains_arrow(&self, id: &str) -> bool {
        self.arrows.contains(id)
    }

    /// Click on an item. Clears the arrow selection; with `additive` the item
    /// is toggled, otherwise it becomes the only selected item.
    pub fn click_item(&mut self, id: &str, additive: bool) {
        self.arrows.clear();
        if additive {
            toggle(&mut self.items, id);
        } else {
            self.items.clear();
            self.items.insert(id.to_string());
        }
    }

    /// Click on an arrow. Mirror of [`Selection::click_item`].
    pub fn click_arrow(&mut self, id: &str, additive: bool) {
        self.items.clear();
        if additive {
            toggle(&mut self.arrows, id);
        } else {
            self.arrows.clear();
            self.arrows.insert(id.to_string());
        }
    }

    /// Apply a marquee result. Additive marquees toggle each hit item and keep
    /// the arrow selection; plain ones replace everything.
    pub fn apply_marquee(&mut self, hits: Vec<ItemId>, additive: bool) {
        if additive {
            for id in hits {
                toggle(&mut self.items, &id);
            }
        } else {
            self.items = hits.into_iter().collect();
            self.arrows.clear();
        }
    }

    /// Drop ids that no longer pass `exists`.
    pub fn retain(&mut self, item_exists: impl Fn(&str) -> bool, arrow_exists: impl Fn(&str) -> bool) {
        self.items.retain(|id| item_exists(id));
        self.arrows.retain(|id| arrow_exists(id));
    }
}

fn toggle(set: &mut HashSet<String>, id: &str) {
    if !set.remove(id) {
        set.insert(id.to_string());
    }
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// A resize handle on an item's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    Corner(Corner),
    Edge(Edge),
}

/// Which sides of the rectangle a handle drags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Corner(Corner::TopLeft),
        ResizeHandle::Edge(Edge::Top),
        ResizeHandle::Corner(Corner::TopRight),
        ResizeHandle::Edge(Edge::Right),
        ResizeHandle::Corner(Corner::BottomRight),
        ResizeHandle::Edge(Edge::Bottom),
        ResizeHandle::Corner(Corner::BottomLeft),
        ResizeHandle::Edge(Edge::Left),
    ];

    pub fn edges(self) -> Edges {
        match self {
            ResizeHandle::Corner(Corner::TopLeft) => Edges { left: true, top: true, ..Edges::default() },
            ResizeHandle::Corner(Corner::TopRight) => Edges { right: true, top: true, ..Edges::default() },
            ResizeHandle::Corner(Corner::BottomLeft) => Edges { left: true, bottom: true, ..Edges::default() },
            ResizeHandle::Corner(Corner::BottomRight) => Edges { right: true, bottom: true, ..Edges::default() },
            ResizeHandle::Edge(Edge::Top) => Edges { top: true, ..Edges::default() },
            ResizeHandle::Edge(Edge::Right) => Edges { right: true, ..Edges::default() },
            ResizeHandle::Edge(Edge::Bottom) => Edges { bottom: true, ..Edges::default() },
            ResizeHandle::Edge(Edge::Left) => Edges { left: true, ..Edges::default() },
        }
    }

    /// Handle position on `rect`, in the same space as `rect`.
    pub fn position(self, rect: Rect) -> Point {
        let cx = (rect.x0 + rect.x1) / 2.0;
        let cy = (rect.y0 + rect.y1) / 2.0;
        match self {
            ResizeHandle::Corner(Corner::TopLeft) => Point::new(rect.x0, rect.y0),
            ResizeHandle::Corner(Corner::TopRight) => Point::new(rect.x1, rect.y0),
            ResizeHandle::Corner(Corner::BottomLeft) => Point::new(rect.x0, rect.y1),
            ResizeHandle::Corner(Corner::BottomRight) => Point::new(rect.x1, rect.y1),
            ResizeHandle::Edge(Edge::Top) => Point::new(cx, rect.y0),
            ResizeHandle::Edge(Edge::Right) => Point::new(rect.x1, cy),
            ResizeHandle::Edge(Edge::Bottom) => Point::new(cx, rect.y1),
            ResizeHandle::Edge(Edge::Left) => Point::new(rect.x0, cy),
        }
    }
}

/// Find the handle of `rect` within `tolerance` of `point`. Corners win over
/// edges when both are in range.
pub fn hit_test_handles(rect: Rect, point: Point, tolerance: f64) -> Option<ResizeHandle> {
    let tol_sq = tolerance * tolerance;
    let hit = |handle: &ResizeHandle| (handle.position(rect) - point).hypot2() <= tol_sq;
    ResizeHandle::ALL
        .iter()
        .filter(|h| matches!(h, ResizeHandle::Corner(_)))
        .find(|h| hit(h))
        .or_else(|| ResizeHandle::ALL.iter().find(|h| hit(h)))
        .copied()
}

/// Constraints for [`apply_resize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeRules {
    /// Floor for both dimensions.
    pub min_size: f64,
    /// Keep the start rectangle's aspect ratio.
    pub keep_aspect: bool,
    /// Height is frozen (link items).
    pub fixed_height: bool,
}

/// Resize `start` by dragging `handle` through `delta` (canvas units).
///
/// The result is always computed from the fixed start rectangle, never
/// accumulated. With `keep_aspect`, the axis that moved further drives the
/// other one; the size floor is applied after the aspect correction by
/// scaling both dimensions, so the ratio survives the clamp. Dragging a left
/// or top side keeps the opposite side fixed.
pub fn apply_resize(start: Rect, handle: ResizeHandle, delta: Vec2, rules: ResizeRules) -> Rect {
    let edges = handle.edges();
    let dx = if edges.right {
        delta.x
    } else if edges.left {
        -delta.x
    } else {
        0.0
    };
    let dy = if rules.fixed_height {
        0.0
    } else if edges.bottom {
        delta.y
    } else if edges.top {
        -delta.y
    } else {
        0.0
    };

    let start_w = start.width();
    let start_h = start.height();
    let min = rules.min_size;
    let mut w = start_w + dx;
    let mut h = start_h + dy;

    if rules.fixed_height {
        w = w.max(min);
        h = start_h;
    } else if rules.keep_aspect && start_w > 0.0 && start_h > 0.0 {
        let aspect = start_w / start_h;
        if dx.abs() > dy.abs() {
            w = w.max(min);
            h = w / aspect;
            if h < min {
                h = min;
                w = h * aspect;
            }
        } else {
            h = h.max(min);
            w = h * aspect;
            if w < min {
                w = min;
                h = w / aspect;
            }
        }
    } else {
        w = w.max(min);
        h = h.max(min);
    }

    let x0 = if edges.left { start.x1 - w } else { start.x0 };
    let y0 = if edges.top && !rules.fixed_height { start.y1 - h } else { start.y0 };
    Rect::new(x0, y0, x0 + w, y0 + h)
}

/// Which end of an arrow a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowEnd {
    Start,
    End,
}
