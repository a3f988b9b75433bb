//! Scene graph: a flat arena of items and arrows tagged with their board.
//!
//! The board hierarchy is implied by `parent` edges. Nothing here stores
//! child lists; hierarchy questions are answered by walking parents.

use std::collections::{HashMap, HashSet};

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::rect_intersects_rect;
use crate::items::{Arrow, ArrowId, BoardRef, Item, ItemId, ItemPatch, insert_before, remove_entry};

/// Display name of the root board.
pub const ROOT_BOARD_NAME: &str = "Home";

/// Immutable copy of the scene at a commit point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub arrows: Vec<Arrow>,
}

/// Why a board move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),
    #[error("Unknown board: {0}")]
    UnknownBoard(ItemId),
    #[error("Item {0} is not a board")]
    NotABoard(ItemId),
    #[error("Cannot move {item} into itself or one of its descendants ({target})")]
    Cycle { item: ItemId, target: ItemId },
}

/// A board as listed in pickers and breadcrumbs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEntry {
    pub board: BoardRef,
    pub name: String,
}

impl BoardEntry {
    pub fn root() -> Self {
        Self {
            board: BoardRef::Root,
            name: ROOT_BOARD_NAME.to_string(),
        }
    }
}

/// All items and arrows of a canvas.
#[derive(Debug, Clone)]
pub struct Scene {
    items: HashMap<ItemId, Item>,
    /// Item paint order (back to front).
    item_order: Vec<ItemId>,
    arrows: HashMap<ArrowId, Arrow>,
    arrow_order: Vec<ArrowId>,
    auto_fallback: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Scene {
    /// Empty scene. `auto_fallback` is the height assumed for auto-height
    /// items whenever a rectangle is needed.
    pub fn new(auto_fallback: f64) -> Self {
        Self {
            items: HashMap::new(),
            item_order: Vec::new(),
            arrows: HashMap::new(),
            arrow_order: Vec::new(),
            auto_fallback,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot, auto_fallback: f64) -> Self {
        let mut scene = Self::new(auto_fallback);
        scene.restore(snapshot);
        scene
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            items: self.items().cloned().collect(),
            arrows: self.arrows().cloned().collect(),
        }
    }

    /// Replace the whole scene with `snapshot`.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.items.clear();
        self.item_order.clear();
        self.arrows.clear();
        self.arrow_order.clear();
        for item in snapshot.items {
            self.add_item(item);
        }
        for arrow in snapshot.arrows {
            self.add_arrow(arrow);
        }
    }

    pub fn auto_fallback(&self) -> f64 {
        self.auto_fallback
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.arrows.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn arrow_count(&self) -> usize {
        self.arrows.len()
    }

    // --- items ---------------------------------------------------------

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.get_mut(id)
    }

    /// All items, back to front.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.item_order.iter().filter_map(|id| self.items.get(id))
    }

    /// Items on `board`, back to front.
    pub fn items_in<'a>(&'a self, board: &'a BoardRef) -> impl Iterator<Item = &'a Item> + 'a {
        self.items().filter(move |item| &item.parent == board)
    }

    /// Insert an item. An existing item with the same id is replaced in place.
    pub fn add_item(&mut self, item: Item) -> ItemId {
        let id = item.id.clone();
        if self.items.insert(id.clone(), item).is_none() {
            self.item_order.push(id.clone());
        }
        id
    }

    /// Shallow-merge `patch` into item `id`. Returns true if the item exists
    /// and changed.
    pub fn update_item(&mut self, id: &str, patch: &ItemPatch) -> bool {
        match self.items.get_mut(id) {
            Some(item) => item.apply(patch),
            None => false,
        }
    }

    /// Remove an item and every arrow anchored to it. Items on the removed
    /// board stay in the arena.
    pub fn delete_item(&mut self, id: &str) -> Option<Item> {
        let item = self.items.remove(id)?;
        self.item_order.retain(|other| other != id);

        let anchored: Vec<ArrowId> = self
            .arrows()
            .filter(|arrow| arrow.touches(id))
            .map(|arrow| arrow.id.clone())
            .collect();
        for arrow_id in anchored {
            self.delete_arrow(&arrow_id);
        }
        Some(item)
    }

    /// Canvas rectangle of an item.
    pub fn item_rect(&self, id: &str) -> Option<Rect> {
        self.items.get(id).map(|item| item.rect(self.auto_fallback))
    }

    /// Topmost item on `board` containing `point`.
    pub fn item_at(&self, board: &BoardRef, point: Point) -> Option<&Item> {
        let fallback = self.auto_fallback;
        self.item_order
            .iter()
            .rev()
            .filter_map(|id| self.items.get(id))
            .find(|item| &item.parent == board && item.rect(fallback).contains(point))
    }

    /// Ids of items on `board` whose rectangle strictly overlaps `rect`.
    pub fn items_in_rect(&self, board: &BoardRef, rect: Rect) -> Vec<ItemId> {
        let fallback = self.auto_fallback;
        self.items_in(board)
            .filter(|item| rect_intersects_rect(item.rect(fallback), rect))
            .map(|item| item.id.clone())
            .collect()
    }

    /// Union of the rectangles of every item on `board`.
    pub fn content_bounds(&self, board: &BoardRef) -> Option<Rect> {
        let fallback = self.auto_fallback;
        self.items_in(board)
            .map(|item| item.rect(fallback))
            .reduce(|acc, rect| acc.union(rect))
    }

    // --- arrows --------------------------------------------------------

    pub fn arrow(&self, id: &str) -> Option<&Arrow> {
        self.arrows.get(id)
    }

    pub fn arrow_mut(&mut self, id: &str) -> Option<&mut Arrow> {
        self.arrows.get_mut(id)
    }

    pub fn arrows(&self) -> impl Iterator<Item = &Arrow> {
        self.arrow_order.iter().filter_map(|id| self.arrows.get(id))
    }

    pub fn arrows_in<'a>(&'a self, board: &'a BoardRef) -> impl Iterator<Item = &'a Arrow> + 'a {
        self.arrows().filter(move |arrow| &arrow.parent == board)
    }

    pub fn add_arrow(&mut self, arrow: Arrow) -> ArrowId {
        let id = arrow.id.clone();
        if self.arrows.insert(id.clone(), arrow).is_none() {
            self.arrow_order.push(id.clone());
        }
        id
    }

    pub fn delete_arrow(&mut self, id: &str) -> Option<Arrow> {
        let arrow = self.arrows.remove(id)?;
        self.arrow_order.retain(|other| other != id);
        Some(arrow)
    }

    // --- hierarchy -----------------------------------------------------

    /// Walk parent edges from `board` up to the root. The walk is bounded by
    /// the arena size so a corrupt cycle cannot loop forever.
    fn ancestors_of(&self, board: &BoardRef) -> Vec<ItemId> {
        let mut chain = Vec::new();
        let mut current = board.clone();
        for _ in 0..=self.items.len() {
            let Some(id) = current.id() else { break };
            chain.push(id.to_string());
            match self.items.get(id) {
                Some(item) => current = item.parent.clone(),
                None => break,
            }
        }
        chain
    }

    /// True if `board` is `ancestor` or nested anywhere inside it.
    pub fn is_within(&self, board: &BoardRef, ancestor: &str) -> bool {
        self.ancestors_of(board).iter().any(|id| id == ancestor)
    }

    /// Check that `id` may be moved onto `target` without mutating anything.
    pub fn can_move_to(&self, id: &str, target: &BoardRef) -> Result<(), MoveError> {
        if !self.items.contains_key(id) {
            return Err(MoveError::UnknownItem(id.to_string()));
        }
        if let Some(target_id) = target.id() {
            let board = self
                .items
                .get(target_id)
                .ok_or_else(|| MoveError::UnknownBoard(target_id.to_string()))?;
            if !board.is_board() {
                return Err(MoveError::NotABoard(target_id.to_string()));
            }
            if self.is_within(target, id) {
                return Err(MoveError::Cycle {
                    item: id.to_string(),
                    target: target_id.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Reparent item `id` onto `target`.
    ///
    /// Arrows anchored to the item stay on their board; their anchored ends
    /// are detached to the item's last centre. Returns `Ok(false)` when the
    /// item is already on `target`.
    pub fn move_item_to_board(&mut self, id: &str, target: &BoardRef) -> Result<bool, MoveError> {
        self.can_move_to(id, target)?;
        let fallback = self.auto_fallback;
        let Some(item) = self.items.get_mut(id) else {
            return Err(MoveError::UnknownItem(id.to_string()));
        };
        if &item.parent == target {
            return Ok(false);
        }
        item.parent = target.clone();
        let center = item.rect(fallback).center();

        for arrow in self.arrows.values_mut() {
            arrow.detach(id, center);
        }
        Ok(true)
    }

    /// Every board nested (at any depth) inside board `id`.
    pub fn descendant_boards(&self, id: &str) -> Vec<ItemId> {
        let mut found = Vec::new();
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut frontier = vec![id.to_string()];

        while let Some(current) = frontier.pop() {
            let parent = BoardRef::Board(current);
            for child in self.items_in(&parent).filter(|item| item.is_board()) {
                if seen.insert(child.id.clone()) {
                    found.push(child.id.clone());
                    frontier.push(child.id.clone());
                }
            }
        }
        found
    }

    /// All board items, in paint order.
    pub fn boards(&self) -> Vec<BoardEntry> {
        self.items()
            .filter(|item| item.is_board())
            .map(|item| BoardEntry {
                board: BoardRef::Board(item.id.clone()),
                name: item.content().to_string(),
            })
            .collect()
    }

    /// Boards item `id` could be moved to: the root plus every board except
    /// its current parent, itself and its descendants.
    pub fn move_targets(&self, id: &str) -> Vec<BoardEntry> {
        let Some(item) = self.items.get(id) else {
            return Vec::new();
        };
        std::iter::once(BoardEntry::root())
            .chain(self.boards())
            .filter(|entry| entry.board != item.parent)
            .filter(|entry| self.can_move_to(id, &entry.board).is_ok())
            .collect()
    }

    /// Parent edges that form a cycle, reported by the first item found on one.
    pub fn find_cycle(&self) -> Option<ItemId> {
        self.item_order
            .iter()
            .filter_map(|id| self.items.get(id))
            .find(|item| self.is_within(&item.parent, &item.id))
            .map(|item| item.id.clone())
    }

    // --- todo lists ----------------------------------------------------

    /// Move a todo entry from list `from` to list `to`, before entry
    /// `before` (or to the end). Dropping on the same list without a target
    /// is a no-op. Returns true if the scene changed.
    pub fn transfer_todo(&mut self, from: &str, entry_id: &str, to: &str, before: Option<&str>) -> bool {
        if from == to && before.is_none() {
            return false;
        }
        if before == Some(entry_id) {
            return false;
        }
        if self.items.get(to).and_then(Item::todos).is_none() {
            return false;
        }
        let Some(entry) = self
            .items
            .get_mut(from)
            .and_then(Item::todos_mut)
            .and_then(|entries| remove_entry(entries, entry_id))
        else {
            return false;
        };
        if let Some(entries) = self.items.get_mut(to).and_then(Item::todos_mut) {
            insert_before(entries, entry, before);
        }
        true
    }
}
