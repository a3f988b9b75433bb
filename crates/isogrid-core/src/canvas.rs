//! Canvas runtime: scene, history, view and navigation for one open canvas.

use kurbo::{Point, Rect};

use crate::config::EngineConfig;
use crate::context_menu::ContextMenu;
use crate::document::{self, CanvasData, ImportError};
use crate::geometry::{ArrowRoute, Terminal, rect_from_points, route_terminals};
use crate::history::History;
use crate::interaction::Interaction;
use crate::items::{
    Arrow, ArrowId, BoardRef, Endpoint, IntakeError, Item, ItemId, ItemKind, ItemPatch, ItemType, TextAlign, add_entry,
    edit_entry, image_item_from_bytes, remove_entry, toggle_entry,
};
use crate::navigation::NavigationStack;
use crate::scene::{BoardEntry, MoveError, Scene, Snapshot};
use crate::selection::{ArrowEnd, Selection};
use crate::settings::{BoardSettings, SettingsPatch};
use crate::storage::{Storage, StorageResult};
use crate::viewport::Viewport;

/// Padding (screen pixels) kept around content by [`Canvas::fit_to_content`].
const FIT_PADDING: f64 = 50.0;

/// One open canvas.
///
/// All mutations go through methods here. Each committing method records
/// exactly one history entry and bumps the revision used by autosave.
pub struct Canvas {
    pub config: EngineConfig,
    pub viewport: Viewport,
    pub selection: Selection,
    pub(crate) scene: Scene,
    pub(crate) history: History,
    pub(crate) navigation: NavigationStack,
    pub(crate) settings: BoardSettings,
    pub(crate) interaction: Interaction,
    pub(crate) context_menu: Option<ContextMenu>,
    revision: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Canvas {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            viewport: Viewport::new(&config),
            selection: Selection::default(),
            scene: Scene::new(config.auto_height_fallback),
            history: History::new(Snapshot::default(), config.history_limit),
            navigation: NavigationStack::new(),
            settings: BoardSettings::default(),
            interaction: Interaction::Idle,
            context_menu: None,
            revision: 0,
            config,
        }
    }

    /// Canvas seeded with `data`; the data becomes the base history entry.
    pub fn from_data(data: CanvasData, config: EngineConfig) -> Self {
        let mut canvas = Self::new(config);
        canvas.seed(data);
        canvas
    }

    fn seed(&mut self, data: CanvasData) {
        let snapshot = data.snapshot();
        self.scene.restore(snapshot.clone());
        self.history.reset(snapshot);
        self.settings = data.settings.unwrap_or_default();
    }

    // --- read access ---------------------------------------------------

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn navigation(&self) -> &NavigationStack {
        &self.navigation
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    /// Count of local mutations since the canvas was created or loaded.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn current_board(&self) -> &BoardRef {
        self.navigation.current_board()
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.scene.item(id)
    }

    pub fn arrow(&self, id: &str) -> Option<&Arrow> {
        self.scene.arrow(id)
    }

    /// Items on the current board, back to front.
    pub fn visible_items(&self) -> impl Iterator<Item = &Item> {
        self.scene.items_in(self.navigation.current_board())
    }

    pub fn visible_arrows(&self) -> impl Iterator<Item = &Arrow> {
        self.scene.arrows_in(self.navigation.current_board())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.scene
            .item(id)
            .is_some_and(|item| &item.parent == self.navigation.current_board())
    }

    /// Rectangle an item is displayed at, including any drag or resize
    /// preview in progress.
    pub fn display_rect(&self, id: &str) -> Option<Rect> {
        let rect = self.scene.item_rect(id)?;
        Some(self.interaction.preview_rect(id, rect).unwrap_or(rect))
    }

    fn endpoint_terminal(&self, endpoint: &Endpoint) -> Option<Terminal> {
        match endpoint {
            Endpoint::Free(p) => Some(Terminal::Point(*p)),
            Endpoint::Anchored { item_id } => self.display_rect(item_id).map(Terminal::Rect),
        }
    }

    /// Routed geometry of an arrow as currently displayed. `None` when an
    /// anchored end points at a missing item.
    pub fn arrow_route(&self, id: &str) -> Option<ArrowRoute> {
        let arrow = self.scene.arrow(id)?;
        let (start, end) = match self.interaction.endpoint_preview(id) {
            Some((ArrowEnd::Start, p)) => (Endpoint::Free(p), arrow.end.clone()),
            Some((ArrowEnd::End, p)) => (arrow.start.clone(), Endpoint::Free(p)),
            None => (arrow.start.clone(), arrow.end.clone()),
        };
        Some(route_terminals(
            self.endpoint_terminal(&start)?,
            self.endpoint_terminal(&end)?,
            self.config.arrowhead_length,
        ))
    }

    /// Live preview of an arrow being drawn.
    pub fn arrow_preview(&self) -> Option<ArrowRoute> {
        let Interaction::DrawingArrow { start: Some(start), cursor } = &self.interaction else {
            return None;
        };
        Some(route_terminals(
            self.endpoint_terminal(start)?,
            Terminal::Point(*cursor),
            self.config.arrowhead_length,
        ))
    }

    /// Marquee rectangle in screen space while one is being dragged.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.interaction {
            Interaction::MarqueeSelecting { start, current } => Some(rect_from_points(*start, *current)),
            _ => None,
        }
    }

    pub fn editing_item(&self) -> Option<&str> {
        match &self.interaction {
            Interaction::EditingItem { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn editing_draft(&self) -> Option<&str> {
        match &self.interaction {
            Interaction::EditingItem { draft, .. } => Some(draft),
            _ => None,
        }
    }

    // --- history -------------------------------------------------------

    /// Record the live scene as a new history entry.
    pub(crate) fn commit(&mut self, reason: &str) {
        self.history.commit(self.scene.snapshot());
        self.revision += 1;
        log::debug!("commit #{} ({reason})", self.revision);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_interaction();
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        log::debug!("undo to entry {}", self.history.cursor());
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_interaction();
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        log::debug!("redo to entry {}", self.history.cursor());
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.scene.restore(snapshot);
        self.revision += 1;
        self.after_structure_change();
    }

    /// Drop selection entries and breadcrumb frames that no longer exist and
    /// bring breadcrumb names in line with their board items.
    fn after_structure_change(&mut self) {
        let scene = &self.scene;
        self.selection
            .retain(|id| scene.item(id).is_some(), |id| scene.arrow(id).is_some());
        let pruned = self
            .navigation
            .prune(|id| scene.item(id).is_some_and(Item::is_board));
        self.navigation
            .sync_names(|id| scene.item(id).map(|item| item.content().to_string()));
        if pruned {
            log::info!("current board disappeared, returned to {}", self.navigation.current().name);
            self.viewport.reset();
            self.selection.clear();
        }
    }

    // --- item mutations ------------------------------------------------

    /// Create an item of `ty` with its top-left at canvas point `at` on the
    /// current board.
    pub fn add_item(&mut self, ty: ItemType, at: Point) -> ItemId {
        let item = Item::create(ty, at, self.current_board().clone(), &self.config);
        self.push_item(item)
    }

    /// Add a fully built item. `None` (and nothing recorded) when its parent
    /// is neither the root nor an existing board, or its id is taken.
    pub fn insert_item(&mut self, item: Item) -> Option<ItemId> {
        let parent_ok = match &item.parent {
            BoardRef::Root => true,
            BoardRef::Board(board) => self.scene.item(board).is_some_and(Item::is_board),
        };
        if !parent_ok || self.scene.item(&item.id).is_some() {
            log::warn!("rejected item {} with parent {:?}", item.id, item.parent);
            return None;
        }
        Some(self.push_item(item))
    }

    /// The current board always exists, so items created on it need no check.
    fn push_item(&mut self, item: Item) -> ItemId {
        let id = self.scene.add_item(item);
        self.commit("add item");
        id
    }

    /// Place pasted or dropped image bytes at the viewport centre.
    pub fn paste_image(&mut self, bytes: &[u8]) -> Result<ItemId, IntakeError> {
        let item = image_item_from_bytes(
            bytes,
            self.viewport.canvas_center(),
            self.current_board().clone(),
            &self.config,
        )?;
        Ok(self.push_item(item))
    }

    /// Shallow-merge `patch` into item `id`. Unknown ids and no-op patches
    /// return false and record nothing.
    pub fn update_item(&mut self, id: &str, patch: &ItemPatch) -> bool {
        if !self.scene.update_item(id, patch) {
            return false;
        }
        if patch.content.is_some() {
            self.sync_board_name(id);
        }
        self.commit("update item");
        true
    }

    /// Apply many patches as one history entry. Returns how many items changed.
    pub fn update_items(&mut self, patches: &[(ItemId, ItemPatch)]) -> usize {
        let mut changed = 0;
        for (id, patch) in patches {
            if self.scene.update_item(id, patch) {
                changed += 1;
                if patch.content.is_some() {
                    self.sync_board_name(id);
                }
            }
        }
        if changed > 0 {
            self.commit("update items");
        }
        changed
    }

    fn sync_board_name(&mut self, id: &str) {
        if let Some(item) = self.scene.item(id).filter(|item| item.is_board()) {
            let name = item.content().to_string();
            self.navigation.rename(id, &name);
        }
    }

    /// Rename a board item; breadcrumb frames follow.
    pub fn rename_board(&mut self, id: &str, name: &str) -> bool {
        if !self.scene.item(id).is_some_and(Item::is_board) {
            return false;
        }
        self.update_item(id, &ItemPatch::content(name))
    }

    /// Align line `line` of a text or title item. Lines past the end of
    /// the content are rejected.
    pub fn set_line_align(&mut self, id: &str, line: usize, align: TextAlign) -> bool {
        let aligned = match self.scene.item_mut(id).map(|item| &mut item.kind) {
            Some(ItemKind::Text { text, style } | ItemKind::Title { text, style, .. }) => {
                style.set_line_align(text, line, align)
            }
            _ => false,
        };
        if aligned {
            self.commit("align line");
        }
        aligned
    }

    /// Delete an item and the arrows anchored to it.
    pub fn delete_item(&mut self, id: &str) -> bool {
        if self.scene.delete_item(id).is_none() {
            return false;
        }
        self.commit("delete item");
        self.after_structure_change();
        true
    }

    pub fn delete_arrow(&mut self, id: &str) -> bool {
        if self.scene.delete_arrow(id).is_none() {
            return false;
        }
        self.commit("delete arrow");
        self.after_structure_change();
        true
    }

    /// Delete every selected item and arrow as one history entry.
    pub fn delete_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let items: Vec<ItemId> = self.selection.items.iter().cloned().collect();
        let arrows: Vec<ArrowId> = self.selection.arrows.iter().cloned().collect();
        let mut removed = false;
        for id in &items {
            removed |= self.scene.delete_item(id).is_some();
        }
        for id in &arrows {
            removed |= self.scene.delete_arrow(id).is_some();
        }
        self.selection.clear();
        if removed {
            self.commit("delete selection");
            self.after_structure_change();
        }
        removed
    }

    /// Add an arrow on the current board.
    pub fn add_arrow(&mut self, start: Endpoint, end: Endpoint) -> ArrowId {
        let id = self
            .scene
            .add_arrow(Arrow::new(start, end, self.current_board().clone()));
        self.commit("add arrow");
        id
    }

    /// Move a free arrow end.
    pub fn set_arrow_end(&mut self, id: &str, end: ArrowEnd, position: Point) -> bool {
        let Some(arrow) = self.scene.arrow_mut(id) else {
            return false;
        };
        let endpoint = match end {
            ArrowEnd::Start => &mut arrow.start,
            ArrowEnd::End => &mut arrow.end,
        };
        let moved = Endpoint::Free(position);
        if *endpoint == moved {
            return false;
        }
        *endpoint = moved;
        self.commit("move arrow end");
        true
    }

    pub fn can_move_to(&self, id: &str, target: &BoardRef) -> Result<(), MoveError> {
        self.scene.can_move_to(id, target)
    }

    /// Reparent an item. Nothing is mutated or recorded when the move is
    /// rejected or the item is already on `target`.
    pub fn move_item_to_board(&mut self, id: &str, target: &BoardRef) -> Result<bool, MoveError> {
        if !self.scene.move_item_to_board(id, target)? {
            return Ok(false);
        }
        if target != self.current_board() {
            self.selection.items.remove(id);
        }
        self.commit("move to board");
        Ok(true)
    }

    pub fn move_targets(&self, id: &str) -> Vec<BoardEntry> {
        self.scene.move_targets(id)
    }

    pub fn boards(&self) -> Vec<BoardEntry> {
        self.scene.boards()
    }

    // --- todo lists ----------------------------------------------------

    pub fn add_todo(&mut self, list: &str, text: &str) -> Option<String> {
        let entries = self.scene.item_mut(list)?.todos_mut()?;
        let id = add_entry(entries, text);
        self.commit("add todo");
        Some(id)
    }

    pub fn toggle_todo(&mut self, list: &str, entry: &str) -> bool {
        let toggled = self
            .scene
            .item_mut(list)
            .and_then(Item::todos_mut)
            .is_some_and(|entries| toggle_entry(entries, entry));
        if toggled {
            self.commit("toggle todo");
        }
        toggled
    }

    pub fn edit_todo(&mut self, list: &str, entry: &str, text: &str) -> bool {
        let edited = self
            .scene
            .item_mut(list)
            .and_then(Item::todos_mut)
            .is_some_and(|entries| {
                entries.iter().any(|e| e.id == entry && e.text != text) && edit_entry(entries, entry, text)
            });
        if edited {
            self.commit("edit todo");
        }
        edited
    }

    pub fn delete_todo(&mut self, list: &str, entry: &str) -> bool {
        let removed = self
            .scene
            .item_mut(list)
            .and_then(Item::todos_mut)
            .and_then(|entries| remove_entry(entries, entry))
            .is_some();
        if removed {
            self.commit("delete todo");
        }
        removed
    }

    /// Drag a todo entry onto another list (or another spot in the same
    /// list), before `before` or at the end.
    pub fn transfer_todo(&mut self, from: &str, entry: &str, to: &str, before: Option<&str>) -> bool {
        if !self.scene.transfer_todo(from, entry, to, before) {
            return false;
        }
        self.commit("transfer todo");
        true
    }

    // --- navigation ----------------------------------------------------

    fn on_navigation_change(&mut self) {
        self.viewport.reset();
        self.selection.clear();
        self.context_menu = None;
        log::info!("viewing board {}", self.navigation.current().name);
    }

    /// Enter board item `id`. The board must be visible on the current board.
    pub fn enter_board(&mut self, id: &str) -> bool {
        let Some(item) = self.scene.item(id).filter(|item| item.is_board()) else {
            return false;
        };
        if &item.parent != self.navigation.current_board() {
            return false;
        }
        let name = item.content().to_string();
        self.finish_editing();
        self.cancel_interaction();
        self.navigation.enter(id, &name);
        self.on_navigation_change();
        true
    }

    /// Breadcrumb: jump to frame `index` of the navigation path.
    pub fn navigate_to(&mut self, index: usize) -> bool {
        if index + 1 >= self.navigation.depth() {
            return false;
        }
        self.finish_editing();
        self.cancel_interaction();
        self.navigation.navigate_to(index);
        self.on_navigation_change();
        true
    }

    pub fn go_up(&mut self) -> bool {
        let depth = self.navigation.depth();
        depth > 1 && self.navigate_to(depth - 2)
    }

    // --- view ----------------------------------------------------------

    /// Zoom slider input, anchored on the viewport centre.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    /// Zoom and pan so every visible item is on screen.
    pub fn fit_to_content(&mut self) -> bool {
        match self.scene.content_bounds(self.navigation.current_board()) {
            Some(bounds) => {
                self.viewport.fit_to_bounds(bounds, FIT_PADDING);
                true
            }
            None => false,
        }
    }

    // --- settings ------------------------------------------------------

    /// Change board settings. Settings are persisted but not part of history.
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        let before = self.settings.clone();
        self.settings.apply(patch);
        if self.settings != before {
            self.revision += 1;
        }
    }

    // --- documents and persistence ------------------------------------

    pub fn snapshot(&self) -> Snapshot {
        self.scene.snapshot()
    }

    /// Payload to persist.
    pub fn data(&self) -> CanvasData {
        CanvasData::new(self.scene.snapshot(), self.settings.clone())
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        document::export_json(&self.scene.snapshot())
    }

    /// Replace the scene with an exported document. The document is fully
    /// validated first; on error nothing changes. On success the replacement
    /// is one history entry and navigation returns to the root.
    pub fn import_json(&mut self, text: &str) -> Result<(), ImportError> {
        let snapshot = match document::parse_import(text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("import rejected: {e}");
                return Err(e);
            }
        };
        self.finish_editing();
        self.cancel_interaction();
        let (items, arrows) = (snapshot.items.len(), snapshot.arrows.len());
        self.scene.restore(snapshot);
        self.commit("import");
        self.selection.clear();
        if self.navigation.reset_to_root() {
            self.on_navigation_change();
        } else {
            self.viewport.reset();
        }
        log::info!("imported {items} items and {arrows} arrows");
        Ok(())
    }

    /// Apply a payload loaded from storage. Refused once the canvas has local
    /// mutations, so a slow load can never overwrite newer edits.
    pub fn apply_loaded(&mut self, data: Option<CanvasData>) -> bool {
        if self.revision > 0 {
            log::warn!("ignoring loaded canvas: {} local changes already made", self.revision);
            return false;
        }
        self.seed(data.unwrap_or_default());
        self.after_structure_change();
        true
    }

    /// Load `user_id`'s canvas from `storage` and apply it.
    pub async fn load_from(&mut self, storage: &dyn Storage, user_id: &str) -> StorageResult<bool> {
        let data = storage.load(user_id).await?;
        match &data {
            Some(d) => log::info!("loaded {} items for {user_id}", d.items.len()),
            None => log::info!("no stored canvas for {user_id}, starting empty"),
        }
        Ok(self.apply_loaded(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pollster::block_on;

    fn canvas() -> Canvas {
        Canvas::default()
    }

    #[test]
    fn test_add_item_commits_once() {
        let mut canvas = canvas();
        let id = canvas.add_item(ItemType::Text, Point::new(10.0, 10.0));
        assert_eq!(canvas.history().len(), 2);
        assert!(canvas.is_visible(&id));
        assert!(canvas.undo());
        assert!(canvas.item(&id).is_none());
        assert!(canvas.redo());
        assert!(canvas.item(&id).is_some());
    }

    #[test]
    fn test_insert_item_checks_parent() {
        let mut canvas = canvas();
        let config = EngineConfig::default();
        let orphan = Item::create(ItemType::Text, Point::ZERO, BoardRef::board("ghost"), &config);
        assert!(canvas.insert_item(orphan).is_none());

        let text = canvas.add_item(ItemType::Text, Point::ZERO);
        let under_text = Item::create(ItemType::Text, Point::ZERO, BoardRef::board(text), &config);
        assert!(canvas.insert_item(under_text).is_none());
        assert_eq!(canvas.history().len(), 2);

        let board = canvas.add_item(ItemType::Board, Point::ZERO);
        let child = Item::create(ItemType::Text, Point::ZERO, BoardRef::board(board), &config);
        let id = canvas.insert_item(child.clone()).unwrap();
        assert!(canvas.item(&id).is_some());
        assert!(canvas.insert_item(child).is_none());
    }

    #[test]
    fn test_noop_update_records_nothing() {
        let mut canvas = canvas();
        let id = canvas.add_item(ItemType::Text, Point::ZERO);
        assert!(!canvas.update_item(&id, &ItemPatch::content("New Text")));
        assert!(!canvas.update_item("ghost", &ItemPatch::content("x")));
        assert_eq!(canvas.history().len(), 2);
    }

    #[test]
    fn test_batch_update_is_one_entry() {
        let mut canvas = canvas();
        let a = canvas.add_item(ItemType::Text, Point::ZERO);
        let b = canvas.add_item(ItemType::Title, Point::ZERO);
        let patch = ItemPatch {
            font_size: Some(24.0),
            ..ItemPatch::default()
        };
        let before = canvas.history().len();
        assert_eq!(canvas.update_items(&[(a.clone(), patch.clone()), (b, patch)]), 2);
        assert_eq!(canvas.history().len(), before + 1);
        assert!(canvas.undo());
        let style = canvas.item(&a).and_then(|i| i.kind.text_style()).unwrap();
        assert!((style.font_size - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_line_align() {
        let mut canvas = canvas();
        let id = canvas.add_item(ItemType::Text, Point::ZERO);
        assert!(!canvas.set_line_align(&id, 2, TextAlign::Center));
        assert!(!canvas.set_line_align(&id, usize::MAX, TextAlign::Center));
        assert!(canvas.update_item(&id, &ItemPatch::content("one\ntwo\nthree")));
        let before = canvas.history().len();
        assert!(canvas.set_line_align(&id, 2, TextAlign::Center));
        assert_eq!(canvas.history().len(), before + 1);
        match &canvas.item(&id).unwrap().kind {
            ItemKind::Text { style, .. } => {
                assert_eq!(style.line_aligns, vec![TextAlign::Left, TextAlign::Left, TextAlign::Center]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!canvas.set_line_align(&id, 2, TextAlign::Center));
        let board = canvas.add_item(ItemType::Board, Point::ZERO);
        assert!(!canvas.set_line_align(&board, 0, TextAlign::Right));
    }

    #[test]
    fn test_rename_board_updates_breadcrumb() {
        let mut canvas = canvas();
        let board = canvas.add_item(ItemType::Board, Point::ZERO);
        assert!(canvas.enter_board(&board));
        assert!(canvas.rename_board(&board, "Ideas"));
        assert_eq!(canvas.navigation().current().name, "Ideas");
    }

    #[test]
    fn test_undo_redo_rename_keeps_breadcrumb_in_sync() {
        let mut canvas = canvas();
        let board = canvas.add_item(ItemType::Board, Point::ZERO);
        assert!(canvas.enter_board(&board));
        assert!(canvas.rename_board(&board, "Ideas"));

        assert!(canvas.undo());
        assert_eq!(canvas.item(&board).map(Item::content), Some("New Board"));
        assert_eq!(canvas.navigation().current().name, "New Board");

        assert!(canvas.redo());
        assert_eq!(canvas.navigation().current().name, "Ideas");
        assert_eq!(canvas.navigation().depth(), 2);
    }

    #[test]
    fn test_undo_past_board_creation_returns_home() {
        let mut canvas = canvas();
        let board = canvas.add_item(ItemType::Board, Point::ZERO);
        canvas.enter_board(&board);
        canvas.viewport.set_zoom(2.0);
        assert!(canvas.undo());
        assert!(canvas.navigation().is_at_root());
        assert!((canvas.viewport.zoom() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_selection_single_entry() {
        let mut canvas = canvas();
        let a = canvas.add_item(ItemType::Text, Point::ZERO);
        let b = canvas.add_item(ItemType::Text, Point::new(400.0, 0.0));
        let arrow = canvas.add_arrow(Endpoint::anchored(a.clone()), Endpoint::anchored(b.clone()));
        canvas.selection.click_item(&a, false);
        let before = canvas.history().len();

        assert!(canvas.delete_selection());

        assert_eq!(canvas.history().len(), before + 1);
        assert!(canvas.arrow(&arrow).is_none());
        assert!(canvas.item(&b).is_some());
    }

    #[test]
    fn test_todo_operations() {
        let mut canvas = canvas();
        let list = canvas.add_item(ItemType::Todo, Point::ZERO);
        let other = canvas.add_item(ItemType::Todo, Point::new(400.0, 0.0));
        let entry = canvas.add_todo(&list, "write tests").unwrap();
        assert!(canvas.toggle_todo(&list, &entry));
        assert!(canvas.edit_todo(&list, &entry, "write more tests"));
        assert!(!canvas.edit_todo(&list, &entry, "write more tests"));
        assert!(canvas.transfer_todo(&list, &entry, &other, None));
        let moved = &canvas.item(&other).unwrap().todos().unwrap()[0];
        assert!(moved.completed);
        assert_eq!(moved.text, "write more tests");
        assert!(canvas.delete_todo(&other, &entry));
        assert!(canvas.add_todo("missing", "x").is_none());
    }

    #[test]
    fn test_apply_loaded_refused_after_local_change() {
        let storage = MemoryStorage::new();
        let mut seeded = canvas();
        seeded.add_item(ItemType::Link, Point::ZERO);
        block_on(storage.save("u", &seeded.data())).unwrap();

        let mut fresh = canvas();
        assert!(block_on(fresh.load_from(&storage, "u")).unwrap());
        assert_eq!(fresh.scene().item_count(), 1);
        assert!(!fresh.can_undo());

        let mut busy = canvas();
        busy.add_item(ItemType::Text, Point::ZERO);
        assert!(!block_on(busy.load_from(&storage, "u")).unwrap());
        assert_eq!(busy.visible_items().next().map(Item::item_type), Some(ItemType::Text));
    }

    #[test]
    fn test_settings_bump_revision_without_history() {
        let mut canvas = canvas();
        canvas.update_settings(&SettingsPatch {
            show_grid: Some(false),
            ..SettingsPatch::default()
        });
        assert_eq!(canvas.revision(), 1);
        assert!(!canvas.can_undo());
        assert_eq!(canvas.data().settings.map(|s| s.show_grid), Some(false));
    }

    #[test]
    fn test_fit_to_content() {
        let mut canvas = canvas();
        assert!(!canvas.fit_to_content());
        canvas.add_item(ItemType::Board, Point::new(1000.0, 1000.0));
        assert!(canvas.fit_to_content());
        let visible = canvas.viewport.visible_rect();
        assert!(visible.contains(Point::new(1150.0, 1100.0)));
    }
}
