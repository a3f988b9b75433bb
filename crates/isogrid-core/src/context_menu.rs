//! Right-click menu: what it targets, which actions it offers and running them.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::interaction::{Hit, Interaction};
use crate::items::{ArrowId, BoardRef, Endpoint, ItemId, ItemType};

/// What the menu was opened over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum MenuTarget {
    Canvas,
    Item(ItemId),
    Arrow(ArrowId),
}

/// An open context menu. `position` is in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub position: Point,
    pub target: MenuTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "arg", rename_all = "camelCase")]
pub enum MenuAction {
    /// Create an item with its top-left at the menu point.
    Add(ItemType),
    /// Start drawing an arrow, from the menu's item when it targets one.
    Connect,
    Edit,
    Delete,
    EnterBoard,
    MoveToBoard(BoardRef),
}

impl Canvas {
    pub(crate) fn open_context_menu(&mut self, position: Point) {
        let target = match self.hit_test(position) {
            Hit::Item(id) | Hit::Handle(id, _) => MenuTarget::Item(id),
            Hit::Arrow(id) | Hit::ArrowEnd(id, _) => MenuTarget::Arrow(id),
            Hit::Background => MenuTarget::Canvas,
        };
        log::debug!("context menu at {position:?} for {target:?}");
        self.context_menu = Some(ContextMenu { position, target });
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Actions available in the open menu, in display order.
    pub fn menu_actions(&self) -> Vec<MenuAction> {
        let Some(menu) = &self.context_menu else {
            return Vec::new();
        };
        match &menu.target {
            MenuTarget::Canvas => ItemType::ALL
                .iter()
                .map(|ty| MenuAction::Add(*ty))
                .chain(std::iter::once(MenuAction::Connect))
                .collect(),
            MenuTarget::Item(id) => {
                let Some(item) = self.scene.item(id) else {
                    return Vec::new();
                };
                let mut actions = Vec::new();
                if item.is_board() {
                    actions.push(MenuAction::EnterBoard);
                }
                if item.item_type().is_editable() {
                    actions.push(MenuAction::Edit);
                }
                actions.push(MenuAction::Connect);
                actions.extend(
                    self.scene
                        .move_targets(id)
                        .into_iter()
                        .map(|entry| MenuAction::MoveToBoard(entry.board)),
                );
                actions.push(MenuAction::Delete);
                actions
            }
            MenuTarget::Arrow(_) => vec![MenuAction::Delete],
        }
    }

    /// Run `action` against the open menu's target and close the menu.
    /// Returns false when there is no menu or the action does not apply.
    pub fn perform_menu_action(&mut self, action: &MenuAction) -> bool {
        let Some(menu) = self.context_menu.take() else {
            return false;
        };
        match (action, &menu.target) {
            (MenuAction::Add(ty), _) => {
                let at = self.viewport.screen_to_canvas(menu.position);
                self.add_item(*ty, at);
                true
            }
            (MenuAction::Connect, target) => {
                let start = match target {
                    MenuTarget::Item(id) if self.scene.item(id).is_some() => Some(Endpoint::anchored(id.clone())),
                    MenuTarget::Item(_) => return false,
                    _ => None,
                };
                self.finish_editing();
                self.interaction = Interaction::DrawingArrow {
                    start,
                    cursor: self.viewport.screen_to_canvas(menu.position),
                };
                true
            }
            (MenuAction::Edit, MenuTarget::Item(id)) => self.begin_editing(id),
            (MenuAction::Delete, MenuTarget::Item(id)) => self.delete_item(id),
            (MenuAction::Delete, MenuTarget::Arrow(id)) => self.delete_arrow(id),
            (MenuAction::EnterBoard, MenuTarget::Item(id)) => self.enter_board(id),
            (MenuAction::MoveToBoard(target), MenuTarget::Item(id)) => match self.move_item_to_board(id, target) {
                Ok(moved) => moved,
                Err(e) => {
                    log::warn!("move rejected: {e}");
                    false
                }
            },
            _ => false,
        }
    }
}
