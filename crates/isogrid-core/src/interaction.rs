//! Pointer and keyboard state machine.
//!
//! Gestures only touch the scene at their commit point (pointer release,
//! second arrow click, end of editing). Until then the preview lives in the
//! [`Interaction`] state and is overlaid by [`Canvas::display_rect`] and
//! [`Canvas::arrow_route`].

use kurbo::{Point, Rect, Vec2};

use crate::canvas::Canvas;
use crate::geometry::{point_to_segment_dist, rect_from_points};
use crate::input::{InputEvent, Modifiers, MouseButton, keys};
use crate::items::{ArrowId, Endpoint, Height, Item, ItemId, ItemPatch, ItemType};
use crate::selection::{ArrowEnd, ResizeHandle, ResizeRules, apply_resize, hit_test_handles};

/// Current gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    /// Dragging the view. `last` is the previous pointer position (screen).
    Panning { last: Point },
    /// Moving one item. `grab_offset` is the pointer minus the item's
    /// top-left in canvas units, `position` the previewed top-left.
    DraggingItem {
        id: ItemId,
        grab_offset: Vec2,
        origin: Point,
        position: Point,
    },
    /// Resizing from a fixed start rectangle; `current` is the preview.
    ResizingItem {
        id: ItemId,
        handle: ResizeHandle,
        start_rect: Rect,
        start_pointer: Point,
        current: Rect,
    },
    /// Rubber band in screen space.
    MarqueeSelecting { start: Point, current: Point },
    /// Waiting for the first (`start == None`) or second click of a new
    /// arrow. Clicks on an item anchor that end to it.
    DrawingArrow { start: Option<Endpoint>, cursor: Point },
    /// Moving a free arrow end; `position` is the preview in canvas space.
    DraggingArrowEnd {
        id: ArrowId,
        end: ArrowEnd,
        position: Point,
    },
    /// Secondary button held. Releasing without dragging opens the menu.
    ContextPress { start: Point, dragged: bool },
    EditingItem { id: ItemId, draft: String },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// A pointer gesture is in flight.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Interaction::Idle | Interaction::EditingItem { .. })
    }

    pub(crate) fn preview_rect(&self, id: &str, rect: Rect) -> Option<Rect> {
        match self {
            Interaction::DraggingItem { id: dragged, position, .. } if dragged.as_str() == id => {
                Some(rect.with_origin(*position))
            }
            Interaction::ResizingItem { id: resized, current, .. } if resized.as_str() == id => Some(*current),
            _ => None,
        }
    }

    pub(crate) fn endpoint_preview(&self, arrow: &str) -> Option<(ArrowEnd, Point)> {
        match self {
            Interaction::DraggingArrowEnd { id, end, position } if id.as_str() == arrow => Some((*end, *position)),
            _ => None,
        }
    }
}

/// What lies under a screen point, in priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    /// Free end of a selected arrow.
    ArrowEnd(ArrowId, ArrowEnd),
    Handle(ItemId, ResizeHandle),
    Item(ItemId),
    Arrow(ArrowId),
    Background,
}

impl Canvas {
    /// Feed one host event through the state machine.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            InputEvent::PointerMove { position, modifiers } => self.pointer_move(position, modifiers),
            InputEvent::PointerUp {
                position,
                button,
                modifiers,
            } => self.pointer_up(position, button, modifiers),
            InputEvent::DoubleClick { position, modifiers } => self.double_click(position, modifiers),
            InputEvent::Wheel { position, delta_y, .. } => self.viewport.wheel(position, delta_y),
            InputEvent::Key { key, modifiers } => self.key(&key, modifiers),
            InputEvent::TextInput { text } => {
                if let Interaction::EditingItem { draft, .. } = &mut self.interaction {
                    *draft = text;
                }
            }
            InputEvent::Resize { origin, size } => self.viewport.set_bounds(origin, size),
            InputEvent::PointerCaptureLost => {
                if self.interaction.is_transient() {
                    self.cancel_interaction();
                }
            }
        }
    }

    /// Classify the screen point `screen` against the current board.
    pub fn hit_test(&self, screen: Point) -> Hit {
        let at = self.viewport.screen_to_canvas(screen);
        let zoom = self.viewport.zoom();
        let handle_tolerance = self.config.handle_tolerance / zoom;

        for arrow in self.visible_arrows().filter(|a| self.selection.contains_arrow(&a.id)) {
            for (end, endpoint) in [(ArrowEnd::Start, &arrow.start), (ArrowEnd::End, &arrow.end)] {
                if let Endpoint::Free(p) = endpoint {
                    if p.distance(at) <= handle_tolerance {
                        return Hit::ArrowEnd(arrow.id.clone(), end);
                    }
                }
            }
        }

        let fallback = self.scene.auto_fallback();
        let items: Vec<&Item> = self.visible_items().collect();
        for item in items.iter().rev() {
            let rect = item.rect(fallback);
            if let Some(handle) = hit_test_handles(rect, at, handle_tolerance) {
                return Hit::Handle(item.id.clone(), handle);
            }
            if rect.contains(at) {
                return Hit::Item(item.id.clone());
            }
        }

        let arrow_tolerance = self.config.arrow_hit_tolerance / zoom;
        let arrows: Vec<&ArrowId> = self.visible_arrows().map(|a| &a.id).collect();
        for id in arrows.into_iter().rev() {
            let Some(route) = self.arrow_route(id) else {
                continue;
            };
            if point_to_segment_dist(at, route.start, route.end) <= arrow_tolerance {
                return Hit::Arrow(id.clone());
            }
        }

        Hit::Background
    }

    /// Start editing item `id`, committing any other edit first.
    pub fn begin_editing(&mut self, id: &str) -> bool {
        let Some(item) = self.scene.item(id) else {
            return false;
        };
        if !item.item_type().is_editable() || self.editing_item() == Some(id) {
            return false;
        }
        let draft = item.content().to_string();
        self.finish_editing();
        self.cancel_interaction();
        self.interaction = Interaction::EditingItem {
            id: id.to_string(),
            draft,
        };
        true
    }

    /// Commit the draft of the item being edited. Returns true if the item
    /// changed.
    ///
    /// The editing state is taken out before the commit, so a second call
    /// (blur racing Enter, say) finds nothing to commit.
    pub fn finish_editing(&mut self) -> bool {
        match std::mem::take(&mut self.interaction) {
            Interaction::EditingItem { id, draft } => self.update_item(&id, &ItemPatch::content(draft)),
            other => {
                self.interaction = other;
                false
            }
        }
    }

    /// Drop whatever gesture or edit is in progress without committing it.
    pub fn cancel_interaction(&mut self) {
        if !self.interaction.is_idle() {
            log::debug!("cancelled {:?}", self.interaction);
            self.interaction = Interaction::Idle;
        }
    }

    fn pointer_down(&mut self, position: Point, button: MouseButton, modifiers: Modifiers) {
        self.context_menu = None;
        let at = self.viewport.screen_to_canvas(position);

        if let Some(id) = self.editing_item() {
            if self.display_rect(id).is_some_and(|rect| rect.contains(at)) {
                return;
            }
            self.finish_editing();
        }

        if let Interaction::DrawingArrow { start, .. } = &self.interaction {
            let start = start.clone();
            self.arrow_click(start, position, at, button);
            return;
        }

        match button {
            MouseButton::Middle => self.interaction = Interaction::Panning { last: position },
            MouseButton::Right => {
                self.interaction = Interaction::ContextPress {
                    start: position,
                    dragged: false,
                }
            }
            MouseButton::Left => self.primary_down(position, at, modifiers),
        }
    }

    fn arrow_click(&mut self, start: Option<Endpoint>, position: Point, at: Point, button: MouseButton) {
        match button {
            MouseButton::Left => {}
            MouseButton::Right => return self.cancel_interaction(),
            MouseButton::Middle => return,
        }
        let clicked = match self.hit_test(position) {
            Hit::Item(id) | Hit::Handle(id, _) => Endpoint::anchored(id),
            _ => Endpoint::Free(at),
        };
        match start {
            None => {
                self.interaction = Interaction::DrawingArrow {
                    start: Some(clicked),
                    cursor: at,
                };
            }
            // an item is never connected to itself
            Some(start) if start.anchor().is_some() && start == clicked => {}
            Some(start) => {
                self.interaction = Interaction::Idle;
                self.add_arrow(start, clicked);
            }
        }
    }

    fn primary_down(&mut self, position: Point, at: Point, modifiers: Modifiers) {
        match self.hit_test(position) {
            Hit::Background if modifiers.command() => {
                self.interaction = Interaction::Panning { last: position };
            }
            Hit::Background => {
                self.selection.clear();
                self.interaction = Interaction::MarqueeSelecting {
                    start: position,
                    current: position,
                };
            }
            Hit::ArrowEnd(id, end) => {
                self.interaction = Interaction::DraggingArrowEnd { id, end, position: at };
            }
            Hit::Handle(id, handle) => {
                let Some(rect) = self.scene.item_rect(&id) else {
                    return;
                };
                self.interaction = Interaction::ResizingItem {
                    id,
                    handle,
                    start_rect: rect,
                    start_pointer: position,
                    current: rect,
                };
            }
            Hit::Item(id) if modifiers.command() => self.selection.click_item(&id, true),
            Hit::Item(id) => {
                let Some(origin) = self.scene.item(&id).map(|item| item.position) else {
                    return;
                };
                self.selection.click_item(&id, false);
                self.interaction = Interaction::DraggingItem {
                    id,
                    grab_offset: at - origin,
                    origin,
                    position: origin,
                };
            }
            Hit::Arrow(id) => self.selection.click_arrow(&id, modifiers.command()),
        }
    }

    fn pointer_move(&mut self, position: Point, modifiers: Modifiers) {
        let at = self.viewport.screen_to_canvas(position);
        match &mut self.interaction {
            Interaction::Panning { last } => {
                let delta = position - *last;
                *last = position;
                self.viewport.pan_by(delta);
            }
            Interaction::DraggingItem {
                grab_offset, position: preview, ..
            } => *preview = at - *grab_offset,
            Interaction::ResizingItem {
                id,
                handle,
                start_rect,
                start_pointer,
                current,
            } => {
                let delta = self.viewport.screen_delta_to_canvas(position - *start_pointer);
                let fixed_height = self
                    .scene
                    .item(id)
                    .is_some_and(|item| item.item_type() == ItemType::Link);
                let rules = ResizeRules {
                    min_size: self.config.min_item_size,
                    keep_aspect: modifiers.shift && !fixed_height,
                    fixed_height,
                };
                *current = apply_resize(*start_rect, *handle, delta, rules);
            }
            Interaction::MarqueeSelecting { current, .. } => *current = position,
            Interaction::DrawingArrow { cursor, .. } => *cursor = at,
            Interaction::DraggingArrowEnd { position: preview, .. } => *preview = at,
            Interaction::ContextPress { start, dragged } => {
                if !*dragged && (position - *start).hypot() > self.config.drag_threshold {
                    *dragged = true;
                }
            }
            Interaction::Idle | Interaction::EditingItem { .. } => {}
        }
    }

    fn pointer_up(&mut self, position: Point, button: MouseButton, modifiers: Modifiers) {
        match button {
            MouseButton::Right => {
                if let Interaction::ContextPress { dragged, .. } = self.interaction {
                    self.interaction = Interaction::Idle;
                    if !dragged {
                        self.open_context_menu(position);
                    }
                }
                return;
            }
            MouseButton::Middle => {
                if matches!(self.interaction, Interaction::Panning { .. }) {
                    self.interaction = Interaction::Idle;
                }
                return;
            }
            MouseButton::Left => {}
        }

        match std::mem::take(&mut self.interaction) {
            Interaction::Panning { .. } => {}
            Interaction::DraggingItem {
                id, origin, position, ..
            } => {
                if position != origin {
                    self.update_item(&id, &ItemPatch::position(position));
                }
            }
            Interaction::ResizingItem {
                id,
                start_rect,
                current,
                ..
            } => {
                if current != start_rect {
                    self.commit_resize(&id, start_rect, current);
                }
            }
            Interaction::MarqueeSelecting { start, .. } => {
                let rect = rect_from_points(
                    self.viewport.screen_to_canvas(start),
                    self.viewport.screen_to_canvas(position),
                );
                let hits = self.scene.items_in_rect(self.navigation.current_board(), rect);
                self.selection.apply_marquee(hits, modifiers.command());
            }
            Interaction::DraggingArrowEnd { id, end, position } => {
                self.set_arrow_end(&id, end, position);
            }
            other => self.interaction = other,
        }
    }

    fn commit_resize(&mut self, id: &str, start: Rect, current: Rect) {
        let Some(item) = self.scene.item(id) else {
            return;
        };
        let height = match item.height {
            Height::Auto if (current.height() - start.height()).abs() < f64::EPSILON => None,
            _ => Some(Height::Fixed(current.height())),
        };
        let patch = ItemPatch {
            position: Some(current.origin()),
            width: Some(current.width()),
            height,
            ..ItemPatch::default()
        };
        self.update_item(id, &patch);
    }

    fn double_click(&mut self, position: Point, modifiers: Modifiers) {
        if self.interaction.is_transient() {
            return;
        }
        let id = match self.hit_test(position) {
            Hit::Item(id) | Hit::Handle(id, _) => id,
            _ => return,
        };
        let Some(item) = self.scene.item(&id) else {
            return;
        };
        if item.is_board() && !modifiers.edit() {
            self.enter_board(&id);
        } else {
            self.begin_editing(&id);
        }
    }

    fn key(&mut self, key: &str, modifiers: Modifiers) {
        self.context_menu = None;
        if let Interaction::EditingItem { id, .. } = &self.interaction {
            let single_line = self
                .scene
                .item(id)
                .is_some_and(|item| matches!(item.item_type(), ItemType::Link | ItemType::Board | ItemType::Todo));
            if key == keys::ESCAPE {
                self.cancel_interaction();
            } else if key == keys::ENTER && single_line && !modifiers.shift {
                self.finish_editing();
            }
            return;
        }

        if key == keys::ESCAPE {
            self.cancel_interaction();
            self.selection.clear();
            return;
        }

        if modifiers.command() {
            match key.to_ascii_lowercase().as_str() {
                "z" if modifiers.shift => {
                    self.redo();
                }
                "z" => {
                    self.undo();
                }
                "y" => {
                    self.redo();
                }
                _ => {}
            }
            return;
        }

        if key == keys::DELETE || key == keys::BACKSPACE {
            self.cancel_interaction();
            self.delete_selection();
        }
    }
}
