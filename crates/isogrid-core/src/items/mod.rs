//! Canvas items: the records the scene graph stores.

mod arrow;
mod image;
mod text;
mod todo;

pub use arrow::{Arrow, ArrowId, Endpoint};
pub use image::{IntakeError, image_item_from_bytes};
pub use text::{FontStyle, FontWeight, MIN_FONT_SIZE, TextAlign, TextDecoration, TextStyle};
pub use todo::{TodoEntry, add_entry, edit_entry, insert_before, remove_entry, toggle_entry};

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;

pub type ItemId = String;

/// The board an item or arrow lives on.
///
/// Serialized as the nullable `parentId` string; `null`, `""` and `"root"`
/// all mean the root board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum BoardRef {
    #[default]
    Root,
    Board(ItemId),
}

impl BoardRef {
    pub fn board(id: impl Into<ItemId>) -> Self {
        BoardRef::Board(id.into())
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            BoardRef::Root => None,
            BoardRef::Board(id) => Some(id),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, BoardRef::Root)
    }
}

impl From<Option<String>> for BoardRef {
    fn from(value: Option<String>) -> Self {
        match value {
            None => BoardRef::Root,
            Some(id) if id.is_empty() || id == "root" => BoardRef::Root,
            Some(id) => BoardRef::Board(id),
        }
    }
}

impl From<BoardRef> for Option<String> {
    fn from(value: BoardRef) -> Self {
        match value {
            BoardRef::Root => None,
            BoardRef::Board(id) => Some(id),
        }
    }
}

/// Item height: a fixed number of canvas units, or sized by content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HeightRepr", into = "HeightRepr")]
pub enum Height {
    Fixed(f64),
    #[default]
    Auto,
}

impl Height {
    /// Concrete height, substituting `fallback` for `Auto`.
    pub fn resolve(&self, fallback: f64) -> f64 {
        match self {
            Height::Fixed(h) => *h,
            Height::Auto => fallback,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum HeightRepr {
    Number(f64),
    Keyword(String),
}

impl TryFrom<HeightRepr> for Height {
    type Error = String;

    fn try_from(value: HeightRepr) -> Result<Self, Self::Error> {
        match value {
            HeightRepr::Number(h) => Ok(Height::Fixed(h)),
            HeightRepr::Keyword(k) if k == "auto" => Ok(Height::Auto),
            HeightRepr::Keyword(k) => Err(format!("invalid height '{k}'")),
        }
    }
}

impl From<Height> for HeightRepr {
    fn from(value: Height) -> Self {
        match value {
            Height::Fixed(h) => HeightRepr::Number(h),
            Height::Auto => HeightRepr::Keyword("auto".to_string()),
        }
    }
}

/// Discriminant of [`ItemKind`], as written in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Text,
    Image,
    Board,
    Todo,
    Link,
    Title,
    Note,
}

impl ItemType {
    pub const ALL: [ItemType; 7] = [
        ItemType::Text,
        ItemType::Image,
        ItemType::Board,
        ItemType::Todo,
        ItemType::Link,
        ItemType::Title,
        ItemType::Note,
    ];

    /// Whether double-click opens an inline editor for this kind.
    pub fn is_editable(self) -> bool {
        !matches!(self, ItemType::Image)
    }

    /// Size a new item of this kind is created with.
    pub fn default_size(self, config: &EngineConfig) -> (f64, Height) {
        match self {
            ItemType::Text => (250.0, Height::Fixed(100.0)),
            ItemType::Image | ItemType::Board | ItemType::Note => (300.0, Height::Fixed(200.0)),
            ItemType::Todo => (300.0, Height::Auto),
            ItemType::Link => (300.0, Height::Fixed(config.link_height)),
            ItemType::Title => (400.0, Height::Fixed(80.0)),
        }
    }
}

/// Placeholder shown by image items created from the menu.
pub const PLACEHOLDER_IMAGE: &str = "https://picsum.photos/seed/isogrid/300/200";

/// Kind-specific payload of an item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Text { text: String, style: TextStyle },
    Image { src: String },
    Board { title: String },
    Todo { title: String, entries: Vec<TodoEntry> },
    Link { url: String },
    Title { text: String, style: TextStyle, outline: bool },
    /// Rich note; the document body is opaque to the engine.
    Note { title: String, document: serde_json::Value },
}

impl ItemKind {
    /// Payload a new item of `ty` starts with.
    pub fn default_for(ty: ItemType) -> Self {
        match ty {
            ItemType::Text => ItemKind::Text {
                text: "New Text".to_string(),
                style: TextStyle::default(),
            },
            ItemType::Image => ItemKind::Image {
                src: PLACEHOLDER_IMAGE.to_string(),
            },
            ItemType::Board => ItemKind::Board {
                title: "New Board".to_string(),
            },
            ItemType::Todo => ItemKind::Todo {
                title: "New Todo List".to_string(),
                entries: Vec::new(),
            },
            ItemType::Link => ItemKind::Link {
                url: "https://www.google.com".to_string(),
            },
            ItemType::Title => ItemKind::Title {
                text: "New Title".to_string(),
                style: TextStyle::title(),
                outline: false,
            },
            ItemType::Note => ItemKind::Note {
                title: "New Note".to_string(),
                document: serde_json::Value::Null,
            },
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            ItemKind::Text { .. } => ItemType::Text,
            ItemKind::Image { .. } => ItemType::Image,
            ItemKind::Board { .. } => ItemType::Board,
            ItemKind::Todo { .. } => ItemType::Todo,
            ItemKind::Link { .. } => ItemType::Link,
            ItemKind::Title { .. } => ItemType::Title,
            ItemKind::Note { .. } => ItemType::Note,
        }
    }

    /// The primary string: text, image source, title or URL.
    pub fn content(&self) -> &str {
        match self {
            ItemKind::Text { text, .. } | ItemKind::Title { text, .. } => text,
            ItemKind::Image { src } => src,
            ItemKind::Board { title } | ItemKind::Todo { title, .. } | ItemKind::Note { title, .. } => title,
            ItemKind::Link { url } => url,
        }
    }

    fn content_mut(&mut self) -> &mut String {
        match self {
            ItemKind::Text { text, .. } | ItemKind::Title { text, .. } => text,
            ItemKind::Image { src } => src,
            ItemKind::Board { title } | ItemKind::Todo { title, .. } | ItemKind::Note { title, .. } => title,
            ItemKind::Link { url } => url,
        }
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        match self {
            ItemKind::Text { style, .. } | ItemKind::Title { style, .. } => Some(style),
            _ => None,
        }
    }

    pub fn text_style_mut(&mut self) -> Option<&mut TextStyle> {
        match self {
            ItemKind::Text { style, .. } | ItemKind::Title { style, .. } => Some(style),
            _ => None,
        }
    }
}

/// Per-item rendering overrides; `None` falls back to the board settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Appearance {
    pub opacity: Option<f64>,
    pub background_blur: Option<f64>,
}

/// A placed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRecord", into = "ItemRecord")]
pub struct Item {
    pub id: ItemId,
    /// Top-left corner in canvas space.
    pub position: Point,
    pub width: f64,
    pub height: Height,
    pub parent: BoardRef,
    pub appearance: Appearance,
    pub kind: ItemKind,
}

impl Item {
    /// New item of `ty` at `position` with the kind's default payload and size.
    pub fn create(ty: ItemType, position: Point, parent: BoardRef, config: &EngineConfig) -> Self {
        let (width, height) = ty.default_size(config);
        Self {
            id: Uuid::new_v4().to_string(),
            position,
            width,
            height,
            parent,
            appearance: Appearance::default(),
            kind: ItemKind::default_for(ty),
        }
    }

    /// Replace the generated id (imports, tests).
    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: Height) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    pub fn is_board(&self) -> bool {
        matches!(self.kind, ItemKind::Board { .. })
    }

    pub fn content(&self) -> &str {
        self.kind.content()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        *self.kind.content_mut() = content.into();
    }

    pub fn todos(&self) -> Option<&Vec<TodoEntry>> {
        match &self.kind {
            ItemKind::Todo { entries, .. } => Some(entries),
            _ => None,
        }
    }

    pub fn todos_mut(&mut self) -> Option<&mut Vec<TodoEntry>> {
        match &mut self.kind {
            ItemKind::Todo { entries, .. } => Some(entries),
            _ => None,
        }
    }

    pub fn size(&self, auto_fallback: f64) -> Size {
        Size::new(self.width, self.height.resolve(auto_fallback))
    }

    /// Bounding rectangle in canvas space; `Auto` height uses `auto_fallback`.
    pub fn rect(&self, auto_fallback: f64) -> Rect {
        Rect::from_origin_size(self.position, self.size(auto_fallback))
    }

    /// Shallow-merge `patch` into this item. Fields that do not apply to the
    /// item's kind are ignored. Returns true if anything changed.
    pub fn apply(&mut self, patch: &ItemPatch) -> bool {
        let before = self.clone();

        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(content) = &patch.content {
            self.set_content(content.clone());
        }
        if let Some(opacity) = patch.opacity {
            self.appearance.opacity = Some(opacity);
        }
        if let Some(blur) = patch.background_blur {
            self.appearance.background_blur = Some(blur);
        }
        if let (Some(todos), Some(entries)) = (&patch.todos, self.todos_mut()) {
            *entries = todos.clone();
        }
        match &mut self.kind {
            ItemKind::Title { outline, .. } => {
                if let Some(value) = patch.title_outline {
                    *outline = value;
                }
            }
            ItemKind::Note { document, .. } => {
                if let Some(value) = &patch.document {
                    *document = value.clone();
                }
            }
            _ => {}
        }
        if let Some(style) = self.kind.text_style_mut() {
            patch.apply_style(style);
        }

        *self != before
    }
}

/// Partial update for an item. Every field is optional; `None` leaves the
/// item's value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemPatch {
    pub position: Option<Point>,
    pub width: Option<f64>,
    pub height: Option<Height>,
    pub content: Option<String>,
    pub todos: Option<Vec<TodoEntry>>,
    pub text_align: Option<TextAlign>,
    pub text_aligns: Option<Vec<TextAlign>>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_decoration: Option<TextDecoration>,
    pub color: Option<String>,
    pub title_outline: Option<bool>,
    pub opacity: Option<f64>,
    pub background_blur: Option<f64>,
    pub document: Option<serde_json::Value>,
}

impl ItemPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_style(&self, style: &mut TextStyle) {
        if let Some(align) = self.text_align {
            style.align = align;
        }
        if let Some(aligns) = &self.text_aligns {
            style.line_aligns = aligns.clone();
        }
        if let Some(size) = self.font_size {
            style.font_size = size.max(MIN_FONT_SIZE);
        }
        if let Some(weight) = self.font_weight {
            style.font_weight = weight;
        }
        if let Some(font_style) = self.font_style {
            style.font_style = font_style;
        }
        if let Some(decoration) = self.text_decoration {
            style.decoration = decoration;
        }
        if let Some(color) = &self.color {
            style.color = Some(color.clone());
        }
    }
}

/// Flat wire form of an item, matching the portable document layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    id: String,
    #[serde(rename = "type")]
    item_type: ItemType,
    #[serde(default)]
    position: Point,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<Height>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    parent_id: BoardRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    todos: Option<Vec<TodoEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_aligns: Option<Vec<TextAlign>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_decoration: Option<TextDecoration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title_outline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document: Option<serde_json::Value>,
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        let (default_width, default_height) = record.item_type.default_size(&EngineConfig::default());
        let mut kind = ItemKind::default_for(record.item_type);
        *kind.content_mut() = record.content;

        let patch = ItemPatch {
            todos: record.todos,
            text_align: record.text_align,
            text_aligns: record.text_aligns,
            font_size: record.font_size,
            font_weight: record.font_weight,
            font_style: record.font_style,
            text_decoration: record.text_decoration,
            color: record.color,
            title_outline: record.title_outline,
            document: record.document,
            ..ItemPatch::default()
        };

        let mut item = Item {
            id: record.id,
            position: record.position,
            width: record.width.unwrap_or(default_width),
            height: record.height.unwrap_or(default_height),
            parent: record.parent_id,
            appearance: Appearance {
                opacity: record.opacity,
                background_blur: record.background_blur,
            },
            kind,
        };
        // A record without per-line alignments keeps none, so every line
        // follows the block alignment.
        if patch.text_aligns.is_none() {
            if let Some(style) = item.kind.text_style_mut() {
                style.line_aligns.clear();
            }
        }
        item.apply(&patch);
        item
    }
}

impl From<Item> for ItemRecord {
    fn from(item: Item) -> Self {
        let item_type = item.item_type();
        let content = item.content().to_string();
        let mut record = ItemRecord {
            id: item.id,
            item_type,
            position: item.position,
            width: Some(item.width),
            height: Some(item.height),
            content,
            parent_id: item.parent,
            todos: None,
            text_align: None,
            text_aligns: None,
            font_size: None,
            font_weight: None,
            font_style: None,
            text_decoration: None,
            color: None,
            title_outline: None,
            opacity: item.appearance.opacity,
            background_blur: item.appearance.background_blur,
            document: None,
        };

        match item.kind {
            ItemKind::Text { style, .. } => record.write_style(style),
            ItemKind::Title { style, outline, .. } => {
                record.write_style(style);
                record.title_outline = Some(outline);
            }
            ItemKind::Todo { entries, .. } => record.todos = Some(entries),
            ItemKind::Note { document, .. } => record.document = Some(document),
            ItemKind::Image { .. } | ItemKind::Board { .. } | ItemKind::Link { .. } => {}
        }
        record
    }
}

impl ItemRecord {
    fn write_style(&mut self, style: TextStyle) {
        self.text_align = Some(style.align);
        self.text_aligns = Some(style.line_aligns);
        self.font_size = Some(style.font_size);
        self.font_weight = Some(style.font_weight);
        self.font_style = Some(style.font_style);
        self.text_decoration = Some(style.decoration);
        self.color = style.color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_factory_defaults() {
        let text = Item::create(ItemType::Text, Point::ZERO, BoardRef::Root, &config());
        assert_eq!(text.content(), "New Text");
        assert!((text.width - 250.0).abs() < f64::EPSILON);
        assert_eq!(text.height, Height::Fixed(100.0));

        let todo = Item::create(ItemType::Todo, Point::ZERO, BoardRef::Root, &config());
        assert_eq!(todo.height, Height::Auto);
        assert_eq!(todo.todos().map(Vec::len), Some(0));

        let link = Item::create(ItemType::Link, Point::ZERO, BoardRef::Root, &config());
        assert_eq!(link.height, Height::Fixed(52.0));
        assert_eq!(link.content(), "https://www.google.com");

        let board = Item::create(ItemType::Board, Point::ZERO, BoardRef::Root, &config());
        assert_eq!(board.content(), "New Board");
        assert!(board.is_board());
    }

    #[test]
    fn test_auto_height_rect_uses_fallback() {
        let todo = Item::create(ItemType::Todo, Point::new(10.0, 20.0), BoardRef::Root, &config());
        let rect = todo.rect(100.0);
        assert!((rect.height() - 100.0).abs() < f64::EPSILON);
        assert!((rect.x0 - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_tolerates_unknown_and_missing_fields() {
        let item: Item = serde_json::from_value(json!({
            "id": "t1",
            "type": "text",
            "position": {"x": 5.0, "y": 6.0},
            "content": "hello",
            "parentId": null,
            "someFutureField": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(item.content(), "hello");
        assert_eq!(item.parent, BoardRef::Root);
        assert!((item.width - 250.0).abs() < f64::EPSILON);
        let style = item.kind.text_style().unwrap();
        assert_eq!(style.align, TextAlign::Left);
        assert!(style.line_aligns.is_empty());
    }

    #[test]
    fn test_record_wire_keys() {
        let mut item = Item::create(ItemType::Todo, Point::ZERO, BoardRef::board("b1"), &config()).with_id("x");
        if let Some(entries) = item.todos_mut() {
            add_entry(entries, "buy milk");
        }
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "todo");
        assert_eq!(json["height"], "auto");
        assert_eq!(json["parentId"], "b1");
        assert_eq!(json["todos"][0]["text"], "buy milk");
        assert!(json.get("textAlign").is_none());
    }

    #[test]
    fn test_root_string_parent_is_root() {
        let item: Item = serde_json::from_value(json!({
            "id": "b", "type": "board", "content": "B", "parentId": "root"
        }))
        .unwrap();
        assert!(item.parent.is_root());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<Item, _> = serde_json::from_value(json!({"id": "x", "type": "hologram"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_ignores_fields_of_other_kinds() {
        let mut link = Item::create(ItemType::Link, Point::ZERO, BoardRef::Root, &config());
        let patch = ItemPatch {
            font_size: Some(30.0),
            title_outline: Some(true),
            ..ItemPatch::default()
        };
        assert!(!link.apply(&patch));

        let mut title = Item::create(ItemType::Title, Point::ZERO, BoardRef::Root, &config());
        assert!(title.apply(&patch));
        match &title.kind {
            ItemKind::Title { style, outline, .. } => {
                assert!(*outline);
                assert!((style.font_size - 30.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_patch_content_maps_to_kind_field() {
        let mut board = Item::create(ItemType::Board, Point::ZERO, BoardRef::Root, &config());
        board.apply(&ItemPatch::content("Plans"));
        assert_eq!(board.kind, ItemKind::Board { title: "Plans".into() });
    }
}
