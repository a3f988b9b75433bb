//! End-to-end scenarios driven through the public `Canvas` API and recorded
//! input events.

use std::io::Cursor;
use std::time::Duration;

use image::{ImageFormat, RgbaImage};
use isogrid_core::storage::{FileStorage, MemoryStorage};
use isogrid_core::{
    AutoSave, Base64Codec, BoardRef, Canvas, CanvasData, Endpoint, Height, ImportError, InputEvent, ItemType,
    MouseButton, Storage,
};
use kurbo::{Point, Vec2};
use pollster::block_on;

fn replay(canvas: &mut Canvas, events: &str) {
    let events: Vec<InputEvent> = serde_json::from_str(events).expect("valid event log");
    for event in events {
        canvas.handle_event(event);
    }
}

#[test]
fn drag_from_recorded_events_moves_item_by_fifty() {
    let mut canvas = Canvas::default();
    let id = canvas.add_item(ItemType::Text, Point::new(100.0, 100.0));
    let before = canvas.history().len();

    replay(
        &mut canvas,
        r#"[
            {"type":"pointerDown","position":{"x":200,"y":150},"button":"left"},
            {"type":"pointerMove","position":{"x":220,"y":150}},
            {"type":"pointerMove","position":{"x":250,"y":150}},
            {"type":"pointerUp","position":{"x":250,"y":150},"button":"left"}
        ]"#,
    );

    assert_eq!(canvas.item(&id).map(|i| i.position), Some(Point::new(150.0, 100.0)));
    assert_eq!(canvas.history().len(), before + 1);
    assert!(canvas.undo());
    assert_eq!(canvas.item(&id).map(|i| i.position), Some(Point::new(100.0, 100.0)));
}

#[test]
fn wheel_at_origin_keeps_zero_pan() {
    let mut canvas = Canvas::default();
    replay(
        &mut canvas,
        r#"[
            {"type":"wheel","position":{"x":0,"y":0},"deltaY":-100},
            {"type":"wheel","position":{"x":0,"y":0},"deltaY":-100}
        ]"#,
    );
    assert!((canvas.viewport.zoom() - 1.21).abs() < 1e-9);
    assert_eq!(canvas.viewport.view.pan, Vec2::ZERO);
}

#[test]
fn zoom_is_clamped_to_range() {
    let mut canvas = Canvas::default();
    for _ in 0..50 {
        canvas.handle_event(InputEvent::Wheel {
            position: Point::new(300.0, 300.0),
            delta_y: -1.0,
            modifiers: Default::default(),
        });
    }
    assert!((canvas.viewport.zoom() - 3.0).abs() < f64::EPSILON);
    canvas.set_zoom(0.1);
    assert!((canvas.viewport.zoom() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn boards_nest_and_breadcrumbs_navigate() {
    let mut canvas = Canvas::default();
    let board = canvas.add_item(ItemType::Board, Point::ZERO);
    let outside = canvas.add_item(ItemType::Text, Point::new(500.0, 0.0));

    assert!(canvas.enter_board(&board));
    assert_eq!(canvas.current_board(), &BoardRef::board(board.clone()));
    assert_eq!(canvas.visible_items().count(), 0);

    let inside = canvas.add_item(ItemType::Todo, Point::new(10.0, 10.0));
    let names: Vec<&str> = canvas.navigation().path().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Home", "New Board"]);

    assert!(canvas.navigate_to(0));
    assert!(canvas.navigation().is_at_root());
    assert!(canvas.is_visible(&outside));
    assert!(!canvas.is_visible(&inside));

    let err = canvas.move_item_to_board(&board, &BoardRef::board(board.clone())).unwrap_err();
    assert!(err.to_string().contains("descendants"));
    assert!(canvas.move_item_to_board(&outside, &BoardRef::board(board.clone())).unwrap());
    assert!(!canvas.is_visible(&outside));
}

#[test]
fn anchored_arrow_follows_drag_preview() {
    let mut canvas = Canvas::default();
    let a = canvas.add_item(ItemType::Text, Point::new(0.0, 0.0));
    let b = canvas.add_item(ItemType::Text, Point::new(500.0, 0.0));
    let arrow = canvas.add_arrow(Endpoint::anchored(a.clone()), Endpoint::anchored(b));
    let route = canvas.arrow_route(&arrow).unwrap();
    assert!(route.start.distance(Point::new(250.0, 50.0)) < 1e-9);
    assert!(route.end.distance(Point::new(500.0, 50.0)) < 1e-9);

    canvas.handle_event(InputEvent::down(Point::new(125.0, 50.0), MouseButton::Left, Default::default()));
    canvas.handle_event(InputEvent::moved(Point::new(125.0, 250.0)));
    let moved = canvas.arrow_route(&arrow).unwrap();
    assert!(moved.start.y > 50.0);
    assert!(canvas.item(&a).is_some_and(|i| i.position == Point::ZERO));
}

#[test]
fn malformed_imports_leave_canvas_untouched() {
    let mut canvas = Canvas::default();
    let id = canvas.add_item(ItemType::Link, Point::ZERO);
    let history = canvas.history().len();
    let before = canvas.snapshot();

    assert!(matches!(canvas.import_json("{not json"), Err(ImportError::InvalidJson(_))));
    assert!(matches!(
        canvas.import_json(r#"{"arrows": []}"#),
        Err(ImportError::MissingCollection("items"))
    ));
    assert!(matches!(
        canvas.import_json(r#"{"items": {}, "arrows": []}"#),
        Err(ImportError::NotAnArray("items"))
    ));
    let cyclic = r#"{
        "items": [
            {"id":"x","type":"board","position":{"x":0,"y":0},"width":300,"height":200,"content":"X","parentId":"y"},
            {"id":"y","type":"board","position":{"x":0,"y":0},"width":300,"height":200,"content":"Y","parentId":"x"}
        ],
        "arrows": []
    }"#;
    assert!(matches!(canvas.import_json(cyclic), Err(ImportError::InvalidHierarchy(_))));

    assert_eq!(canvas.snapshot(), before);
    assert_eq!(canvas.history().len(), history);
    assert!(canvas.item(&id).is_some());
}

#[test]
fn export_then_import_replaces_scene_as_one_entry() {
    let mut source = Canvas::default();
    let board = source.add_item(ItemType::Board, Point::ZERO);
    source.enter_board(&board);
    source.add_item(ItemType::Note, Point::new(20.0, 20.0));
    let exported = source.export_json().unwrap();

    let mut target = Canvas::default();
    target.add_item(ItemType::Title, Point::ZERO);
    let history = target.history().len();
    target.import_json(&exported).unwrap();

    assert_eq!(target.snapshot(), source.snapshot());
    assert_eq!(target.history().len(), history + 1);
    assert!(target.navigation().is_at_root());
    assert!(target.undo());
    assert_eq!(target.scene().item_count(), 1);
}

#[test]
fn pasted_image_is_centred_in_view() {
    let mut bytes = Vec::new();
    RgbaImage::new(800, 400)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();

    let mut canvas = Canvas::default();
    let id = canvas.paste_image(&bytes).unwrap();
    let item = canvas.item(&id).unwrap();
    assert_eq!(item.item_type(), ItemType::Image);
    assert_eq!(item.height, Height::Fixed(200.0));
    let center = canvas.display_rect(&id).unwrap().center();
    assert!((center - canvas.viewport.canvas_center()).hypot() < 1e-9);

    assert!(canvas.paste_image(b"not an image").is_err());
    assert_eq!(canvas.scene().item_count(), 1);
}

#[test]
fn session_load_edit_and_autosave() {
    let storage = MemoryStorage::new();
    let mut first = Canvas::default();
    assert!(block_on(first.load_from(&storage, "alice")).unwrap());
    assert!(first.scene().is_empty());

    let mut autosave = AutoSave::new(Duration::ZERO);
    first.add_item(ItemType::Todo, Point::new(40.0, 40.0));
    autosave.mark_changed(first.revision());
    assert!(autosave.is_dirty());
    assert!(block_on(autosave.flush(&storage, "alice", &first.data(), first.revision())).unwrap());
    assert!(!autosave.is_dirty());

    let mut second = Canvas::default();
    assert!(block_on(second.load_from(&storage, "alice")).unwrap());
    assert_eq!(second.snapshot(), first.snapshot());
    assert!(!second.can_undo());
}

#[test]
fn file_storage_with_base64_codec() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::with_codec(dir.path().to_path_buf(), Box::new(Base64Codec)).unwrap();
    let mut canvas = Canvas::default();
    canvas.add_item(ItemType::Text, Point::ZERO);
    block_on(storage.save("bob", &canvas.data())).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("bob.json")).unwrap();
    assert!(!raw.contains("New Text"));

    let loaded: CanvasData = block_on(storage.load("bob")).unwrap().unwrap();
    assert_eq!(loaded, canvas.data());
    assert_eq!(block_on(storage.list()).unwrap(), vec!["bob".to_string()]);
}
