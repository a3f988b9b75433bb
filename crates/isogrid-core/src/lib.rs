//! Isogrid Core Library
//!
//! Platform-agnostic engine for the Isogrid infinite canvas: the item scene
//! graph, board hierarchy, view transform, interaction state machine,
//! undo/redo history and persistence.

pub mod canvas;
pub mod codec;
pub mod config;
pub mod context_menu;
pub mod document;
pub mod geometry;
pub mod history;
pub mod input;
pub mod interaction;
pub mod items;
pub mod navigation;
pub mod scene;
pub mod selection;
pub mod settings;
pub mod storage;
pub mod viewport;

pub use canvas::Canvas;
pub use codec::{Base64Codec, Codec, PlainCodec};
pub use config::EngineConfig;
pub use context_menu::{ContextMenu, MenuAction, MenuTarget};
pub use document::{CanvasData, ImportError};
pub use geometry::{ArrowRoute, ViewState};
pub use history::History;
pub use input::{InputEvent, Modifiers, MouseButton};
pub use interaction::{Hit, Interaction};
pub use items::{Arrow, BoardRef, Endpoint, Height, Item, ItemKind, ItemPatch, ItemType};
pub use navigation::NavigationStack;
pub use scene::{BoardEntry, MoveError, Scene, Snapshot};
pub use selection::Selection;
pub use settings::BoardSettings;
pub use storage::{AutoSave, Storage, StorageError};
pub use viewport::Viewport;
