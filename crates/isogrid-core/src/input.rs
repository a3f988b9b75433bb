//! Input events injected by the host.
//!
//! The engine never talks to a windowing system. The host translates its
//! native events into [`InputEvent`]s (screen coordinates, host-window pixels)
//! and feeds them to [`crate::Canvas::handle_event`]. Events are serde-encoded
//! so recorded sessions can be replayed.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS. Drives additive selection,
    /// pan-with-primary and the undo/redo shortcuts.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Double-clicking a board with this held edits its title instead of
    /// entering it.
    pub fn edit(&self) -> bool {
        self.alt
    }
}

/// Key names used by the engine's shortcuts.
pub mod keys {
    pub const ESCAPE: &str = "Escape";
    pub const DELETE: &str = "Delete";
    pub const BACKSPACE: &str = "Backspace";
    pub const ENTER: &str = "Enter";
}

/// A single host event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InputEvent {
    PointerDown {
        position: Point,
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        position: Point,
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    DoubleClick {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Wheel scroll; negative `delta_y` scrolls up.
    Wheel {
        position: Point,
        delta_y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Replacement text for the item being edited.
    TextInput { text: String },
    /// The canvas element moved or changed size.
    Resize { origin: Point, size: Size },
    /// The host lost the pointer (window blur, capture lost).
    PointerCaptureLost,
}

impl InputEvent {
    pub fn down(position: Point, button: MouseButton, modifiers: Modifiers) -> Self {
        InputEvent::PointerDown {
            position,
            button,
            modifiers,
        }
    }

    pub fn moved(position: Point) -> Self {
        InputEvent::PointerMove {
            position,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(position: Point, button: MouseButton, modifiers: Modifiers) -> Self {
        InputEvent::PointerUp {
            position,
            button,
            modifiers,
        }
    }

    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        InputEvent::Key {
            key: key.to_string(),
            modifiers,
        }
    }
}
