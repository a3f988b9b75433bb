//! Keyboard and pointer bindings, for help output.

/// One binding understood by the canvas engine.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all bindings.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("Delete", false, false, "Delete selected items and arrows"),
            Shortcut::new("Backspace", false, false, "Delete selected items and arrows"),
            Shortcut::new("Escape", false, false, "Cancel current action and clear selection"),
            Shortcut::new("Enter", false, false, "Finish editing a link, board or todo title"),
            Shortcut::new("Click", true, false, "Toggle item in selection"),
            Shortcut::new("Drag", true, false, "Pan the canvas"),
            Shortcut::new("Middle drag", false, false, "Pan the canvas"),
            Shortcut::new("Wheel", false, false, "Zoom about the pointer"),
            Shortcut::new("Shift+Drag handle", false, false, "Keep aspect ratio while resizing"),
            Shortcut::new("Double-click", false, false, "Edit item, or enter a board"),
            Shortcut::new("Alt+Double-click", false, false, "Edit a board's title"),
            Shortcut::new("Right-click", false, false, "Open the context menu"),
        ]
    }

    /// Help text, one binding per line.
    pub fn describe() -> String {
        let mut out = String::from("=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            out.push_str(&format!("\n  {:20} {}", shortcut.format(), shortcut.description));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(Shortcut::new("Z", true, true, "Redo").format(), "Ctrl+Shift+Z");
        assert_eq!(Shortcut::new("Escape", false, false, "").format(), "Escape");
    }

    #[test]
    fn test_describe_lists_every_binding() {
        let text = ShortcutRegistry::describe();
        assert_eq!(text.lines().count(), ShortcutRegistry::all().len() + 1);
        assert!(text.contains("Ctrl+Y"));
    }
}
