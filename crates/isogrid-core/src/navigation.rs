//! Board path from the root to the board being viewed.

use crate::items::BoardRef;
use crate::scene::BoardEntry;

/// Breadcrumb stack. Never empty: frame 0 is always the root board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStack {
    frames: Vec<BoardEntry>,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationStack {
    pub fn new() -> Self {
        Self {
            frames: vec![BoardEntry::root()],
        }
    }

    /// The board being viewed.
    pub fn current(&self) -> &BoardEntry {
        // frames is never empty
        &self.frames[self.frames.len() - 1]
    }

    pub fn current_board(&self) -> &BoardRef {
        &self.current().board
    }

    /// Frames from root to current.
    pub fn path(&self) -> &[BoardEntry] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_at_root(&self) -> bool {
        self.frames.len() == 1
    }

    /// Push board `id` on top of the stack.
    pub fn enter(&mut self, id: &str, name: &str) {
        self.frames.push(BoardEntry {
            board: BoardRef::board(id),
            name: name.to_string(),
        });
    }

    /// Truncate to `index` (breadcrumb click). Returns false when `index` is
    /// out of range or already current.
    pub fn navigate_to(&mut self, index: usize) -> bool {
        if index + 1 >= self.frames.len() {
            return false;
        }
        self.frames.truncate(index + 1);
        true
    }

    /// Leave the current board. Returns false at the root.
    pub fn go_up(&mut self) -> bool {
        let depth = self.frames.len();
        depth > 1 && self.navigate_to(depth - 2)
    }

    /// Update the display name of every frame for board `id`.
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        let mut changed = false;
        for frame in self.frames.iter_mut().filter(|f| f.board.id() == Some(id)) {
            frame.name = name.to_string();
            changed = true;
        }
        changed
    }

    /// Refresh frame names from `name_of` (board id → current name) after
    /// the scene was replaced wholesale. Returns true if any name changed.
    pub fn sync_names(&mut self, name_of: impl Fn(&str) -> Option<String>) -> bool {
        let mut changed = false;
        for frame in self.frames.iter_mut().skip(1) {
            let Some(name) = frame.board.id().and_then(&name_of) else {
                continue;
            };
            if frame.name != name {
                frame.name = name;
                changed = true;
            }
        }
        changed
    }

    pub fn reset_to_root(&mut self) -> bool {
        if self.is_at_root() {
            return false;
        }
        self.frames.truncate(1);
        true
    }

    /// Cut the stack below the first frame whose board no longer passes
    /// `exists` (after undo, delete or import). Returns true if cut.
    pub fn prune(&mut self, exists: impl Fn(&str) -> bool) -> bool {
        let cut = self
            .frames
            .iter()
            .skip(1)
            .position(|frame| frame.board.id().is_some_and(|id| !exists(id)));
        match cut {
            Some(offset) => {
                self.frames.truncate(offset + 1);
                true
            }
            None => false,
        }
    }
}
