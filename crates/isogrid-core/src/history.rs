//! Snapshot-based linear undo/redo.

use crate::scene::Snapshot;

/// Linear history of scene snapshots.
///
/// Entry 0 is the base state (the loaded or empty canvas). `cursor` points at
/// the entry matching the live scene; committing drops everything after it.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Snapshot::default(), 200)
    }
}

impl History {
    /// History seeded with `base`, keeping at most `limit` entries.
    pub fn new(base: Snapshot, limit: usize) -> Self {
        Self {
            entries: vec![base],
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Forget everything and start over from `base`.
    pub fn reset(&mut self, base: Snapshot) {
        self.entries.clear();
        self.entries.push(base);
        self.cursor = 0;
    }

    /// Record a new state, truncating the redo future.
    pub fn commit(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back, returning the state to restore.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward, returning the state to restore.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// The entry matching the live scene.
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
