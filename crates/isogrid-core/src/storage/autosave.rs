//! Debounced saving with revision tracking.
//!
//! Every committed mutation bumps the canvas revision. A save captures the
//! revision it serialized; its completion can only mark that revision (or
//! older) clean, so a slow save never hides newer edits.

use crate::document::CanvasData;
use crate::storage::{Storage, StorageResult};

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Handle for one in-flight save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    pub revision: u64,
}

/// Tracks what needs saving and when.
#[derive(Debug, Clone)]
pub struct AutoSave {
    debounce: Duration,
    /// Latest revision reported by the canvas.
    revision: u64,
    /// Newest revision known to be stored.
    saved_revision: u64,
    last_change: Option<Instant>,
    in_flight: Option<u64>,
    /// Revision whose save failed; nothing is due again until it changes.
    failed_revision: Option<u64>,
}

impl AutoSave {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            revision: 0,
            saved_revision: 0,
            last_change: None,
            in_flight: None,
            failed_revision: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Treat `revision` as already stored (fresh load).
    pub fn mark_saved(&mut self, revision: u64) {
        self.revision = revision;
        self.saved_revision = revision;
        self.last_change = None;
        self.failed_revision = None;
    }

    /// Record a mutation. Restarts the quiet period.
    pub fn mark_changed(&mut self, revision: u64) {
        self.mark_changed_at(revision, Instant::now());
    }

    pub fn mark_changed_at(&mut self, revision: u64, now: Instant) {
        if revision <= self.revision {
            return;
        }
        self.revision = revision;
        self.last_change = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.revision > self.saved_revision
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_due(&self) -> bool {
        self.is_due_at(Instant::now())
    }

    /// Dirty, quiet for the debounce window, nothing in flight, and not a
    /// revision that already failed.
    pub fn is_due_at(&self, now: Instant) -> bool {
        if !self.is_dirty() || self.in_flight.is_some() {
            return false;
        }
        if self.failed_revision == Some(self.revision) {
            return false;
        }
        match self.last_change {
            Some(changed) => now.saturating_duration_since(changed) >= self.debounce,
            None => true,
        }
    }

    /// Start a save if one is due.
    pub fn begin_at(&mut self, now: Instant) -> Option<SaveTicket> {
        if !self.is_due_at(now) {
            return None;
        }
        self.in_flight = Some(self.revision);
        Some(SaveTicket { revision: self.revision })
    }

    /// Record the outcome of `ticket`'s save.
    pub fn complete(&mut self, ticket: SaveTicket, result: &StorageResult<()>) {
        if self.in_flight == Some(ticket.revision) {
            self.in_flight = None;
        }
        match result {
            Ok(()) => {
                self.saved_revision = self.saved_revision.max(ticket.revision);
                log::debug!("saved revision {}", ticket.revision);
            }
            Err(e) => {
                self.failed_revision = Some(ticket.revision);
                log::warn!("save of revision {} failed: {e}", ticket.revision);
            }
        }
    }

    /// Save `data` (captured at `revision`) if due.
    ///
    /// Returns `Ok(true)` when a save ran and succeeded. A failure leaves the
    /// canvas dirty; it is retried after the next mutation's quiet period.
    pub async fn flush(
        &mut self,
        storage: &dyn Storage,
        user_id: &str,
        data: &CanvasData,
        revision: u64,
    ) -> StorageResult<bool> {
        self.mark_changed(revision);
        let Some(ticket) = self.begin_at(Instant::now()) else {
            return Ok(false);
        };
        let result = storage.save(user_id, data).await;
        self.complete(ticket, &result);
        result.map(|()| true)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::storage::{BoxFuture, MemoryStorage, StorageError};
    use pollster::block_on;

    const SECOND: Duration = Duration::from_secs(1);

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn save(&self, _: &str, _: &CanvasData) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Io("disk full".into())) })
        }
        fn load(&self, _: &str) -> BoxFuture<'_, StorageResult<Option<CanvasData>>> {
            Box::pin(async { Ok(None) })
        }
        fn delete(&self, _: &str) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
        fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    #[test]
    fn test_debounce_window() {
        let start = Instant::now();
        let mut autosave = AutoSave::new(SECOND);
        assert!(!autosave.is_due_at(start));

        autosave.mark_changed_at(1, start);
        assert!(autosave.is_dirty());
        assert!(!autosave.is_due_at(start + Duration::from_millis(999)));
        assert!(autosave.is_due_at(start + SECOND));

        autosave.mark_changed_at(2, start + Duration::from_millis(500));
        assert!(!autosave.is_due_at(start + SECOND));
        assert!(autosave.is_due_at(start + Duration::from_millis(1500)));
    }

    #[test]
    fn test_stale_completion_keeps_newer_changes_dirty() {
        let start = Instant::now();
        let mut autosave = AutoSave::new(SECOND);
        autosave.mark_changed_at(1, start);
        let ticket = autosave.begin_at(start + SECOND).unwrap();
        assert!(autosave.begin_at(start + SECOND * 5).is_none());

        autosave.mark_changed_at(2, start + SECOND);
        autosave.complete(ticket, &Ok(()));

        assert!(autosave.is_dirty());
        assert!(autosave.is_due_at(start + SECOND * 2));
    }

    #[test]
    fn test_failure_waits_for_next_change() {
        let start = Instant::now();
        let mut autosave = AutoSave::new(SECOND);
        autosave.mark_changed_at(1, start);
        let ticket = autosave.begin_at(start + SECOND).unwrap();
        autosave.complete(ticket, &Err(StorageError::Other("offline".into())));

        assert!(autosave.is_dirty());
        assert!(!autosave.is_due_at(start + SECOND * 10));

        autosave.mark_changed_at(2, start + SECOND * 10);
        assert!(autosave.is_due_at(start + SECOND * 11));
    }

    #[test]
    fn test_flush_saves_once() {
        let storage = MemoryStorage::new();
        let mut autosave = AutoSave::new(Duration::ZERO);
        let data = CanvasData::default();

        assert!(block_on(autosave.flush(&storage, "u", &data, 1)).unwrap());
        assert!(!autosave.is_dirty());
        assert!(!block_on(autosave.flush(&storage, "u", &data, 1)).unwrap());
        assert_eq!(block_on(storage.load("u")).unwrap(), Some(data));
    }

    #[test]
    fn test_flush_failure_stays_dirty() {
        let mut autosave = AutoSave::new(Duration::ZERO);
        let result = block_on(autosave.flush(&FailingStorage, "u", &CanvasData::default(), 3));
        assert!(result.is_err());
        assert!(autosave.is_dirty());
        assert!(!autosave.is_due());
    }
}
