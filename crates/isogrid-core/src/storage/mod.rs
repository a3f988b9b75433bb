//! Persistence boundary.
//!
//! The engine only defines the trait; the store decides where bytes go.
//! Futures are boxed so native and wasm backends share one trait.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutoSave, SaveTicket};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::CanvasData;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Canvas not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Per-user canvas store.
///
/// On native platforms implementations must be Send + Sync; on WASM these
/// bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    /// Replace the stored canvas of `user_id`.
    fn save(&self, user_id: &str, data: &CanvasData) -> BoxFuture<'_, StorageResult<()>>;

    /// Stored canvas of `user_id`; `None` means the user starts empty.
    fn load(&self, user_id: &str) -> BoxFuture<'_, StorageResult<Option<CanvasData>>>;

    fn delete(&self, user_id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Users with a stored canvas.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}

/// Per-user canvas store (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    fn save(&self, user_id: &str, data: &CanvasData) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, user_id: &str) -> BoxFuture<'_, StorageResult<Option<CanvasData>>>;

    fn delete(&self, user_id: &str) -> BoxFuture<'_, StorageResult<()>>;

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}
