//! Headless application shell: opens a user's canvas from storage, drives it
//! and writes it back.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use isogrid_core::storage::{FileStorage, StorageError};
use isogrid_core::{
    AutoSave, Base64Codec, BoardEntry, Canvas, Codec, EngineConfig, ImportError, InputEvent, ItemType, PlainCodec,
    Storage,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("import: {0}")]
    Import(#[from] ImportError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("no stored canvas for {0}")]
    UnknownUser(String),
    #[error("stored canvas for {0} was modified before it finished loading")]
    LoadRaced(String),
}

/// Shell configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Directory holding one payload file per user. `None` uses the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,
    /// Store payloads as plain JSON instead of base64-encoded.
    pub plain: bool,
    pub engine: EngineConfig,
}

/// What a canvas contains, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub user: String,
    pub items: Vec<(ItemType, usize)>,
    pub arrows: usize,
    pub boards: Vec<BoardEntry>,
    pub undo_steps: usize,
}

impl Summary {
    pub fn of(user: &str, canvas: &Canvas) -> Self {
        let scene = canvas.scene();
        let items = ItemType::ALL
            .iter()
            .map(|ty| (*ty, scene.items().filter(|item| item.item_type() == *ty).count()))
            .filter(|(_, count)| *count > 0)
            .collect();
        Self {
            user: user.to_string(),
            items,
            arrows: scene.arrow_count(),
            boards: canvas.boards(),
            undo_steps: canvas.history().cursor(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "canvas of {}", self.user)?;
        writeln!(f, "  items:  {}", self.item_count())?;
        for (ty, count) in &self.items {
            writeln!(f, "    {:8} {count}", format!("{ty:?}").to_lowercase())?;
        }
        writeln!(f, "  arrows: {}", self.arrows)?;
        write!(f, "  boards: {}", self.boards.len())?;
        for board in &self.boards {
            write!(f, "\n    {}", board.name)?;
        }
        Ok(())
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    storage: FileStorage,
}

impl App {
    pub fn open(config: AppConfig) -> Result<Self, AppError> {
        let codec: Box<dyn Codec> = if config.plain {
            Box::new(PlainCodec)
        } else {
            Box::new(Base64Codec)
        };
        let storage = match &config.data_dir {
            Some(dir) => FileStorage::with_codec(dir.clone(), codec)?,
            None => FileStorage::with_codec(FileStorage::default_base_path()?, codec)?,
        };
        log::info!("using canvas store at {}", storage.base_path().display());
        Ok(Self { config, storage })
    }

    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Load `user`'s canvas, or an empty one if nothing is stored.
    pub fn load(&self, user: &str) -> Result<Canvas, AppError> {
        let mut canvas = Canvas::new(self.config.engine.clone());
        if !pollster::block_on(canvas.load_from(&self.storage, user))? {
            return Err(AppError::LoadRaced(user.to_string()));
        }
        Ok(canvas)
    }

    /// Like [`App::load`] but fails when the user has nothing stored.
    pub fn load_existing(&self, user: &str) -> Result<Canvas, AppError> {
        if pollster::block_on(self.storage.load(user))?.is_none() {
            return Err(AppError::UnknownUser(user.to_string()));
        }
        self.load(user)
    }

    /// Write `canvas` back if it changed since it was loaded.
    pub fn save(&self, user: &str, canvas: &Canvas) -> Result<bool, AppError> {
        let mut autosave = AutoSave::new(Duration::ZERO);
        let saved = pollster::block_on(autosave.flush(&self.storage, user, &canvas.data(), canvas.revision()))?;
        if saved {
            log::info!("saved canvas of {user} at revision {}", canvas.revision());
        }
        Ok(saved)
    }

    pub fn users(&self) -> Result<Vec<String>, AppError> {
        Ok(pollster::block_on(self.storage.list())?)
    }

    pub fn inspect(&self, user: &str) -> Result<Summary, AppError> {
        let canvas = self.load_existing(user)?;
        Ok(Summary::of(user, &canvas))
    }

    pub fn export(&self, user: &str) -> Result<String, AppError> {
        let canvas = self.load_existing(user)?;
        Ok(canvas.export_json()?)
    }

    /// Replace `user`'s canvas with an exported document.
    pub fn import(&self, user: &str, document: &str) -> Result<Summary, AppError> {
        let mut canvas = self.load(user)?;
        canvas.import_json(document)?;
        self.save(user, &canvas)?;
        Ok(Summary::of(user, &canvas))
    }

    /// Feed recorded input events to `user`'s canvas. With `persist` the
    /// result is written back.
    pub fn replay(&self, user: &str, events: &[InputEvent], persist: bool) -> Result<Summary, AppError> {
        let mut canvas = self.load(user)?;
        for event in events {
            canvas.handle_event(event.clone());
        }
        log::info!(
            "replayed {} events, {} commits",
            events.len(),
            canvas.history().cursor()
        );
        if persist {
            self.save(user, &canvas)?;
        }
        Ok(Summary::of(user, &canvas))
    }

    pub fn delete(&self, user: &str) -> Result<(), AppError> {
        Ok(pollster::block_on(self.storage.delete(user))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn app(dir: &tempfile::TempDir) -> App {
        App::open(AppConfig {
            data_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_user_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        assert!(matches!(app.inspect("nobody"), Err(AppError::UnknownUser(_))));
        assert!(app.load("nobody").unwrap().scene().is_empty());
    }

    #[test]
    fn test_save_skips_unchanged_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let mut canvas = app.load("ann").unwrap();
        assert!(!app.save("ann", &canvas).unwrap());
        canvas.add_item(ItemType::Board, Point::ZERO);
        assert!(app.save("ann", &canvas).unwrap());
        assert_eq!(app.users().unwrap(), vec!["ann".to_string()]);
    }

    #[test]
    fn test_import_export_between_users() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        let mut canvas = app.load("ann").unwrap();
        canvas.add_item(ItemType::Title, Point::ZERO);
        canvas.add_item(ItemType::Link, Point::new(0.0, 200.0));
        app.save("ann", &canvas).unwrap();

        let document = app.export("ann").unwrap();
        let summary = app.import("ben", &document).unwrap();
        assert_eq!(summary.item_count(), 2);
        assert_eq!(app.inspect("ben").unwrap().items, summary.items);
    }

    #[test]
    fn test_rejected_import_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        assert!(matches!(app.import("ann", "[]"), Err(AppError::Import(_))));
        assert!(app.users().unwrap().is_empty());
    }

    #[test]
    fn test_summary_display() {
        let mut canvas = Canvas::default();
        canvas.add_item(ItemType::Board, Point::ZERO);
        let text = Summary::of("ann", &canvas).to_string();
        assert!(text.contains("items:  1"));
        assert!(text.contains("New Board"));
    }
}
