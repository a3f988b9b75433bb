//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::codec::{Codec, PlainCodec, decode_payload, encode_payload};
use crate::document::CanvasData;
use std::fs;
use std::path::{Path, PathBuf};

/// One file per user under a base directory.
pub struct FileStorage {
    base_path: PathBuf,
    codec: Box<dyn Codec>,
}

impl FileStorage {
    /// Open (and create if needed) a store rooted at `base_path`.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        Self::with_codec(base_path, Box::new(PlainCodec))
    }

    pub fn with_codec(base_path: PathBuf, codec: Box<dyn Codec>) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path, codec })
    }

    /// Store in the platform data directory.
    ///
    /// On Unix: `~/.local/share/isogrid/canvases/`
    /// On Windows: `%LOCALAPPDATA%\isogrid\canvases\`
    pub fn default_location() -> StorageResult<Self> {
        Self::new(Self::default_base_path()?)
    }

    pub fn default_base_path() -> StorageResult<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Ok(base.join("isogrid").join("canvases"))
    }

    fn canvas_path(&self, user_id: &str) -> PathBuf {
        let safe_id: String = user_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, user_id: &str, data: &CanvasData) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.canvas_path(user_id);
        let payload = match encode_payload(self.codec.as_ref(), data) {
            Ok(p) => p,
            Err(e) => return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) }),
        };

        Box::pin(async move {
            fs::write(&path, payload)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
        })
    }

    fn load(&self, user_id: &str) -> BoxFuture<'_, StorageResult<Option<CanvasData>>> {
        let path = self.canvas_path(user_id);

        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }
            let stored = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
            decode_payload(self.codec.as_ref(), &stored)
                .map(Some)
                .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e)))
        })
    }

    fn delete(&self, user_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.canvas_path(user_id);
        let user_id = user_id.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(user_id));
            }
            fs::remove_file(&path)
                .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut users: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect();
            users.sort();
            Ok(users)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Base64Codec;
    use crate::config::EngineConfig;
    use crate::items::{BoardRef, Item, ItemType};
    use crate::settings::{BoardSettings, GridStyle};
    use kurbo::Point;
    use pollster::block_on;
    use tempfile::tempdir;

    fn data() -> CanvasData {
        let settings = BoardSettings {
            grid_style: GridStyle::Lines,
            ..BoardSettings::default()
        };
        CanvasData {
            items: vec![Item::create(ItemType::Link, Point::new(4.0, 2.0), BoardRef::Root, &EngineConfig::default()).with_id("l")],
            arrows: Vec::new(),
            settings: Some(settings),
        }
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("user-1", &data())).unwrap();
        assert_eq!(block_on(storage.load("user-1")).unwrap(), Some(data()));
    }

    #[test]
    fn test_file_storage_missing_user() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(block_on(storage.load("ghost")).unwrap(), None);
        assert!(matches!(block_on(storage.delete("ghost")), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_encoded_and_legacy() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::with_codec(dir.path().to_path_buf(), Box::new(Base64Codec)).unwrap();

        block_on(storage.save("enc", &data())).unwrap();
        let raw = fs::read_to_string(dir.path().join("enc.json")).unwrap();
        assert!(!raw.contains("items"));
        assert_eq!(block_on(storage.load("enc")).unwrap(), Some(data()));

        fs::write(dir.path().join("legacy.json"), data().to_json().unwrap()).unwrap();
        assert_eq!(block_on(storage.load("legacy")).unwrap(), Some(data()));
    }

    #[test]
    fn test_file_storage_list_and_sanitize() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("b", &data())).unwrap();
        block_on(storage.save("a/b:c", &data())).unwrap();

        assert_eq!(block_on(storage.list()).unwrap(), vec!["a_b_c".to_string(), "b".to_string()]);
        assert!(block_on(storage.load("a/b:c")).unwrap().is_some());
    }
}
