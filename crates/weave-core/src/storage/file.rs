//! File-based object table for native platforms.

use super::{BoxFuture, ObjectTable, StorageError, StorageResult};
use crate::object::{ObjectId, WorldObject};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each object as `<id>.json` in a directory.
pub struct FileTable {
    base_path: PathBuf,
}

impl FileTable {
    /// Create a table rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Directory holding Weave's local data (`<data_local_dir>/weave`).
    pub fn data_dir() -> StorageResult<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Ok(base.join("weave"))
    }

    /// Table in `<data_local_dir>/weave/objects`.
    pub fn default_location() -> StorageResult<Self> {
        Self::new(Self::data_dir()?.join("objects"))
    }

    fn object_path(&self, id: ObjectId) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl ObjectTable for FileTable {
    fn put(&self, object: &WorldObject) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.object_path(object.id);
        let json = match serde_json::to_string_pretty(object) {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            // Write-then-rename so a crash never leaves a half-written row.
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e))
            })?;
            fs::rename(&tmp, &path).map_err(|e| {
                StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, id: ObjectId) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.object_path(id);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn get_all(&self) -> BoxFuture<'_, StorageResult<Vec<WorldObject>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut objects = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e != "json").unwrap_or(true) {
                    continue;
                }
                let json = fs::read_to_string(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
                })?;
                match serde_json::from_str::<WorldObject>(&json) {
                    Ok(object) => objects.push(object),
                    // One bad row must not hide the rest of the board.
                    Err(e) => log::warn!("Skipping unreadable row {}: {}", path.display(), e),
                }
            }
            objects.sort_by_key(|o| (o.created_at, o.id));
            Ok(objects)
        })
    }
}
