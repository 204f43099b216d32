//! In-memory object table.

use super::{BoxFuture, ObjectTable, StorageError, StorageResult};
use crate::object::{ObjectId, WorldObject};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory table for testing and ephemeral boards.
#[derive(Default)]
pub struct MemoryTable {
    rows: RwLock<HashMap<ObjectId, WorldObject>>,
}

impl MemoryTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table pre-filled with `objects`.
    pub fn with_rows(objects: impl IntoIterator<Item = WorldObject>) -> Self {
        let rows = objects.into_iter().map(|o| (o.id, o)).collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Stored copy of a row, if present.
    pub fn row(&self, id: ObjectId) -> Option<WorldObject> {
        self.rows.read().ok()?.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl ObjectTable for MemoryTable {
    fn put(&self, object: &WorldObject) -> BoxFuture<'_, StorageResult<()>> {
        let object = object.clone();
        Box::pin(async move {
            let mut rows = self.rows.write().map_err(lock_error)?;
            rows.insert(object.id, object);
            Ok(())
        })
    }

    fn delete(&self, id: ObjectId) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let mut rows = self.rows.write().map_err(lock_error)?;
            rows.remove(&id);
            Ok(())
        })
    }

    fn get_all(&self) -> BoxFuture<'_, StorageResult<Vec<WorldObject>>> {
        Box::pin(async move {
            let rows = self.rows.read().map_err(lock_error)?;
            let mut all: Vec<WorldObject> = rows.values().cloned().collect();
            all.sort_by_key(|o| (o.created_at, o.id));
            Ok(all)
        })
    }
}
