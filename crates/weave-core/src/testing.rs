//! Shared fixtures for unit tests.

use crate::object::{ObjectId, WorldObject};
use crate::storage::{
    BlockingSpawner, BoxFuture, MemoryTable, ObjectTable, PersistenceAdapter, StorageResult,
};
use crate::store::ObjectStore;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOp {
    Put(ObjectId),
    Delete(ObjectId),
}

/// Memory table that remembers every call made against it.
#[derive(Default)]
pub struct RecordingTable {
    inner: MemoryTable,
    ops: Mutex<Vec<TableOp>>,
}

impl RecordingTable {
    pub fn ops(&self) -> Vec<TableOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn puts_for(&self, id: ObjectId) -> usize {
        self.ops().iter().filter(|op| **op == TableOp::Put(id)).count()
    }

    pub fn deletes_for(&self, id: ObjectId) -> usize {
        self.ops().iter().filter(|op| **op == TableOp::Delete(id)).count()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub fn row(&self, id: ObjectId) -> Option<WorldObject> {
        self.inner.row(id)
    }
}

impl ObjectTable for RecordingTable {
    fn put(&self, object: &WorldObject) -> BoxFuture<'_, StorageResult<()>> {
        self.ops.lock().unwrap().push(TableOp::Put(object.id));
        self.inner.put(object)
    }

    fn delete(&self, id: ObjectId) -> BoxFuture<'_, StorageResult<()>> {
        self.ops.lock().unwrap().push(TableOp::Delete(id));
        self.inner.delete(id)
    }

    fn get_all(&self) -> BoxFuture<'_, StorageResult<Vec<WorldObject>>> {
        self.inner.get_all()
    }
}

/// Store backed by a recording table with synchronous writes.
pub fn recording_store() -> (ObjectStore, Arc<RecordingTable>) {
    let table = Arc::new(RecordingTable::default());
    let adapter = PersistenceAdapter::new(table.clone(), Box::new(BlockingSpawner));
    (ObjectStore::new(adapter), table)
}

/// `(a - b).abs() < 1e-9` on every component.
pub fn approx(a: glam::DVec3, b: glam::DVec3) -> bool {
    (a - b).abs().max_element() < 1e-9
}
