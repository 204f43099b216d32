//! Fire-and-forget mirroring of store mutations into an [`ObjectTable`].
//!
//! Every write carries a full snapshot of the object, so completion order does not
//! matter as long as writes are *issued* in commit order. Spawners start tasks in
//! submission order. Failures are logged and counted, never returned.

use super::{BoxFuture, ObjectTable, StorageResult};
use crate::object::{ObjectId, WorldObject};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(not(target_arch = "wasm32"))]
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

/// Runs detached persistence tasks.
pub trait Spawner {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Drives each task to completion before returning.
///
/// Suitable for native tables whose futures finish without real suspension.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingSpawner;

#[cfg(not(target_arch = "wasm32"))]
impl Spawner for BlockingSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        pollster::block_on(task);
    }
}

/// Holds tasks until the host drains them, e.g. once per frame.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default, Clone)]
pub struct QueuedSpawner {
    queue: Rc<RefCell<VecDeque<BoxFuture<'static, ()>>>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl QueuedSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks issued but not yet run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run queued tasks in issue order. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Release the borrow before running: a task may enqueue more work.
            let next = self.queue.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            pollster::block_on(task);
            ran += 1;
        }
        ran
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Spawner for QueuedSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.queue.borrow_mut().push_back(task);
    }
}

/// Hands tasks to the browser's microtask queue.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalSpawner;

#[cfg(target_arch = "wasm32")]
impl Spawner for LocalSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// Best-effort durable mirror of the object store.
pub struct PersistenceAdapter {
    table: Arc<dyn ObjectTable>,
    spawner: Box<dyn Spawner>,
    issued: usize,
    failures: Arc<AtomicUsize>,
}

impl PersistenceAdapter {
    pub fn new(table: Arc<dyn ObjectTable>, spawner: Box<dyn Spawner>) -> Self {
        Self {
            table,
            spawner,
            issued: 0,
            failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Issue a write of the given snapshot. Does not wait for it.
    pub fn write(&mut self, object: &WorldObject) {
        let table = Arc::clone(&self.table);
        let failures = Arc::clone(&self.failures);
        let object = object.clone();
        self.issued += 1;
        log::trace!("Issuing write for {}", object.id);
        self.spawner.spawn(Box::pin(async move {
            if let Err(e) = table.put(&object).await {
                failures.fetch_add(1, Ordering::Relaxed);
                log::warn!("Failed to persist object {}: {}", object.id, e);
            }
        }));
    }

    /// Issue a delete of the row for `id`. Does not wait for it.
    pub fn delete(&mut self, id: ObjectId) {
        let table = Arc::clone(&self.table);
        let failures = Arc::clone(&self.failures);
        self.issued += 1;
        log::trace!("Issuing delete for {}", id);
        self.spawner.spawn(Box::pin(async move {
            if let Err(e) = table.delete(id).await {
                failures.fetch_add(1, Ordering::Relaxed);
                log::warn!("Failed to delete object {}: {}", id, e);
            }
        }));
    }

    /// Read every stored row.
    pub async fn load_all(&self) -> StorageResult<Vec<WorldObject>> {
        self.table.get_all().await
    }

    /// Writes and deletes issued so far.
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Writes and deletes that completed with an error.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }
}
