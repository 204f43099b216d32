//! Durable object table: one `WorldObject` row per id.

mod memory;
mod persist;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod indexeddb;

pub use memory::MemoryTable;
pub use persist::{PersistenceAdapter, Spawner};

#[cfg(not(target_arch = "wasm32"))]
pub use persist::{BlockingSpawner, QueuedSpawner};

#[cfg(target_arch = "wasm32")]
pub use persist::LocalSpawner;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileTable;

#[cfg(target_arch = "wasm32")]
pub use indexeddb::IndexedDbTable;

use crate::object::{ObjectId, WorldObject};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
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

/// Async key-value table holding one object per row, keyed by id.
///
/// On native platforms implementations must be Send + Sync.
/// On WASM these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait ObjectTable: Send + Sync {
    /// Insert or replace the row for `object.id`.
    fn put(&self, object: &WorldObject) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete the row for `id`. Deleting a missing row succeeds.
    fn delete(&self, id: ObjectId) -> BoxFuture<'_, StorageResult<()>>;

    /// Every stored row.
    fn get_all(&self) -> BoxFuture<'_, StorageResult<Vec<WorldObject>>>;
}

/// Async key-value table (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait ObjectTable {
    /// Insert or replace the row for `object.id`.
    fn put(&self, object: &WorldObject) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete the row for `id`. Deleting a missing row succeeds.
    fn delete(&self, id: ObjectId) -> BoxFuture<'_, StorageResult<()>>;

    /// Every stored row.
    fn get_all(&self) -> BoxFuture<'_, StorageResult<Vec<WorldObject>>>;
}

/// Table used by [`create_default_table`] on this platform.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformTable = FileTable;

/// Table used by [`create_default_table`] on this platform.
#[cfg(target_arch = "wasm32")]
pub type PlatformTable = IndexedDbTable;

/// Open the platform's durable table in its default location.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_table() -> StorageResult<PlatformTable> {
    FileTable::default_location()
}

/// Open the platform's durable table in its default location.
#[cfg(target_arch = "wasm32")]
pub fn create_default_table() -> StorageResult<PlatformTable> {
    Ok(IndexedDbTable::new())
}

/// Single-threaded executor for tests: polls with a no-op waker until ready.
#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
