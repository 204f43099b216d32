//! IndexedDB object table for WebAssembly.

use super::{BoxFuture, ObjectTable, StorageError, StorageResult};
use crate::object::{ObjectId, WorldObject};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{IdbDatabase, IdbObjectStore, IdbRequest, IdbTransactionMode};

const DB_NAME: &str = "WeaveDB";
const DB_VERSION: u32 = 1;
const STORE_NAME: &str = "objects";

/// Rows are JSON strings keyed by the object id.
///
/// Not Send/Sync: WASM is single-threaded and IndexedDB handles are not thread-safe.
pub struct IndexedDbTable {
    db: Rc<RefCell<Option<IdbDatabase>>>,
}

impl IndexedDbTable {
    /// The connection is opened lazily on first use.
    pub fn new() -> Self {
        Self {
            db: Rc::new(RefCell::new(None)),
        }
    }

    async fn get_db(&self) -> StorageResult<IdbDatabase> {
        if let Some(db) = self.db.borrow().as_ref() {
            return Ok(db.clone());
        }

        let window =
            web_sys::window().ok_or_else(|| StorageError::Other("No window object".to_string()))?;

        let idb_factory = window
            .indexed_db()
            .map_err(|e| StorageError::Other(format!("IndexedDB error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("IndexedDB not available".to_string()))?;

        let open_request = idb_factory
            .open_with_u32(DB_NAME, DB_VERSION)
            .map_err(|e| StorageError::Other(format!("Failed to open DB: {:?}", e)))?;

        let onupgrade = Closure::once(Box::new(move |event: web_sys::IdbVersionChangeEvent| {
            let Some(target) = event.target() else {
                return;
            };
            let request: IdbRequest = target.unchecked_into();
            let Ok(result) = request.result() else {
                return;
            };
            let db: IdbDatabase = result.unchecked_into();
            if !db.object_store_names().contains(STORE_NAME) {
                if let Err(e) = db.create_object_store(STORE_NAME) {
                    log::error!("Failed to create object store: {:?}", e);
                }
            }
        }) as Box<dyn FnOnce(_)>);

        open_request.set_onupgradeneeded(Some(onupgrade.as_ref().unchecked_ref()));
        onupgrade.forget();

        let db = await_idb_request::<IdbDatabase>(&open_request).await?;
        *self.db.borrow_mut() = Some(db.clone());
        log::info!("Opened IndexedDB {} v{}", DB_NAME, DB_VERSION);

        Ok(db)
    }

    fn get_store(&self, db: &IdbDatabase, mode: IdbTransactionMode) -> StorageResult<IdbObjectStore> {
        let transaction = db
            .transaction_with_str_and_mode(STORE_NAME, mode)
            .map_err(|e| StorageError::Other(format!("Transaction error: {:?}", e)))?;

        transaction
            .object_store(STORE_NAME)
            .map_err(|e| StorageError::Other(format!("Store error: {:?}", e)))
    }
}

impl Default for IndexedDbTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTable for IndexedDbTable {
    fn put(&self, object: &WorldObject) -> BoxFuture<'_, StorageResult<()>> {
        let key = object.id.to_string();
        let json = match serde_json::to_string(object) {
            Ok(j) => j,
            Err(e) => {
                return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) });
            }
        };

        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readwrite)?;

            let request = store
                .put_with_key(&JsValue::from_str(&json), &JsValue::from_str(&key))
                .map_err(|e| StorageError::Other(format!("Put error: {:?}", e)))?;

            await_idb_request::<JsValue>(&request).await?;
            Ok(())
        })
    }

    fn delete(&self, id: ObjectId) -> BoxFuture<'_, StorageResult<()>> {
        let key = id.to_string();

        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readwrite)?;

            let request = store
                .delete(&JsValue::from_str(&key))
                .map_err(|e| StorageError::Other(format!("Delete error: {:?}", e)))?;

            await_idb_request::<JsValue>(&request).await?;
            Ok(())
        })
    }

    fn get_all(&self) -> BoxFuture<'_, StorageResult<Vec<WorldObject>>> {
        Box::pin(async move {
            let db = self.get_db().await?;
            let store = self.get_store(&db, IdbTransactionMode::Readonly)?;

            let request = store
                .get_all()
                .map_err(|e| StorageError::Other(format!("GetAll error: {:?}", e)))?;

            let rows = await_idb_request::<js_sys::Array>(&request).await?;

            let mut objects = Vec::with_capacity(rows.length() as usize);
            for row in rows.iter() {
                let Some(json) = row.as_string() else {
                    log::warn!("Skipping non-string row in {}", STORE_NAME);
                    continue;
                };
                match serde_json::from_str::<WorldObject>(&json) {
                    Ok(object) => objects.push(object),
                    Err(e) => log::warn!("Skipping unreadable row: {}", e),
                }
            }
            objects.sort_by_key(|o| (o.created_at, o.id));
            Ok(objects)
        })
    }
}

/// Await an IndexedDB request through a Promise.
async fn await_idb_request<T: JsCast>(request: &IdbRequest) -> StorageResult<T> {
    use wasm_bindgen_futures::JsFuture;

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let onsuccess = Closure::once(Box::new(move |event: web_sys::Event| {
            let result = event
                .target()
                .map(|t| t.unchecked_into::<IdbRequest>())
                .and_then(|r| r.result().ok())
                .unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::NULL, &result);
        }) as Box<dyn FnOnce(_)>);

        let onerror = Closure::once(Box::new(move |_event: web_sys::Event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("IndexedDB request failed"));
        }) as Box<dyn FnOnce(_)>);

        request.set_onsuccess(Some(onsuccess.as_ref().unchecked_ref()));
        request.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        onsuccess.forget();
        onerror.forget();
    });

    JsFuture::from(promise)
        .await
        .map_err(|e| StorageError::Other(format!("IndexedDB request failed: {:?}", e)))?
        .dyn_into::<T>()
        .map_err(|_| StorageError::Other("Type conversion failed".to_string()))
}
