//! The authoritative in-memory object map, plus selection and editing state.
//!
//! Mutations are synchronous and notify observers before returning. Durable
//! writes go through the [`PersistenceAdapter`] and are never awaited.

use crate::object::{DEFAULT_LAYER, MAX_LAYER, ObjectId, ObjectPatch, WorldObject};
use crate::storage::{PersistenceAdapter, StorageResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// What a primary pointer press does on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Presses select and transform objects.
    #[default]
    Select,
    /// Presses belong to the camera; objects ignore them.
    Pan,
}

/// Notification sent to observers after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Added(ObjectId),
    Updated(ObjectId),
    Removed(ObjectId),
    SelectionChanged(Vec<ObjectId>),
    EditingChanged(Option<ObjectId>),
    /// The store was replaced from durable storage.
    Loaded(usize),
    ModeChanged(InteractionMode),
    LayerChanged(u8),
    TransformingChanged(bool),
}

/// Subscription handle for [`ObjectStore::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

type Observer = Box<dyn FnMut(&StoreEvent)>;

pub struct ObjectStore {
    objects: HashMap<ObjectId, WorldObject>,
    /// Selected ids in selection order.
    selection: Vec<ObjectId>,
    /// Object whose inline editor is open.
    editing: Option<ObjectId>,
    mode: InteractionMode,
    current_layer: u8,
    transforming: bool,
    persistence: PersistenceAdapter,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl ObjectStore {
    pub fn new(persistence: PersistenceAdapter) -> Self {
        Self {
            objects: HashMap::new(),
            selection: Vec::new(),
            editing: None,
            mode: InteractionMode::default(),
            current_layer: DEFAULT_LAYER,
            transforming: false,
            persistence,
            observers: Vec::new(),
        }
    }

    // --- observers ---

    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn emit(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }

    // --- objects ---

    /// Insert an object and issue a durable write.
    ///
    /// An existing object with the same id is replaced. Returns false in that case.
    pub fn add(&mut self, object: WorldObject) -> bool {
        let id = object.id;
        self.persistence.write(&object);
        let replaced = self.objects.insert(id, object).is_some();
        if replaced {
            log::warn!("add() replaced existing object {}", id);
            self.emit(StoreEvent::Updated(id));
        } else {
            self.emit(StoreEvent::Added(id));
        }
        !replaced
    }

    /// Merge `patch` into an object and bump `updated_at`. Does not persist.
    ///
    /// Returns false if the id is unknown.
    pub fn update(&mut self, id: ObjectId, patch: ObjectPatch) -> bool {
        let Some(object) = self.objects.get_mut(&id) else {
            log::debug!("update() ignored unknown object {}", id);
            return false;
        };
        object.apply(patch);
        object.touch();
        self.emit(StoreEvent::Updated(id));
        true
    }

    /// Issue a durable write of the current snapshot of `id`.
    pub fn persist(&mut self, id: ObjectId) -> bool {
        match self.objects.get(&id) {
            Some(object) => {
                self.persistence.write(object);
                true
            }
            None => {
                log::debug!("persist() ignored unknown object {}", id);
                false
            }
        }
    }

    /// Delete from memory and durable storage, clearing any selection or
    /// editing reference to it.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        if self.objects.remove(&id).is_none() {
            log::debug!("remove() ignored unknown object {}", id);
            return false;
        }
        self.persistence.delete(id);

        if self.selection.contains(&id) {
            self.selection.retain(|s| *s != id);
            let selection = self.selection.clone();
            self.emit(StoreEvent::SelectionChanged(selection));
        }
        if self.editing == Some(id) {
            self.editing = None;
            self.emit(StoreEvent::EditingChanged(None));
        }
        self.emit(StoreEvent::Removed(id));
        true
    }

    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.values()
    }

    /// Copy of the whole object map.
    pub fn snapshot(&self) -> HashMap<ObjectId, WorldObject> {
        self.objects.clone()
    }

    /// Objects on the current layer, back to front.
    pub fn visible_objects(&self) -> Vec<&WorldObject> {
        let mut visible: Vec<&WorldObject> = self
            .objects
            .values()
            .filter(|o| o.layer() == self.current_layer)
            .collect();
        visible.sort_by(|a, b| a.position.z.total_cmp(&b.position.z).then(a.created_at.cmp(&b.created_at)));
        visible
    }

    // --- selection & editing ---

    /// Replace the selection. Unknown and repeated ids are dropped.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        let mut selection = Vec::new();
        for id in ids {
            if !self.objects.contains_key(&id) {
                log::debug!("set_selection() dropped unknown object {}", id);
            } else if !selection.contains(&id) {
                selection.push(id);
            }
        }
        if selection != self.selection {
            self.selection = selection;
            let selection = self.selection.clone();
            self.emit(StoreEvent::SelectionChanged(selection));
        }
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the editing slot. Returns false if `id` is unknown.
    pub fn set_editing(&mut self, id: Option<ObjectId>) -> bool {
        if let Some(id) = id {
            if !self.objects.contains_key(&id) {
                log::debug!("set_editing() ignored unknown object {}", id);
                return false;
            }
        }
        if self.editing != id {
            self.editing = id;
            self.emit(StoreEvent::EditingChanged(id));
        }
        true
    }

    pub fn editing(&self) -> Option<ObjectId> {
        self.editing
    }

    // --- board state ---

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        if self.mode != mode {
            self.mode = mode;
            self.emit(StoreEvent::ModeChanged(mode));
        }
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switch the visible layer, clamped to `1..=MAX_LAYER`.
    pub fn set_current_layer(&mut self, layer: u8) {
        let layer = layer.clamp(DEFAULT_LAYER, MAX_LAYER);
        if self.current_layer != layer {
            self.current_layer = layer;
            self.emit(StoreEvent::LayerChanged(layer));
        }
    }

    pub fn current_layer(&self) -> u8 {
        self.current_layer
    }

    pub(crate) fn set_transforming(&mut self, transforming: bool) {
        if self.transforming != transforming {
            self.transforming = transforming;
            self.emit(StoreEvent::TransformingChanged(transforming));
        }
    }

    /// True while an object is being dragged or resized.
    pub fn is_transforming(&self) -> bool {
        self.transforming
    }

    pub fn persistence(&self) -> &PersistenceAdapter {
        &self.persistence
    }

    // --- startup ---

    /// Replace the object map with the durable contents.
    ///
    /// On failure the store is left untouched. Selection and editing entries
    /// that no longer resolve are dropped.
    pub async fn load_all(&mut self) -> StorageResult<usize> {
        let rows = match self.persistence.load_all().await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("Failed to load objects: {}", e);
                return Err(e);
            }
        };
        self.objects = rows.into_iter().map(|o| (o.id, o)).collect();

        let objects = &self.objects;
        let before = self.selection.len();
        self.selection.retain(|id| objects.contains_key(id));
        if self.selection.len() != before {
            let selection = self.selection.clone();
            self.emit(StoreEvent::SelectionChanged(selection));
        }
        if let Some(id) = self.editing {
            if !self.objects.contains_key(&id) {
                self.editing = None;
                self.emit(StoreEvent::EditingChanged(None));
            }
        }

        let count = self.objects.len();
        log::info!("Loaded {} objects", count);
        self.emit(StoreEvent::Loaded(count));
        Ok(count)
    }
}
