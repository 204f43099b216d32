//! Selection, inline editing, keyboard shortcuts and toolbar actions.
//!
//! Selection and editing state live in the [`ObjectStore`]; this type holds the
//! rules for changing them. Toolbar actions apply to every selected object and
//! persist each one they change.

use crate::config::WeaveConfig;
use crate::geometry::ShapeKind;
use crate::input::KeyEvent;
use crate::object::{ObjectId, ObjectPatch};
use crate::store::{InteractionMode, ObjectStore};
use crate::style::{ObjectStyle, TextAlign, parse_color};

/// Result of pressing on an object's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The object does not accept pointer targeting.
    Ignored,
    /// The selection was replaced with this object.
    Selected,
    /// The object was already selected; selection kept as is.
    AlreadySelected,
}

impl ClickOutcome {
    pub fn accepted(self) -> bool {
        self != ClickOutcome::Ignored
    }
}

pub struct SelectionCoordinator {
    duplicate_offset_factor: f64,
    reorder_step: f64,
}

impl SelectionCoordinator {
    pub fn new(config: &WeaveConfig) -> Self {
        Self {
            duplicate_offset_factor: config.duplicate_offset_factor,
            reorder_step: config.reorder_step,
        }
    }

    /// Press on an object body. An unselected object replaces the selection.
    pub fn click(&self, store: &mut ObjectStore, id: ObjectId) -> ClickOutcome {
        if store.interaction_mode() != InteractionMode::Select {
            return ClickOutcome::Ignored;
        }
        match store.get(id) {
            Some(object) if object.is_pickable => {}
            _ => return ClickOutcome::Ignored,
        }
        if store.is_selected(id) {
            return ClickOutcome::AlreadySelected;
        }
        store.set_selection([id]);
        ClickOutcome::Selected
    }

    /// Press on empty space.
    pub fn pointer_missed(&self, store: &mut ObjectStore) {
        if store.interaction_mode() == InteractionMode::Select {
            store.set_selection([]);
        }
    }

    /// Open the inline editor on `id`, closing any other.
    pub fn double_click(&self, store: &mut ObjectStore, id: ObjectId) -> bool {
        let Some(object) = store.get(id) else {
            return false;
        };
        if !object.is_pickable || object.is_locked || !object.object_type.supports_editing() {
            return false;
        }
        store.set_editing(Some(id));
        store.set_selection([id]);
        true
    }

    /// Write the editor's text to the editing object, persist it and close the editor.
    pub fn commit_edit(&self, store: &mut ObjectStore, content: &str) -> bool {
        let Some(id) = store.editing() else {
            return false;
        };
        store.update(id, ObjectPatch::content(content));
        store.persist(id);
        store.set_editing(None);
        true
    }

    /// Close the editor without writing.
    pub fn cancel_edit(&self, store: &mut ObjectStore) {
        store.set_editing(None);
    }

    /// Keyboard shortcuts. Returns true if the key was handled.
    pub fn handle_key(&self, store: &mut ObjectStore, event: &KeyEvent) -> bool {
        match (event.key.as_str(), event.pressed) {
            ("Escape", true) => {
                store.set_selection([]);
                true
            }
            ("Delete" | "Backspace", true) => {
                if event.in_text_input {
                    return false;
                }
                self.delete_selected(store) > 0
            }
            (" ", true) if !event.in_text_input => {
                if store.interaction_mode() == InteractionMode::Select {
                    store.set_interaction_mode(InteractionMode::Pan);
                }
                true
            }
            (" ", false) => {
                store.set_interaction_mode(InteractionMode::Select);
                true
            }
            _ => false,
        }
    }

    /// Remove every selected object. Returns how many were removed.
    pub fn delete_selected(&self, store: &mut ObjectStore) -> usize {
        let ids = store.selection().to_vec();
        let removed = ids.into_iter().filter(|id| store.remove(*id)).count();
        if removed > 0 {
            log::info!("Deleted {} object(s)", removed);
        }
        removed
    }

    /// Copy every selected object beside its source and select the copies.
    pub fn duplicate_selected(&self, store: &mut ObjectStore) -> Vec<ObjectId> {
        let sources: Vec<_> = store
            .selection()
            .iter()
            .filter_map(|id| store.get(*id).cloned())
            .collect();

        let mut copies = Vec::with_capacity(sources.len());
        for source in sources {
            let mut copy = source.duplicate();
            copy.position.x += source.scale.x * self.duplicate_offset_factor;
            copy.position.y -= source.scale.y * self.duplicate_offset_factor;
            copies.push(copy.id);
            store.add(copy);
        }
        store.set_selection(copies.iter().copied());
        copies
    }

    /// Raise the selection above every object, keeping its internal order.
    pub fn bring_to_front(&self, store: &mut ObjectStore) {
        let top = store.objects().map(|o| o.position.z).fold(0.0, f64::max);
        for (i, id) in self.selected_by_z(store).into_iter().enumerate() {
            self.set_z(store, id, top + self.reorder_step * (i + 1) as f64);
        }
    }

    /// Lower the selection below every object, keeping its internal order.
    pub fn send_to_back(&self, store: &mut ObjectStore) {
        let bottom = store.objects().map(|o| o.position.z).fold(0.0, f64::min);
        let ids = self.selected_by_z(store);
        for (i, id) in ids.into_iter().rev().enumerate() {
            self.set_z(store, id, bottom - self.reorder_step * (i + 1) as f64);
        }
    }

    /// Selected ids, lowest z first.
    fn selected_by_z(&self, store: &ObjectStore) -> Vec<ObjectId> {
        let mut ids: Vec<_> = store
            .selection()
            .iter()
            .filter_map(|id| store.get(*id).map(|o| (o.position.z, *id)))
            .collect();
        ids.sort_by(|a, b| a.0.total_cmp(&b.0));
        ids.into_iter().map(|(_, id)| id).collect()
    }

    fn set_z(&self, store: &mut ObjectStore, id: ObjectId, z: f64) {
        let Some(mut position) = store.get(id).map(|o| o.position) else {
            return;
        };
        position.z = z;
        store.update(id, ObjectPatch::position(position));
        store.persist(id);
    }

    /// Lock or unlock the selection. The first selected object decides the
    /// direction so a mixed selection ends up uniform.
    pub fn toggle_lock(&self, store: &mut ObjectStore) -> Option<bool> {
        let first = *store.selection().first()?;
        let locked = !store.get(first)?.is_locked;
        for id in store.selection().to_vec() {
            store.update(id, ObjectPatch::locked(locked));
            store.persist(id);
        }
        Some(locked)
    }

    pub fn set_fill_color(&self, store: &mut ObjectStore, color: &str) -> usize {
        if parse_color(color).is_none() {
            log::warn!("Ignoring invalid fill color {:?}", color);
            return 0;
        }
        self.edit_style(store, |s| s.fill_color = Some(color.to_string()))
    }

    pub fn set_stroke_color(&self, store: &mut ObjectStore, color: &str) -> usize {
        if parse_color(color).is_none() {
            log::warn!("Ignoring invalid stroke color {:?}", color);
            return 0;
        }
        self.edit_style(store, |s| s.stroke_color = Some(color.to_string()))
    }

    pub fn set_opacity(&self, store: &mut ObjectStore, opacity: f64) -> usize {
        if !opacity.is_finite() {
            return 0;
        }
        let opacity = opacity.clamp(0.0, 1.0);
        self.edit_style(store, |s| s.opacity = Some(opacity))
    }

    /// Step each stroke width by `delta`, never below zero.
    pub fn adjust_stroke_width(&self, store: &mut ObjectStore, delta: f64) -> usize {
        self.edit_style(store, |s| s.stroke_width = Some((s.stroke_width() + delta).max(0.0)))
    }

    pub fn set_text_align(&self, store: &mut ObjectStore, align: TextAlign) -> usize {
        self.edit_style(store, |s| s.text_align = Some(align))
    }

    pub fn set_shape_type(&self, store: &mut ObjectStore, kind: ShapeKind) -> usize {
        self.edit_style(store, |s| s.shape_type = Some(kind))
    }

    fn edit_style(&self, store: &mut ObjectStore, edit: impl Fn(&mut ObjectStyle)) -> usize {
        let mut changed = 0;
        for id in store.selection().to_vec() {
            let Some(mut style) = store.get(id).map(|o| o.style.clone()) else {
                continue;
            };
            edit(&mut style);
            store.update(id, ObjectPatch::style(style));
            store.persist(id);
            changed += 1;
        }
        changed
    }
}
