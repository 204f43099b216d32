//! Pointer-driven drag and resize.
//!
//! The engine owns the *live* pose of at most one object. The store keeps the
//! committed pose, which only changes when the transform ends (pointer-up or
//! loss of pointer capture). While a transform is active the engine holds the
//! pointer: presses by any other object or pointer are refused.

mod drag;
mod handles;
mod resize;

pub use drag::DragState;
pub use handles::{CursorIcon, Corner, Edge, HANDLE_COUNT, HandleKind};
pub use resize::{ResizeResult, ResizeState};

use crate::config::WeaveConfig;
use crate::input::{PointerId, PointerInput, PointerTarget};
use crate::object::{ObjectId, ObjectPatch, WorldObject};
use crate::store::{InteractionMode, ObjectStore};
use crate::style::TextAlign;
use glam::{DVec2, DVec3};

/// Engine state, as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Dragging(ObjectId),
    Resizing(ObjectId, HandleKind),
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Drag(DragState),
    Resize(ResizeState),
}

/// The single in-flight transform and the pointer that owns it.
#[derive(Debug, Clone, Copy)]
struct ActiveTransform {
    object_id: ObjectId,
    pointer_id: PointerId,
    gesture: Gesture,
    live_position: DVec3,
    live_scale: DVec3,
}

/// Counter-scaling for decorations drawn inside a scaled object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decorations {
    /// Local scale of each handle marker so it stays `handle_size` wide.
    pub handle_scale: DVec2,
    /// Local scale of the text group so glyphs stay undistorted.
    pub text_scale: DVec2,
    /// Wrap width for the object's text.
    pub text_wrap_width: f64,
    /// Local x of the text anchor for the current alignment.
    pub text_offset_x: f64,
}

pub struct TransformEngine {
    active: Option<ActiveTransform>,
    min_scale: f64,
    handle_size: f64,
    text_wrap_factor: f64,
}

impl TransformEngine {
    pub fn new(config: &WeaveConfig) -> Self {
        Self {
            active: None,
            min_scale: config.min_scale,
            handle_size: config.handle_size,
            text_wrap_factor: config.text_wrap_factor,
        }
    }

    pub fn state(&self) -> EngineState {
        match self.active {
            None => EngineState::Idle,
            Some(ActiveTransform {
                object_id,
                gesture: Gesture::Drag(_),
                ..
            }) => EngineState::Dragging(object_id),
            Some(ActiveTransform {
                object_id,
                gesture: Gesture::Resize(r),
                ..
            }) => EngineState::Resizing(object_id, r.handle()),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Object and pointer holding the transform, if any.
    pub fn owner(&self) -> Option<(ObjectId, PointerId)> {
        self.active.map(|a| (a.object_id, a.pointer_id))
    }

    fn can_start(&self, store: &ObjectStore, id: ObjectId) -> Option<WorldObject> {
        if let Some(active) = &self.active {
            log::debug!("Transform of {} refused: {} holds the pointer", id, active.object_id);
            return None;
        }
        if store.interaction_mode() != InteractionMode::Select {
            return None;
        }
        let object = store.get(id)?;
        if object.is_locked {
            log::debug!("Transform of {} refused: locked", id);
            return None;
        }
        Some(object.clone())
    }

    /// Start dragging `id`. Returns false if the drag was refused.
    pub fn begin_drag(&mut self, store: &mut ObjectStore, id: ObjectId, input: &PointerInput) -> bool {
        let Some(object) = self.can_start(store, id) else {
            return false;
        };
        if !object.is_pickable {
            return false;
        }
        let Some(hit) = input.ray.intersect_z_plane(object.position.z) else {
            log::debug!("Drag of {} refused: ray misses its plane", id);
            return false;
        };

        self.active = Some(ActiveTransform {
            object_id: id,
            pointer_id: input.pointer_id,
            gesture: Gesture::Drag(DragState::begin(object.position, hit)),
            live_position: object.position,
            live_scale: object.scale,
        });
        store.set_transforming(true);
        log::debug!("Drag started on {}", id);
        true
    }

    /// Start resizing `id` from handle `index` (0..8). Returns false if refused.
    pub fn begin_resize(
        &mut self,
        store: &mut ObjectStore,
        id: ObjectId,
        index: usize,
        input: &PointerInput,
    ) -> bool {
        let Some(handle) = HandleKind::from_index(index) else {
            log::debug!("Resize of {} refused: no handle {}", id, index);
            return false;
        };
        let Some(object) = self.can_start(store, id) else {
            return false;
        };
        if !offers_handles(store, &object) {
            return false;
        }

        self.active = Some(ActiveTransform {
            object_id: id,
            pointer_id: input.pointer_id,
            gesture: Gesture::Resize(ResizeState::begin(handle, object.position, object.scale)),
            live_position: object.position,
            live_scale: object.scale,
        });
        store.set_transforming(true);
        log::debug!("Resize started on {} from {:?}", id, handle);
        true
    }

    /// Advance the live pose. Returns true if the event belonged to the transform.
    ///
    /// A ray that misses the plane leaves the live pose as it was.
    pub fn pointer_move(&mut self, input: &PointerInput) -> bool {
        let min_scale = self.min_scale;
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if active.pointer_id != input.pointer_id {
            return false;
        }

        let plane_z = match &active.gesture {
            Gesture::Drag(d) => d.initial_position().z,
            Gesture::Resize(r) => r.fixed_point().z,
        };
        let Some(hit) = input.ray.intersect_z_plane(plane_z) else {
            log::trace!("Frame skipped: ray misses plane z={}", plane_z);
            return true;
        };

        match &active.gesture {
            Gesture::Drag(drag) => {
                active.live_position = drag.target(hit, input.modifiers.axis_lock());
            }
            Gesture::Resize(resize) => {
                let result = resize.apply(hit, input.modifiers.aspect_lock(), min_scale);
                active.live_position = result.position;
                active.live_scale = result.scale;
            }
        }
        true
    }

    /// End the transform and commit the live pose. Returns true if a transform ended.
    pub fn pointer_up(&mut self, store: &mut ObjectStore, input: &PointerInput) -> bool {
        self.release(store, input.pointer_id)
    }

    /// End the transform owned by `pointer_id`, committing the live pose.
    ///
    /// Used for pointer-up and for cancellation or lost capture, so the engine is
    /// never left holding a pointer that will not come back.
    pub fn release(&mut self, store: &mut ObjectStore, pointer_id: PointerId) -> bool {
        match self.active {
            Some(active) if active.pointer_id == pointer_id => {
                self.active = None;
                self.commit(store, active);
                store.set_transforming(false);
                true
            }
            _ => false,
        }
    }

    fn commit(&self, store: &mut ObjectStore, active: ActiveTransform) {
        let id = active.object_id;
        if !store.update(id, ObjectPatch::pose(active.live_position, active.live_scale)) {
            log::debug!("Commit dropped: {} no longer exists", id);
            return;
        }
        store.persist(id);
        log::debug!("Committed {} at {} scale {}", id, active.live_position, active.live_scale);
    }

    /// Pose to draw for `id`: live while it is being transformed, else committed.
    pub fn display_pose(&self, store: &ObjectStore, id: ObjectId) -> Option<(DVec3, DVec3)> {
        match self.active {
            Some(active) if active.object_id == id => Some((active.live_position, active.live_scale)),
            _ => store.get(id).map(|o| (o.position, o.scale)),
        }
    }

    /// Decorations for `id` at its displayed scale.
    pub fn decorations(&self, store: &ObjectStore, id: ObjectId) -> Option<Decorations> {
        let (_, scale) = self.display_pose(store, id)?;
        let align = store.get(id)?.style.text_align();
        Some(self.decorations_for(scale, align))
    }

    pub fn decorations_for(&self, scale: DVec3, align: TextAlign) -> Decorations {
        let s = scale.truncate().max(DVec2::splat(f64::EPSILON));
        let text_offset_x = match align {
            TextAlign::Left => -0.9 + 0.1 / s.x,
            TextAlign::Right => 0.9 - 0.1 / s.x,
            TextAlign::Center => 0.0,
        };
        Decorations {
            handle_scale: DVec2::splat(self.handle_size) / s,
            text_scale: DVec2::ONE / s,
            text_wrap_width: s.x * self.text_wrap_factor,
            text_offset_x,
        }
    }

    /// Handles to draw for `id`. During a resize only the grabbed one shows.
    pub fn visible_handles(&self, store: &ObjectStore, id: ObjectId) -> Vec<HandleKind> {
        let Some(object) = store.get(id) else {
            return Vec::new();
        };
        if !offers_handles(store, object) {
            return Vec::new();
        }
        match self.state() {
            EngineState::Resizing(owner, handle) if owner == id => vec![handle],
            _ => HandleKind::ALL.to_vec(),
        }
    }

    /// Cursor hint for hovering `target`.
    pub fn cursor(&self, store: &ObjectStore, target: PointerTarget) -> CursorIcon {
        if let EngineState::Resizing(_, handle) = self.state() {
            return handle.cursor();
        }
        match target {
            PointerTarget::Handle(id, index) => match (store.get(id), HandleKind::from_index(index)) {
                (Some(o), Some(handle)) if offers_handles(store, o) && !o.is_locked => handle.cursor(),
                _ => CursorIcon::Default,
            },
            PointerTarget::Body(id) => match store.get(id) {
                Some(o) if o.is_pickable && !o.is_locked => CursorIcon::Grab,
                _ => CursorIcon::Default,
            },
            PointerTarget::Empty => CursorIcon::Default,
        }
    }
}

/// Selected, resizable and not bbox-hidden.
fn offers_handles(store: &ObjectStore, object: &WorldObject) -> bool {
    object.object_type.supports_resize() && !object.is_bbox_hidden && store.is_selected(object.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Modifiers, Ray};
    use crate::object::ObjectType;
    use crate::testing::{approx, recording_store};

    fn setup() -> (TransformEngine, ObjectStore, std::sync::Arc<crate::testing::RecordingTable>, ObjectId) {
        let (mut store, table) = recording_store();
        let obj = WorldObject::new(ObjectType::Shape, DVec3::ZERO);
        let id = obj.id;
        store.add(obj);
        store.set_selection([id]);
        table.clear_ops();
        (TransformEngine::new(&WeaveConfig::default()), store, table, id)
    }

    fn at(x: f64, y: f64, id: ObjectId) -> PointerInput {
        PointerInput::at(x, y, PointerTarget::Body(id))
    }

    #[test]
    fn test_drag_commits_once_on_release() {
        let (mut engine, mut store, table, id) = setup();

        assert!(engine.begin_drag(&mut store, id, &at(0.0, 0.0, id)));
        assert_eq!(engine.state(), EngineState::Dragging(id));
        assert!(store.is_transforming());

        for i in 1..=10 {
            let t = i as f64 / 10.0;
            engine.pointer_move(&at(3.0 * t, 4.0 * t, id));
        }
        // Nothing committed or written mid-drag.
        assert_eq!(store.get(id).unwrap().position, DVec3::ZERO);
        assert!(table.ops().is_empty());
        assert!(approx(engine.display_pose(&store, id).unwrap().0, DVec3::new(3.0, 4.0, 0.0)));

        assert!(engine.pointer_up(&mut store, &at(3.0, 4.0, id)));

        assert!(approx(store.get(id).unwrap().position, DVec3::new(3.0, 4.0, 0.0)));
        assert_eq!(table.puts_for(id), 1);
        assert!(engine.is_idle());
        assert!(!store.is_transforming());
    }

    #[test]
    fn test_drag_offset_from_grab_point() {
        let (mut engine, mut store, _table, id) = setup();

        engine.begin_drag(&mut store, id, &at(0.5, -0.5, id));
        engine.pointer_move(&at(2.5, 1.5, id));
        engine.pointer_up(&mut store, &at(2.5, 1.5, id));

        assert!(approx(store.get(id).unwrap().position, DVec3::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn test_locked_object_refuses_drag() {
        let (mut engine, mut store, table, id) = setup();
        store.update(id, ObjectPatch::locked(true));

        assert!(!engine.begin_drag(&mut store, id, &at(0.0, 0.0, id)));
        assert!(!engine.pointer_move(&at(5.0, 5.0, id)));
        assert!(!engine.pointer_up(&mut store, &at(5.0, 5.0, id)));

        assert_eq!(store.get(id).unwrap().position, DVec3::ZERO);
        assert!(table.ops().is_empty());
    }

    #[test]
    fn test_locked_object_refuses_resize() {
        let (mut engine, mut store, _table, id) = setup();
        store.update(id, ObjectPatch::locked(true));
        let input = PointerInput::at(1.0, 1.0, PointerTarget::Handle(id, 0));

        assert!(!engine.begin_resize(&mut store, id, 0, &input));
    }

    #[test]
    fn test_non_pickable_refuses_drag_but_not_resize() {
        let (mut engine, mut store, _table, id) = setup();
        store.update(
            id,
            ObjectPatch {
                is_pickable: Some(false),
                ..ObjectPatch::default()
            },
        );

        assert!(!engine.begin_drag(&mut store, id, &at(0.0, 0.0, id)));
        let input = PointerInput::at(1.0, 1.0, PointerTarget::Handle(id, 0));
        assert!(engine.begin_resize(&mut store, id, 0, &input));
    }

    #[test]
    fn test_pan_mode_refuses_transforms() {
        let (mut engine, mut store, _table, id) = setup();
        store.set_interaction_mode(InteractionMode::Pan);
        assert!(!engine.begin_drag(&mut store, id, &at(0.0, 0.0, id)));
    }

    #[test]
    fn test_resize_scenario() {
        let (mut engine, mut store, table, id) = setup();
        let handle = |x, y| PointerInput::at(x, y, PointerTarget::Handle(id, 0));

        assert!(engine.begin_resize(&mut store, id, 0, &handle(1.0, 1.0)));
        engine.pointer_move(&handle(3.0, 3.0));
        engine.pointer_move(&handle(5.0, 5.0));
        engine.pointer_up(&mut store, &handle(5.0, 5.0));

        let obj = store.get(id).unwrap();
        assert!(approx(obj.scale, DVec3::new(3.0, 3.0, 1.0)));
        assert!(approx(obj.position, DVec3::new(2.0, 2.0, 0.0)));
        assert_eq!(table.puts_for(id), 1);
    }

    #[test]
    fn test_aspect_locked_resize_commits_press_ratio() {
        let (mut engine, mut store, table, id) = setup();
        store.update(id, ObjectPatch::pose(DVec3::ZERO, DVec3::new(2.0, 1.0, 1.0)));
        let handle = |x, y| {
            PointerInput::at(x, y, PointerTarget::Handle(id, 0)).with_modifiers(Modifiers::ctrl())
        };

        assert!(engine.begin_resize(&mut store, id, 0, &handle(2.0, 1.0)));
        engine.pointer_move(&handle(4.0, 6.0));
        engine.pointer_move(&handle(9.0, 2.0));
        engine.pointer_up(&mut store, &handle(9.0, 2.0));

        let obj = store.get(id).unwrap();
        assert!((obj.scale.x / obj.scale.y - 2.0).abs() < 1e-9);
        assert!(obj.scale.x > 2.0);
        // Bottom-left corner stays at (-2, -1).
        assert!((obj.position.x - obj.scale.x - -2.0).abs() < 1e-9);
        assert!((obj.position.y - obj.scale.y - -1.0).abs() < 1e-9);
        assert_eq!(table.puts_for(id), 1);
    }

    #[test]
    fn test_bottom_edge_resize_keeps_x() {
        let (mut engine, mut store, _table, id) = setup();
        let handle = |x, y| PointerInput::at(x, y, PointerTarget::Handle(id, 5));

        engine.begin_resize(&mut store, id, 5, &handle(0.0, -1.0));
        engine.pointer_move(&handle(4.0, -4.0));
        engine.pointer_up(&mut store, &handle(4.0, -4.0));

        let obj = store.get(id).unwrap();
        assert!((obj.scale.x - 1.0).abs() < f64::EPSILON);
        assert!((obj.position.x - 0.0).abs() < f64::EPSILON);
        assert!((obj.scale.y - 2.5).abs() < 1e-9);
        assert!((obj.position.y - -1.5).abs() < 1e-9);
    }

    #[test]
    fn test_resize_requires_selection_and_resizable_type() {
        let (mut engine, mut store, _table, id) = setup();
        store.set_selection([]);
        let input = PointerInput::at(1.0, 1.0, PointerTarget::Handle(id, 0));
        assert!(!engine.begin_resize(&mut store, id, 0, &input));

        let clock = WorldObject::new(ObjectType::Clock, DVec3::ZERO);
        let clock_id = clock.id;
        store.add(clock);
        store.set_selection([clock_id]);
        assert!(!engine.begin_resize(&mut store, clock_id, 0, &input));
        assert!(!engine.begin_resize(&mut store, id, 8, &input));
    }

    #[test]
    fn test_only_one_owner() {
        let (mut engine, mut store, _table, id) = setup();
        let other = WorldObject::new(ObjectType::Shape, DVec3::new(5.0, 0.0, 0.0));
        let other_id = other.id;
        store.add(other);

        assert!(engine.begin_drag(&mut store, id, &at(0.0, 0.0, id)));
        assert!(!engine.begin_drag(&mut store, other_id, &at(5.0, 0.0, other_id)));

        // Another pointer cannot steer or end the transform.
        let mut stranger = at(9.0, 9.0, id);
        stranger.pointer_id = 7;
        assert!(!engine.pointer_move(&stranger));
        assert!(!engine.pointer_up(&mut store, &stranger));
        assert_eq!(engine.owner(), Some((id, 1)));
    }

    #[test]
    fn test_parallel_ray_skips_frame() {
        let (mut engine, mut store, _table, id) = setup();
        engine.begin_drag(&mut store, id, &at(0.0, 0.0, id));
        engine.pointer_move(&at(1.0, 1.0, id));

        let mut sideways = at(50.0, 50.0, id);
        sideways.ray = Ray::new(DVec3::new(0.0, 0.0, 1.0), DVec3::X);
        assert!(engine.pointer_move(&sideways));
        assert!(approx(engine.display_pose(&store, id).unwrap().0, DVec3::new(1.0, 1.0, 0.0)));

        engine.pointer_up(&mut store, &sideways);
        assert!(approx(store.get(id).unwrap().position, DVec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_press_with_missing_ray_refuses_drag() {
        let (mut engine, mut store, _table, id) = setup();
        let mut input = at(0.0, 0.0, id);
        input.ray = Ray::new(DVec3::new(0.0, 0.0, 1.0), DVec3::Y);
        assert!(!engine.begin_drag(&mut store, id, &input));
        assert!(engine.is_idle());
    }

    #[test]
    fn test_stalled_drag_then_lost_capture_commits() {
        let (mut engine, mut store, table, id) = setup();
        engine.begin_drag(&mut store, id, &at(0.0, 0.0, id));
        engine.pointer_move(&at(2.0, 0.0, id));

        // No pointer-up: the store still holds the old pose.
        assert_eq!(store.get(id).unwrap().position, DVec3::ZERO);
        assert!(!engine.is_idle());

        assert!(engine.release(&mut store, 1));
        assert!(engine.is_idle());
        assert!(approx(store.get(id).unwrap().position, DVec3::new(2.0, 0.0, 0.0)));
        assert_eq!(table.puts_for(id), 1);
    }

    #[test]
    fn test_removed_mid_drag_drops_commit() {
        let (mut engine, mut store, table, id) = setup();
        engine.begin_drag(&mut store, id, &at(0.0, 0.0, id));
        engine.pointer_move(&at(2.0, 0.0, id));
        store.remove(id);

        assert!(engine.pointer_up(&mut store, &at(2.0, 0.0, id)));
        assert!(engine.is_idle());
        assert_eq!(table.puts_for(id), 0);
        assert!(!store.contains(id));
    }

    #[test]
    fn test_axis_lock_drag_moves_one_axis() {
        let (mut engine, mut store, _table, id) = setup();
        let shifted = |x, y| at(x, y, id).with_modifiers(Modifiers::shift());

        engine.begin_drag(&mut store, id, &shifted(0.0, 0.0));
        engine.pointer_move(&shifted(1.0, 0.5));
        engine.pointer_move(&shifted(4.0, 3.0));
        engine.pointer_up(&mut store, &shifted(4.0, 3.0));

        let pos = store.get(id).unwrap().position;
        assert!(approx(pos, DVec3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn test_handles_and_decorations_during_resize() {
        let (mut engine, mut store, _table, id) = setup();
        assert_eq!(engine.visible_handles(&store, id).len(), HANDLE_COUNT);

        let handle = |x, y| PointerInput::at(x, y, PointerTarget::Handle(id, 6));
        engine.begin_resize(&mut store, id, 6, &handle(1.0, 0.0));
        engine.pointer_move(&handle(3.0, 0.0));

        assert_eq!(engine.visible_handles(&store, id), vec![HandleKind::Edge(Edge::Right)]);
        assert_eq!(engine.cursor(&store, PointerTarget::Empty), CursorIcon::EwResize);

        let deco = engine.decorations(&store, id).unwrap();
        // Live scale is (2, 1).
        assert!((deco.handle_scale.x - 0.06).abs() < 1e-9);
        assert!((deco.handle_scale.y - 0.12).abs() < 1e-9);
        assert!((deco.text_scale.x - 0.5).abs() < 1e-9);
        assert!((deco.text_wrap_width - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_bbox_hidden_offers_no_handles() {
        let (engine, mut store, _table, id) = setup();
        store.update(
            id,
            ObjectPatch {
                is_bbox_hidden: Some(true),
                ..ObjectPatch::default()
            },
        );
        assert!(engine.visible_handles(&store, id).is_empty());
    }

    #[test]
    fn test_text_offset_by_alignment() {
        let engine = TransformEngine::new(&WeaveConfig::default());
        let scale = DVec3::new(2.0, 1.0, 1.0);
        assert!((engine.decorations_for(scale, TextAlign::Left).text_offset_x - -0.85).abs() < 1e-9);
        assert!((engine.decorations_for(scale, TextAlign::Right).text_offset_x - 0.85).abs() < 1e-9);
        assert!(engine.decorations_for(scale, TextAlign::Center).text_offset_x.abs() < f64::EPSILON);
    }

    #[test]
    fn test_hover_cursor() {
        let (engine, mut store, _table, id) = setup();
        assert_eq!(engine.cursor(&store, PointerTarget::Body(id)), CursorIcon::Grab);
        assert_eq!(engine.cursor(&store, PointerTarget::Handle(id, 1)), CursorIcon::NwseResize);
        store.update(id, ObjectPatch::locked(true));
        assert_eq!(engine.cursor(&store, PointerTarget::Body(id)), CursorIcon::Default);
    }
}
