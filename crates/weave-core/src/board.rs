//! The board: one store, one transform engine and the rules that connect them to
//! host input.
//!
//! Hosts feed [`PointerEvent`]s, [`KeyEvent`]s and [`BoardAction`]s in, and read
//! [`ObjectView`]s out each frame. Every routed event reports whether the board
//! consumed it, so the host knows whether the camera may act on it.

use crate::config::WeaveConfig;
use crate::geometry::{OutlineCache, ShapeKind};
use crate::input::{ClickTracker, Instant, KeyEvent, PointerEvent, PointerInput, PointerTarget};
use crate::object::{ObjectId, ObjectType};
use crate::selection::{ClickOutcome, SelectionCoordinator};
use crate::storage::{PersistenceAdapter, StorageResult};
use crate::store::ObjectStore;
use crate::style::TextAlign;
use crate::tools::ObjectFactory;
use crate::transform::{CursorIcon, Decorations, HandleKind, TransformEngine};
use glam::DVec3;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Toolbar and menu actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BoardAction {
    AddShape { kind: ShapeKind },
    AddSticky,
    AddText,
    AddCard { front: String, back: String },
    AddClock,
    /// Duplicate the selection beside itself.
    Duplicate,
    BringToFront,
    SendToBack,
    ToggleLock,
    /// Remove the selection (toolbar delete button).
    Delete,
    SetFillColor { color: String },
    SetStrokeColor { color: String },
    SetOpacity { value: f64 },
    /// Add `delta` to each selected stroke width.
    AdjustStrokeWidth { delta: f64 },
    SetTextAlign { align: TextAlign },
    SetShapeType { kind: ShapeKind },
    /// Write the inline editor's text and close it.
    CommitEdit { content: String },
    CancelEdit,
    SetLayer { layer: u8 },
}

/// Everything a renderer needs to draw one object this frame.
#[derive(Debug, Clone)]
pub struct ObjectView {
    pub id: ObjectId,
    pub object_type: ObjectType,
    /// Live pose while transforming, committed otherwise.
    pub position: DVec3,
    pub rotation: DVec3,
    pub scale: DVec3,
    /// Fill outline in local unit space; shapes only.
    pub outline: Option<Arc<[Point]>>,
    /// Closed selection border; present when selected.
    pub border: Option<Arc<[Point]>>,
    pub handles: Vec<HandleKind>,
    pub decorations: Decorations,
    pub selected: bool,
    pub editing: bool,
}

pub struct Board {
    config: WeaveConfig,
    store: ObjectStore,
    engine: TransformEngine,
    coordinator: SelectionCoordinator,
    tools: ObjectFactory,
    clicks: ClickTracker,
    outlines: OutlineCache,
}

impl Board {
    pub fn new(config: WeaveConfig, persistence: PersistenceAdapter) -> Self {
        Self {
            store: ObjectStore::new(persistence),
            engine: TransformEngine::new(&config),
            coordinator: SelectionCoordinator::new(&config),
            tools: ObjectFactory::new(&config),
            clicks: ClickTracker::new(),
            outlines: OutlineCache::new(config.circle_segments, config.border_circle_segments),
            config,
        }
    }

    pub fn config(&self) -> &WeaveConfig {
        &self.config
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }

    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    /// Populate the store from durable storage. Call once at startup.
    pub async fn load(&mut self) -> StorageResult<usize> {
        let count = self.store.load_all().await?;
        log::info!("Board loaded with {} object(s)", count);
        Ok(count)
    }

    // --- input routing ---

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        self.handle_pointer_at(Instant::now(), event)
    }

    /// Route a pointer event that happened at `now`. Returns true if consumed.
    pub fn handle_pointer_at(&mut self, now: Instant, event: &PointerEvent) -> bool {
        match event {
            PointerEvent::Down(input) => self.pointer_down(now, input),
            PointerEvent::Move(input) => self.engine.pointer_move(input),
            PointerEvent::Up(input) => self.engine.pointer_up(&mut self.store, input),
            PointerEvent::Cancel { pointer_id } | PointerEvent::LostCapture { pointer_id } => {
                self.engine.release(&mut self.store, *pointer_id)
            }
        }
    }

    fn pointer_down(&mut self, now: Instant, input: &PointerInput) -> bool {
        // The pointer that owns a transform keeps exclusive routing until release.
        if !self.engine.is_idle() {
            return false;
        }
        let double = self.clicks.press_at(now, input.screen, input.target);

        match input.target {
            PointerTarget::Empty => {
                self.coordinator.pointer_missed(&mut self.store);
                false
            }
            PointerTarget::Handle(id, index) => self.engine.begin_resize(&mut self.store, id, index, input),
            PointerTarget::Body(id) => {
                if self.coordinator.click(&mut self.store, id) == ClickOutcome::Ignored {
                    return false;
                }
                if double && self.coordinator.double_click(&mut self.store, id) {
                    return true;
                }
                // Locked objects can be selected but not moved.
                self.engine.begin_drag(&mut self.store, id, input);
                true
            }
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        self.coordinator.handle_key(&mut self.store, event)
    }

    /// Cursor to show while hovering `target`.
    pub fn cursor(&self, target: PointerTarget) -> CursorIcon {
        self.engine.cursor(&self.store, target)
    }

    // --- actions ---

    /// Apply a toolbar action. Returns true if anything changed.
    pub fn apply(&mut self, action: BoardAction) -> bool {
        let store = &mut self.store;
        let coord = &self.coordinator;
        match action {
            BoardAction::AddShape { kind } => {
                self.tools.add_shape(store, kind);
                true
            }
            BoardAction::AddSticky => {
                self.tools.add_sticky(store);
                true
            }
            BoardAction::AddText => {
                self.tools.add_text(store);
                true
            }
            BoardAction::AddCard { front, back } => {
                self.tools.add_card(store, &front, &back);
                true
            }
            BoardAction::AddClock => {
                self.tools.add_clock(store);
                true
            }
            BoardAction::Duplicate => !coord.duplicate_selected(store).is_empty(),
            BoardAction::BringToFront => {
                coord.bring_to_front(store);
                !store.selection().is_empty()
            }
            BoardAction::SendToBack => {
                coord.send_to_back(store);
                !store.selection().is_empty()
            }
            BoardAction::ToggleLock => coord.toggle_lock(store).is_some(),
            BoardAction::Delete => coord.delete_selected(store) > 0,
            BoardAction::SetFillColor { color } => coord.set_fill_color(store, &color) > 0,
            BoardAction::SetStrokeColor { color } => coord.set_stroke_color(store, &color) > 0,
            BoardAction::SetOpacity { value } => coord.set_opacity(store, value) > 0,
            BoardAction::AdjustStrokeWidth { delta } => coord.adjust_stroke_width(store, delta) > 0,
            BoardAction::SetTextAlign { align } => coord.set_text_align(store, align) > 0,
            BoardAction::SetShapeType { kind } => coord.set_shape_type(store, kind) > 0,
            BoardAction::CommitEdit { content } => coord.commit_edit(store, &content),
            BoardAction::CancelEdit => {
                let open = store.editing().is_some();
                coord.cancel_edit(store);
                open
            }
            BoardAction::SetLayer { layer } => {
                let before = store.current_layer();
                store.set_current_layer(layer);
                store.current_layer() != before
            }
        }
    }

    // --- rendering ---

    /// Objects on the current layer, back to front, with live poses applied.
    pub fn view(&mut self) -> Vec<ObjectView> {
        let editing = self.store.editing();
        let mut views = Vec::new();
        for object in self.store.visible_objects() {
            let (position, scale) = self
                .engine
                .display_pose(&self.store, object.id)
                .unwrap_or((object.position, object.scale));
            let selected = self.store.is_selected(object.id);
            let kind = object.style.shape_type();
            let is_shape = object.object_type == ObjectType::Shape;

            views.push(ObjectView {
                id: object.id,
                object_type: object.object_type,
                position,
                rotation: object.rotation,
                scale,
                outline: is_shape.then(|| self.outlines.outline(kind)),
                border: (selected && !object.is_bbox_hidden).then(|| self.outlines.border(kind)),
                handles: self.engine.visible_handles(&self.store, object.id),
                decorations: self.engine.decorations_for(scale, object.style.text_align()),
                selected,
                editing: editing == Some(object.id),
            });
        }
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::object::{ObjectPatch, WorldObject};
    use crate::storage::{BlockingSpawner, MemoryTable, ObjectTable, block_on};
    use crate::store::InteractionMode;
    use crate::testing::{RecordingTable, TableOp, approx};
    use std::time::Duration;

    fn board() -> (Board, Arc<RecordingTable>) {
        let table = Arc::new(RecordingTable::default());
        let adapter = PersistenceAdapter::new(table.clone(), Box::new(BlockingSpawner));
        (Board::new(WeaveConfig::default(), adapter), table)
    }

    fn add(board: &mut Board, position: DVec3) -> ObjectId {
        let obj = WorldObject::new(ObjectType::Shape, position);
        let id = obj.id;
        board.store_mut().add(obj);
        id
    }

    fn down(x: f64, y: f64, target: PointerTarget) -> PointerEvent {
        PointerEvent::Down(PointerInput::at(x, y, target))
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move(PointerInput::at(x, y, PointerTarget::Empty))
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up(PointerInput::at(x, y, PointerTarget::Empty))
    }

    #[test]
    fn test_scenario_drag_commits_once() {
        let (mut board, table) = board();
        let id = add(&mut board, DVec3::ZERO);
        table.clear_ops();

        assert!(board.handle_pointer(&down(0.0, 0.0, PointerTarget::Body(id))));
        assert_eq!(board.store().selection(), &[id]);
        assert!(board.store().is_transforming());

        board.handle_pointer(&moved(1.5, 2.0));
        board.handle_pointer(&moved(3.0, 4.0));
        assert_eq!(board.store().get(id).unwrap().position, DVec3::ZERO);
        assert!(table.ops().is_empty());

        assert!(board.handle_pointer(&up(3.0, 4.0)));
        assert!(approx(board.store().get(id).unwrap().position, DVec3::new(3.0, 4.0, 0.0)));
        assert_eq!(table.ops(), vec![TableOp::Put(id)]);
        assert!(!board.store().is_transforming());
    }

    #[test]
    fn test_scenario_resize_top_right() {
        let (mut board, _table) = board();
        let id = add(&mut board, DVec3::ZERO);
        board.store_mut().set_selection([id]);

        assert!(board.handle_pointer(&down(1.0, 1.0, PointerTarget::Handle(id, 0))));
        board.handle_pointer(&moved(5.0, 5.0));
        board.handle_pointer(&up(5.0, 5.0));

        let obj = board.store().get(id).unwrap();
        assert!(approx(obj.scale, DVec3::new(3.0, 3.0, 1.0)));
        assert!(approx(obj.position, DVec3::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn test_scenario_locked_object_selects_but_stays() {
        let (mut board, table) = board();
        let id = add(&mut board, DVec3::ZERO);
        board.store_mut().update(id, ObjectPatch::locked(true));
        table.clear_ops();

        assert!(board.handle_pointer(&down(0.0, 0.0, PointerTarget::Body(id))));
        assert!(!board.handle_pointer(&moved(3.0, 4.0)));
        assert!(!board.handle_pointer(&up(3.0, 4.0)));

        assert_eq!(board.store().selection(), &[id]);
        assert_eq!(board.store().get(id).unwrap().position, DVec3::ZERO);
        assert!(table.ops().is_empty());
    }

    #[test]
    fn test_scenario_delete_key() {
        let (mut board, table) = board();
        let id = add(&mut board, DVec3::ZERO);
        board.handle_pointer(&down(0.0, 0.0, PointerTarget::Body(id)));
        board.handle_pointer(&up(0.0, 0.0));
        table.clear_ops();

        assert!(board.handle_key(&KeyEvent::pressed("Delete")));

        assert!(!board.store().contains(id));
        assert!(board.store().selection().is_empty());
        assert_eq!(table.ops(), vec![TableOp::Delete(id)]);
    }

    #[test]
    fn test_scenario_bottom_edge_keeps_width() {
        let (mut board, _table) = board();
        let id = add(&mut board, DVec3::new(1.0, 1.0, 0.0));
        board.store_mut().update(id, ObjectPatch::pose(DVec3::new(1.0, 1.0, 0.0), DVec3::new(2.0, 1.0, 1.0)));
        board.store_mut().set_selection([id]);

        board.handle_pointer(&down(1.0, 0.0, PointerTarget::Handle(id, 5)));
        board.handle_pointer(&moved(4.0, -3.0));
        board.handle_pointer(&up(4.0, -3.0));

        let obj = board.store().get(id).unwrap();
        assert!((obj.scale.x - 2.0).abs() < 1e-9);
        assert!((obj.position.x - 1.0).abs() < 1e-9);
        assert!((obj.scale.y - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_axis_lock_through_board() {
        let (mut board, _table) = board();
        let id = add(&mut board, DVec3::ZERO);

        board.handle_pointer(&down(0.0, 0.0, PointerTarget::Body(id)));
        let shift = PointerInput::at(5.0, 1.0, PointerTarget::Empty).with_modifiers(Modifiers::shift());
        board.handle_pointer(&PointerEvent::Move(shift));
        board.handle_pointer(&PointerEvent::Up(shift));

        assert!(approx(board.store().get(id).unwrap().position, DVec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_press_on_empty_clears_selection_and_passes_through() {
        let (mut board, _table) = board();
        let id = add(&mut board, DVec3::ZERO);
        board.store_mut().set_selection([id]);

        assert!(!board.handle_pointer(&down(9.0, 9.0, PointerTarget::Empty)));
        assert!(board.store().selection().is_empty());
    }

    #[test]
    fn test_second_pointer_is_refused_during_drag() {
        let (mut board, _table) = board();
        let a = add(&mut board, DVec3::ZERO);
        let b = add(&mut board, DVec3::new(5.0, 0.0, 0.0));

        board.handle_pointer(&down(0.0, 0.0, PointerTarget::Body(a)));
        let mut other = PointerInput::at(5.0, 0.0, PointerTarget::Body(b));
        other.pointer_id = 2;

        assert!(!board.handle_pointer(&PointerEvent::Down(other)));
        assert_eq!(board.store().selection(), &[a]);
        assert!(!board.handle_pointer(&PointerEvent::Move(other)));
    }

    #[test]
    fn test_lost_capture_commits_live_pose() {
        let (mut board, table) = board();
        let id = add(&mut board, DVec3::ZERO);
        table.clear_ops();

        board.handle_pointer(&down(0.0, 0.0, PointerTarget::Body(id)));
        board.handle_pointer(&moved(2.0, 0.0));
        assert!(board.handle_pointer(&PointerEvent::LostCapture { pointer_id: 1 }));

        assert!(board.engine().is_idle());
        assert!(approx(board.store().get(id).unwrap().position, DVec3::new(2.0, 0.0, 0.0)));
        assert_eq!(table.puts_for(id), 1);
    }

    #[test]
    fn test_double_click_opens_editor_without_drag() {
        let (mut board, _table) = board();
        let id = add(&mut board, DVec3::ZERO);
        let t0 = Instant::now();

        board.handle_pointer_at(t0, &down(0.0, 0.0, PointerTarget::Body(id)));
        board.handle_pointer_at(t0, &up(0.0, 0.0));
        assert_eq!(board.store().editing(), None);

        let t1 = t0 + Duration::from_millis(150);
        assert!(board.handle_pointer_at(t1, &down(0.0, 0.0, PointerTarget::Body(id))));
        assert_eq!(board.store().editing(), Some(id));
        assert!(board.engine().is_idle());
    }

    #[test]
    fn test_pan_mode_ignores_presses() {
        let (mut board, _table) = board();
        let id = add(&mut board, DVec3::ZERO);
        board.handle_key(&KeyEvent::pressed(" "));
        assert_eq!(board.store().interaction_mode(), InteractionMode::Pan);

        assert!(!board.handle_pointer(&down(0.0, 0.0, PointerTarget::Body(id))));
        assert!(board.store().selection().is_empty());
        assert!(board.engine().is_idle());
    }

    #[test]
    fn test_actions_route_to_coordinator_and_tools() {
        let (mut board, _table) = board();
        assert!(board.apply(BoardAction::AddSticky));
        let sticky = board.store().selection()[0];
        assert_eq!(board.store().editing(), Some(sticky));

        assert!(board.apply(BoardAction::CommitEdit {
            content: "note".to_string()
        }));
        assert!(board.apply(BoardAction::Duplicate));
        assert_eq!(board.store().len(), 2);
        assert_ne!(board.store().selection()[0], sticky);

        assert!(!board.apply(BoardAction::SetFillColor {
            color: "bogus".to_string()
        }));
        assert!(board.apply(BoardAction::Delete));
        assert_eq!(board.store().len(), 1);
    }

    #[test]
    fn test_action_json() {
        let action: BoardAction = serde_json::from_str(r#"{"action":"addShape","kind":"hexagon"}"#).unwrap();
        assert_eq!(action, BoardAction::AddShape { kind: ShapeKind::Hexagon });
    }

    #[test]
    fn test_view_uses_live_pose_and_handles() {
        let (mut board, _table) = board();
        let id = add(&mut board, DVec3::ZERO);
        board.store_mut().set_selection([id]);

        board.handle_pointer(&down(1.0, 1.0, PointerTarget::Handle(id, 0)));
        board.handle_pointer(&moved(3.0, 3.0));

        let views = board.view();
        assert_eq!(views.len(), 1);
        let view = &views[0];
        assert!(approx(view.scale, DVec3::new(2.0, 2.0, 1.0)));
        assert_eq!(view.handles, vec![HandleKind::ALL[0]]);
        assert!(view.border.is_some());
        assert_eq!(view.outline.as_ref().map(|o| o.len()), Some(4));
        assert!((view.decorations.text_scale.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_load_populates_store() {
        let stored = WorldObject::new(ObjectType::Clock, DVec3::new(0.0, 0.0, 0.5));
        let table = Arc::new(MemoryTable::with_rows([stored.clone()]));
        let adapter = PersistenceAdapter::new(table.clone(), Box::new(BlockingSpawner));
        let mut board = Board::new(WeaveConfig::default(), adapter);

        assert_eq!(block_on(board.load()).unwrap(), 1);
        assert_eq!(board.store().get(stored.id), Some(&stored));
        assert_eq!(block_on(table.get_all()).unwrap().len(), 1);
    }
}
