//! WebAssembly entry point: exposes the board to a JavaScript renderer.
//!
//! Events and actions cross the boundary as JSON strings in the same layout the
//! core types serialize to.

use crate::{App, AppConfig};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use weave_core::{
    BoardAction, KeyEvent, ObjectId, ObjectType, ObjectView, PointerEvent, PointerTarget, StoreEvent,
    WeaveConfig,
};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("Starting Weave (WASM)");
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Open the board stored in IndexedDB. `config_json` overrides the defaults.
#[wasm_bindgen(js_name = openBoard)]
pub async fn open_board(config_json: Option<String>) -> Result<WeaveBoard, JsValue> {
    let board = match config_json {
        Some(json) => WeaveConfig::from_json(&json).map_err(to_js)?,
        None => WeaveConfig::default(),
    };
    let app = App::open(AppConfig { board }).await.map_err(to_js)?;
    log::info!("Board ready: {}", app.summary());
    Ok(WeaveBoard { app })
}

/// Per-object draw data in the renderer's JSON layout.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewJson {
    id: ObjectId,
    #[serde(rename = "type")]
    object_type: ObjectType,
    position: [f64; 3],
    rotation: [f64; 3],
    scale: [f64; 3],
    outline: Option<Vec<[f64; 2]>>,
    border: Option<Vec<[f64; 2]>>,
    handles: Vec<usize>,
    handle_scale: [f64; 2],
    text_scale: [f64; 2],
    text_wrap_width: f64,
    text_offset_x: f64,
    selected: bool,
    editing: bool,
}

impl From<ObjectView> for ViewJson {
    fn from(view: ObjectView) -> Self {
        let points = |p: &[kurbo::Point]| -> Vec<[f64; 2]> { p.iter().map(|p| [p.x, p.y]).collect() };
        Self {
            id: view.id,
            object_type: view.object_type,
            position: view.position.to_array(),
            rotation: view.rotation.to_array(),
            scale: view.scale.to_array(),
            outline: view.outline.as_deref().map(points),
            border: view.border.as_deref().map(points),
            handles: view.handles.iter().map(|h| h.index()).collect(),
            handle_scale: view.decorations.handle_scale.to_array(),
            text_scale: view.decorations.text_scale.to_array(),
            text_wrap_width: view.decorations.text_wrap_width,
            text_offset_x: view.decorations.text_offset_x,
            selected: view.selected,
            editing: view.editing,
        }
    }
}

fn event_name(event: &StoreEvent) -> &'static str {
    match event {
        StoreEvent::Added(_) => "added",
        StoreEvent::Updated(_) => "updated",
        StoreEvent::Removed(_) => "removed",
        StoreEvent::SelectionChanged(_) => "selectionChanged",
        StoreEvent::EditingChanged(_) => "editingChanged",
        StoreEvent::Loaded(_) => "loaded",
        StoreEvent::ModeChanged(_) => "modeChanged",
        StoreEvent::LayerChanged(_) => "layerChanged",
        StoreEvent::TransformingChanged(_) => "transformingChanged",
    }
}

#[wasm_bindgen]
pub struct WeaveBoard {
    app: App,
}

#[wasm_bindgen]
impl WeaveBoard {
    /// Route a pointer event. Returns true if the board consumed it.
    pub fn pointer(&mut self, event_json: &str) -> Result<bool, JsValue> {
        let event: PointerEvent = serde_json::from_str(event_json).map_err(to_js)?;
        Ok(self.app.board_mut().handle_pointer(&event))
    }

    /// Route a key event. Returns true if the board handled it.
    pub fn key(&mut self, event_json: &str) -> Result<bool, JsValue> {
        let event: KeyEvent = serde_json::from_str(event_json).map_err(to_js)?;
        Ok(self.app.board_mut().handle_key(&event))
    }

    /// Apply a toolbar action. Returns true if anything changed.
    pub fn action(&mut self, action_json: &str) -> Result<bool, JsValue> {
        let action: BoardAction = serde_json::from_str(action_json).map_err(to_js)?;
        Ok(self.app.board_mut().apply(action))
    }

    /// Draw list for the current frame as a JSON array.
    pub fn view(&mut self) -> Result<String, JsValue> {
        let views: Vec<ViewJson> = self.app.board_mut().view().into_iter().map(ViewJson::from).collect();
        serde_json::to_string(&views).map_err(to_js)
    }

    /// CSS cursor for hovering `target_json`.
    pub fn cursor(&self, target_json: &str) -> Result<String, JsValue> {
        let target: PointerTarget = serde_json::from_str(target_json).map_err(to_js)?;
        Ok(self.app.board().cursor(target).as_css().to_string())
    }

    #[wasm_bindgen(js_name = isTransforming)]
    pub fn is_transforming(&self) -> bool {
        self.app.board().store().is_transforming()
    }

    pub fn summary(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.app.summary()).map_err(to_js)
    }

    /// Call `callback(eventName)` after every store mutation.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: js_sys::Function) {
        self.app.board_mut().store_mut().subscribe(move |event| {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(event_name(event))) {
                log::error!("Change callback failed: {:?}", e);
            }
        });
    }
}
