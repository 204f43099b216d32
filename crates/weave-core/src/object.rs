//! World objects: the single persisted entity on a board.

use crate::style::ObjectStyle;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for world objects.
pub type ObjectId = Uuid;

/// Layer used when an object carries no layer id.
pub const DEFAULT_LAYER: u8 = 1;
/// Highest layer id a board exposes.
pub const MAX_LAYER: u8 = 3;

/// Kind of object. Decides rendering and which interactions are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Shape,
    Text,
    Sticky,
    Connector,
    Card,
    Clock,
}

impl ObjectType {
    /// Whether the object shows resize handles when selected.
    pub fn supports_resize(self) -> bool {
        matches!(self, ObjectType::Shape | ObjectType::Text | ObjectType::Sticky)
    }

    /// Whether double-click opens the inline text editor.
    pub fn supports_editing(self) -> bool {
        self.supports_resize()
    }
}

/// A placed object on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldObject {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    #[serde(with = "vec3")]
    pub position: DVec3,
    #[serde(with = "vec3", default = "zero")]
    pub rotation: DVec3,
    /// `x` and `y` are half-extents of the object's 2x2 unit geometry.
    #[serde(with = "vec3", default = "one")]
    pub scale: DVec3,
    #[serde(default)]
    pub style: ObjectStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<u8>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default = "default_true")]
    pub is_pickable: bool,
    #[serde(default, rename = "isBBoxHidden")]
    pub is_bbox_hidden: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

fn default_true() -> bool {
    true
}

fn zero() -> DVec3 {
    DVec3::ZERO
}

fn one() -> DVec3 {
    DVec3::ONE
}

impl WorldObject {
    /// Create a new object with a fresh id, unit scale and default style.
    pub fn new(object_type: ObjectType, position: DVec3) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            object_type,
            position,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
            style: ObjectStyle::default(),
            content: None,
            parent_id: None,
            layer_id: None,
            is_locked: false,
            is_pickable: true,
            is_bbox_hidden: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_style(mut self, style: ObjectStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer_id = Some(layer);
        self
    }

    pub fn layer(&self) -> u8 {
        self.layer_id.unwrap_or(DEFAULT_LAYER)
    }

    /// Copy of this object under a new id with fresh timestamps.
    pub fn duplicate(&self) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Merge a partial update. Returns true if any field was given.
    pub fn apply(&mut self, patch: ObjectPatch) -> bool {
        let ObjectPatch {
            position,
            rotation,
            scale,
            style,
            content,
            layer_id,
            is_locked,
            is_pickable,
            is_bbox_hidden,
        } = patch;
        let mut changed = false;
        if let Some(v) = position {
            self.position = v;
            changed = true;
        }
        if let Some(v) = rotation {
            self.rotation = v;
            changed = true;
        }
        if let Some(v) = scale {
            self.scale = v;
            changed = true;
        }
        if let Some(v) = style {
            self.style = v;
            changed = true;
        }
        if let Some(v) = content {
            self.content = Some(v);
            changed = true;
        }
        if let Some(v) = layer_id {
            self.layer_id = Some(v);
            changed = true;
        }
        if let Some(v) = is_locked {
            self.is_locked = v;
            changed = true;
        }
        if let Some(v) = is_pickable {
            self.is_pickable = v;
            changed = true;
        }
        if let Some(v) = is_bbox_hidden {
            self.is_bbox_hidden = v;
            changed = true;
        }
        changed
    }

    /// Advance `updated_at`, never moving it backwards.
    pub(crate) fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at.saturating_add(1));
    }
}

/// A partial update to a [`WorldObject`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub position: Option<DVec3>,
    pub rotation: Option<DVec3>,
    pub scale: Option<DVec3>,
    pub style: Option<ObjectStyle>,
    pub content: Option<String>,
    pub layer_id: Option<u8>,
    pub is_locked: Option<bool>,
    pub is_pickable: Option<bool>,
    pub is_bbox_hidden: Option<bool>,
}

impl ObjectPatch {
    pub fn position(position: DVec3) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn pose(position: DVec3, scale: DVec3) -> Self {
        Self {
            position: Some(position),
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn style(style: ObjectStyle) -> Self {
        Self {
            style: Some(style),
            ..Self::default()
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn locked(locked: bool) -> Self {
        Self {
            is_locked: Some(locked),
            ..Self::default()
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Serializes a `DVec3` as `{ "x": .., "y": .., "z": .. }`.
pub(crate) mod vec3 {
    use glam::DVec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Repr {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    }

    pub fn serialize<S: Serializer>(v: &DVec3, serializer: S) -> Result<S::Ok, S::Error> {
        Repr {
            x: v.x,
            y: v.y,
            z: v.z,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DVec3, D::Error> {
        let r = Repr::deserialize(deserializer)?;
        Ok(DVec3::new(r.x, r.y, r.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_object_defaults() {
        let obj = WorldObject::new(ObjectType::Shape, DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(obj.scale, DVec3::ONE);
        assert!(obj.is_pickable);
        assert!(!obj.is_locked);
        assert_eq!(obj.layer(), DEFAULT_LAYER);
        assert_eq!(obj.created_at, obj.updated_at);
    }

    #[test]
    fn test_json_layout_is_camel_case() {
        let obj = WorldObject::new(ObjectType::Sticky, DVec3::new(1.0, -2.0, 0.5)).with_content("hi");
        let json = serde_json::to_value(&obj).unwrap();

        assert_eq!(json["type"], "sticky");
        assert_eq!(json["position"]["x"], 1.0);
        assert_eq!(json["position"]["y"], -2.0);
        assert_eq!(json["position"]["z"], 0.5);
        assert_eq!(json["isPickable"], true);
        assert_eq!(json["isBBoxHidden"], false);
        assert_eq!(json["content"], "hi");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let json = r#"{
            "id": "6f1c2c44-7f5e-4c8c-9d55-3c3c8f1b2a10",
            "type": "clock",
            "position": {"x": 0, "y": 0, "z": 0.5},
            "createdAt": 1,
            "updatedAt": 2
        }"#;
        let obj: WorldObject = serde_json::from_str(json).unwrap();

        assert_eq!(obj.object_type, ObjectType::Clock);
        assert_eq!(obj.scale, DVec3::ONE);
        assert!(obj.is_pickable);
        assert_eq!(obj.style, ObjectStyle::default());
    }

    #[test]
    fn test_apply_patch() {
        let mut obj = WorldObject::new(ObjectType::Shape, DVec3::ZERO);
        assert!(!obj.apply(ObjectPatch::default()));

        assert!(obj.apply(ObjectPatch::pose(DVec3::new(2.0, 2.0, 0.0), DVec3::new(3.0, 3.0, 1.0))));
        assert_eq!(obj.position, DVec3::new(2.0, 2.0, 0.0));
        assert_eq!(obj.scale, DVec3::new(3.0, 3.0, 1.0));
    }

    #[test]
    fn test_touch_is_monotonic() {
        let mut obj = WorldObject::new(ObjectType::Shape, DVec3::ZERO);
        obj.updated_at = u64::MAX - 10;
        let before = obj.updated_at;
        obj.touch();
        assert!(obj.updated_at > before);
    }

    #[test]
    fn test_duplicate_gets_new_id() {
        let obj = WorldObject::new(ObjectType::Shape, DVec3::ZERO).with_content("a");
        let copy = obj.duplicate();
        assert_ne!(copy.id, obj.id);
        assert_eq!(copy.content, obj.content);
    }
}
