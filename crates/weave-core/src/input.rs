//! Pointer and keyboard input as delivered by the rendering host.
//!
//! The host ray-casts against its scene graph and hands the core a world-space ray
//! plus what it hit. The core never touches the scene graph itself.

use crate::object::ObjectId;
use glam::DVec3;
use kurbo::Point;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Rays closer to parallel than this never meet a plane.
const PARALLEL_EPSILON: f64 = 1e-9;

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Shift locks a drag to its dominant axis.
    pub fn axis_lock(&self) -> bool {
        self.shift
    }

    /// Ctrl or Cmd keeps the aspect ratio during a corner resize.
    pub fn aspect_lock(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A world-space pointer ray.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    #[serde(with = "crate::object::vec3")]
    pub origin: DVec3,
    #[serde(with = "crate::object::vec3")]
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Ray looking straight down the -z axis through `(x, y)`.
    pub fn looking_down(x: f64, y: f64) -> Self {
        Self::new(DVec3::new(x, y, 10.0), DVec3::NEG_Z)
    }

    /// Intersection with the plane `z = plane_z` (normal +z).
    ///
    /// `None` when the ray is parallel to the plane or the plane lies behind it.
    pub fn intersect_z_plane(&self, plane_z: f64) -> Option<DVec3> {
        let denom = self.direction.z;
        if denom.abs() < PARALLEL_EPSILON || !denom.is_finite() {
            return None;
        }
        let t = (plane_z - self.origin.z) / denom;
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        let mut hit = self.origin + self.direction * t;
        hit.z = plane_z;
        Some(hit)
    }
}

/// Identifies one pointer: the mouse, a pen or a touch contact.
pub type PointerId = i32;

/// What the host's ray-cast hit first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum PointerTarget {
    /// Nothing pickable under the pointer.
    Empty,
    /// The body of an object.
    Body(ObjectId),
    /// One of the eight resize handles of an object, indexed 0..8.
    Handle(ObjectId, usize),
}

/// Data shared by every pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    pub pointer_id: PointerId,
    pub ray: Ray,
    /// Screen position in CSS pixels, used only for double-click detection.
    pub screen: Point,
    pub modifiers: Modifiers,
    pub target: PointerTarget,
}

impl PointerInput {
    /// Mouse input with a straight-down ray at world `(x, y)`.
    pub fn at(x: f64, y: f64, target: PointerTarget) -> Self {
        Self {
            pointer_id: 1,
            ray: Ray::looking_down(x, y),
            screen: Point::new(x, y),
            modifiers: Modifiers::NONE,
            target,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Pointer event from the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerEvent {
    Down(PointerInput),
    Move(PointerInput),
    Up(PointerInput),
    /// The platform cancelled the gesture.
    Cancel { pointer_id: PointerId },
    /// Pointer capture was taken away.
    LostCapture { pointer_id: PointerId },
}

impl PointerEvent {
    pub fn pointer_id(&self) -> PointerId {
        match self {
            PointerEvent::Down(i)
            | PointerEvent::Move(i)
            | PointerEvent::Up(i) => i.pointer_id,
            PointerEvent::Cancel { pointer_id } | PointerEvent::LostCapture { pointer_id } => {
                *pointer_id
            }
        }
    }
}

/// Keyboard event from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    /// DOM-style key name: "Delete", "Escape", " ", "a", ...
    pub key: String,
    pub pressed: bool,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Focus is inside a text field; destructive shortcuts are suppressed.
    #[serde(default)]
    pub in_text_input: bool,
}

impl KeyEvent {
    pub fn pressed(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pressed: true,
            modifiers: Modifiers::NONE,
            in_text_input: false,
        }
    }

    pub fn released(key: impl Into<String>) -> Self {
        Self {
            pressed: false,
            ..Self::pressed(key)
        }
    }

    pub fn in_text_input(mut self) -> Self {
        self.in_text_input = true;
        self
    }
}

/// Turns two quick presses on the same target into a double-click.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last: Option<(Instant, Point, PointerTarget)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. Returns true if it completes a double-click.
    pub fn press(&mut self, screen: Point, target: PointerTarget) -> bool {
        self.press_at(Instant::now(), screen, target)
    }

    pub fn press_at(&mut self, now: Instant, screen: Point, target: PointerTarget) -> bool {
        if let Some((time, pos, last_target)) = self.last {
            let elapsed = now.saturating_duration_since(time).as_millis();
            if elapsed < DOUBLE_CLICK_TIME_MS
                && pos.distance(screen) < DOUBLE_CLICK_DISTANCE
                && last_target == target
            {
                // Reset so a triple-click is not a second double-click.
                self.last = None;
                return true;
            }
        }
        self.last = Some((now, screen, target));
        false
    }
}
