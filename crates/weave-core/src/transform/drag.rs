//! Drag: move an object in its own z-plane, keeping the grab offset.

use glam::{DVec2, DVec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    /// Grab point minus object position at press time.
    offset: DVec2,
    initial_position: DVec3,
}

impl DragState {
    /// `hit` is where the press ray met the object's z-plane.
    pub fn begin(position: DVec3, hit: DVec3) -> Self {
        Self {
            offset: hit.truncate() - position.truncate(),
            initial_position: position,
        }
    }

    pub fn initial_position(&self) -> DVec3 {
        self.initial_position
    }

    /// Object position for a pointer now over `hit`.
    ///
    /// With `axis_lock` the axis with the smaller travel snaps back to its
    /// initial value.
    pub fn target(&self, hit: DVec3, axis_lock: bool) -> DVec3 {
        let mut candidate = hit.truncate() - self.offset;
        if axis_lock {
            let start = self.initial_position.truncate();
            let delta = (candidate - start).abs();
            if delta.x > delta.y {
                candidate.y = start.y;
            } else {
                candidate.x = start.x;
            }
        }
        candidate.extend(self.initial_position.z)
    }
}
