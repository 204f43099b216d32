//! Resize around a fixed anchor opposite the grabbed handle.
//!
//! The anchor is `position - direction * scale`. It never moves during the
//! resize, including when the pointer crosses it and the object flips to the
//! other side.

use super::handles::HandleKind;
use glam::{DVec2, DVec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeState {
    handle: HandleKind,
    direction: DVec2,
    fixed: DVec2,
    initial_position: DVec3,
    initial_scale: DVec3,
    /// `scale.x / scale.y` at press time.
    aspect: f64,
}

/// Position and scale produced by one resize step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeResult {
    pub position: DVec3,
    pub scale: DVec3,
}

impl ResizeState {
    pub fn begin(handle: HandleKind, position: DVec3, scale: DVec3) -> Self {
        let direction = handle.direction();
        Self {
            handle,
            direction,
            fixed: position.truncate() - direction * scale.truncate(),
            initial_position: position,
            initial_scale: scale,
            aspect: scale.x / scale.y,
        }
    }

    pub fn handle(&self) -> HandleKind {
        self.handle
    }

    /// The stationary anchor, on the object's z-plane.
    pub fn fixed_point(&self) -> DVec3 {
        self.fixed.extend(self.initial_position.z)
    }

    /// Pose for a pointer now over `hit`.
    ///
    /// `min_scale` is both the smallest distance from the anchor an active axis
    /// may shrink to and the smallest half-extent that can result.
    pub fn apply(&self, hit: DVec3, aspect_lock: bool, min_scale: f64) -> ResizeResult {
        let active = self.direction.cmpne(DVec2::ZERO);
        let raw = hit.truncate() - self.fixed;
        let sign = DVec2::new(
            sign_or(raw.x, self.direction.x),
            sign_or(raw.y, self.direction.y),
        );

        let mut size = raw.abs().max(DVec2::splat(min_scale));

        let aspect_ok = self.aspect.is_finite() && self.aspect > 0.0;
        if self.handle.is_corner() && aspect_lock && aspect_ok {
            if size.x / size.y > self.aspect {
                size.y = size.x / self.aspect;
            } else {
                size.x = size.y * self.aspect;
            }
            // Grow both together so the half-extent floor cannot skew the ratio.
            let floor = 2.0 * min_scale;
            let k = (floor / size.x).max(floor / size.y).max(1.0);
            size *= k;
        }

        let half = (size / 2.0).max(DVec2::splat(min_scale));
        let initial = self.initial_scale.truncate();
        let scale = DVec2::select(active, half, initial);
        let center = DVec2::select(active, self.fixed + sign * half, self.fixed);

        ResizeResult {
            position: center.extend(self.initial_position.z),
            scale: scale.extend(self.initial_scale.z),
        }
    }
}

/// Sign of `v`, or `fallback` when `v` is exactly zero.
fn sign_or(v: f64, fallback: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        fallback.signum()
    }
}
