//! Pointer-to-vector geometry
//!
//! Pure functions that turn an absolute pointer position into the stick
//! displacement reported to consumers. Nothing in here touches engine state,
//! so the same math drives live input, resize reprojection and the benches.
//!
//! # Pipeline
//!
//! 1. Offset from the anchor, scaled by sensitivity
//! 2. Axis lock (before the magnitude is taken)
//! 3. Polar form: magnitude and `atan2` angle
//! 4. Normalize against `max_radius`
//! 5. Boundary clamp in polar form (angle preserved)
//! 6. Hard dead-zone cutoff (no rescale of the remaining range)
//! 7. Per-axis delta clamped to [-1, 1]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::{LockAxis, StickConfig};

/// Floor for `max_radius` so normalization never divides by zero.
///
/// A handle larger than the surface would otherwise produce a zero or
/// negative travel radius.
pub const MIN_MAX_RADIUS: f64 = 1e-3;

/// 2D point or vector in surface pixels (or normalized units for deltas)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Axis-aligned rectangle in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered_at(center: Vec2, width: f64, height: f64) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// True when the rectangle can host a surface (finite, non-empty)
    pub fn is_usable(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Travel radius of the handle inside a surface of the given size.
///
/// `min(width, height) / 2 - handle_radius`, floored at [`MIN_MAX_RADIUS`].
pub fn max_radius(width: f64, height: f64, handle_radius: f64) -> f64 {
    let radius = width.min(height) / 2.0 - handle_radius;
    if radius.is_finite() && radius > MIN_MAX_RADIUS {
        radius
    } else {
        MIN_MAX_RADIUS
    }
}

/// Mapper inputs derived from the config and the current layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapperParams {
    pub sensitivity: f64,
    pub deadzone: f64,
    pub boundaries: bool,
    pub lock_axis: LockAxis,
    pub max_radius: f64,
}

impl MapperParams {
    pub fn from_config(config: &StickConfig, max_radius: f64) -> Self {
        Self {
            sensitivity: config.sensitivity,
            deadzone: config.deadzone,
            boundaries: config.boundaries,
            lock_axis: config.lock_axis,
            max_radius,
        }
    }
}

/// Output of [`compute_vector`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickVector {
    /// Pixel displacement after sensitivity, lock, clamp and dead-zone
    pub position: Vec2,
    /// Displacement normalized by `max_radius`, each axis in [-1, 1]
    pub delta: Vec2,
    /// `atan2(dy, dx)` of the (locked, unclamped) displacement, in (-π, π]
    pub angle: f64,
    /// Normalized magnitude after clamp and dead-zone
    pub distance: f64,
}

/// Map a client-space pointer position to a stick vector.
///
/// The angle is taken before the dead-zone, so a vector inside the dead-zone
/// still reports the direction of the raw displacement while its position,
/// delta and distance are zero.
pub fn compute_vector(client: Vec2, anchor: Vec2, params: &MapperParams) -> StickVector {
    let max_radius = params.max_radius.max(MIN_MAX_RADIUS);

    let mut dx = (client.x - anchor.x) * params.sensitivity;
    let mut dy = (client.y - anchor.y) * params.sensitivity;

    match params.lock_axis {
        LockAxis::X => dy = 0.0,
        LockAxis::Y => dx = 0.0,
        LockAxis::None => {}
    }

    let raw_distance = (dx * dx + dy * dy).sqrt();
    let angle = dy.atan2(dx);
    let mut distance = raw_distance / max_radius;

    if params.boundaries && distance > 1.0 {
        // Scale rather than rebuild from the angle so a locked axis stays exactly zero
        let k = max_radius / raw_distance;
        dx *= k;
        dy *= k;
        distance = 1.0;
    }

    if distance < params.deadzone {
        dx = 0.0;
        dy = 0.0;
        distance = 0.0;
    }

    StickVector {
        position: Vec2::new(dx, dy),
        delta: Vec2::new(
            (dx / max_radius).clamp(-1.0, 1.0),
            (dy / max_radius).clamp(-1.0, 1.0),
        ),
        angle,
        distance,
    }
}
