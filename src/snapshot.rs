//! Stick state snapshot handed to consumers

use serde::Serialize;

use crate::geometry::{StickVector, Vec2};

/// Complete output state of one update
///
/// Consumers always receive copies; mutating one never affects the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Snapshot {
    /// Pixel displacement of the handle from the anchor
    pub position: Vec2,
    /// Displacement normalized to [-1, 1] per axis
    pub delta: Vec2,
    /// Direction in radians, (-π, π]
    pub angle: f64,
    /// Normalized magnitude after clamp and dead-zone
    pub distance: f64,
    /// Active zone id
    pub zone: Option<String>,
    /// Whether a pointer is currently engaged
    pub pressed: bool,
}

impl Snapshot {
    /// Centered stick with no zone
    pub fn neutral(pressed: bool) -> Self {
        Self {
            pressed,
            ..Self::default()
        }
    }

    /// True for the centered, zone-less output (ignores `pressed`)
    pub fn is_neutral(&self) -> bool {
        self.position == Vec2::ZERO
            && self.delta == Vec2::ZERO
            && self.angle == 0.0
            && self.distance == 0.0
            && self.zone.is_none()
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    pub(crate) fn apply_vector(&mut self, vector: &StickVector) {
        self.position = vector.position;
        self.delta = vector.delta;
        self.angle = vector.angle;
        self.distance = vector.distance;
    }
}
