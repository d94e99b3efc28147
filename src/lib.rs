//! Virtual stick engine
//!
//! Turns mouse and touch drags on an on-screen control into a normalized 2-D
//! vector with direction, magnitude and radial zone, and streams it to
//! registered callbacks on drag start, on every change, at a fixed refresh
//! rate while engaged, and on release.

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod haptics;
pub mod paths;
pub mod pointer;
pub mod snapshot;
pub mod surface;
pub mod trace;
pub mod zones;

pub use config::{ConfigPatch, LockAxis, Shape, StickConfig, StickMode, ZoneSpec};
pub use engine::{Callbacks, Joystick, JoystickActor, JoystickHandle};
pub use error::StickError;
pub use geometry::{compute_vector, MapperParams, Rect, StickVector, Vec2};
pub use haptics::{CountingHaptics, Haptics, HapticError, NoHaptics};
pub use pointer::{PointerId, PointerInput, TouchPoint};
pub use snapshot::Snapshot;
pub use surface::{HeadlessSurface, Surface, SurfaceError};
