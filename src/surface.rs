//! Presentation-layer boundary
//!
//! The engine never draws. It tells a [`Surface`] where the handle is, how
//! big the zone rings are and where the control sits, and asks it for the
//! on-screen rectangles it needs for the math.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::config::Shape;
use crate::geometry::{Rect, Vec2};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("no usable attach point for the control surface")]
    MissingAttachPoint,

    #[error("attach point rejected the control surface: {0}")]
    Rejected(String),
}

/// What the host must build on attach
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSpec {
    pub width: f64,
    pub height: f64,
    pub handle_radius: f64,
    pub shape: Shape,
}

/// Ring pair drawn for one zone, in pixels from the surface center
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneIndicator {
    pub id: String,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub color: Option<String>,
}

/// Host-side control surface
pub trait Surface: Send {
    /// Build the surface inside its attach point
    fn attach(&mut self, spec: &SurfaceSpec) -> Result<(), SurfaceError>;

    /// Current on-screen rectangle of the control surface
    fn layout(&self) -> Rect;

    /// Current on-screen rectangle of the attach point
    fn container(&self) -> Rect;

    /// Resize the surface and the handle
    fn resize(&mut self, width: f64, height: f64, handle_radius: f64);

    /// Move the surface so its center sits on `center` (dynamic mode)
    fn relocate(&mut self, center: Vec2);

    /// Offset the handle from the surface center
    fn move_handle(&mut self, offset: Vec2);

    /// Grab/grabbing feedback
    fn set_pressed(&mut self, pressed: bool);

    fn set_shape(&mut self, shape: Shape);

    /// Replace all zone indicators
    fn set_zones(&mut self, zones: &[ZoneIndicator]);

    /// Tear down everything built by `attach`
    fn detach(&mut self);
}

/// Observable state of a [`HeadlessSurface`]
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessState {
    pub container: Rect,
    pub attached: bool,
    pub width: f64,
    pub height: f64,
    pub handle_radius: f64,
    /// Set by `relocate`; the surface is centered in its container otherwise
    pub relocated_center: Option<Vec2>,
    pub handle_offset: Vec2,
    pub pressed: bool,
    pub shape: Shape,
    pub zones: Vec<ZoneIndicator>,
    pub detach_count: usize,
}

impl HeadlessState {
    fn layout(&self) -> Rect {
        let center = self.relocated_center.unwrap_or_else(|| self.container.center());
        Rect::centered_at(center, self.width, self.height)
    }
}

/// Surface without a display
///
/// Keeps layout and the last presentation commands in shared state so the
/// host (CLI, tests) can inspect them and simulate container resizes through
/// a [`HeadlessProbe`].
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    state: Arc<Mutex<HeadlessState>>,
}

/// Host-side view of a [`HeadlessSurface`]
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessSurface {
    /// Surface hosted in the given container rectangle
    pub fn new(container: Rect) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState {
                container,
                attached: false,
                width: 0.0,
                height: 0.0,
                handle_radius: 0.0,
                relocated_center: None,
                handle_offset: Vec2::ZERO,
                pressed: false,
                shape: Shape::default(),
                zones: Vec::new(),
                detach_count: 0,
            })),
        }
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: self.state.clone(),
        }
    }
}

impl HeadlessProbe {
    pub fn state(&self) -> HeadlessState {
        self.state.lock().clone()
    }

    /// Simulate the host resizing or rotating the container
    pub fn set_container(&self, container: Rect) {
        self.state.lock().container = container;
    }

    pub fn layout(&self) -> Rect {
        self.state.lock().layout()
    }
}

impl Surface for HeadlessSurface {
    fn attach(&mut self, spec: &SurfaceSpec) -> Result<(), SurfaceError> {
        let mut state = self.state.lock();
        if !state.container.is_usable() {
            return Err(SurfaceError::MissingAttachPoint);
        }
        if state.attached {
            return Err(SurfaceError::Rejected("surface is already attached".into()));
        }

        state.attached = true;
        state.width = spec.width;
        state.height = spec.height;
        state.handle_radius = spec.handle_radius;
        state.shape = spec.shape;
        state.relocated_center = None;
        state.handle_offset = Vec2::ZERO;
        Ok(())
    }

    fn layout(&self) -> Rect {
        self.state.lock().layout()
    }

    fn container(&self) -> Rect {
        self.state.lock().container
    }

    fn resize(&mut self, width: f64, height: f64, handle_radius: f64) {
        let mut state = self.state.lock();
        state.width = width;
        state.height = height;
        state.handle_radius = handle_radius;
    }

    fn relocate(&mut self, center: Vec2) {
        self.state.lock().relocated_center = Some(center);
    }

    fn move_handle(&mut self, offset: Vec2) {
        self.state.lock().handle_offset = offset;
    }

    fn set_pressed(&mut self, pressed: bool) {
        self.state.lock().pressed = pressed;
    }

    fn set_shape(&mut self, shape: Shape) {
        self.state.lock().shape = shape;
    }

    fn set_zones(&mut self, zones: &[ZoneIndicator]) {
        self.state.lock().zones = zones.to_vec();
    }

    fn detach(&mut self) {
        let mut state = self.state.lock();
        state.attached = false;
        state.zones.clear();
        state.detach_count += 1;
    }
}
