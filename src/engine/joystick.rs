//! Synchronous stick engine
//!
//! [`Joystick`] owns the configuration, the single interaction session and
//! the current snapshot. Every mutation goes through `&mut self`, so a host
//! either drives it directly from its event loop or hands it to
//! [`JoystickActor`](super::JoystickActor), which serializes input, option
//! updates and emission ticks on one task.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ConfigPatch, StickConfig, StickMode};
use crate::error::StickError;
use crate::geometry::{compute_vector, max_radius, MapperParams, Rect, Vec2};
use crate::haptics::{pulse_once, Haptics};
use crate::pointer::{EndReason, PointerId, PointerInput, PointerTracker, Transition};
use crate::snapshot::Snapshot;
use crate::surface::{Surface, SurfaceSpec, ZoneIndicator};
use crate::zones::{ZoneSet, ZoneTracker, ZoneWarning};

/// Consumer callback; receives a copy-on-read view of the snapshot
pub type SnapshotFn = Arc<dyn Fn(&Snapshot) + Send + Sync>;

/// Consumer callbacks
#[derive(Clone, Default)]
pub struct Callbacks {
    pub on_start: Option<SnapshotFn>,
    pub on_change: Option<SnapshotFn>,
    pub on_end: Option<SnapshotFn>,
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_start", &self.on_start.is_some())
            .field("on_change", &self.on_change.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

/// Pointer-to-vector engine
pub struct Joystick {
    pub(super) config: StickConfig,
    pub(super) zones: ZoneSet,
    zone_warnings: Vec<ZoneWarning>,
    pub(super) surface: Box<dyn Surface>,
    haptics: Box<dyn Haptics>,
    callbacks: Callbacks,
    pub(super) tracker: PointerTracker,
    pub(super) snapshot: Snapshot,
    zone_tracker: ZoneTracker,
    pub(super) layout: Rect,
    pub(super) max_radius: f64,
    destroyed: bool,
}

impl Joystick {
    /// Validate `config`, attach to the surface and derive the geometry.
    ///
    /// Fails before anything is attached when the config is invalid, and
    /// with a configuration error when the surface has no usable attach
    /// point. Invalid zones are skipped, not fatal.
    pub fn new(
        mut surface: Box<dyn Surface>,
        haptics: Box<dyn Haptics>,
        config: StickConfig,
    ) -> Result<Self, StickError> {
        config.validate().map_err(StickError::configuration)?;

        let (zones, zone_warnings) = ZoneSet::from_specs(&config.zones);

        surface
            .attach(&SurfaceSpec {
                width: config.width,
                height: config.height,
                handle_radius: config.handle_radius,
                shape: config.shape,
            })
            .map_err(StickError::configuration)?;

        let mut joystick = Self {
            config,
            zones,
            zone_warnings,
            surface,
            haptics,
            callbacks: Callbacks::default(),
            tracker: PointerTracker::new(),
            snapshot: Snapshot::default(),
            zone_tracker: ZoneTracker::new(),
            layout: Rect::default(),
            max_radius: 0.0,
            destroyed: false,
        };
        joystick.refresh_geometry();

        info!(
            "Stick attached ({}x{}, max radius {:.1}px, {} zones, {:?} mode)",
            joystick.layout.width,
            joystick.layout.height,
            joystick.max_radius,
            joystick.zones.len(),
            joystick.config.mode
        );

        Ok(joystick)
    }

    // =========================================================================
    // Callback registration
    // =========================================================================

    pub fn on_start(&mut self, f: impl Fn(&Snapshot) + Send + Sync + 'static) -> &mut Self {
        self.callbacks.on_start = Some(Arc::new(f));
        self
    }

    pub fn on_change(&mut self, f: impl Fn(&Snapshot) + Send + Sync + 'static) -> &mut Self {
        self.callbacks.on_change = Some(Arc::new(f));
        self
    }

    pub fn on_end(&mut self, f: impl Fn(&Snapshot) + Send + Sync + 'static) -> &mut Self {
        self.callbacks.on_end = Some(Arc::new(f));
        self
    }

    pub fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current snapshot, by value
    pub fn state(&self) -> Snapshot {
        self.snapshot.clone()
    }

    pub fn config(&self) -> &StickConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.tracker.is_active()
    }

    pub fn tracked_pointer(&self) -> Option<PointerId> {
        self.tracker.session().map(|s| s.pointer)
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    pub fn layout(&self) -> Rect {
        self.layout
    }

    /// Zones skipped by the last zone-set build
    pub fn zone_warnings(&self) -> &[ZoneWarning] {
        &self.zone_warnings
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Feed one host input event.
    ///
    /// Inputs for untracked pointers are dropped. Never fails.
    pub fn handle_input(&mut self, input: &PointerInput) {
        if self.destroyed {
            return;
        }

        match self.tracker.interpret(input) {
            Some(Transition::Press { pointer, position }) => self.press(pointer, position),
            Some(Transition::Move { position }) => self.move_to(position),
            Some(Transition::Release { pointer, reason }) => self.release(pointer, reason),
            None => {}
        }
    }

    fn press(&mut self, pointer: PointerId, position: Vec2) {
        let anchor = match self.config.mode {
            StickMode::Dynamic => {
                self.surface.relocate(position);
                self.layout = self.surface.layout();
                position
            }
            StickMode::Static => self.layout.center(),
        };

        if !self.tracker.begin(pointer, anchor, position) {
            return;
        }
        debug!(?pointer, x = anchor.x, y = anchor.y, "Stick pressed");

        self.snapshot.pressed = true;
        self.surface.set_pressed(true);
        self.update_position(position);
        self.emit_change();
        self.emit(self.callbacks.on_start.clone());
    }

    fn move_to(&mut self, position: Vec2) {
        self.tracker.record_position(position);
        self.update_position(position);
        self.emit_change();
    }

    fn release(&mut self, pointer: PointerId, reason: EndReason) {
        if self.tracker.end().is_none() {
            return;
        }
        debug!(?pointer, ?reason, "Stick released");

        self.snapshot.pressed = false;
        self.surface.set_pressed(false);

        if self.config.auto_center {
            self.reset_position();
        }

        self.emit(self.callbacks.on_end.clone());
    }

    /// Run the mapper for the tracked session and push the result to the
    /// snapshot, the surface and the zone tracker.
    pub(super) fn update_position(&mut self, position: Vec2) {
        let Some(session) = self.tracker.session() else {
            return;
        };

        let params = MapperParams::from_config(&self.config, self.max_radius);
        let vector = compute_vector(position, session.anchor, &params);

        self.snapshot.apply_vector(&vector);
        self.surface.move_handle(vector.position);
        self.update_zone();
    }

    fn update_zone(&mut self) {
        let zone = self.zones.classify(self.snapshot.distance).map(|z| z.id.as_str());
        if self.zone_tracker.update(zone) {
            debug!(zone = ?zone, "Zone changed");
            self.snapshot.zone = zone.map(str::to_string);
            pulse_once(self.haptics.as_mut(), self.config.vibration);
        }
    }

    // =========================================================================
    // Public operations
    // =========================================================================

    /// Emission-loop tick: re-broadcast the snapshot while a session is active
    pub fn tick(&mut self) {
        if !self.destroyed && self.tracker.is_active() {
            self.emit_change();
        }
    }

    /// Force the neutral snapshot and broadcast it once.
    ///
    /// The pressed flag and any active session are kept; the next move
    /// recomputes the vector.
    pub fn reset_position(&mut self) {
        if self.destroyed {
            return;
        }
        self.snapshot = Snapshot::neutral(self.snapshot.pressed);
        self.zone_tracker.clear();
        self.surface.move_handle(Vec2::ZERO);
        self.emit_change();
    }

    /// Apply one named option.
    ///
    /// Returns `Ok(false)` for unknown option names (nothing changes).
    pub fn set_option(&mut self, name: &str, value: serde_json::Value) -> Result<bool, StickError> {
        match ConfigPatch::from_option(name, value)? {
            Some(patch) => {
                self.update_config(patch)?;
                Ok(true)
            }
            None => {
                debug!("Ignoring unknown option '{}'", name);
                Ok(false)
            }
        }
    }

    /// Apply a partial config update, then rescale.
    ///
    /// The merged config is validated first; on error nothing changes.
    pub fn update_config(&mut self, patch: ConfigPatch) -> Result<(), StickError> {
        if self.destroyed {
            return Err(StickError::ActorClosed);
        }

        let next = self.config.apply(patch).map_err(StickError::configuration)?;

        if next.shape != self.config.shape {
            self.surface.set_shape(next.shape);
        }
        if next.zones != self.config.zones {
            let (zones, warnings) = ZoneSet::from_specs(&next.zones);
            self.zones = zones;
            self.zone_warnings = warnings;
        }

        self.config = next;
        self.rescale();
        Ok(())
    }

    /// Detach from the surface and drop all callbacks. Idempotent.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.tracker.end();
        self.callbacks = Callbacks::default();
        self.surface.detach();
        info!("Stick destroyed");
    }

    // =========================================================================
    // Emission
    // =========================================================================

    pub(super) fn emit_change(&self) {
        self.emit(self.callbacks.on_change.clone());
    }

    fn emit(&self, callback: Option<SnapshotFn>) {
        if let Some(callback) = callback {
            callback(&self.snapshot);
        }
    }

    pub(super) fn zone_indicators(&self) -> Vec<ZoneIndicator> {
        self.zones
            .iter()
            .map(|zone| ZoneIndicator {
                id: zone.id.clone(),
                inner_radius: zone.min * self.max_radius,
                outer_radius: zone.max * self.max_radius,
                color: zone.color.clone(),
            })
            .collect()
    }

    /// Re-read the layout and derive `max_radius` from it
    pub(super) fn refresh_geometry(&mut self) {
        self.layout = self.surface.layout();
        self.max_radius = max_radius(
            self.layout.width,
            self.layout.height,
            self.config.handle_radius,
        );
        let indicators = self.zone_indicators();
        self.surface.set_zones(&indicators);
    }
}

impl std::fmt::Debug for Joystick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Joystick")
            .field("config", &self.config)
            .field("state", self.tracker.state())
            .field("snapshot", &self.snapshot)
            .field("layout", &self.layout)
            .field("max_radius", &self.max_radius)
            .field("callbacks", &self.callbacks)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
