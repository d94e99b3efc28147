//! Resize / rescale handling
//!
//! Size changes re-derive the geometry constants in place. An active session
//! survives: its last raw pointer position is pushed through the mapper again
//! with the new geometry instead of snapping the stick back to center.

use tracing::debug;

use super::Joystick;

impl Joystick {
    /// Scale factor that fits the configured surface into its container.
    ///
    /// 1.0 when responsive scaling is off or the container is unusable.
    pub fn responsive_scale(&self) -> f64 {
        if !self.config.responsive {
            return 1.0;
        }

        let container = self.surface.container();
        if !container.is_usable() {
            return 1.0;
        }

        let scale = (container.width / self.config.width).min(container.height / self.config.height);
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    /// Recompute layout-dependent geometry after a resize, orientation
    /// change, option update or explicit host request.
    ///
    /// Idempotent: with no intervening change, a second call yields the same
    /// layout, radius and snapshot.
    pub fn rescale(&mut self) {
        if self.is_destroyed() {
            return;
        }

        let scale = self.responsive_scale();
        self.surface.resize(
            self.config.width * scale,
            self.config.height * scale,
            self.config.handle_radius * scale,
        );
        self.refresh_geometry();

        debug!(
            scale,
            width = self.layout.width,
            height = self.layout.height,
            max_radius = self.max_radius,
            "Stick rescaled"
        );

        match self.tracker.session().map(|s| s.last_position) {
            Some(last_position) => {
                self.tracker.set_anchor(self.layout.center());
                self.update_position(last_position);
                self.emit_change();
            }
            None => {
                if self.config.auto_center && !self.snapshot.is_neutral() {
                    self.reset_position();
                }
            }
        }
    }
}
