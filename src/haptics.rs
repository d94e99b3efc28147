//! Haptic feedback boundary
//!
//! The engine only ever asks for one short pulse per zone transition. Hosts
//! without a vibration device use [`NoHaptics`]; failures are reported back
//! as [`HapticError`] and swallowed by the engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace};

/// Length of the zone-change pulse
pub const HAPTIC_PULSE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HapticError {
    #[error("haptic feedback is not available on this host")]
    Unavailable,

    #[error("haptic feedback was denied: {0}")]
    Denied(String),
}

/// Host vibration capability
pub trait Haptics: Send {
    /// Capability check, consulted before every pulse
    fn is_available(&self) -> bool;

    /// Trigger a single pulse
    fn pulse(&mut self, duration: Duration) -> Result<(), HapticError>;
}

/// Host without a vibration device
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn is_available(&self) -> bool {
        false
    }

    fn pulse(&mut self, _duration: Duration) -> Result<(), HapticError> {
        Err(HapticError::Unavailable)
    }
}

/// Haptics that count pulses instead of driving hardware
///
/// Clones share the counter, so a host can keep one copy for reporting and
/// hand the other to the engine.
#[derive(Debug, Default, Clone)]
pub struct CountingHaptics {
    pulses: Arc<AtomicUsize>,
}

impl CountingHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> usize {
        self.pulses.load(Ordering::Relaxed)
    }
}

impl Haptics for CountingHaptics {
    fn is_available(&self) -> bool {
        true
    }

    fn pulse(&mut self, duration: Duration) -> Result<(), HapticError> {
        let count = self.pulses.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(?duration, count, "Haptic pulse");
        Ok(())
    }
}

/// Fire one pulse if enabled and available; errors never escape.
pub(crate) fn pulse_once(haptics: &mut dyn Haptics, enabled: bool) {
    if !enabled || !haptics.is_available() {
        return;
    }
    if let Err(e) = haptics.pulse(HAPTIC_PULSE) {
        debug!("Haptic pulse ignored: {}", e);
    }
}
