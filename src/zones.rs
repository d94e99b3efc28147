//! Radial zone classification
//!
//! Zones are bands of normalized distance (`[min, max]`, inclusive). They may
//! overlap; classification returns the first zone in declaration order that
//! contains the distance, so order in the config is significant.

use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

use crate::config::ZoneSpec;

/// Validated radial zone
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub min: f64,
    pub max: f64,
    pub color: Option<String>,
}

impl Zone {
    /// Inclusive on both ends
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.min && distance <= self.max
    }
}

/// Why a configured zone was skipped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneWarning {
    #[error("zone #{index} has no id")]
    MissingId { index: usize },

    #[error("zone '{id}' is missing its min/max bounds")]
    MissingBounds { index: usize, id: String },

    #[error("zone '{id}' has non-finite bounds")]
    NonFinite { index: usize, id: String },

    #[error("zone '{id}' has min {min} greater than max {max}")]
    Inverted { index: usize, id: String, min: f64, max: f64 },

    #[error("zone '{id}' duplicates an earlier zone id")]
    DuplicateId { index: usize, id: String },
}

/// Ordered set of valid zones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    /// Build a zone set from config entries, skipping invalid ones.
    ///
    /// Bounds are clamped to [0, 1] before the ordering check. Every skipped
    /// entry is logged and returned so hosts can surface it.
    pub fn from_specs(specs: &[ZoneSpec]) -> (Self, Vec<ZoneWarning>) {
        let mut zones = Vec::with_capacity(specs.len());
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for (index, spec) in specs.iter().enumerate() {
            match validate_spec(index, spec, &seen) {
                Ok(zone) => {
                    seen.insert(zone.id.clone());
                    zones.push(zone);
                }
                Err(warning) => {
                    warn!("Invalid zone configuration skipped: {}", warning);
                    warnings.push(warning);
                }
            }
        }

        (Self { zones }, warnings)
    }

    /// First zone containing `distance`, in declaration order
    pub fn classify(&self, distance: f64) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.contains(distance))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

fn validate_spec(index: usize, spec: &ZoneSpec, seen: &HashSet<String>) -> Result<Zone, ZoneWarning> {
    let id = match spec.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(ZoneWarning::MissingId { index }),
    };

    let (Some(min), Some(max)) = (spec.min, spec.max) else {
        return Err(ZoneWarning::MissingBounds { index, id });
    };

    if !min.is_finite() || !max.is_finite() {
        return Err(ZoneWarning::NonFinite { index, id });
    }

    let min = min.clamp(0.0, 1.0);
    let max = max.clamp(0.0, 1.0);
    if min > max {
        return Err(ZoneWarning::Inverted { index, id, min, max });
    }

    if seen.contains(&id) {
        return Err(ZoneWarning::DuplicateId { index, id });
    }

    Ok(Zone {
        id,
        min,
        max,
        color: spec.color.clone(),
    })
}

/// Classify `distance` against an ordered zone slice.
///
/// Returns the id of the first zone whose inclusive interval contains the
/// distance, or `None` when nothing matches.
pub fn classify(distance: f64, zones: &[Zone]) -> Option<&str> {
    zones
        .iter()
        .find(|zone| zone.contains(distance))
        .map(|zone| zone.id.as_str())
}

/// Remembers the active zone and reports transitions
#[derive(Debug, Clone, Default)]
pub struct ZoneTracker {
    current: Option<String>,
}

impl ZoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest classification; true when it differs from the last
    /// one (including transitions to and from no zone).
    pub fn update(&mut self, zone: Option<&str>) -> bool {
        if self.current.as_deref() == zone {
            return false;
        }
        self.current = zone.map(str::to_string);
        true
    }

    /// Forget the active zone without reporting a transition
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}
