//! Configuration management for the virtual stick
//!
//! Handles loading, parsing, validation, partial updates and hot-reloading of
//! YAML stick configuration files.

pub mod watcher;

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::fs;

use crate::error::StickError;

pub use watcher::ConfigWatcher;

/// Stick configuration
///
/// Field names are snake_case in YAML; the camelCase spellings used by web
/// hosts (`handleRadius`, `autoCenter`, `lockAxis`, `refreshHz`) are accepted
/// as aliases.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct StickConfig {
    /// Surface width in pixels
    #[serde(default = "default_size")]
    pub width: f64,
    /// Surface height in pixels
    #[serde(default = "default_size")]
    pub height: f64,
    /// Handle radius in pixels
    #[serde(default = "default_handle_radius", alias = "handleRadius")]
    pub handle_radius: f64,
    /// Multiplier applied to the raw pointer offset
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Normalized radius below which output is forced to zero, in [0, 1)
    #[serde(default = "default_deadzone")]
    pub deadzone: f64,
    /// Clamp the handle to the travel radius
    #[serde(default)]
    pub boundaries: bool,
    /// Return to neutral when the pointer is released
    #[serde(default = "default_true", alias = "autoCenter")]
    pub auto_center: bool,
    /// Presentation-only base shape
    #[serde(default)]
    pub shape: Shape,
    /// Fixed surface or re-anchor on first contact
    #[serde(default)]
    pub mode: StickMode,
    /// Restrict output to one axis
    #[serde(
        default,
        alias = "lockAxis",
        deserialize_with = "deserialize_lock_axis"
    )]
    #[schemars(with = "LockAxis")]
    pub lock_axis: LockAxis,
    /// Radial zones, classified first-match in declaration order
    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
    /// Pulse haptics on zone changes
    #[serde(default = "default_true")]
    pub vibration: bool,
    /// Scale the surface to fit its container on rescale
    #[serde(default = "default_true")]
    pub responsive: bool,
    /// Emission loop cadence
    #[serde(default = "default_refresh_hz", alias = "refreshHz")]
    pub refresh_hz: u32,
}

/// Base shape of the control surface
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Circle,
    Square,
}

/// Interaction mode
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StickMode {
    /// Surface fixed in place; anchor is its center
    #[default]
    Static,
    /// Surface re-anchors to the first contact point
    Dynamic,
}

/// Axis lock
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LockAxis {
    #[default]
    None,
    /// Horizontal only (vertical component forced to zero)
    X,
    /// Vertical only (horizontal component forced to zero)
    Y,
}

/// Zone as written in the config file
///
/// Every field is optional here so that one malformed zone does not reject
/// the whole file; incomplete zones are skipped with a warning when the zone
/// set is built.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct ZoneSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Non-numeric bounds read as absent so the zone is skipped, not the file
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_zone_bound"
    )]
    #[schemars(with = "Option<f64>")]
    pub min: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_zone_bound"
    )]
    #[schemars(with = "Option<f64>")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ZoneSpec {
    pub fn new(id: &str, min: f64, max: f64) -> Self {
        Self {
            id: Some(id.to_string()),
            min: Some(min),
            max: Some(max),
            color: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }
}

/// Partial configuration update
///
/// Absent fields keep their current value. Applied with
/// [`StickConfig::apply`], which validates the merged result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadzone: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundaries: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_center: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<StickMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_axis: Option<LockAxis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<ZoneSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_hz: Option<u32>,
}

/// Option names accepted by `set_option`, mapped to their config field
const OPTION_NAMES: &[(&str, &str)] = &[
    ("width", "width"),
    ("height", "height"),
    ("handleRadius", "handle_radius"),
    ("handle_radius", "handle_radius"),
    ("sensitivity", "sensitivity"),
    ("deadzone", "deadzone"),
    ("boundaries", "boundaries"),
    ("autoCenter", "auto_center"),
    ("auto_center", "auto_center"),
    ("shape", "shape"),
    ("mode", "mode"),
    ("lockAxis", "lock_axis"),
    ("lock_axis", "lock_axis"),
    ("zones", "zones"),
    ("vibration", "vibration"),
    ("responsive", "responsive"),
    ("refreshHz", "refresh_hz"),
    ("refresh_hz", "refresh_hz"),
];

/// Resolve a host-facing option name to its config field
pub fn canonical_option_name(name: &str) -> Option<&'static str> {
    OPTION_NAMES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, field)| *field)
}

impl ConfigPatch {
    /// Build a single-field patch from a named option.
    ///
    /// Returns `Ok(None)` for unknown option names and a configuration error
    /// when the value has the wrong type for a known option. A `null` lock
    /// axis means "no lock".
    pub fn from_option(name: &str, value: Value) -> Result<Option<Self>, StickError> {
        let Some(field) = canonical_option_name(name) else {
            return Ok(None);
        };

        let value = if field == "lock_axis" && value.is_null() {
            Value::String("none".to_string())
        } else {
            value
        };

        let mut map = serde_json::Map::new();
        map.insert(field.to_string(), value);

        serde_json::from_value(Value::Object(map))
            .map(Some)
            .map_err(|e| StickError::Configuration(format!("invalid value for option '{}': {}", name, e)))
    }

    pub fn is_empty(&self) -> bool {
        *self == ConfigPatch::default()
    }
}

impl From<StickConfig> for ConfigPatch {
    /// Full replacement patch (used when a reloaded file replaces the config)
    fn from(config: StickConfig) -> Self {
        Self {
            width: Some(config.width),
            height: Some(config.height),
            handle_radius: Some(config.handle_radius),
            sensitivity: Some(config.sensitivity),
            deadzone: Some(config.deadzone),
            boundaries: Some(config.boundaries),
            auto_center: Some(config.auto_center),
            shape: Some(config.shape),
            mode: Some(config.mode),
            lock_axis: Some(config.lock_axis),
            zones: Some(config.zones),
            vibration: Some(config.vibration),
            responsive: Some(config.responsive),
            refresh_hz: Some(config.refresh_hz),
        }
    }
}

impl Default for StickConfig {
    fn default() -> Self {
        Self {
            width: default_size(),
            height: default_size(),
            handle_radius: default_handle_radius(),
            sensitivity: default_sensitivity(),
            deadzone: default_deadzone(),
            boundaries: false,
            auto_center: true,
            shape: Shape::default(),
            mode: StickMode::default(),
            lock_axis: LockAxis::default(),
            zones: Vec::new(),
            vibration: true,
            responsive: true,
            refresh_hz: default_refresh_hz(),
        }
    }
}

impl StickConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: StickConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate numeric ranges
    ///
    /// Zones are not validated here: invalid zones are skipped individually
    /// when the zone set is built.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!("{} must be a positive number (got {})", name, value);
            }
        }

        if !self.handle_radius.is_finite() || self.handle_radius < 0.0 {
            anyhow::bail!(
                "handle_radius must be zero or positive (got {})",
                self.handle_radius
            );
        }

        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            anyhow::bail!(
                "sensitivity must be a positive number (got {})",
                self.sensitivity
            );
        }

        if !(0.0..1.0).contains(&self.deadzone) {
            anyhow::bail!("deadzone must be in [0, 1) (got {})", self.deadzone);
        }

        if !(1..=1000).contains(&self.refresh_hz) {
            anyhow::bail!("refresh_hz must be in 1..=1000 (got {})", self.refresh_hz);
        }

        Ok(())
    }

    /// Merge a patch over this config and validate the result.
    ///
    /// The receiver is left untouched; callers commit the returned value.
    pub fn apply(&self, patch: ConfigPatch) -> Result<Self> {
        let mut next = self.clone();

        if let Some(v) = patch.width {
            next.width = v;
        }
        if let Some(v) = patch.height {
            next.height = v;
        }
        if let Some(v) = patch.handle_radius {
            next.handle_radius = v;
        }
        if let Some(v) = patch.sensitivity {
            next.sensitivity = v;
        }
        if let Some(v) = patch.deadzone {
            next.deadzone = v;
        }
        if let Some(v) = patch.boundaries {
            next.boundaries = v;
        }
        if let Some(v) = patch.auto_center {
            next.auto_center = v;
        }
        if let Some(v) = patch.shape {
            next.shape = v;
        }
        if let Some(v) = patch.mode {
            next.mode = v;
        }
        if let Some(v) = patch.lock_axis {
            next.lock_axis = v;
        }
        if let Some(v) = patch.zones {
            next.zones = v;
        }
        if let Some(v) = patch.vibration {
            next.vibration = v;
        }
        if let Some(v) = patch.responsive {
            next.responsive = v;
        }
        if let Some(v) = patch.refresh_hz {
            next.refresh_hz = v;
        }

        next.validate().context("Rejected configuration update")?;
        Ok(next)
    }
}

fn deserialize_lock_axis<'de, D>(deserializer: D) -> std::result::Result<LockAxis, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LockAxis>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_zone_bound<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_f64()))
}

// Default value functions
fn default_size() -> f64 { 100.0 }
fn default_handle_radius() -> f64 { 20.0 }
fn default_sensitivity() -> f64 { 1.0 }
fn default_deadzone() -> f64 { 0.1 }
fn default_true() -> bool { true }
fn default_refresh_hz() -> u32 { 60 }
