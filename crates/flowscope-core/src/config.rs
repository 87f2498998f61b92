//! Viewer configuration.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{FlowscopeError, Result};
use crate::scene::DEFAULT_BACKGROUND;

/// Whether a synthetic light rig is injected on every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DefaultLights {
    /// No synthetic lighting.
    None,
    /// Ambient, hemisphere and two point lights.
    #[default]
    Default,
}

impl FromStr for DefaultLights {
    type Err = FlowscopeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "default" => Ok(Self::Default),
            other => Err(FlowscopeError::InvalidConfig(format!(
                "unknown defaultLights value '{other}'"
            ))),
        }
    }
}

/// Key codes that force a controller state while held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackballKeys {
    pub rotate: String,
    pub zoom: String,
    pub pan: String,
}

impl Default for TrackballKeys {
    fn default() -> Self {
        Self {
            rotate: "KeyA".to_string(),
            zoom: "KeyS".to_string(),
            pan: "KeyD".to_string(),
        }
    }
}

/// Tunables of the trackball camera controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackballSettings {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,

    pub no_rotate: bool,
    pub no_zoom: bool,
    pub no_pan: bool,

    /// Apply input immediately instead of coasting with damping.
    pub static_moving: bool,
    pub dynamic_damping_factor: f32,

    pub min_distance: f32,
    /// `None` means unbounded.
    pub max_distance: Option<f32>,

    pub keys: TrackballKeys,
}

impl Default for TrackballSettings {
    fn default() -> Self {
        Self {
            rotate_speed: 1.5,
            zoom_speed: 1.2,
            pan_speed: 0.3,
            no_rotate: false,
            no_zoom: false,
            no_pan: false,
            static_moving: false,
            dynamic_damping_factor: 0.2,
            min_distance: 0.0,
            max_distance: None,
            keys: TrackballKeys::default(),
        }
    }
}

impl TrackballSettings {
    /// Upper distance bound as a float, infinite when unbounded.
    #[must_use]
    pub fn max_distance_or_infinity(&self) -> f32 {
        self.max_distance.unwrap_or(f32::INFINITY)
    }
}

/// Configuration of one viewer instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub default_lights: DefaultLights,
    pub background: Color,
    pub controls: TrackballSettings,
    /// Longest pointer-down to pointer-up interval still treated as a click.
    pub click_threshold_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_lights: DefaultLights::Default,
            background: Color::from_hex(DEFAULT_BACKGROUND),
            controls: TrackballSettings::default(),
            click_threshold_ms: 500,
        }
    }
}

impl ViewerConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            if e.is_data() {
                FlowscopeError::InvalidConfig(e.to_string())
            } else {
                FlowscopeError::JsonError(e)
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        let c = &self.controls;
        if c.min_distance < 0.0 {
            return Err(FlowscopeError::InvalidConfig(
                "minDistance must not be negative".into(),
            ));
        }
        if c.max_distance.is_some_and(|max| max < c.min_distance) {
            return Err(FlowscopeError::InvalidConfig(
                "maxDistance must not be below minDistance".into(),
            ));
        }
        if !(0.0..=1.0).contains(&c.dynamic_damping_factor) {
            return Err(FlowscopeError::InvalidConfig(
                "dynamicDampingFactor must lie in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.default_lights, DefaultLights::Default);
        assert_eq!(config.click_threshold_ms, 500);
        assert_eq!(config.background.to_hex(), 0x42_4242);
        assert!((config.controls.rotate_speed - 1.5).abs() < f32::EPSILON);
        assert!(config.controls.max_distance_or_infinity().is_infinite());
        assert_eq!(config.controls.keys.zoom, "KeyS");
    }

    #[test]
    fn test_parse_default_lights() {
        let config = ViewerConfig::from_json(r#"{"defaultLights": "none"}"#).unwrap();
        assert_eq!(config.default_lights, DefaultLights::None);
        assert_eq!("default".parse::<DefaultLights>().unwrap(), DefaultLights::Default);
    }

    #[test]
    fn test_unknown_default_lights_rejected() {
        let err = ViewerConfig::from_json(r#"{"defaultLights": "studio"}"#).unwrap_err();
        assert!(matches!(err, FlowscopeError::InvalidConfig(_)));
        assert!("studio".parse::<DefaultLights>().is_err());
    }

    #[test]
    fn test_partial_controls() {
        let config =
            ViewerConfig::from_json(r#"{"controls": {"staticMoving": true, "maxDistance": 50}}"#)
                .unwrap();
        assert!(config.controls.static_moving);
        assert_eq!(config.controls.max_distance, Some(50.0));
        assert!((config.controls.zoom_speed - 1.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(ViewerConfig::from_json(r#"{"controls": {"minDistance": -1}}"#).is_err());
        assert!(
            ViewerConfig::from_json(r#"{"controls": {"minDistance": 5, "maxDistance": 2}}"#)
                .is_err()
        );
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = ViewerConfig {
            default_lights: DefaultLights::None,
            ..ViewerConfig::default()
        };
        let parsed = ViewerConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
