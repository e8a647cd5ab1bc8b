#![forbid(unsafe_code)]

//! Reorder configuration as data.
//!
//! Groups the tunables of the gesture tracker, the layout animator and the
//! coordinator into one [`ReorderConfig`] that can be loaded from TOML or
//! JSON at startup.
//!
//! ```toml
//! item_height = 56.0
//!
//! [gesture]
//! activation_button = "primary"
//! cancel_on_leave_without_capture = true
//!
//! [motion]
//! stiffness = 240.0
//! damping = 31.0
//! drag_scale = 1.03
//! ```
//!
//! ```rust,ignore
//! let config = ReorderConfig::from_toml_file("dragsort.toml")?;
//! ```
//!
//! Omitted fields take their defaults, so an empty document is the default
//! configuration.

#[cfg(feature = "config")]
use std::path::Path;

use dragsort_core::gesture::GestureConfig;
use dragsort_core::layout::MotionConfig;

/// Default row height in pixels.
pub const DEFAULT_ITEM_HEIGHT: f64 = 48.0;

/// Configuration for a [`ReorderCoordinator`](crate::ReorderCoordinator).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ReorderConfig {
    /// Fixed row height in pixels.
    pub item_height: f64,
    pub gesture: GestureConfig,
    pub motion: MotionConfig,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            item_height: DEFAULT_ITEM_HEIGHT,
            gesture: GestureConfig::default(),
            motion: MotionConfig::default(),
        }
    }
}

impl ReorderConfig {
    #[must_use]
    pub fn with_item_height(mut self, item_height: f64) -> Self {
        self.item_height = item_height;
        self
    }

    #[must_use]
    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load by extension: `.json` is JSON, anything else TOML. The result is
    /// validated.
    #[cfg(feature = "config")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        config.validated()
    }

    /// Serialize to pretty JSON.
    #[cfg(feature = "config")]
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(ConfigError::Json)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.item_height.is_finite() && self.item_height > 0.0) {
            errors.push(format!(
                "item_height must be finite and > 0, got {}",
                self.item_height
            ));
        }

        let motion = &self.motion;
        if !(motion.stiffness.is_finite() && motion.stiffness > 0.0) {
            errors.push(format!(
                "motion.stiffness must be finite and > 0, got {}",
                motion.stiffness
            ));
        }
        if !(motion.damping.is_finite() && motion.damping >= 0.0) {
            errors.push(format!(
                "motion.damping must be finite and >= 0, got {}",
                motion.damping
            ));
        }
        for (name, value) in [
            ("motion.offset_rest_threshold", motion.offset_rest_threshold),
            ("motion.scale_rest_threshold", motion.scale_rest_threshold),
        ] {
            if !(value.is_finite() && value > 0.0) {
                errors.push(format!("{name} must be finite and > 0, got {value}"));
            }
        }
        if !(motion.drag_scale.is_finite() && motion.drag_scale > 0.0) {
            errors.push(format!(
                "motion.drag_scale must be finite and > 0, got {}",
                motion.drag_scale
            ));
        }
        if !(motion.low_elevation.is_finite() && motion.high_elevation.is_finite()) {
            errors.push("motion elevations must be finite".into());
        } else if motion.low_elevation > motion.high_elevation {
            errors.push(format!(
                "motion.low_elevation ({}) must not exceed motion.high_elevation ({})",
                motion.low_elevation, motion.high_elevation
            ));
        }

        errors
    }

    /// `self` if valid, otherwise [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading or validating a [`ReorderConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse or encode error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(ReorderConfig::default().validate().is_empty());
    }

    #[test]
    fn default_motion_is_critically_damped() {
        let motion = ReorderConfig::default().motion;
        assert!((motion.damping - 2.0 * motion.stiffness.sqrt()).abs() < 1e-12);
        assert_eq!(motion.drag_scale, 1.02);
    }

    #[test]
    fn rejects_non_positive_height_and_stiffness() {
        let mut config = ReorderConfig::default().with_item_height(0.0);
        config.motion.stiffness = -1.0;
        let errors = config.validate();
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors[0].contains("item_height"));
        assert!(errors[1].contains("stiffness"));
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Validation(ref e)) if e.len() == 2
        ));
    }

    #[test]
    fn rejects_inverted_elevations() {
        let mut config = ReorderConfig::default();
        config.motion.low_elevation = 10.0;
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn nan_height_is_invalid() {
        let config = ReorderConfig::default().with_item_height(f64::NAN);
        assert_eq!(config.validate().len(), 1);
    }

    #[cfg(feature = "config")]
    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            ReorderConfig::from_toml_str("").unwrap(),
            ReorderConfig::default()
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            ReorderConfig::from_json_str(r#"{"item_height": 32.0, "motion": {"drag_scale": 1.1}}"#)
                .unwrap();
        assert_eq!(config.item_height, 32.0);
        assert_eq!(config.motion.drag_scale, 1.1);
        assert_eq!(config.motion.stiffness, MotionConfig::default().stiffness);
        assert_eq!(config.gesture, GestureConfig::default());
    }
}
