//! Configuration types for playback sessions and the orbit camera.

use serde::{Deserialize, Serialize};

/// Hard zoom limits; configured limits must sit inside these.
pub const ZOOM_LIMITS: (f32, f32) = (0.3, 3.0);

fn default_light_direction() -> [f32; 3] {
    [0.5, 0.7, 1.0]
}

fn default_distance_factor() -> f32 {
    2.0
}

/// Top-level session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Orbit camera parameters.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Direction toward the light, handed to the renderer (normalized on use).
    #[serde(default = "default_light_direction")]
    pub light_direction: [f32; 3],
    /// Eye distance as a multiple of the largest grid dimension.
    #[serde(default = "default_distance_factor")]
    pub camera_distance_factor: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            light_direction: default_light_direction(),
            camera_distance_factor: default_distance_factor(),
        }
    }
}

/// Orbit camera parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial pitch in radians.
    pub initial_rotation_x: f32,
    /// Initial yaw in radians.
    pub initial_rotation_y: f32,
    pub initial_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Radians per pixel of drag.
    pub drag_sensitivity: f32,
    /// Zoom change per wheel unit.
    pub zoom_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_rotation_x: 0.5,
            initial_rotation_y: 0.6,
            initial_zoom: 1.0,
            min_zoom: ZOOM_LIMITS.0,
            max_zoom: ZOOM_LIMITS.1,
            drag_sensitivity: 0.01,
            zoom_sensitivity: 0.001,
        }
    }
}

impl CameraConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = ZOOM_LIMITS;
        if !(self.min_zoom >= lo && self.max_zoom <= hi && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::InvalidZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if !self.drag_sensitivity.is_finite() || !self.zoom_sensitivity.is_finite() {
            return Err(ConfigError::InvalidSensitivity);
        }
        Ok(())
    }
}

impl SessionConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()?;
        let [x, y, z] = self.light_direction;
        if !(x.is_finite() && y.is_finite() && z.is_finite()) || x * x + y * y + z * z == 0.0 {
            return Err(ConfigError::InvalidLightDirection);
        }
        if !(self.camera_distance_factor > 0.0) {
            return Err(ConfigError::InvalidCameraDistance);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Zoom range [{min}, {max}] must lie within [0.3, 3.0]")]
    InvalidZoomRange { min: f32, max: f32 },
    #[error("Camera sensitivities must be finite")]
    InvalidSensitivity,
    #[error("Light direction must be a finite non-zero vector")]
    InvalidLightDirection,
    #[error("Camera distance factor must be positive")]
    InvalidCameraDistance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zoom_range_outside_limits() {
        let config = CameraConfig {
            max_zoom: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidZoomRange { .. })
        ));
    }

    #[test]
    fn test_zero_light_rejected() {
        let config = SessionConfig {
            light_direction: [0.0, 0.0, 0.0],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLightDirection)
        ));
    }

    #[test]
    fn test_partial_json() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"camera": {"drag_sensitivity": 0.02}}"#).unwrap();
        assert_eq!(config.camera.drag_sensitivity, 0.02);
        assert_eq!(config.camera.max_zoom, 3.0);
        assert_eq!(config.camera_distance_factor, 2.0);
    }
}
