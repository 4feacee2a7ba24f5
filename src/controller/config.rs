//! Controller Settings
//!
//! Tuning constants for [`CharacterController`](super::CharacterController).
//! Every field has a default tuned for the paladin rig, so a config
//! file only needs the values it changes:
//!
//! ```rust,ignore
//! let config = ControllerConfig::from_json_str(r#"{ "max_dt": 0.1 }"#)?;
//! ```

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, StriderError};
use crate::fsm::locomotion::DEFAULT_CROSSFADE_DURATION;
use crate::input::KeyBindings;

/// Camera placement and projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(75.0, 20.0, 0.0),
            fov: 60.0,
            aspect: 1920.0 / 1080.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Per-axis acceleration. `z` drives forward/backward speed, `y` scales the turn rate.
    pub acceleration: Vec3,
    /// Per-axis damping factors; negative values pull velocity toward zero.
    pub deceleration: Vec3,
    /// Radians per second of turning at `acceleration.y == 1`.
    pub turn_rate: f32,
    pub crossfade_duration: f32,
    /// Squared distance the avatar must move in a frame for the camera to follow.
    pub camera_follow_threshold: f32,
    pub avatar_scale: f32,
    /// Upper bound applied to `dt` before integration. `None` keeps `dt` unclamped.
    pub max_dt: Option<f32>,
    pub camera: CameraConfig,
    pub key_bindings: KeyBindings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            acceleration: Vec3::new(1.0, 0.25, 50.0),
            deceleration: Vec3::new(-0.0005, -0.0001, -5.0),
            turn_rate: 4.0 * PI,
            crossfade_duration: DEFAULT_CROSSFADE_DURATION,
            camera_follow_threshold: 1e-4,
            avatar_scale: 0.1,
            max_dt: None,
            camera: CameraConfig::default(),
            key_bindings: KeyBindings::default(),
        }
    }
}

impl ControllerConfig {
    /// Parses a JSON document and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.acceleration.is_finite() || !self.deceleration.is_finite() {
            return Err(StriderError::Config(
                "acceleration and deceleration must be finite".to_string(),
            ));
        }
        if !self.turn_rate.is_finite() {
            return Err(StriderError::Config("turn_rate must be finite".to_string()));
        }
        if !(self.crossfade_duration.is_finite() && self.crossfade_duration > 0.0) {
            return Err(StriderError::Config(format!(
                "crossfade_duration must be positive, got {}",
                self.crossfade_duration
            )));
        }
        if !(self.camera_follow_threshold.is_finite() && self.camera_follow_threshold >= 0.0) {
            return Err(StriderError::Config(
                "camera_follow_threshold must be non-negative".to_string(),
            ));
        }
        if !(self.avatar_scale.is_finite() && self.avatar_scale > 0.0) {
            return Err(StriderError::Config("avatar_scale must be positive".to_string()));
        }
        if let Some(max_dt) = self.max_dt
            && !(max_dt.is_finite() && max_dt > 0.0)
        {
            return Err(StriderError::Config(format!("max_dt must be positive, got {max_dt}")));
        }

        let cam = &self.camera;
        if !cam.position.is_finite() {
            return Err(StriderError::Config("camera position must be finite".to_string()));
        }
        if !(cam.fov > 0.0 && cam.fov < 180.0) || !(cam.aspect > 0.0) {
            return Err(StriderError::Config(format!(
                "invalid camera projection (fov {}, aspect {})",
                cam.fov, cam.aspect
            )));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(StriderError::Config(format!(
                "camera clip planes must satisfy 0 < near < far (near {}, far {})",
                cam.near, cam.far
            )));
        }
        Ok(())
    }
}
