//! JSON render settings for repeatable jobs.
//!
//! A settings file captures everything about a render except the
//! payload, so the same style can be reapplied across runs. All fields
//! are optional in the JSON; missing ones take the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use qrcad_core::RenderConfig;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub module_size: f64,
    pub corner_radius: f64,
    /// Convenience style: when set and no explicit radius is given, the
    /// radius becomes a quarter of the module size.
    pub rounded: bool,
    pub border: u32,
    pub layer: String,
    pub ecc: String,
    pub eye_frame_radius: Option<f64>,
    pub eye_ball_radius: Option<f64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            module_size: 1.0,
            corner_radius: 0.0,
            rounded: false,
            border: 4,
            layer: "QR".to_string(),
            ecc: "medium".to_string(),
            eye_frame_radius: None,
            eye_ball_radius: None,
        }
    }
}

impl RenderSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let settings = serde_json::from_str(&fs::read_to_string(path)?)?;
        log::debug!("loaded render settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Resolve into the emitter config, applying the `rounded`
    /// convenience default.
    pub fn to_render_config(&self) -> RenderConfig {
        let mut corner_radius = self.corner_radius;
        if self.rounded && corner_radius <= 0.0 {
            corner_radius = self.module_size * 0.25;
        }
        RenderConfig {
            module_size: self.module_size,
            corner_radius,
            border: self.border,
            layer_name: self.layer.clone(),
            eye_frame_radius: self.eye_frame_radius,
            eye_ball_radius: self.eye_ball_radius,
        }
    }
}
