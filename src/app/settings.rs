//! Persistent sandbox settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::util::Result;

/// Sandbox settings that persist between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    // Window
    pub window_width: u32,
    pub window_height: u32,
    pub screen_width: u32,
    pub screen_height: u32,

    // Camera
    pub camera_fov: f64, // degrees, 1-179
    pub camera_near: f64,
    pub camera_far: f64,
    pub presence_altitude: f64,

    // Layers
    pub show_terrain: bool,
    pub show_atmosphere: bool,
    pub show_background: bool,
    pub show_graticule: bool,
    pub show_axes: bool,
    pub graticule_step: f64, // degrees
    pub axes_length: f64,
    pub background_color: [f64; 4],

    // Textures
    pub terrain_texture: Option<PathBuf>,
    pub atmosphere_texture: Option<PathBuf>,
    pub background_texture: Option<PathBuf>,

    // Playback
    pub target_fps: f64,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            screen_width: 1920,
            screen_height: 1080,
            camera_fov: 45.0,
            camera_near: 1.0e3,
            camera_far: 1.0e9,
            presence_altitude: 2.0e7,
            show_terrain: true,
            show_atmosphere: true,
            show_background: true,
            show_graticule: true,
            show_axes: false,
            graticule_step: 15.0,
            axes_length: 1.0e7,
            background_color: [0.02, 0.02, 0.05, 1.0],
            terrain_texture: None,
            atmosphere_texture: None,
            background_texture: None,
            target_fps: 60.0,
        }
    }
}

impl SandboxSettings {
    /// Settings file in the platform config dir
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("geopose-sandbox");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the config dir, falling back to defaults
    pub fn load() -> Self {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Save settings to the config dir
    pub fn save(&self) -> Result<()> {
        match Self::path() {
            Some(path) => self.save_to(&path),
            None => {
                warn!("no config directory, settings not saved");
                Ok(())
            }
        }
    }

    /// Read and repair settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&text)?;
        settings.validate();
        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    /// Reset out-of-range values to their defaults. Returns the names of repaired fields.
    pub fn validate(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut repaired = Vec::new();

        if self.window_width == 0 || self.window_height == 0 {
            self.window_width = defaults.window_width;
            self.window_height = defaults.window_height;
            repaired.push("window size");
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            self.screen_width = defaults.screen_width;
            self.screen_height = defaults.screen_height;
            repaired.push("screen size");
        }
        if !(1.0..=179.0).contains(&self.camera_fov) {
            self.camera_fov = defaults.camera_fov;
            repaired.push("camera_fov");
        }
        if !(self.camera_near > 0.0 && self.camera_far > self.camera_near) {
            self.camera_near = defaults.camera_near;
            self.camera_far = defaults.camera_far;
            repaired.push("camera clip planes");
        }
        if !self.presence_altitude.is_finite() {
            self.presence_altitude = defaults.presence_altitude;
            repaired.push("presence_altitude");
        }
        if !(1.0..=90.0).contains(&self.graticule_step) {
            self.graticule_step = defaults.graticule_step;
            repaired.push("graticule_step");
        }
        if !(self.axes_length > 0.0) {
            self.axes_length = defaults.axes_length;
            repaired.push("axes_length");
        }
        if self.background_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            self.background_color = defaults.background_color;
            repaired.push("background_color");
        }
        if !(self.target_fps > 0.0) {
            self.target_fps = defaults.target_fps;
            repaired.push("target_fps");
        }

        for field in &repaired {
            warn!(field, "setting out of range, reset to default");
        }
        repaired
    }

    /// Fixed time step for headless runs.
    pub fn frame_step(&self) -> f64 {
        1.0 / self.target_fps
    }

    pub fn aspect(&self) -> f64 {
        self.window_width as f64 / self.window_height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: SandboxSettings = serde_json::from_str(r#"{"camera_fov": 60.0}"#).unwrap();
        assert_eq!(settings.camera_fov, 60.0);
        assert_eq!(settings.window_width, 1280);
        assert!(settings.show_graticule);
    }

    #[test]
    fn test_validate_repairs_bad_values() {
        let mut settings = SandboxSettings {
            camera_fov: 0.0,
            camera_near: 10.0,
            camera_far: 5.0,
            graticule_step: 120.0,
            ..SandboxSettings::default()
        };
        let repaired = settings.validate();
        assert_eq!(repaired, vec!["camera_fov", "camera clip planes", "graticule_step"]);
        assert_eq!(settings, SandboxSettings::default());
        assert!(SandboxSettings::default().validate().is_empty());
    }
}
