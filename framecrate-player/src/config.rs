//! Player configuration

use framecrate_core::{Error, LengthPolicy, Result, Rgb};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Render material handed to the scene backend together with a geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub shader: String,
    pub point_size: Option<f32>,
    pub line_width: Option<f32>,
    pub color: Rgb,
}

impl Material {
    /// Unlit points, as used for raw scans
    pub fn unlit_points(point_size: f32) -> Self {
        Self {
            shader: "defaultUnlit".to_string(),
            point_size: Some(point_size),
            line_width: None,
            color: [1.0, 1.0, 1.0],
        }
    }

    /// Unlit lines, as used for box outlines
    pub fn unlit_lines(line_width: f32, color: Rgb) -> Self {
        Self {
            shader: "unlitLine".to_string(),
            point_size: None,
            line_width: Some(line_width),
            color,
        }
    }
}

/// Configuration of a player window and its playback loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Sleep between two ticks of the playback thread
    pub tick_interval_ms: u64,
    /// Pending frame updates kept for the UI thread before the oldest is dropped
    pub queue_capacity: usize,
    pub length_policy: LengthPolicy,
    pub background: [f32; 4],
    pub point_material: Material,
    pub line_material: Material,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::single_camera()
    }
}

impl PlayerConfig {
    /// One camera next to the point cloud, one frame per second
    pub fn single_camera() -> Self {
        Self {
            window_title: "framecrate".to_string(),
            window_width: 1024,
            window_height: 768,
            tick_interval_ms: 1000,
            queue_capacity: 8,
            length_policy: LengthPolicy::Shortest,
            background: [0.0, 0.0, 0.0, 0.0],
            point_material: Material::unlit_points(1.0),
            line_material: Material::unlit_lines(2.0, [1.0, 1.0, 0.0]),
        }
    }

    /// Several wayside cameras at ten frames per second
    pub fn multi_wayside() -> Self {
        Self {
            window_title: "framecrate - wayside".to_string(),
            tick_interval_ms: 100,
            ..Self::single_camera()
        }
    }

    /// Load a configuration file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Error::InvalidData(format!("Invalid player configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidData("tick_interval_ms must be positive".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidData("queue_capacity must be positive".to_string()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
