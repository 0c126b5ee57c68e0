//! # Pipeline Configuration
//!
//! Configuration for the frame pipeline: how long the producer may wait for a
//! submission window, which backend to create at startup, the output
//! resolution and the depth convention used to order translucent draws.
//!
//! All values are read once by [`FramePipeline::create`](crate::render::FramePipeline::create)
//! and never consulted again on the per-frame path.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use crate::config::{Config, ConfigError};

/// Which backend implementation to construct at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Records every command in memory, used by tests and tools
    ///
    /// The log is never trimmed, so it grows with every frame rendered.
    Headless,
    /// Discards commands after logging them at trace level
    #[default]
    Null,
}

/// Direction the camera looks along in camera space
///
/// Decides which end of the camera-space Z axis is "far" when translucent
/// draws are ordered back-to-front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraForward {
    /// Right-handed convention: the camera looks down -Z, farther is more negative
    #[default]
    NegativeZ,
    /// Left-handed convention: the camera looks down +Z, farther is larger
    PositiveZ,
}

/// Output resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Resolution {
    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self { width: 512, height: 512 }
    }
}

/// # Pipeline Configuration
///
/// Settings consumed once at startup by the frame pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Longest time the producer waits for a submission window, in milliseconds
    pub submission_timeout_ms: u64,
    /// Output resolution
    pub resolution: Resolution,
    /// Backend implementation to create
    pub backend: BackendKind,
    /// Camera-space forward axis used by the translucent depth sort
    pub camera_forward: CameraForward,
    /// Entries reserved up front in each draw list
    pub initial_draw_capacity: usize,
    /// Clear color a snapshot holds until one is submitted [R, G, B, A]
    pub default_background_color: [f32; 4],
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl PipelineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            submission_timeout_ms: 1000,
            resolution: Resolution::default(),
            backend: BackendKind::default(),
            camera_forward: CameraForward::default(),
            initial_draw_capacity: 64,
            default_background_color: [0.0, 0.0, 0.0, 1.0],
            log_filter: "info".to_string(),
        }
    }

    /// Set the producer wait timeout
    pub fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the output resolution
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Resolution { width, height };
        self
    }

    /// Select the backend implementation
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Select the camera-space forward axis
    pub fn with_camera_forward(mut self, camera_forward: CameraForward) -> Self {
        self.camera_forward = camera_forward;
        self
    }

    /// Set how many entries each draw list reserves up front
    pub fn with_initial_draw_capacity(mut self, capacity: usize) -> Self {
        self.initial_draw_capacity = capacity;
        self
    }

    /// Set the clear color used before any color is submitted
    pub fn with_default_background_color(mut self, color: [f32; 4]) -> Self {
        self.default_background_color = color;
        self
    }

    /// Set the fallback log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Producer wait timeout as a [`Duration`]
    pub const fn submission_timeout(&self) -> Duration {
        Duration::from_millis(self.submission_timeout_ms)
    }

    /// Check that the configuration can drive a pipeline
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.submission_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "submission_timeout_ms",
                reason: "a zero timeout can never observe the swap".to_string(),
            });
        }
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(ConfigError::Invalid {
                field: "resolution",
                reason: format!("{}x{} has no pixels", self.resolution.width, self.resolution.height),
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for PipelineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.submission_timeout(), Duration::from_millis(1000));
        assert_eq!(config.camera_forward, CameraForward::NegativeZ);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = PipelineConfig::new().with_submission_timeout(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "submission_timeout_ms", .. })
        ));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let config = PipelineConfig::new().with_resolution(0, 720);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_backend_keeps_no_command_log() {
        assert_eq!(PipelineConfig::default().backend, BackendKind::Null);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            submission_timeout_ms = 250
            backend = "headless"
            camera_forward = "positive_z"
            "#,
        )
        .unwrap();

        assert_eq!(config.submission_timeout_ms, 250);
        assert_eq!(config.backend, BackendKind::Headless);
        assert_eq!(config.camera_forward, CameraForward::PositiveZ);
        assert_eq!(config.resolution, Resolution::default());
    }

    #[test]
    fn test_ron_file_round_trip() {
        let path = std::env::temp_dir().join(format!("frame_pipeline_config_{}.ron", std::process::id()));
        let config = PipelineConfig::new()
            .with_resolution(1280, 720)
            .with_default_background_color([0.1, 0.2, 0.3, 1.0]);

        config.save_to_file(&path).unwrap();
        let loaded = PipelineConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let result = PipelineConfig::load_from_file("pipeline.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
