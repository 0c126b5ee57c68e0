//! Startup parameters handed to the backend
//!
//! Consumed exactly once while the pipeline is created; nothing here is
//! touched on the per-frame path.

use crate::core::config::{PipelineConfig, Resolution};
use raw_window_handle::RawWindowHandle;

/// Parameters for backend context and view creation
#[derive(Debug, Clone, Copy)]
pub struct InitializationParameters {
    /// Output resolution
    pub resolution: Resolution,
    /// Platform window to render into, if any
    pub window: Option<RawWindowHandle>,
}

impl InitializationParameters {
    /// Parameters for rendering without a window
    pub const fn headless(resolution: Resolution) -> Self {
        Self {
            resolution,
            window: None,
        }
    }

    /// Parameters for rendering into a platform window
    pub const fn windowed(resolution: Resolution, window: RawWindowHandle) -> Self {
        Self {
            resolution,
            window: Some(window),
        }
    }

    /// Headless parameters at the configured resolution
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::headless(config.resolution)
    }
}
