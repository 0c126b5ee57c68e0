//! Core primitive types for rendering
//!
//! Data the submission path turns into per-frame constants.

pub mod camera;

// Re-export commonly used types
pub use camera::{Camera, CameraTransforms};
