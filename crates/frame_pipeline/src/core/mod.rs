//! # Core Pipeline Module
//!
//! Shared configuration used by the rest of the crate.
//!
//! ## Organization
//!
//! - **Config**: startup configuration for the frame pipeline

pub mod config;

// Re-export commonly used config types
pub use config::{
    BackendKind,
    CameraForward,
    Config,
    ConfigError,
    PipelineConfig,
    Resolution,
};
