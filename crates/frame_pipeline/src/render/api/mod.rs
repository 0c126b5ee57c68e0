//! Public rendering API
//!
//! This module contains the backend-facing half of the public API: the
//! render backend trait and the parameters used to initialize it.

pub mod render_backend;
pub mod initialization;

// Re-export commonly used types
pub use render_backend::{
    BackendResult, ConstantBufferId, ConstantBufferKind, RenderBackend, SamplerStateId, ShaderStages,
};
pub use initialization::InitializationParameters;
