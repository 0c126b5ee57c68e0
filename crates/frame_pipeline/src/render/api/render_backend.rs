//! Backend abstraction traits for the rendering system
//!
//! This module defines the trait that rendering backends must implement
//! to provide a consistent interface for the render loop. A backend is picked
//! once at startup (see [`create_backend`](crate::render::backends::create_backend))
//! and the render loop never branches on its concrete type afterwards.

use super::initialization::InitializationParameters;
use crate::core::config::Resolution;
use crate::render::resources::{Effect, Mesh, Sprite, Texture};
use crate::render::RenderError;
use bitflags::bitflags;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

slotmap::new_key_type! {
    /// Handle to a constant buffer owned by a backend
    pub struct ConstantBufferId;

    /// Handle to a sampler state owned by a backend
    pub struct SamplerStateId;
}

bitflags! {
    /// Shader stages a constant buffer is visible to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u8 {
        /// Vertex shader stage
        const VERTEX = 1 << 0;
        /// Fragment shader stage
        const FRAGMENT = 1 << 1;
    }
}

/// Which per-frame slot a constant buffer serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantBufferKind {
    /// Camera and time data, uploaded once per frame
    PerFrame,
    /// Local-to-world transform, uploaded before every mesh draw
    PerDraw,
}

/// Main rendering backend trait
///
/// This trait abstracts over graphics APIs and exposes only what the render
/// loop needs: constant buffers, a sampler, a clearable/presentable view and
/// bind/draw entry points for submitted resources.
pub trait RenderBackend: Send {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Create the device/context for the given window and resolution
    fn initialize_context(&mut self, parameters: &InitializationParameters) -> BackendResult<()>;

    /// Create the render target and depth views
    fn initialize_views(&mut self, resolution: Resolution) -> BackendResult<()>;

    /// Create a constant buffer of `size` bytes
    fn create_constant_buffer(&mut self, kind: ConstantBufferKind, size: usize) -> BackendResult<ConstantBufferId>;

    /// Make a constant buffer visible to the given shader stages
    fn bind_constant_buffer(&mut self, buffer: ConstantBufferId, stages: ShaderStages) -> BackendResult<()>;

    /// Copy `data` into a constant buffer
    fn update_constant_buffer(&mut self, buffer: ConstantBufferId, data: &[u8]) -> BackendResult<()>;

    /// Destroy a constant buffer
    fn destroy_constant_buffer(&mut self, buffer: ConstantBufferId) -> BackendResult<()>;

    /// Create the sampler state used by every texture binding
    fn create_sampler_state(&mut self) -> BackendResult<SamplerStateId>;

    /// Bind a sampler state
    fn bind_sampler_state(&mut self, sampler: SamplerStateId) -> BackendResult<()>;

    /// Destroy a sampler state
    fn destroy_sampler_state(&mut self, sampler: SamplerStateId) -> BackendResult<()>;

    /// Clear the render target [R, G, B, A]
    fn clear(&mut self, color: [f32; 4]) -> BackendResult<()>;

    /// Bind an effect's shaders and render state
    fn bind_effect(&mut self, effect: &dyn Effect) -> BackendResult<()>;

    /// Bind a texture to a slot
    fn bind_texture(&mut self, texture: &dyn Texture, slot: u32) -> BackendResult<()>;

    /// Draw a mesh with whatever is currently bound
    fn draw_mesh(&mut self, mesh: &dyn Mesh) -> BackendResult<()>;

    /// Draw a screen-space sprite with whatever is currently bound
    fn draw_sprite(&mut self, sprite: &dyn Sprite) -> BackendResult<()>;

    /// Present the back buffer
    fn present(&mut self) -> BackendResult<()>;

    /// Release views and the context
    fn cleanup(&mut self) -> BackendResult<()>;

    /// Downcast to concrete backend type for inspection
    fn as_any(&self) -> &dyn std::any::Any;
}
