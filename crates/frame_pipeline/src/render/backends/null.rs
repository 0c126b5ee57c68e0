//! Backend that discards everything
//!
//! Handy for benchmarking the handoff without any recording overhead. Each
//! call is logged at trace level and otherwise ignored; only resource ids are
//! tracked so that destroying an unknown id is still reported.

use crate::core::config::Resolution;
use crate::render::api::{
    BackendResult, ConstantBufferId, ConstantBufferKind, InitializationParameters, RenderBackend, SamplerStateId,
    ShaderStages,
};
use crate::render::resources::{Effect, Mesh, Sprite, Texture};
use crate::render::RenderError;
use slotmap::SlotMap;

/// Backend that only logs
#[derive(Debug, Default)]
pub struct NullBackend {
    constant_buffers: SlotMap<ConstantBufferId, ConstantBufferKind>,
    sampler_states: SlotMap<SamplerStateId, ()>,
}

impl NullBackend {
    /// Create a null backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn initialize_context(&mut self, parameters: &InitializationParameters) -> BackendResult<()> {
        log::trace!("null: initialize context at {:?}", parameters.resolution);
        Ok(())
    }

    fn initialize_views(&mut self, resolution: Resolution) -> BackendResult<()> {
        log::trace!("null: initialize views at {}x{}", resolution.width, resolution.height);
        Ok(())
    }

    fn create_constant_buffer(&mut self, kind: ConstantBufferKind, size: usize) -> BackendResult<ConstantBufferId> {
        log::trace!("null: create {:?} constant buffer ({} bytes)", kind, size);
        Ok(self.constant_buffers.insert(kind))
    }

    fn bind_constant_buffer(&mut self, buffer: ConstantBufferId, stages: ShaderStages) -> BackendResult<()> {
        log::trace!("null: bind constant buffer {:?} to {:?}", buffer, stages);
        Ok(())
    }

    fn update_constant_buffer(&mut self, buffer: ConstantBufferId, data: &[u8]) -> BackendResult<()> {
        log::trace!("null: update constant buffer {:?} ({} bytes)", buffer, data.len());
        Ok(())
    }

    fn destroy_constant_buffer(&mut self, buffer: ConstantBufferId) -> BackendResult<()> {
        self.constant_buffers
            .remove(buffer)
            .map(|_| ())
            .ok_or_else(|| RenderError::BackendError(format!("unknown constant buffer {:?}", buffer)))
    }

    fn create_sampler_state(&mut self) -> BackendResult<SamplerStateId> {
        Ok(self.sampler_states.insert(()))
    }

    fn bind_sampler_state(&mut self, sampler: SamplerStateId) -> BackendResult<()> {
        log::trace!("null: bind sampler state {:?}", sampler);
        Ok(())
    }

    fn destroy_sampler_state(&mut self, sampler: SamplerStateId) -> BackendResult<()> {
        self.sampler_states
            .remove(sampler)
            .ok_or_else(|| RenderError::BackendError(format!("unknown sampler state {:?}", sampler)))
    }

    fn clear(&mut self, color: [f32; 4]) -> BackendResult<()> {
        log::trace!("null: clear {:?}", color);
        Ok(())
    }

    fn bind_effect(&mut self, effect: &dyn Effect) -> BackendResult<()> {
        log::trace!("null: bind effect {}", effect.label());
        Ok(())
    }

    fn bind_texture(&mut self, texture: &dyn Texture, slot: u32) -> BackendResult<()> {
        log::trace!("null: bind texture {} to slot {}", texture.label(), slot);
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: &dyn Mesh) -> BackendResult<()> {
        log::trace!("null: draw mesh {} ({} indices)", mesh.label(), mesh.index_count());
        Ok(())
    }

    fn draw_sprite(&mut self, sprite: &dyn Sprite) -> BackendResult<()> {
        log::trace!("null: draw sprite {}", sprite.label());
        Ok(())
    }

    fn present(&mut self) -> BackendResult<()> {
        log::trace!("null: present");
        Ok(())
    }

    fn cleanup(&mut self) -> BackendResult<()> {
        log::trace!("null: cleanup");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
