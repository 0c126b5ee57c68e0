//! Recording backend
//!
//! Executes nothing on a GPU. Every successful call is appended to an
//! in-memory command log, and constant buffer contents are kept so the last
//! upload can be inspected. Tests assert on the log; tools use it to dump what
//! a frame would have drawn. The log is never trimmed on its own; long runs
//! drain it with [`HeadlessBackend::take_commands`] or use the null backend.

use crate::core::config::Resolution;
use crate::render::api::{
    BackendResult, ConstantBufferId, ConstantBufferKind, InitializationParameters, RenderBackend, SamplerStateId,
    ShaderStages,
};
use crate::render::resources::{Effect, Mesh, Sprite, Texture};
use crate::render::RenderError;
use slotmap::SlotMap;

/// Backend entry point a command was recorded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`RenderBackend::initialize_context`]
    InitializeContext,
    /// [`RenderBackend::initialize_views`]
    InitializeViews,
    /// [`RenderBackend::create_constant_buffer`]
    CreateConstantBuffer,
    /// [`RenderBackend::bind_constant_buffer`]
    BindConstantBuffer,
    /// [`RenderBackend::update_constant_buffer`]
    UpdateConstantBuffer,
    /// [`RenderBackend::destroy_constant_buffer`]
    DestroyConstantBuffer,
    /// [`RenderBackend::create_sampler_state`]
    CreateSamplerState,
    /// [`RenderBackend::bind_sampler_state`]
    BindSamplerState,
    /// [`RenderBackend::destroy_sampler_state`]
    DestroySamplerState,
    /// [`RenderBackend::clear`]
    Clear,
    /// [`RenderBackend::bind_effect`]
    BindEffect,
    /// [`RenderBackend::bind_texture`]
    BindTexture,
    /// [`RenderBackend::draw_mesh`]
    DrawMesh,
    /// [`RenderBackend::draw_sprite`]
    DrawSprite,
    /// [`RenderBackend::present`]
    Present,
    /// [`RenderBackend::cleanup`]
    Cleanup,
}

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// Context created
    InitializeContext {
        /// Requested resolution
        resolution: Resolution,
        /// Whether a platform window was supplied
        windowed: bool,
    },
    /// Views created
    InitializeViews(Resolution),
    /// Constant buffer created
    CreateConstantBuffer {
        /// Buffer slot
        kind: ConstantBufferKind,
        /// Size in bytes
        size: usize,
    },
    /// Constant buffer bound
    BindConstantBuffer {
        /// Buffer slot
        kind: ConstantBufferKind,
        /// Stages it was bound to
        stages: ShaderStages,
    },
    /// Constant buffer contents replaced
    UpdateConstantBuffer {
        /// Buffer slot
        kind: ConstantBufferKind,
        /// New contents
        data: Vec<u8>,
    },
    /// Constant buffer destroyed
    DestroyConstantBuffer(ConstantBufferKind),
    /// Sampler state created
    CreateSamplerState,
    /// Sampler state bound
    BindSamplerState,
    /// Sampler state destroyed
    DestroySamplerState,
    /// Render target cleared [R, G, B, A]
    Clear([f32; 4]),
    /// Effect bound, by label
    BindEffect(String),
    /// Texture bound, by label
    BindTexture {
        /// Texture label
        label: String,
        /// Texture slot
        slot: u32,
    },
    /// Mesh drawn, by label
    DrawMesh(String),
    /// Sprite drawn, by label
    DrawSprite(String),
    /// Back buffer presented
    Present,
    /// Views and context released
    Cleanup,
}

impl RecordedCommand {
    /// Entry point this command came from
    pub const fn operation(&self) -> Operation {
        match self {
            Self::InitializeContext { .. } => Operation::InitializeContext,
            Self::InitializeViews(_) => Operation::InitializeViews,
            Self::CreateConstantBuffer { .. } => Operation::CreateConstantBuffer,
            Self::BindConstantBuffer { .. } => Operation::BindConstantBuffer,
            Self::UpdateConstantBuffer { .. } => Operation::UpdateConstantBuffer,
            Self::DestroyConstantBuffer(_) => Operation::DestroyConstantBuffer,
            Self::CreateSamplerState => Operation::CreateSamplerState,
            Self::BindSamplerState => Operation::BindSamplerState,
            Self::DestroySamplerState => Operation::DestroySamplerState,
            Self::Clear(_) => Operation::Clear,
            Self::BindEffect(_) => Operation::BindEffect,
            Self::BindTexture { .. } => Operation::BindTexture,
            Self::DrawMesh(_) => Operation::DrawMesh,
            Self::DrawSprite(_) => Operation::DrawSprite,
            Self::Present => Operation::Present,
            Self::Cleanup => Operation::Cleanup,
        }
    }
}

#[derive(Debug)]
struct ConstantBuffer {
    kind: ConstantBufferKind,
    contents: Vec<u8>,
}

/// Backend that records commands instead of executing them
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    commands: Vec<RecordedCommand>,
    constant_buffers: SlotMap<ConstantBufferId, ConstantBuffer>,
    sampler_states: SlotMap<SamplerStateId, ()>,
    resolution: Option<Resolution>,
    context_ready: bool,
    views_ready: bool,
    fail_at: Option<Operation>,
}

impl HeadlessBackend {
    /// Create an uninitialized recording backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose every call to `operation` fails with
    /// [`RenderError::BackendError`]
    pub fn failing_at(operation: Operation) -> Self {
        Self {
            fail_at: Some(operation),
            ..Self::default()
        }
    }

    /// Every command recorded so far, oldest first
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Drain the command log
    pub fn take_commands(&mut self) -> Vec<RecordedCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Current contents of the live constant buffer of `kind`
    pub fn constant_buffer_contents(&self, kind: ConstantBufferKind) -> Option<&[u8]> {
        self.constant_buffers
            .values()
            .find(|buffer| buffer.kind == kind)
            .map(|buffer| buffer.contents.as_slice())
    }

    /// Number of constant buffers not yet destroyed
    pub fn live_constant_buffers(&self) -> usize {
        self.constant_buffers.len()
    }

    /// Number of sampler states not yet destroyed
    pub fn live_sampler_states(&self) -> usize {
        self.sampler_states.len()
    }

    /// Whether the context exists
    pub const fn is_initialized(&self) -> bool {
        self.context_ready
    }

    /// Resolution the views were created at
    pub const fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    fn check(&self, operation: Operation) -> BackendResult<()> {
        if self.fail_at == Some(operation) {
            return Err(RenderError::BackendError(format!("injected failure in {:?}", operation)));
        }
        Ok(())
    }

    fn require_context(&self, operation: Operation) -> BackendResult<()> {
        self.check(operation)?;
        if self.context_ready {
            Ok(())
        } else {
            Err(RenderError::BackendError(format!("{:?} called before the context was initialized", operation)))
        }
    }

    fn require_views(&self, operation: Operation) -> BackendResult<()> {
        self.require_context(operation)?;
        if self.views_ready {
            Ok(())
        } else {
            Err(RenderError::BackendError(format!("{:?} called before the views were initialized", operation)))
        }
    }

    fn buffer_mut(&mut self, id: ConstantBufferId) -> BackendResult<&mut ConstantBuffer> {
        self.constant_buffers
            .get_mut(id)
            .ok_or_else(|| RenderError::BackendError(format!("unknown constant buffer {:?}", id)))
    }

    fn record(&mut self, command: RecordedCommand) {
        log::trace!("headless: {:?}", command.operation());
        self.commands.push(command);
    }
}

impl RenderBackend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn initialize_context(&mut self, parameters: &InitializationParameters) -> BackendResult<()> {
        self.check(Operation::InitializeContext)?;
        self.context_ready = true;
        self.record(RecordedCommand::InitializeContext {
            resolution: parameters.resolution,
            windowed: parameters.window.is_some(),
        });
        Ok(())
    }

    fn initialize_views(&mut self, resolution: Resolution) -> BackendResult<()> {
        self.require_context(Operation::InitializeViews)?;
        self.views_ready = true;
        self.resolution = Some(resolution);
        self.record(RecordedCommand::InitializeViews(resolution));
        Ok(())
    }

    fn create_constant_buffer(&mut self, kind: ConstantBufferKind, size: usize) -> BackendResult<ConstantBufferId> {
        self.require_context(Operation::CreateConstantBuffer)?;
        let id = self.constant_buffers.insert(ConstantBuffer {
            kind,
            contents: vec![0; size],
        });
        self.record(RecordedCommand::CreateConstantBuffer { kind, size });
        Ok(id)
    }

    fn bind_constant_buffer(&mut self, buffer: ConstantBufferId, stages: ShaderStages) -> BackendResult<()> {
        self.require_context(Operation::BindConstantBuffer)?;
        let kind = self.buffer_mut(buffer)?.kind;
        self.record(RecordedCommand::BindConstantBuffer { kind, stages });
        Ok(())
    }

    fn update_constant_buffer(&mut self, buffer: ConstantBufferId, data: &[u8]) -> BackendResult<()> {
        self.require_context(Operation::UpdateConstantBuffer)?;
        let target = self.buffer_mut(buffer)?;
        if target.contents.len() != data.len() {
            return Err(RenderError::BackendError(format!(
                "constant buffer {:?} holds {} bytes, got {}",
                target.kind,
                target.contents.len(),
                data.len()
            )));
        }
        target.contents.copy_from_slice(data);
        let kind = target.kind;
        self.record(RecordedCommand::UpdateConstantBuffer {
            kind,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn destroy_constant_buffer(&mut self, buffer: ConstantBufferId) -> BackendResult<()> {
        self.check(Operation::DestroyConstantBuffer)?;
        let removed = self
            .constant_buffers
            .remove(buffer)
            .ok_or_else(|| RenderError::BackendError(format!("unknown constant buffer {:?}", buffer)))?;
        self.record(RecordedCommand::DestroyConstantBuffer(removed.kind));
        Ok(())
    }

    fn create_sampler_state(&mut self) -> BackendResult<SamplerStateId> {
        self.require_context(Operation::CreateSamplerState)?;
        let id = self.sampler_states.insert(());
        self.record(RecordedCommand::CreateSamplerState);
        Ok(id)
    }

    fn bind_sampler_state(&mut self, sampler: SamplerStateId) -> BackendResult<()> {
        self.require_context(Operation::BindSamplerState)?;
        if !self.sampler_states.contains_key(sampler) {
            return Err(RenderError::BackendError(format!("unknown sampler state {:?}", sampler)));
        }
        self.record(RecordedCommand::BindSamplerState);
        Ok(())
    }

    fn destroy_sampler_state(&mut self, sampler: SamplerStateId) -> BackendResult<()> {
        self.check(Operation::DestroySamplerState)?;
        self.sampler_states
            .remove(sampler)
            .ok_or_else(|| RenderError::BackendError(format!("unknown sampler state {:?}", sampler)))?;
        self.record(RecordedCommand::DestroySamplerState);
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) -> BackendResult<()> {
        self.require_views(Operation::Clear)?;
        self.record(RecordedCommand::Clear(color));
        Ok(())
    }

    fn bind_effect(&mut self, effect: &dyn Effect) -> BackendResult<()> {
        self.require_views(Operation::BindEffect)?;
        self.record(RecordedCommand::BindEffect(effect.label().to_string()));
        Ok(())
    }

    fn bind_texture(&mut self, texture: &dyn Texture, slot: u32) -> BackendResult<()> {
        self.require_views(Operation::BindTexture)?;
        self.record(RecordedCommand::BindTexture {
            label: texture.label().to_string(),
            slot,
        });
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: &dyn Mesh) -> BackendResult<()> {
        self.require_views(Operation::DrawMesh)?;
        self.record(RecordedCommand::DrawMesh(mesh.label().to_string()));
        Ok(())
    }

    fn draw_sprite(&mut self, sprite: &dyn Sprite) -> BackendResult<()> {
        self.require_views(Operation::DrawSprite)?;
        self.record(RecordedCommand::DrawSprite(sprite.label().to_string()));
        Ok(())
    }

    fn present(&mut self) -> BackendResult<()> {
        self.require_views(Operation::Present)?;
        self.record(RecordedCommand::Present);
        Ok(())
    }

    fn cleanup(&mut self) -> BackendResult<()> {
        self.check(Operation::Cleanup)?;
        self.views_ready = false;
        self.context_ready = false;
        self.record(RecordedCommand::Cleanup);
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::resources::{MeshDesc, TextureDesc};

    fn ready() -> HeadlessBackend {
        let mut backend = HeadlessBackend::new();
        backend
            .initialize_context(&InitializationParameters::headless(Resolution::default()))
            .unwrap();
        backend.initialize_views(Resolution::default()).unwrap();
        backend
    }

    #[test]
    fn test_draws_are_recorded_in_order() {
        let mut backend = ready();
        backend.take_commands();

        backend.clear([0.1, 0.2, 0.3, 1.0]).unwrap();
        backend.bind_texture(&TextureDesc::new("brick", 8, 8), 0).unwrap();
        backend.draw_mesh(&MeshDesc::new("wall", 6)).unwrap();
        backend.present().unwrap();

        assert_eq!(
            backend.commands(),
            &[
                RecordedCommand::Clear([0.1, 0.2, 0.3, 1.0]),
                RecordedCommand::BindTexture {
                    label: "brick".to_string(),
                    slot: 0
                },
                RecordedCommand::DrawMesh("wall".to_string()),
                RecordedCommand::Present,
            ]
        );
    }

    #[test]
    fn test_constant_buffer_keeps_last_upload() {
        let mut backend = ready();
        let id = backend.create_constant_buffer(ConstantBufferKind::PerDraw, 4).unwrap();
        backend.update_constant_buffer(id, &[1, 2, 3, 4]).unwrap();
        assert_eq!(backend.constant_buffer_contents(ConstantBufferKind::PerDraw), Some(&[1, 2, 3, 4][..]));

        assert!(backend.update_constant_buffer(id, &[1, 2]).is_err());

        backend.destroy_constant_buffer(id).unwrap();
        assert_eq!(backend.live_constant_buffers(), 0);
        assert!(backend.destroy_constant_buffer(id).is_err());
    }

    #[test]
    fn test_drawing_before_views_fails() {
        let mut backend = HeadlessBackend::new();
        assert!(backend.clear([0.0; 4]).is_err());
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn test_injected_failure_is_not_recorded() {
        let mut backend = HeadlessBackend::failing_at(Operation::InitializeViews);
        backend
            .initialize_context(&InitializationParameters::headless(Resolution::default()))
            .unwrap();
        let error = backend.initialize_views(Resolution::default()).unwrap_err();
        assert!(matches!(error, RenderError::BackendError(_)));
        assert_eq!(backend.commands().len(), 1);
    }
}
