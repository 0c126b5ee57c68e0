//! Pipeline construction
//!
//! Startup runs in a fixed order: validate the configuration, create the
//! backend context, create and bind both constant buffers, create and bind the
//! sampler state, create the views. If any step fails, everything created by
//! the earlier steps is destroyed before the error is returned.

use super::api::{ConstantBufferKind, InitializationParameters, RenderBackend, ShaderStages};
use super::backends::create_backend;
use super::renderer::{BackendResources, FrameBuffers, Renderer};
use super::resources::LifetimeTracker;
use super::snapshot::{FrameSnapshot, PerDrawConstants, PerFrameConstants};
use super::submission::{SnapshotExchange, Submitter};
use super::{RenderError, RenderResult};
use crate::core::config::PipelineConfig;
use std::sync::Arc;

/// A freshly created producer/renderer pair
///
/// # Example
/// ```rust
/// use frame_pipeline::core::PipelineConfig;
/// use frame_pipeline::render::FramePipeline;
///
/// let FramePipeline { mut submitter, mut renderer } =
///     FramePipeline::from_config(&PipelineConfig::default()).unwrap();
///
/// let timeout = submitter.default_timeout();
/// let mut window = submitter.begin_submission(timeout).unwrap();
/// window.submit_background_color(0.1, 0.2, 0.3, 1.0).unwrap();
/// window.finish().unwrap();
///
/// let report = renderer.render_frame().unwrap();
/// assert_eq!(report.draw_count(), 0);
/// renderer.shutdown().unwrap();
/// ```
#[derive(Debug)]
pub struct FramePipeline {
    /// Producer half; move it to the simulation thread
    pub submitter: Submitter,
    /// Consumer half; keep it on the thread that owns the graphics context
    pub renderer: Renderer,
}

impl FramePipeline {
    /// Create a pipeline with the backend named in `config`
    pub fn from_config(config: &PipelineConfig) -> RenderResult<Self> {
        Self::create(config, create_backend(config.backend))
    }

    /// Create a headless pipeline driving `backend`
    pub fn create(config: &PipelineConfig, backend: Box<dyn RenderBackend>) -> RenderResult<Self> {
        Self::create_with_parameters(config, backend, &InitializationParameters::from_config(config))
    }

    /// Create a pipeline driving `backend` with explicit startup parameters
    ///
    /// # Errors
    /// [`RenderError::InitializationFailed`] if the configuration is invalid or
    /// any backend step fails.
    pub fn create_with_parameters(
        config: &PipelineConfig,
        mut backend: Box<dyn RenderBackend>,
        parameters: &InitializationParameters,
    ) -> RenderResult<Self> {
        config.validate()?;
        log::info!(
            "Creating frame pipeline: {} backend, {}x{}, submission timeout {:?}",
            backend.name(),
            parameters.resolution.width,
            parameters.resolution.height,
            config.submission_timeout()
        );

        let mut resources = BackendResources::default();
        let buffers = match initialize(backend.as_mut(), parameters, &mut resources) {
            Ok(buffers) => buffers,
            Err(error) => {
                log::error!("Frame pipeline startup failed: {}", error);
                if let Err(cleanup_error) = resources.release(backend.as_mut()) {
                    log::error!("Cleanup after failed startup also failed: {}", cleanup_error);
                }
                return Err(error);
            }
        };

        let new_snapshot = || {
            Box::new(FrameSnapshot::with_capacity(
                config.initial_draw_capacity,
                config.default_background_color,
            ))
        };
        let tracker = LifetimeTracker::new();
        let exchange = Arc::new(SnapshotExchange::new(new_snapshot()));

        let submitter = Submitter::new(Arc::clone(&exchange), tracker.clone(), config.submission_timeout());
        let renderer = Renderer::new(
            exchange,
            new_snapshot(),
            backend,
            resources,
            buffers,
            config.camera_forward,
            tracker,
        );

        log::info!("Frame pipeline ready");
        Ok(Self { submitter, renderer })
    }

    /// Split into the producer and renderer halves
    pub fn into_parts(self) -> (Submitter, Renderer) {
        (self.submitter, self.renderer)
    }
}

fn initialize(
    backend: &mut dyn RenderBackend,
    parameters: &InitializationParameters,
    created: &mut BackendResources,
) -> RenderResult<FrameBuffers> {
    let stages = ShaderStages::VERTEX | ShaderStages::FRAGMENT;

    backend
        .initialize_context(parameters)
        .map_err(|error| startup_step("context", error))?;
    created.context = true;

    let per_frame = backend
        .create_constant_buffer(ConstantBufferKind::PerFrame, std::mem::size_of::<PerFrameConstants>())
        .map_err(|error| startup_step("per-frame constant buffer", error))?;
    created.per_frame = Some(per_frame);
    backend
        .bind_constant_buffer(per_frame, stages)
        .map_err(|error| startup_step("per-frame constant buffer binding", error))?;

    let per_draw = backend
        .create_constant_buffer(ConstantBufferKind::PerDraw, std::mem::size_of::<PerDrawConstants>())
        .map_err(|error| startup_step("per-draw constant buffer", error))?;
    created.per_draw = Some(per_draw);
    backend
        .bind_constant_buffer(per_draw, stages)
        .map_err(|error| startup_step("per-draw constant buffer binding", error))?;

    let sampler = backend
        .create_sampler_state()
        .map_err(|error| startup_step("sampler state", error))?;
    created.sampler = Some(sampler);
    backend
        .bind_sampler_state(sampler)
        .map_err(|error| startup_step("sampler state binding", error))?;

    backend
        .initialize_views(parameters.resolution)
        .map_err(|error| startup_step("views", error))?;

    Ok(FrameBuffers { per_frame, per_draw })
}

fn startup_step(step: &str, error: RenderError) -> RenderError {
    match error {
        RenderError::InitializationFailed(_) => error,
        other => RenderError::InitializationFailed(format!("{}: {}", step, other)),
    }
}
