//! # Render Loop
//!
//! The consumer half of the pipeline. Each call to
//! [`Renderer::render_frame`] runs one iteration:
//!
//! 1. wait, without a bound, for the producer to finish a submission window
//! 2. swap the submit target and the render source, signal the swap
//! 3. clear with the submitted background color
//! 4. upload the per-frame constants
//! 5. draw the opaque list in submission order
//! 6. draw the translucent list back to front
//! 7. draw the sprite list in submission order
//! 8. present
//! 9. release every reference the render source holds
//!
//! A failure aborts the frame without running later steps and leaves the
//! renderer failed: every later [`Renderer::render_frame`] returns
//! [`RenderError::Usage`] and nothing is swapped again. References still held
//! by the abandoned frame are released by [`Renderer::shutdown`].

use super::api::{ConstantBufferId, RenderBackend, SamplerStateId};
use super::render_queue;
use super::resources::LifetimeTracker;
use super::snapshot::{FrameSnapshot, MeshDraw, PerDrawConstants};
use super::submission::SnapshotExchange;
use super::{report_fatal, RenderError, RenderResult};
use crate::core::config::CameraForward;
use crate::foundation::math::{self, Mat4};
use crate::foundation::time::Stopwatch;
use std::sync::Arc;
use std::time::Duration;

/// Texture slot every mesh and sprite texture is bound to
pub const TEXTURE_SLOT: u32 = 0;

/// Summary of one rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Frames rendered before this one
    pub frame_number: u64,
    /// Opaque mesh draws issued
    pub opaque_draws: usize,
    /// Translucent mesh draws issued
    pub translucent_draws: usize,
    /// Sprite draws issued
    pub sprite_draws: usize,
    /// Resource references released in step 9
    pub released_references: usize,
    /// Time from the swap to the end of the release step
    pub elapsed: Duration,
}

impl FrameReport {
    /// Total draws issued
    pub const fn draw_count(&self) -> usize {
        self.opaque_draws + self.translucent_draws + self.sprite_draws
    }
}

/// Backend objects created while the pipeline starts up
///
/// Each field is filled in as soon as its object exists, so a startup that
/// fails halfway knows exactly what to tear down.
#[derive(Debug, Default)]
pub(crate) struct BackendResources {
    pub(crate) context: bool,
    pub(crate) per_frame: Option<ConstantBufferId>,
    pub(crate) per_draw: Option<ConstantBufferId>,
    pub(crate) sampler: Option<SamplerStateId>,
}

impl BackendResources {
    /// Destroy everything that was created
    ///
    /// Every step runs even if an earlier one failed; the first failure is
    /// returned.
    pub(crate) fn release(&mut self, backend: &mut dyn RenderBackend) -> RenderResult<()> {
        let mut first_error = None;
        let mut keep_first = |result: RenderResult<()>| {
            if let Err(error) = result {
                log::error!("Cleanup step failed: {}", error);
                first_error.get_or_insert(error);
            }
        };

        if let Some(buffer) = self.per_frame.take() {
            keep_first(backend.destroy_constant_buffer(buffer));
        }
        if let Some(buffer) = self.per_draw.take() {
            keep_first(backend.destroy_constant_buffer(buffer));
        }
        if let Some(sampler) = self.sampler.take() {
            keep_first(backend.destroy_sampler_state(sampler));
        }
        if std::mem::take(&mut self.context) {
            keep_first(backend.cleanup());
        }

        first_error.map_or(Ok(()), Err)
    }
}

/// Constant buffer ids the render loop uploads to every frame
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameBuffers {
    pub(crate) per_frame: ConstantBufferId,
    pub(crate) per_draw: ConstantBufferId,
}

/// Consumer handle to a frame pipeline
///
/// Owns the backend and the render source. Meant to stay on the thread that
/// owns the graphics context.
pub struct Renderer {
    exchange: Arc<SnapshotExchange>,
    render_source: Box<FrameSnapshot>,
    backend: Box<dyn RenderBackend>,
    resources: BackendResources,
    buffers: FrameBuffers,
    camera_forward: CameraForward,
    tracker: LifetimeTracker,
    frame_number: u64,
    failed: bool,
    shut_down: bool,
}

impl Renderer {
    pub(crate) fn new(
        exchange: Arc<SnapshotExchange>,
        render_source: Box<FrameSnapshot>,
        backend: Box<dyn RenderBackend>,
        resources: BackendResources,
        buffers: FrameBuffers,
        camera_forward: CameraForward,
        tracker: LifetimeTracker,
    ) -> Self {
        Self {
            exchange,
            render_source,
            backend,
            resources,
            buffers,
            camera_forward,
            tracker,
            frame_number: 0,
            failed: false,
            shut_down: false,
        }
    }

    /// The backend, for inspection through [`RenderBackend::as_any`]
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Reference ledger shared with the submitter
    pub const fn lifetime_tracker(&self) -> &LifetimeTracker {
        &self.tracker
    }

    /// Frames rendered so far
    pub const fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Whether a frame has failed; the only remaining step is shutdown
    pub const fn is_failed(&self) -> bool {
        self.failed
    }

    /// Whether [`shutdown`](Self::shutdown) has run
    pub const fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Render the most recently submitted frame
    ///
    /// Blocks until the producer finishes a submission window.
    ///
    /// # Errors
    /// [`RenderError::Synchronization`] if the handshake fails, including when
    /// the pipeline has been shut down. Any backend failure aborts the frame
    /// and is returned as is. Both are fatal for the session.
    /// [`RenderError::Usage`] once the renderer has been shut down or a
    /// previous frame has failed.
    pub fn render_frame(&mut self) -> RenderResult<FrameReport> {
        if self.shut_down {
            return Err(RenderError::Usage("render_frame called after shutdown".to_string()));
        }
        if self.failed {
            return Err(RenderError::Usage(
                "render_frame called after a failed frame; shut the pipeline down".to_string(),
            ));
        }

        if let Err(error) = self.exchange.gate.wait_for_submission() {
            self.failed = true;
            report_fatal("waiting for a submitted frame", &error);
            return Err(error.into());
        }

        let stopwatch = Stopwatch::start_new();
        if !self.exchange.swap(&mut self.render_source) {
            self.failed = true;
            let error = RenderError::Usage("submission signaled without a parked snapshot".to_string());
            log::error!("{}", error);
            return Err(error);
        }
        if let Err(error) = self.exchange.gate.signal_swap_complete() {
            self.failed = true;
            report_fatal("signaling swap complete", &error);
            return Err(error.into());
        }
        log::debug!("Frame {} swapped in ({} draws)", self.frame_number, self.render_source.draw_count());

        let source = &mut *self.render_source;
        let drawn = draw_snapshot(self.backend.as_mut(), self.buffers, self.camera_forward, source);
        let (opaque_draws, translucent_draws, sprite_draws) = match drawn {
            Ok(counts) => counts,
            Err(error) => {
                self.failed = true;
                log::error!(
                    "Frame {} abandoned: {}. The application is probably in a bad state and should be exited",
                    self.frame_number,
                    error
                );
                return Err(error);
            }
        };

        let released_references = source.release_all();
        let report = FrameReport {
            frame_number: self.frame_number,
            opaque_draws,
            translucent_draws,
            sprite_draws,
            released_references,
            elapsed: stopwatch.elapsed(),
        };
        log::trace!("Frame {} rendered in {:?}", report.frame_number, report.elapsed);
        self.frame_number += 1;
        Ok(report)
    }

    /// Stop the pipeline and release everything it holds
    ///
    /// Closes both signals, so a producer blocked in
    /// [`begin_submission`](super::Submitter::begin_submission) wakes with a
    /// synchronization error. Then releases every queued draw in both
    /// snapshots and destroys the backend objects. Every step runs; the first
    /// failure is returned. Calling it again does nothing.
    pub fn shutdown(&mut self) -> RenderResult<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        self.exchange.gate.close();
        let released = self.render_source.release_all() + self.exchange.release_parked();
        let result = self.resources.release(self.backend.as_mut());

        log::info!(
            "Render pipeline shut down after {} frames; released {} references, {} still outstanding",
            self.frame_number,
            released,
            self.tracker.outstanding()
        );
        result
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(error) = self.shutdown() {
            log::error!("Render pipeline cleanup failed: {}", error);
        }
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("backend", &self.backend.name())
            .field("frame_number", &self.frame_number)
            .field("camera_forward", &self.camera_forward)
            .field("failed", &self.failed)
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

/// Steps 3 to 8 of the render loop; returns draws issued per list
fn draw_snapshot(
    backend: &mut dyn RenderBackend,
    buffers: FrameBuffers,
    camera_forward: CameraForward,
    source: &mut FrameSnapshot,
) -> RenderResult<(usize, usize, usize)> {
    backend.clear(source.background_color)?;
    backend.update_constant_buffer(buffers.per_frame, bytemuck::bytes_of(&source.per_frame))?;

    for draw in &source.opaque {
        draw_mesh(backend, buffers.per_draw, &mut source.per_draw, draw)?;
    }

    let world_to_camera = Mat4::from(source.per_frame.transform_world_to_camera);
    let order = render_queue::sort_back_to_front(&source.translucent, &world_to_camera, camera_forward);
    for index in order {
        draw_mesh(backend, buffers.per_draw, &mut source.per_draw, &source.translucent[index])?;
    }

    for draw in &source.sprites {
        backend.bind_effect(&*draw.effect)?;
        backend.bind_texture(&*draw.texture, TEXTURE_SLOT)?;
        backend.draw_sprite(&*draw.sprite)?;
    }

    backend.present()?;
    Ok((source.opaque.len(), source.translucent.len(), source.sprites.len()))
}

fn draw_mesh(
    backend: &mut dyn RenderBackend,
    per_draw_buffer: ConstantBufferId,
    scratch: &mut PerDrawConstants,
    draw: &MeshDraw,
) -> RenderResult<()> {
    scratch.transform_local_to_world = math::to_gpu(&math::local_to_world(&draw.pose.orientation, &draw.pose.position));
    backend.update_constant_buffer(per_draw_buffer, bytemuck::bytes_of(&*scratch))?;
    backend.bind_effect(&*draw.effect)?;
    backend.bind_texture(&*draw.texture, TEXTURE_SLOT)?;
    backend.draw_mesh(&*draw.mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{ConstantBufferKind, InitializationParameters};
    use crate::render::backends::{HeadlessBackend, Operation};

    #[test]
    fn test_release_runs_every_step_and_keeps_first_error() {
        let mut backend = HeadlessBackend::failing_at(Operation::DestroyConstantBuffer);
        backend
            .initialize_context(&InitializationParameters::headless(Default::default()))
            .unwrap();
        let mut resources = BackendResources {
            context: true,
            per_frame: Some(backend.create_constant_buffer(ConstantBufferKind::PerFrame, 16).unwrap()),
            per_draw: Some(backend.create_constant_buffer(ConstantBufferKind::PerDraw, 16).unwrap()),
            sampler: Some(backend.create_sampler_state().unwrap()),
        };

        let result = resources.release(&mut backend);
        assert!(matches!(result, Err(RenderError::BackendError(_))));
        assert_eq!(backend.live_sampler_states(), 0);
        assert!(!backend.is_initialized());

        // Nothing is left to release a second time
        assert!(resources.release(&mut backend).is_ok());
    }

    #[test]
    fn test_frame_report_totals() {
        let report = FrameReport {
            frame_number: 3,
            opaque_draws: 2,
            translucent_draws: 1,
            sprite_draws: 4,
            released_references: 21,
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.draw_count(), 7);
    }
}
