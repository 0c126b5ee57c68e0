//! Producer-side submission API
//!
//! The producer describes each frame through a [`SubmissionWindow`], which is
//! only handed out once the render thread has taken the previous frame. All
//! submit calls live on the window, so describing a frame outside its window
//! does not compile. [`SubmissionWindow::finish`] hands the frame over.
//!
//! ```text
//! let mut window = submitter.begin_submission(timeout)?;
//! window.submit_elapsed_time(system_time, simulation_time)?;
//! window.submit_camera(&camera)?;
//! window.submit_mesh_draw(&effect, &mesh, &texture, &body)?;
//! window.finish()?;
//! ```

use crate::concurrency::SyncGate;
use crate::physics::PoseSource;
use crate::render::primitives::Camera;
use crate::render::resources::{EffectHandle, LifetimeTracker, MeshHandle, SpriteHandle, TextureHandle};
use crate::render::snapshot::{FrameSnapshot, MeshDraw, SpriteDraw};
use crate::foundation::math;
use crate::render::{report_fatal, RenderError, RenderResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// The two-signal gate plus the slot the submit target is parked in
///
/// The slot is locked only for the instant a snapshot changes hands: when the
/// producer opens or closes a window and when the renderer swaps. Draw data is
/// written and read without holding it.
#[derive(Debug)]
pub(crate) struct SnapshotExchange {
    pub(crate) gate: SyncGate,
    slot: Mutex<Option<Box<FrameSnapshot>>>,
}

impl SnapshotExchange {
    pub(crate) fn new(submit_target: Box<FrameSnapshot>) -> Self {
        Self {
            gate: SyncGate::new(),
            slot: Mutex::new(Some(submit_target)),
        }
    }

    fn take(&self) -> Option<Box<FrameSnapshot>> {
        self.slot.lock().take()
    }

    /// Park a snapshot; once the gate is closed nothing will render it, so its
    /// entries are released on the way in
    fn give_back(&self, mut snapshot: Box<FrameSnapshot>) {
        let mut slot = self.slot.lock();
        if self.gate.is_closed() {
            let released = snapshot.release_all();
            log::debug!("Released {} references from a window closed after shutdown", released);
        }
        *slot = Some(snapshot);
    }

    /// Exchange the parked snapshot with `render_source`
    ///
    /// Returns `false` if no snapshot is parked.
    pub(crate) fn swap(&self, render_source: &mut Box<FrameSnapshot>) -> bool {
        match self.slot.lock().as_mut() {
            Some(submitted) => {
                std::mem::swap(submitted, render_source);
                true
            }
            None => false,
        }
    }

    /// Release every entry of the parked snapshot
    pub(crate) fn release_parked(&self) -> usize {
        self.slot.lock().as_mut().map_or(0, |snapshot| snapshot.release_all())
    }
}

/// Which list a draw was queued on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawList {
    /// Drawn first, in submission order
    Opaque,
    /// Drawn second, back to front
    Translucent,
    /// Drawn last, in submission order
    Sprite,
}

/// Producer handle to a frame pipeline
///
/// There is exactly one per pipeline. It is `Send`, so it can be moved to the
/// simulation thread.
#[derive(Debug)]
pub struct Submitter {
    exchange: Arc<SnapshotExchange>,
    tracker: LifetimeTracker,
    default_timeout: Duration,
}

impl Submitter {
    pub(crate) fn new(
        exchange: Arc<SnapshotExchange>,
        tracker: LifetimeTracker,
        default_timeout: Duration,
    ) -> Self {
        Self {
            exchange,
            tracker,
            default_timeout,
        }
    }

    /// Configured bound on [`begin_submission`](Self::begin_submission)
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Reference ledger shared with the renderer
    pub const fn lifetime_tracker(&self) -> &LifetimeTracker {
        &self.tracker
    }

    /// Wait up to `timeout` for the renderer to take the previous frame, then
    /// open a window for the next one
    ///
    /// # Errors
    /// A timeout or a closed pipeline is returned as
    /// [`RenderError::Synchronization`]. Either is fatal: the pipeline is out of
    /// step and should be shut down.
    pub fn begin_submission(&mut self, timeout: Duration) -> RenderResult<SubmissionWindow<'_>> {
        if let Err(error) = self.exchange.gate.wait_for_submission_window(timeout) {
            report_fatal("waiting for the submission window", &error);
            return Err(error.into());
        }

        let snapshot = self
            .exchange
            .take()
            .ok_or_else(|| RenderError::Usage("no submit target is parked in the exchange".to_string()))?;

        log::trace!("Submission window opened");
        Ok(SubmissionWindow {
            exchange: &self.exchange,
            tracker: &self.tracker,
            snapshot: Some(snapshot),
        })
    }

    /// [`begin_submission`](Self::begin_submission) with the configured timeout
    pub fn begin_submission_default(&mut self) -> RenderResult<SubmissionWindow<'_>> {
        let timeout = self.default_timeout;
        self.begin_submission(timeout)
    }
}

/// An open submission window
///
/// Holds the submit target exclusively. [`finish`](Self::finish) hands it to
/// the renderer; dropping the window instead parks it without signaling, so
/// the frame is never rendered and the next window times out.
#[derive(Debug)]
pub struct SubmissionWindow<'a> {
    exchange: &'a SnapshotExchange,
    tracker: &'a LifetimeTracker,
    snapshot: Option<Box<FrameSnapshot>>,
}

impl SubmissionWindow<'_> {
    fn target(&mut self) -> RenderResult<&mut FrameSnapshot> {
        self.snapshot
            .as_deref_mut()
            .ok_or_else(|| RenderError::Usage("submission window has already been closed".to_string()))
    }

    /// The frame as described so far
    pub fn snapshot(&self) -> Option<&FrameSnapshot> {
        self.snapshot.as_deref()
    }

    /// Record elapsed wall-clock and simulation time, in seconds
    ///
    /// Camera and mesh submissions extrapolate to the simulation time, so
    /// submit it first.
    pub fn submit_elapsed_time(&mut self, system_time: f32, simulation_time: f32) -> RenderResult<()> {
        let target = self.target()?;
        target.per_frame.elapsed_system_time = system_time;
        target.per_frame.elapsed_simulation_time = simulation_time;
        Ok(())
    }

    /// Record the clear color, channels in R, G, B, A order
    pub fn submit_background_color(&mut self, r: f32, g: f32, b: f32, a: f32) -> RenderResult<()> {
        self.target()?.background_color = [r, g, b, a];
        Ok(())
    }

    /// Record the camera transforms at the submitted simulation time
    pub fn submit_camera(&mut self, camera: &Camera) -> RenderResult<()> {
        let target = self.target()?;
        let transforms = camera.transforms_at(target.per_frame.elapsed_simulation_time);
        target.per_frame.transform_world_to_camera = math::to_gpu(&transforms.world_to_camera);
        target.per_frame.transform_camera_to_projected = math::to_gpu(&transforms.camera_to_projected);
        Ok(())
    }

    /// Queue a mesh draw at `body`'s pose predicted for the submitted
    /// simulation time
    ///
    /// Adds one reference to each of `effect`, `mesh` and `texture`. The draw
    /// goes on the translucent list if the effect enables alpha transparency,
    /// otherwise on the opaque list.
    pub fn submit_mesh_draw(
        &mut self,
        effect: &EffectHandle,
        mesh: &MeshHandle,
        texture: &TextureHandle,
        body: &impl PoseSource,
    ) -> RenderResult<DrawList> {
        let tracker = self.tracker;
        let target = self.target()?;
        let pose = body.predict_pose(target.per_frame.elapsed_simulation_time);
        let draw = MeshDraw {
            effect: tracker.acquire(effect),
            mesh: tracker.acquire(mesh),
            texture: tracker.acquire(texture),
            pose,
        };

        if effect.is_alpha_transparency_enabled() {
            target.translucent.push(draw);
            Ok(DrawList::Translucent)
        } else {
            target.opaque.push(draw);
            Ok(DrawList::Opaque)
        }
    }

    /// Queue a screen-space sprite draw
    ///
    /// Adds one reference to each of `effect`, `sprite` and `texture`.
    pub fn submit_sprite_draw(
        &mut self,
        effect: &EffectHandle,
        sprite: &SpriteHandle,
        texture: &TextureHandle,
    ) -> RenderResult<DrawList> {
        let tracker = self.tracker;
        self.target()?.sprites.push(SpriteDraw {
            effect: tracker.acquire(effect),
            sprite: tracker.acquire(sprite),
            texture: tracker.acquire(texture),
        });
        Ok(DrawList::Sprite)
    }

    /// Hand the frame to the renderer
    ///
    /// # Errors
    /// Fails with [`RenderError::Synchronization`] if the pipeline has been
    /// shut down; the frame's references are released in that case.
    pub fn finish(mut self) -> RenderResult<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| RenderError::Usage("submission window has already been closed".to_string()))?;
        let draws = snapshot.draw_count();
        self.exchange.give_back(snapshot);

        if let Err(error) = self.exchange.gate.signal_submission_complete() {
            report_fatal("signaling submission complete", &error);
            return Err(error.into());
        }
        log::trace!("Submission window closed with {} draws", draws);
        Ok(())
    }
}

impl Drop for SubmissionWindow<'_> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            if !self.exchange.gate.is_closed() {
                log::warn!(
                    "Submission window dropped without finish; {} queued draws will not be rendered",
                    snapshot.draw_count()
                );
            }
            self.exchange.give_back(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::SyncError;
    use crate::foundation::math::Vec3;
    use crate::physics::RigidBodyState;
    use crate::render::resources::{EffectDesc, MeshDesc, RenderState, SpriteBounds, SpriteDesc, TextureDesc};
    use approx::assert_relative_eq;

    const SHORT: Duration = Duration::from_millis(20);

    fn submitter() -> (Submitter, Arc<SnapshotExchange>) {
        let exchange = Arc::new(SnapshotExchange::new(Box::new(FrameSnapshot::with_capacity(
            4,
            [0.0, 0.0, 0.0, 1.0],
        ))));
        let submitter = Submitter::new(Arc::clone(&exchange), LifetimeTracker::new(), SHORT);
        (submitter, exchange)
    }

    #[test]
    fn test_submissions_land_in_their_lists() {
        let (mut submitter, _exchange) = submitter();
        let solid = EffectHandle::effect(EffectDesc::new("solid", RenderState::OPAQUE));
        let glass = EffectHandle::effect(EffectDesc::new("glass", RenderState::TRANSLUCENT));
        let mesh = MeshHandle::mesh(MeshDesc::new("cube", 36));
        let sprite = SpriteHandle::sprite(SpriteDesc::new("logo", SpriteBounds::new(-1.0, 1.0, -0.5, 0.5)));
        let texture = TextureHandle::texture(TextureDesc::new("white", 1, 1));
        let body = RigidBodyState::at(Vec3::zeros());

        let mut window = submitter.begin_submission(SHORT).unwrap();
        assert_eq!(window.submit_sprite_draw(&glass, &sprite, &texture).unwrap(), DrawList::Sprite);
        assert_eq!(window.submit_mesh_draw(&glass, &mesh, &texture, &body).unwrap(), DrawList::Translucent);
        assert_eq!(window.submit_mesh_draw(&solid, &mesh, &texture, &body).unwrap(), DrawList::Opaque);

        let snapshot = window.snapshot().unwrap();
        assert_eq!(snapshot.opaque().len(), 1);
        assert_eq!(snapshot.translucent().len(), 1);
        assert_eq!(snapshot.sprites().len(), 1);
        assert_eq!(texture.ref_count(), 4);
        assert_eq!(mesh.ref_count(), 3);
        assert_eq!(glass.ref_count(), 3);
        window.finish().unwrap();
        assert_eq!(submitter.lifetime_tracker().outstanding(), 9);
    }

    #[test]
    fn test_mesh_pose_is_predicted_at_simulation_time() {
        let (mut submitter, _exchange) = submitter();
        let effect = EffectHandle::effect(EffectDesc::new("solid", RenderState::OPAQUE));
        let mesh = MeshHandle::mesh(MeshDesc::new("cube", 36));
        let texture = TextureHandle::texture(TextureDesc::new("white", 1, 1));
        let body = RigidBodyState::at(Vec3::zeros()).with_velocity(Vec3::new(1.0, 0.0, 0.0));

        let mut window = submitter.begin_submission(SHORT).unwrap();
        window.submit_elapsed_time(10.0, 2.5).unwrap();
        window.submit_mesh_draw(&effect, &mesh, &texture, &body).unwrap();

        let snapshot = window.snapshot().unwrap();
        assert_relative_eq!(snapshot.opaque()[0].pose.position, Vec3::new(2.5, 0.0, 0.0));
        assert_eq!(snapshot.per_frame().elapsed_system_time, 10.0);
        window.finish().unwrap();
    }

    #[test]
    fn test_background_color_keeps_channel_order() {
        let (mut submitter, _exchange) = submitter();
        let mut window = submitter.begin_submission(SHORT).unwrap();
        window.submit_background_color(0.1, 0.2, 0.3, 1.0).unwrap();
        assert_eq!(window.snapshot().unwrap().background_color(), [0.1, 0.2, 0.3, 1.0]);
        window.finish().unwrap();
    }

    #[test]
    fn test_second_window_times_out_without_swap() {
        let (mut submitter, _exchange) = submitter();
        submitter.begin_submission(SHORT).unwrap().finish().unwrap();

        let second = submitter.begin_submission(SHORT);
        assert!(matches!(
            second,
            Err(RenderError::Synchronization(SyncError::TimedOut { .. }))
        ));
    }

    #[test]
    fn test_dropped_window_parks_snapshot_without_signaling() {
        let (mut submitter, exchange) = submitter();
        let effect = EffectHandle::effect(EffectDesc::new("solid", RenderState::OPAQUE));
        let mesh = MeshHandle::mesh(MeshDesc::new("cube", 36));
        let texture = TextureHandle::texture(TextureDesc::new("white", 1, 1));

        {
            let mut window = submitter.begin_submission(SHORT).unwrap();
            window
                .submit_mesh_draw(&effect, &mesh, &texture, &RigidBodyState::default())
                .unwrap();
        }

        assert!(!exchange.gate.is_submission_pending());
        assert_eq!(exchange.release_parked(), 3);
        assert_eq!(mesh.ref_count(), 1);
    }

    #[test]
    fn test_window_finished_after_close_releases_its_draws() {
        let (mut submitter, exchange) = submitter();
        let effect = EffectHandle::effect(EffectDesc::new("solid", RenderState::OPAQUE));
        let mesh = MeshHandle::mesh(MeshDesc::new("cube", 36));
        let texture = TextureHandle::texture(TextureDesc::new("white", 1, 1));

        let mut window = submitter.begin_submission(SHORT).unwrap();
        window
            .submit_mesh_draw(&effect, &mesh, &texture, &RigidBodyState::default())
            .unwrap();
        exchange.gate.close();

        let result = window.finish();
        assert!(matches!(result, Err(RenderError::Synchronization(SyncError::Closed { .. }))));
        assert_eq!(mesh.ref_count(), 1);
        assert_eq!(submitter.lifetime_tracker().outstanding(), 0);
    }
}
