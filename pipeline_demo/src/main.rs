//! Frame pipeline demo application
//!
//! Runs a small orbiting scene through the producer/renderer handoff: a
//! simulation thread describes each frame while the main thread renders the
//! previous one. Pass a `.toml` or `.ron` pipeline configuration as the first
//! argument to override the defaults.
//!
//! ```text
//! cargo run -p pipeline_demo -- demo.toml
//! ```

use frame_pipeline::foundation::logging;
use frame_pipeline::prelude::*;
use nalgebra::Unit;
use std::thread;

const FRAMES_TO_RENDER: u64 = 240;
const SIMULATION_STEP: f32 = 1.0 / 60.0;

/// Resources and bodies the producer thread keeps between frames
struct DemoScene {
    camera: Camera,
    solid: EffectHandle,
    glass: EffectHandle,
    hud: EffectHandle,
    cube: MeshHandle,
    pane: MeshHandle,
    checker: TextureHandle,
    crosshair: SpriteHandle,
    asteroids: Vec<RigidBodyState>,
    panes: Vec<RigidBodyState>,
    simulation_time: f32,
}

impl DemoScene {
    fn new(aspect: f32) -> Self {
        let mut camera = Camera::perspective(Vec3::new(0.0, 4.0, 14.0), 45.0, aspect, 0.1, 100.0);
        camera.look_at(Vec3::zeros(), Vec3::y());

        // A ring of tumbling asteroids around the origin
        let asteroids = (0..8)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / 8.0;
                let position = Vec3::new(angle.cos() * 5.0, 0.0, angle.sin() * 5.0);
                let tangent = Vec3::new(-angle.sin(), 0.0, angle.cos());
                RigidBodyState::at(position)
                    .with_velocity(tangent * 0.5)
                    .with_spin(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.8 + i as f32 * 0.1)
            })
            .collect();

        // Glass panes at different depths so the translucent sort has work to do
        let panes = (0..3)
            .map(|i| {
                let tilt = Quat::from_axis_angle(&Unit::new_normalize(Vec3::x()), 0.3 * i as f32);
                RigidBodyState::at(Vec3::new(0.0, 1.0, -3.0 + 3.0 * i as f32)).with_orientation(tilt)
            })
            .collect();

        Self {
            camera,
            solid: EffectHandle::effect(EffectDesc::new("solid", RenderState::OPAQUE)),
            glass: EffectHandle::effect(EffectDesc::new("glass", RenderState::TRANSLUCENT)),
            hud: EffectHandle::effect(EffectDesc::new("hud", RenderState::OVERLAY)),
            cube: MeshHandle::mesh(MeshDesc::new("asteroid", 36)),
            pane: MeshHandle::mesh(MeshDesc::new("pane", 6)),
            checker: TextureHandle::texture(TextureDesc::new("checker", 64, 64)),
            crosshair: SpriteHandle::sprite(SpriteDesc::new("crosshair", SpriteBounds::new(-0.05, 0.05, 0.05, -0.05))),
            asteroids,
            panes,
            simulation_time: 0.0,
        }
    }

    /// Advance the simulation by one fixed step
    fn update(&mut self) {
        self.simulation_time += SIMULATION_STEP;
        for body in &mut self.asteroids {
            body.update(self.simulation_time);
        }
    }

    /// Describe the current state as one frame
    fn submit(&self, window: &mut SubmissionWindow<'_>, system_time: f32) -> RenderResult<()> {
        window.submit_elapsed_time(system_time, self.simulation_time)?;

        let pulse = 0.5 + 0.5 * (self.simulation_time * 0.25).sin();
        window.submit_background_color(0.02, 0.02, 0.05 + 0.1 * pulse, 1.0)?;
        window.submit_camera(&self.camera)?;

        for body in &self.asteroids {
            window.submit_mesh_draw(&self.solid, &self.cube, &self.checker, body)?;
        }
        for body in &self.panes {
            window.submit_mesh_draw(&self.glass, &self.pane, &self.checker, body)?;
        }
        window.submit_sprite_draw(&self.hud, &self.crosshair, &self.checker)?;
        Ok(())
    }
}

/// Producer loop; runs until the renderer shuts the pipeline down
fn run_simulation(mut submitter: Submitter, mut scene: DemoScene) -> RenderResult<u64> {
    let clock = Stopwatch::start_new();
    let mut submitted = 0;

    loop {
        let mut window = match submitter.begin_submission_default() {
            Ok(window) => window,
            Err(error) if is_closed(&error) => {
                log::info!("Pipeline closed after {} submitted frames", submitted);
                return Ok(submitted);
            }
            Err(error) => return Err(error),
        };

        scene.update();
        scene.submit(&mut window, clock.elapsed_secs())?;
        match window.finish() {
            Ok(()) => submitted += 1,
            // Shut down mid-window; the frame's references are already released
            Err(error) if is_closed(&error) => return Ok(submitted),
            Err(error) => return Err(error),
        }
    }
}

fn is_closed(error: &RenderError) -> bool {
    matches!(error, RenderError::Synchronization(SyncError::Closed { .. }))
}

fn load_config() -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(PipelineConfig::load_from_file(&path)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_filter(&config.log_filter);
    log::info!("Starting frame pipeline demo with {:?} backend", config.backend);

    let FramePipeline { submitter, mut renderer } = FramePipeline::from_config(&config)?;
    let scene = DemoScene::new(config.resolution.aspect_ratio());
    let producer = thread::Builder::new()
        .name("simulation".to_string())
        .spawn(move || run_simulation(submitter, scene))?;

    let mut timings = FrameTimings::default();
    let mut draws = 0;
    for _ in 0..FRAMES_TO_RENDER {
        let report = renderer.render_frame()?;
        timings.record(report.elapsed);
        draws += report.draw_count();
        if report.frame_number % 60 == 0 {
            log::info!(
                "Frame {}: {} opaque, {} translucent, {} sprites, {} references released",
                report.frame_number,
                report.opaque_draws,
                report.translucent_draws,
                report.sprite_draws,
                report.released_references
            );
        }
    }

    renderer.shutdown()?;
    let submitted = match producer.join() {
        Ok(result) => result?,
        Err(_) => return Err("simulation thread panicked".into()),
    };

    let stats = renderer.lifetime_tracker().stats();
    log::info!(
        "Rendered {} frames ({} submitted, {} draws), mean {:?}, slowest {:?}",
        renderer.frame_number(),
        submitted,
        draws,
        timings.mean(),
        timings.slowest()
    );
    log::info!(
        "Resource references: {} acquired, {} released, {} outstanding",
        stats.acquired,
        stats.released,
        stats.outstanding()
    );
    Ok(())
}
