//! # Frame Pipeline
//!
//! Double-buffered frame handoff between a simulation thread and a render
//! thread.
//!
//! ## Features
//!
//! - **Two snapshots, no copies**: the producer fills one frame while the
//!   renderer draws the other; ownership moves, data does not
//! - **Two-signal handshake**: strict alternation between submission and swap
//! - **Pose extrapolation**: draws are placed where bodies will be at the
//!   frame's simulation time
//! - **Ordered drawing**: opaque, then translucent back to front, then sprites
//! - **Counted resources**: nothing a queued draw names is destroyed early
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use frame_pipeline::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let FramePipeline { mut submitter, mut renderer } = FramePipeline::from_config(&config)?;
//!
//!     let producer = std::thread::spawn(move || -> RenderResult<()> {
//!         let timeout = submitter.default_timeout();
//!         let mut window = submitter.begin_submission(timeout)?;
//!         window.submit_elapsed_time(0.0, 0.0)?;
//!         window.submit_camera(&Camera::default())?;
//!         window.finish()
//!     });
//!
//!     renderer.render_frame()?;
//!     producer.join().expect("producer panicked")?;
//!     renderer.shutdown()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;

pub mod concurrency;
pub mod config;
pub mod foundation;
pub mod physics;
pub mod render;

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        concurrency::SyncError,
        core::config::{BackendKind, CameraForward, Config, PipelineConfig, Resolution},
        foundation::{
            math::{Mat4, Quat, Vec3},
            time::{FrameTimings, Stopwatch},
        },
        physics::{Pose, PoseSource, RigidBodyState},
        render::{
            Camera, DrawList, EffectDesc, EffectHandle, FramePipeline, FrameReport, MeshDesc, MeshHandle,
            RenderError, RenderResult, RenderState, Renderer, SpriteBounds, SpriteDesc, SpriteHandle,
            SubmissionWindow, Submitter, TextureDesc, TextureHandle,
        },
    };
}
