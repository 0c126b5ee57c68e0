//! # Rendering System
//!
//! The frame handoff between a producer thread that describes frames and a
//! render thread that draws them.
//!
//! ## Architecture
//!
//! - **Submitter / SubmissionWindow**: producer-side API filling the submit target
//! - **Renderer**: consumer-side render loop drawing the render source
//! - **FrameSnapshot**: everything one frame needs; exactly two exist
//! - **RenderBackend**: the graphics API, selected once at startup
//! - **Resources**: counted handles keeping queued resources alive
//!
//! [`FramePipeline::create`] builds the pair and wires the two-signal gate
//! between them. The producer always describes frame N+1 while frame N is
//! drawn, so poses are extrapolated forward at submission time.

// Public modules for application use
pub mod api;
pub mod backends;
pub mod pipeline;
pub mod primitives;
pub mod render_queue;
pub mod renderer;
pub mod resources;
pub mod snapshot;
pub mod submission;


pub use api::{BackendResult, InitializationParameters, RenderBackend};
pub use backends::{create_backend, HeadlessBackend, NullBackend};
pub use pipeline::FramePipeline;
pub use primitives::Camera;
pub use renderer::{FrameReport, Renderer};
pub use resources::{
    EffectDesc, EffectHandle, LifetimeTracker, MeshDesc, MeshHandle, RenderState, SpriteBounds, SpriteDesc,
    SpriteHandle, TextureDesc, TextureHandle,
};
pub use snapshot::FrameSnapshot;
pub use submission::{DrawList, SubmissionWindow, Submitter};

use crate::concurrency::SyncError;
use crate::config::ConfigError;
use thiserror::Error;

/// High-level rendering error types
///
/// Backends report their own failures as [`RenderError::BackendError`] with a
/// readable message; nothing API-specific leaks through this type.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Pipeline startup failed
    ///
    /// Any backend objects created before the failing step have already been
    /// destroyed when this is returned.
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// The producer/renderer handshake failed
    ///
    /// Unrecoverable: once a signal is missed neither side can tell who owns
    /// which snapshot.
    #[error("Synchronization failed: {0}")]
    Synchronization(#[from] SyncError),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),

    /// The pipeline was used in a way its API does not allow
    #[error("Invalid use of the render pipeline: {0}")]
    Usage(String),
}

impl RenderError {
    /// Whether the session must be shut down
    ///
    /// Handshake and backend failures abandon the frame in progress and are
    /// never retried.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Synchronization(_) | Self::BackendError(_))
    }
}

impl From<ConfigError> for RenderError {
    fn from(error: ConfigError) -> Self {
        Self::InitializationFailed(error.to_string())
    }
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Log a handshake failure
///
/// A closed signal means the pipeline is shutting down and is only logged at
/// debug level.
pub(crate) fn report_fatal(during: &str, error: &SyncError) {
    if matches!(error, SyncError::Closed { .. }) {
        log::debug!("Pipeline closed while {}", during);
        return;
    }
    log::error!(
        "Synchronization failed while {}: {}. The application is probably in a bad state and should be exited",
        during,
        error
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fatal_classification() {
        let timed_out = SyncError::TimedOut {
            signal: "swap_complete",
            waited: Duration::from_millis(5),
        };
        assert!(RenderError::from(timed_out).is_fatal());
        assert!(RenderError::BackendError("device lost".into()).is_fatal());
        assert!(!RenderError::InitializationFailed("no device".into()).is_fatal());
        assert!(!RenderError::Usage("twice".into()).is_fatal());
    }

    #[test]
    fn test_error_messages_name_the_signal() {
        let error = RenderError::from(SyncError::Closed { signal: "submission_complete" });
        assert_eq!(error.to_string(), "Synchronization failed: `submission_complete` was closed");
    }
}
