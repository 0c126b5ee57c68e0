//! Render backend implementations
//!
//! The backend is chosen once, when the pipeline is created. Nothing after
//! that point knows which implementation it is talking to.

pub mod headless;
pub mod null;

pub use headless::{HeadlessBackend, Operation, RecordedCommand};
pub use null::NullBackend;

use crate::core::config::BackendKind;
use crate::render::api::RenderBackend;

/// Construct the backend selected in configuration
pub fn create_backend(kind: BackendKind) -> Box<dyn RenderBackend> {
    log::debug!("Creating {:?} render backend", kind);
    match kind {
        BackendKind::Headless => Box::new(HeadlessBackend::new()),
        BackendKind::Null => Box::new(NullBackend::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_backend_matches_kind() {
        assert_eq!(create_backend(BackendKind::Headless).name(), "headless");
        assert_eq!(create_backend(BackendKind::Null).name(), "null");
        assert!(create_backend(BackendKind::Headless)
            .as_any()
            .downcast_ref::<HeadlessBackend>()
            .is_some());
    }
}
