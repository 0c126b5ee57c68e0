//! Physics-side inputs to the renderer
//!
//! Only the part of rigid-body state the submission path needs: a pose that
//! can be predicted forward in simulation time.

pub mod rigid_body;

pub use rigid_body::{Pose, PoseSource, RigidBodyState};
