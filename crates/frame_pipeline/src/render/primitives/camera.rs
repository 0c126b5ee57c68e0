//! # Camera
//!
//! A perspective camera whose pose is a rigid body like any other moving
//! object. The submission path asks it for its transforms at the frame's
//! simulation time, so a moving camera is extrapolated exactly like the
//! meshes it looks at.
//!
//! ## Coordinate System
//! Camera space is right-handed and Y-up with the camera looking down -Z.
//! Renderers that follow the other convention select
//! [`CameraForward::PositiveZ`](crate::core::config::CameraForward) so the
//! translucent sort still runs back to front.

use crate::foundation::math::{self, utils, Mat4, Quat, Vec3};
use crate::physics::{PoseSource, RigidBodyState};

/// Perspective camera driven by a rigid body
///
/// # Performance Notes
/// Matrices are computed on demand. Submission asks for them once per frame,
/// so nothing is cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Pose and motion of the camera in world space
    pub rigid_body: RigidBodyState,

    /// Vertical field of view in radians
    pub vertical_fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to the near clipping plane
    pub z_near: f32,

    /// Distance to the far clipping plane
    pub z_far: f32,
}

/// Camera transforms for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransforms {
    /// World space to camera space
    pub world_to_camera: Mat4,
    /// Camera space to projected (clip) space
    pub camera_to_projected: Mat4,
}

impl Camera {
    /// Create a perspective camera at `position` with no rotation
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `z_near` - Distance to the near clipping plane (must be > 0)
    /// * `z_far` - Distance to the far clipping plane (must be > `z_near`)
    ///
    /// # Example
    /// ```rust
    /// use frame_pipeline::foundation::math::Vec3;
    /// use frame_pipeline::render::primitives::Camera;
    ///
    /// let camera = Camera::perspective(Vec3::new(0.0, 2.0, 10.0), 45.0, 16.0 / 9.0, 0.1, 100.0);
    /// assert_eq!(camera.rigid_body.position, Vec3::new(0.0, 2.0, 10.0));
    /// ```
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            rigid_body: RigidBodyState::at(position),
            vertical_fov: utils::deg_to_rad(fov_degrees),
            aspect,
            z_near,
            z_far,
        }
    }

    /// Replace the camera's rigid body
    pub fn with_rigid_body(mut self, rigid_body: RigidBodyState) -> Self {
        self.rigid_body = rigid_body;
        self
    }

    /// Rotate the camera so it faces `target`
    ///
    /// `up` does not need to be perpendicular to the view direction. A target
    /// at the camera position or straight along `up` leaves the orientation
    /// unchanged.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let direction = target - self.rigid_body.position;
        if direction.norm_squared() <= f32::EPSILON || direction.cross(&up).norm_squared() <= f32::EPSILON {
            log::warn!("Camera look_at ignored: degenerate direction {:?} with up {:?}", direction, up);
            return;
        }
        let view_rotation: Quat = Quat::look_at_rh(&direction, &up);
        self.rigid_body.orientation = view_rotation.inverse();
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
    }

    /// Update the aspect ratio after a viewport change
    ///
    /// Only changes larger than 0.01 are logged. Non-positive or non-finite
    /// ratios, such as those of a minimized window, are ignored.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if !aspect.is_finite() || aspect <= 0.0 {
            log::warn!("Camera aspect ratio {} ignored, keeping {:.3}", aspect, self.aspect);
            return;
        }
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// World-to-camera and camera-to-projected transforms at `simulation_time`
    ///
    /// The camera's pose is extrapolated from its last update to
    /// `simulation_time` before the view transform is built.
    pub fn transforms_at(&self, simulation_time: f32) -> CameraTransforms {
        let pose = self.rigid_body.predict_pose(simulation_time);
        CameraTransforms {
            world_to_camera: math::world_to_camera(&pose.orientation, &pose.position),
            camera_to_projected: math::perspective(self.vertical_fov, self.aspect, self.z_near, self.z_far),
        }
    }
}

impl Default for Camera {
    /// Camera ten units back on +Z, looking down -Z at the origin
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 0.0, 10.0), 45.0, 1.0, 0.1, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_camera_sees_origin_in_front() {
        let transforms = Camera::default().transforms_at(0.0);
        let origin = transforms.world_to_camera.transform_point(&Vec3::zeros().into());
        assert_relative_eq!(origin.coords, Vec3::new(0.0, 0.0, -10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_moving_camera_is_extrapolated() {
        let body = RigidBodyState::at(Vec3::zeros()).with_velocity(Vec3::new(0.0, 0.0, 2.0));
        let camera = Camera::default().with_rigid_body(body);

        let transforms = camera.transforms_at(1.5);
        let origin = transforms.world_to_camera.transform_point(&Vec3::zeros().into());
        assert_relative_eq!(origin.coords, Vec3::new(0.0, 0.0, -3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_look_at_turns_camera_toward_target() {
        let mut camera = Camera::perspective(Vec3::new(5.0, 0.0, 0.0), 60.0, 1.0, 0.1, 50.0);
        camera.look_at(Vec3::zeros(), Vec3::y());

        let origin = camera
            .transforms_at(0.0)
            .world_to_camera
            .transform_point(&Vec3::zeros().into());
        assert_relative_eq!(origin.coords, Vec3::new(0.0, 0.0, -5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_projection_does_not_panic() {
        let mut camera = Camera::perspective(Vec3::new(0.0, 0.0, 10.0), 45.0, 0.0, 1.0, 1.0);
        let transforms = camera.transforms_at(0.0);
        assert!(transforms.camera_to_projected.iter().all(|value| value.is_finite()));

        camera.set_aspect_ratio(1.5);
        camera.set_aspect_ratio(0.0);
        assert_relative_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn test_degenerate_look_at_is_ignored() {
        let mut camera = Camera::default();
        let before = camera.rigid_body.orientation;
        camera.look_at(camera.rigid_body.position, Vec3::y());
        assert_eq!(camera.rigid_body.orientation, before);
    }
}
