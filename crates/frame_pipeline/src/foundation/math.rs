//! Math utilities and types
//!
//! Provides the math types used by the submission and render paths. The heavy
//! lifting is delegated to nalgebra; this module only fixes the aliases and the
//! handful of transforms the pipeline builds every frame.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

use nalgebra::{Isometry3, Perspective3, Translation3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Column-major matrix layout as it is uploaded to constant buffers
pub type GpuMat4 = [[f32; 4]; 4];

/// Build a local-to-world transform from a rigid pose (rotation then translation)
pub fn local_to_world(orientation: &Quat, position: &Vec3) -> Mat4 {
    Isometry3::from_parts(Translation3::from(*position), *orientation).to_homogeneous()
}

/// Build a world-to-camera transform from the camera's pose in world space
///
/// This is the inverse of the camera's own local-to-world transform, so a point
/// at the camera position maps to the origin and the camera's local axes map to
/// the camera-space axes.
pub fn world_to_camera(orientation: &Quat, position: &Vec3) -> Mat4 {
    Isometry3::from_parts(Translation3::from(*position), *orientation)
        .inverse()
        .to_homogeneous()
}

/// Build a right-handed perspective camera-to-projected transform
///
/// # Arguments
/// * `vertical_fov` - Vertical field of view in radians
/// * `aspect` - Width divided by height
/// * `z_near` - Distance to the near plane (must be > 0)
/// * `z_far` - Distance to the far plane (must be > `z_near`)
///
/// A zero aspect ratio is replaced by 1.0 and a collapsed depth range is
/// widened, so degenerate camera settings produce a usable matrix instead of
/// a panic.
pub fn perspective(vertical_fov: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    const MIN_ASPECT: f32 = 1e-6;
    const MIN_DEPTH_RANGE: f32 = 1e-3;

    let aspect = if aspect.abs() > MIN_ASPECT { aspect } else { 1.0 };
    let min_range = z_near.abs().max(1.0) * MIN_DEPTH_RANGE;
    let z_far = if (z_far - z_near).abs() >= min_range { z_far } else { z_near + min_range };
    Perspective3::new(aspect, vertical_fov, z_near, z_far).to_homogeneous()
}

/// Translation column of an affine transform
pub fn translation_of(transform: &Mat4) -> Vec3 {
    Vec3::new(transform.m14, transform.m24, transform.m34)
}

/// Convert a matrix into the layout uploaded to the GPU
pub fn to_gpu(matrix: &Mat4) -> GpuMat4 {
    (*matrix).into()
}

/// Math utility functions
pub mod utils {
    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * DEG_TO_RAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_local_to_world_places_origin_at_position() {
        let transform = local_to_world(&Quat::identity(), &Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(translation_of(&transform), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_world_to_camera_inverts_camera_pose() {
        let orientation = Quat::from_axis_angle(&Vec3::y_axis(), 0.7);
        let position = Vec3::new(4.0, -1.0, 9.0);
        let product = world_to_camera(&orientation, &position) * local_to_world(&orientation, &position);
        assert_relative_eq!(product, Mat4::identity(), epsilon = 1e-5);
    }

    #[test]
    fn test_point_in_front_of_default_camera_has_negative_z() {
        let view = world_to_camera(&Quat::identity(), &Vec3::new(0.0, 0.0, 10.0));
        let object = local_to_world(&Quat::identity(), &Vec3::zeros());
        assert_relative_eq!(translation_of(&(view * object)).z, -10.0);
    }

    #[test]
    fn test_perspective_tolerates_degenerate_settings() {
        let zero_aspect = perspective(1.0, 0.0, 0.1, 100.0);
        assert!(zero_aspect.iter().all(|value| value.is_finite()));
        assert_relative_eq!(zero_aspect, perspective(1.0, 1.0, 0.1, 100.0));

        let flat = perspective(1.0, 1.0, 5.0, 5.0);
        assert!(flat.iter().all(|value| value.is_finite()));
    }

    #[test]
    fn test_gpu_layout_is_column_major() {
        let transform = local_to_world(&Quat::identity(), &Vec3::new(5.0, 6.0, 7.0));
        let gpu = to_gpu(&transform);
        assert_eq!(gpu[3], [5.0, 6.0, 7.0, 1.0]);
    }
}
