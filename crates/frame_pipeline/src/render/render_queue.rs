//! # Translucent Draw Ordering
//!
//! Opaque and sprite draws are issued in submission order. Translucent draws
//! blend with what is already in the target, so they are issued back to front
//! by their camera-space depth.
//!
//! ## Depth Convention
//!
//! - [`CameraForward::NegativeZ`]: the camera looks down -Z, farther draws
//!   have more negative depth, sort ascending.
//! - [`CameraForward::PositiveZ`]: the camera looks down +Z, farther draws
//!   have larger depth, sort descending.
//!
//! The sort is stable, so draws at equal depth keep submission order. NaN
//! depths are ordered with [`f32::total_cmp`] instead of being treated as
//! equal to everything.

use crate::core::config::CameraForward;
use crate::foundation::math::{self, Mat4};
use crate::render::snapshot::MeshDraw;
use std::cmp::Ordering;

/// Camera-space Z of a draw's origin
pub fn camera_space_depth(draw: &MeshDraw, world_to_camera: &Mat4) -> f32 {
    let local_to_world = math::local_to_world(&draw.pose.orientation, &draw.pose.position);
    math::translation_of(&(world_to_camera * local_to_world)).z
}

/// Indices of `draws` in back-to-front order
pub fn sort_back_to_front(draws: &[MeshDraw], world_to_camera: &Mat4, forward: CameraForward) -> Vec<usize> {
    let depths: Vec<f32> = draws
        .iter()
        .map(|draw| camera_space_depth(draw, world_to_camera))
        .collect();
    back_to_front_order(&depths, forward)
}

/// Indices of `depths` in back-to-front order
pub fn back_to_front_order(depths: &[f32], forward: CameraForward) -> Vec<usize> {
    let mut order: Vec<usize> = (0..depths.len()).collect();
    order.sort_by(|&a, &b| farther_first(depths[a], depths[b], forward));
    order
}

fn farther_first(a: f32, b: f32, forward: CameraForward) -> Ordering {
    match forward {
        CameraForward::NegativeZ => a.total_cmp(&b),
        CameraForward::PositiveZ => b.total_cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::Pose;
    use crate::render::resources::{
        EffectDesc, EffectHandle, LifetimeTracker, MeshDesc, MeshHandle, RenderState, TextureDesc, TextureHandle,
    };

    fn draws_at(depths: &[f32]) -> Vec<MeshDraw> {
        let tracker = LifetimeTracker::new();
        let effect = EffectHandle::effect(EffectDesc::new("glass", RenderState::TRANSLUCENT));
        let mesh = MeshHandle::mesh(MeshDesc::new("pane", 6));
        let texture = TextureHandle::texture(TextureDesc::new("tint", 1, 1));
        depths
            .iter()
            .map(|&z| MeshDraw {
                effect: tracker.acquire(&effect),
                mesh: tracker.acquire(&mesh),
                texture: tracker.acquire(&texture),
                pose: Pose::at(Vec3::new(0.0, 0.0, z)),
            })
            .collect()
    }

    #[test]
    fn test_negative_z_sorts_ascending() {
        let draws = draws_at(&[-5.0, -1.0, -3.0]);
        let order = sort_back_to_front(&draws, &Mat4::identity(), CameraForward::NegativeZ);
        let sorted: Vec<f32> = order.iter().map(|&i| draws[i].pose.position.z).collect();
        assert_eq!(sorted, vec![-5.0, -3.0, -1.0]);
    }

    #[test]
    fn test_positive_z_sorts_descending() {
        let draws = draws_at(&[5.0, 1.0, 3.0]);
        let order = sort_back_to_front(&draws, &Mat4::identity(), CameraForward::PositiveZ);
        let sorted: Vec<f32> = order.iter().map(|&i| draws[i].pose.position.z).collect();
        assert_eq!(sorted, vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn test_depth_uses_camera_space() {
        let draws = draws_at(&[0.0]);
        let camera_back_ten = math::world_to_camera(&math::Quat::identity(), &Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(camera_space_depth(&draws[0], &camera_back_ten), -10.0);
    }

    #[test]
    fn test_equal_depths_keep_submission_order() {
        let order = back_to_front_order(&[-2.0, -4.0, -2.0, -4.0, -2.0], CameraForward::NegativeZ);
        assert_eq!(order, vec![1, 3, 0, 2, 4]);

        let order = back_to_front_order(&[2.0, 2.0, 4.0], CameraForward::PositiveZ);
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_nan_does_not_break_ordering() {
        let order = back_to_front_order(&[-1.0, f32::NAN, -3.0], CameraForward::NegativeZ);
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_empty_list() {
        assert!(back_to_front_order(&[], CameraForward::NegativeZ).is_empty());
    }
}
