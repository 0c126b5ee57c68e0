//! Rigid-body state and pose prediction
//!
//! Submitted frames are drawn one frame after they are described, so the
//! submission path asks every body where it *will* be at the frame's
//! simulation time instead of copying where it was at its last update.

use crate::foundation::math::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Anything that can extrapolate its pose to a simulation timestamp
pub trait PoseSource {
    /// Orientation at `simulation_time` seconds
    fn predict_future_orientation(&self, simulation_time: f32) -> Quat;

    /// Position at `simulation_time` seconds
    fn predict_future_position(&self, simulation_time: f32) -> Vec3;

    /// Both halves of the pose at `simulation_time`
    fn predict_pose(&self, simulation_time: f32) -> Pose {
        Pose {
            orientation: self.predict_future_orientation(simulation_time),
            position: self.predict_future_position(simulation_time),
        }
    }
}

/// Orientation plus position, as stored in a draw entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Rotation from local to world space
    pub orientation: Quat,
    /// Translation from local to world space
    pub position: Vec3,
}

impl Pose {
    /// Pose at `position` with no rotation
    pub fn at(position: Vec3) -> Self {
        Self {
            orientation: Quat::identity(),
            position,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::zeros())
    }
}

/// State of a rigid body at its last simulation update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyState {
    /// Position in world space
    pub position: Vec3,
    /// Linear velocity in units per second
    pub velocity: Vec3,
    /// Orientation in world space
    pub orientation: Quat,
    /// Rotation axis in local space
    pub angular_velocity_axis_local: Vec3,
    /// Angular speed in radians per second
    pub angular_speed: f32,
    /// Simulation time, in seconds, this state was recorded at
    pub updated_at: f32,
}

impl RigidBodyState {
    /// Stationary body at `position`
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            orientation: Quat::identity(),
            angular_velocity_axis_local: Vec3::y(),
            angular_speed: 0.0,
            updated_at: 0.0,
        }
    }

    /// Set linear velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set spin around a local axis
    pub fn with_spin(mut self, axis_local: Vec3, angular_speed: f32) -> Self {
        self.angular_velocity_axis_local = axis_local;
        self.angular_speed = angular_speed;
        self
    }

    /// Set orientation
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Advance the stored state to `simulation_time`
    pub fn update(&mut self, simulation_time: f32) {
        self.position = self.predict_future_position(simulation_time);
        self.orientation = self.predict_future_orientation(simulation_time);
        self.updated_at = simulation_time;
    }

    fn elapsed_since_update(&self, simulation_time: f32) -> f32 {
        (simulation_time - self.updated_at).max(0.0)
    }
}

impl Default for RigidBodyState {
    fn default() -> Self {
        Self::at(Vec3::zeros())
    }
}

impl PoseSource for RigidBodyState {
    fn predict_future_orientation(&self, simulation_time: f32) -> Quat {
        let angle = self.angular_speed * self.elapsed_since_update(simulation_time);
        match nalgebra::Unit::try_new(self.angular_velocity_axis_local, f32::EPSILON) {
            Some(axis) if angle != 0.0 => self.orientation * Quat::from_axis_angle(&axis, angle),
            _ => self.orientation,
        }
    }

    fn predict_future_position(&self, simulation_time: f32) -> Vec3 {
        self.position + self.velocity * self.elapsed_since_update(simulation_time)
    }
}
