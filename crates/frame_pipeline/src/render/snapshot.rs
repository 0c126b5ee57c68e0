//! Frame snapshot: everything needed to render one frame
//!
//! Exactly two snapshots exist per pipeline. One is being filled by the
//! producer while the render thread draws from the other; the two are
//! exchanged by moving boxes, never by copying their contents.

use crate::foundation::math::{self, GpuMat4};
use crate::physics::Pose;
use crate::render::resources::{DrawRef, Effect, Mesh, Sprite, Texture};
use bytemuck::{Pod, Zeroable};

/// Per-frame constant buffer layout
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PerFrameConstants {
    /// World space to camera space
    pub transform_world_to_camera: GpuMat4,
    /// Camera space to projected space
    pub transform_camera_to_projected: GpuMat4,
    /// Seconds of wall-clock time since startup
    pub elapsed_system_time: f32,
    /// Seconds of simulation time since startup
    pub elapsed_simulation_time: f32,
    _padding: [f32; 2],
}

impl Default for PerFrameConstants {
    fn default() -> Self {
        let identity = math::to_gpu(&math::Mat4::identity());
        Self {
            transform_world_to_camera: identity,
            transform_camera_to_projected: identity,
            elapsed_system_time: 0.0,
            elapsed_simulation_time: 0.0,
            _padding: [0.0; 2],
        }
    }
}

/// Per-draw constant buffer layout
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PerDrawConstants {
    /// Local space to world space
    pub transform_local_to_world: GpuMat4,
}

impl Default for PerDrawConstants {
    fn default() -> Self {
        Self {
            transform_local_to_world: math::to_gpu(&math::Mat4::identity()),
        }
    }
}

/// A queued mesh draw
#[derive(Debug)]
pub struct MeshDraw {
    /// Effect to bind
    pub effect: DrawRef<dyn Effect>,
    /// Mesh to draw
    pub mesh: DrawRef<dyn Mesh>,
    /// Texture bound to slot 0
    pub texture: DrawRef<dyn Texture>,
    /// Pose predicted for the frame's simulation time
    pub pose: Pose,
}

impl MeshDraw {
    /// Number of resource references this entry holds
    pub const REFERENCES: usize = 3;
}

/// A queued screen-space sprite draw
#[derive(Debug)]
pub struct SpriteDraw {
    /// Effect to bind
    pub effect: DrawRef<dyn Effect>,
    /// Sprite to draw
    pub sprite: DrawRef<dyn Sprite>,
    /// Texture bound to slot 0
    pub texture: DrawRef<dyn Texture>,
}

impl SpriteDraw {
    /// Number of resource references this entry holds
    pub const REFERENCES: usize = 3;
}

/// Everything needed to render one frame
#[derive(Debug)]
pub struct FrameSnapshot {
    pub(crate) per_frame: PerFrameConstants,
    pub(crate) per_draw: PerDrawConstants,
    pub(crate) background_color: [f32; 4],
    pub(crate) opaque: Vec<MeshDraw>,
    pub(crate) translucent: Vec<MeshDraw>,
    pub(crate) sprites: Vec<SpriteDraw>,
}

impl FrameSnapshot {
    /// Empty snapshot with room for `capacity` entries per list
    pub fn with_capacity(capacity: usize, background_color: [f32; 4]) -> Self {
        Self {
            per_frame: PerFrameConstants::default(),
            per_draw: PerDrawConstants::default(),
            background_color,
            opaque: Vec::with_capacity(capacity),
            translucent: Vec::with_capacity(capacity),
            sprites: Vec::with_capacity(capacity),
        }
    }

    /// Per-frame constants as last submitted
    pub const fn per_frame(&self) -> &PerFrameConstants {
        &self.per_frame
    }

    /// Clear color [R, G, B, A] as last submitted
    pub const fn background_color(&self) -> [f32; 4] {
        self.background_color
    }

    /// Opaque mesh draws in submission order
    pub fn opaque(&self) -> &[MeshDraw] {
        &self.opaque
    }

    /// Translucent mesh draws in submission order
    pub fn translucent(&self) -> &[MeshDraw] {
        &self.translucent
    }

    /// Sprite draws in submission order
    pub fn sprites(&self) -> &[SpriteDraw] {
        &self.sprites
    }

    /// Total queued draws across all three lists
    pub fn draw_count(&self) -> usize {
        self.opaque.len() + self.translucent.len() + self.sprites.len()
    }

    /// Whether no draws are queued
    pub fn is_empty(&self) -> bool {
        self.draw_count() == 0
    }

    /// Drop every queued draw, releasing its references
    ///
    /// Returns the number of references released. Capacity is kept so the
    /// snapshot can be refilled without reallocating.
    pub fn release_all(&mut self) -> usize {
        let released = (self.opaque.len() + self.translucent.len()) * MeshDraw::REFERENCES
            + self.sprites.len() * SpriteDraw::REFERENCES;
        self.opaque.clear();
        self.translucent.clear();
        self.sprites.clear();
        released
    }
}
