//! Drawable resources referenced by submitted draws
//!
//! Effects, meshes, sprites and textures are created elsewhere (asset
//! loading and GPU upload are not this crate's business). The render path
//! only needs to know what each one is called, how an effect blends, and how
//! to keep them alive while a draw that names them is still queued.

pub mod descriptors;
pub mod handle;
pub mod lifetime;

use bitflags::bitflags;
use std::fmt::Debug;

pub use descriptors::{EffectDesc, MeshDesc, SpriteBounds, SpriteDesc, TextureDesc};
pub use handle::{EffectHandle, MeshHandle, ResourceHandle, SpriteHandle, TextureHandle};
pub use lifetime::{DrawRef, LifetimeTracker, LifetimeStats};

bitflags! {
    /// Fixed-function state an effect requests when it is bound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderState: u8 {
        /// Blend with the destination using source alpha
        const ALPHA_TRANSPARENCY = 1 << 0;
        /// Test fragments against the depth buffer
        const DEPTH_TESTING = 1 << 1;
        /// Write fragment depth to the depth buffer
        const DEPTH_WRITING = 1 << 2;
        /// Disable back-face culling
        const DRAW_BOTH_TRIANGLE_SIDES = 1 << 3;
    }
}

impl RenderState {
    /// Depth-tested and depth-written, no blending
    pub const OPAQUE: Self = Self::DEPTH_TESTING.union(Self::DEPTH_WRITING);

    /// Blended and depth-tested without writing depth
    pub const TRANSLUCENT: Self = Self::ALPHA_TRANSPARENCY.union(Self::DEPTH_TESTING);

    /// Blended with no depth interaction, for screen-space overlays
    pub const OVERLAY: Self = Self::ALPHA_TRANSPARENCY;
}

/// Shader program plus render state
pub trait Effect: Send + Sync + Debug {
    /// Name for logs and command traces
    fn label(&self) -> &str;

    /// Render state requested by this effect
    fn render_state(&self) -> RenderState;

    /// Whether draws using this effect must be depth sorted and blended
    fn is_alpha_transparency_enabled(&self) -> bool {
        self.render_state().contains(RenderState::ALPHA_TRANSPARENCY)
    }
}

/// Indexed triangle geometry
pub trait Mesh: Send + Sync + Debug {
    /// Name for logs and command traces
    fn label(&self) -> &str;

    /// Number of indices drawn per call
    fn index_count(&self) -> u32;
}

/// Screen-space textured quad
pub trait Sprite: Send + Sync + Debug {
    /// Name for logs and command traces
    fn label(&self) -> &str;

    /// Corners of the quad in normalized device coordinates
    fn bounds(&self) -> SpriteBounds;
}

/// Sampled image
pub trait Texture: Send + Sync + Debug {
    /// Name for logs and command traces
    fn label(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_flag_drives_translucency() {
        assert!(!EffectDesc::new("solid", RenderState::OPAQUE).is_alpha_transparency_enabled());
        assert!(EffectDesc::new("glass", RenderState::TRANSLUCENT).is_alpha_transparency_enabled());
        assert!(EffectDesc::new("hud", RenderState::OVERLAY).is_alpha_transparency_enabled());
    }
}
