//! Plain resource descriptions usable by any backend
//!
//! A backend that owns real GPU objects wraps its own types in the resource
//! traits. These descriptions cover everything else: headless runs, tools and
//! tests.

use super::{Effect, Mesh, RenderState, Sprite, Texture};

/// Effect described by a name and a render state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectDesc {
    label: String,
    render_state: RenderState,
}

impl EffectDesc {
    /// Create an effect description
    pub fn new(label: impl Into<String>, render_state: RenderState) -> Self {
        Self {
            label: label.into(),
            render_state,
        }
    }
}

impl Effect for EffectDesc {
    fn label(&self) -> &str {
        &self.label
    }

    fn render_state(&self) -> RenderState {
        self.render_state
    }
}

/// Mesh described by a name and an index count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshDesc {
    label: String,
    index_count: u32,
}

impl MeshDesc {
    /// Create a mesh description
    pub fn new(label: impl Into<String>, index_count: u32) -> Self {
        Self {
            label: label.into(),
            index_count,
        }
    }
}

impl Mesh for MeshDesc {
    fn label(&self) -> &str {
        &self.label
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Quad corners in normalized device coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteBounds {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Right edge
    pub right: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl SpriteBounds {
    /// Bounds from two opposite corners
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Two-triangle vertex list as (x, y, u, v), counter-clockwise
    pub fn triangle_list(&self) -> [[f32; 4]; 6] {
        let Self { left, top, right, bottom } = *self;
        [
            [left, top, 0.0, 1.0],
            [right, bottom, 1.0, 0.0],
            [right, top, 1.0, 1.0],
            [left, top, 0.0, 1.0],
            [left, bottom, 0.0, 0.0],
            [right, bottom, 1.0, 0.0],
        ]
    }
}

/// Sprite described by a name and screen-space bounds
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDesc {
    label: String,
    bounds: SpriteBounds,
}

impl SpriteDesc {
    /// Create a sprite description
    pub fn new(label: impl Into<String>, bounds: SpriteBounds) -> Self {
        Self {
            label: label.into(),
            bounds,
        }
    }
}

impl Sprite for SpriteDesc {
    fn label(&self) -> &str {
        &self.label
    }

    fn bounds(&self) -> SpriteBounds {
        self.bounds
    }
}

/// Texture described by a name and its size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    label: String,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
}

impl TextureDesc {
    /// Create a texture description
    pub fn new(label: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            label: label.into(),
            width,
            height,
        }
    }
}

impl Texture for TextureDesc {
    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_quad_covers_bounds() {
        let quad = SpriteBounds::new(-0.5, 0.5, 0.5, -0.5).triangle_list();
        assert_eq!(quad.len(), 6);
        assert_eq!(quad[0], [-0.5, 0.5, 0.0, 1.0]);
        assert_eq!(quad[1], [0.5, -0.5, 1.0, 0.0]);
        assert!(quad.iter().all(|v| v[0].abs() == 0.5 && v[1].abs() == 0.5));
    }
}
