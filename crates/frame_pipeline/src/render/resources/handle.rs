//! Shared-ownership handles to drawable resources
//!
//! A [`ResourceHandle`] is one counted reference. Cloning it adds a
//! reference, dropping it releases one, and the resource itself is dropped
//! exactly once, when the last reference goes away. A scene object and every
//! queued draw that names the resource each hold their own handle, so the
//! resource outlives whichever of them finishes last.

use super::{Effect, Mesh, Sprite, Texture};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Counted reference to a shared resource
pub struct ResourceHandle<T: ?Sized> {
    inner: Arc<T>,
}

/// Counted reference to an effect
pub type EffectHandle = ResourceHandle<dyn Effect>;

/// Counted reference to a mesh
pub type MeshHandle = ResourceHandle<dyn Mesh>;

/// Counted reference to a sprite
pub type SpriteHandle = ResourceHandle<dyn Sprite>;

/// Counted reference to a texture
pub type TextureHandle = ResourceHandle<dyn Texture>;

impl<T> ResourceHandle<T> {
    /// Take ownership of a resource; the new handle is its only reference
    pub fn new(resource: T) -> Self {
        Self {
            inner: Arc::new(resource),
        }
    }
}

impl<T: ?Sized> ResourceHandle<T> {
    /// Wrap an existing shared resource
    pub const fn from_arc(inner: Arc<T>) -> Self {
        Self { inner }
    }

    /// Add a reference
    #[must_use = "dropping the new reference releases it immediately"]
    pub fn add_ref(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Release this reference
    pub fn release(self) {
        drop(self);
    }

    /// Number of live references, including this one
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether two handles refer to the same resource
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl EffectHandle {
    /// Share an effect
    pub fn effect(effect: impl Effect + 'static) -> Self {
        Self::from_arc(Arc::new(effect))
    }
}

impl MeshHandle {
    /// Share a mesh
    pub fn mesh(mesh: impl Mesh + 'static) -> Self {
        Self::from_arc(Arc::new(mesh))
    }
}

impl SpriteHandle {
    /// Share a sprite
    pub fn sprite(sprite: impl Sprite + 'static) -> Self {
        Self::from_arc(Arc::new(sprite))
    }
}

impl TextureHandle {
    /// Share a texture
    pub fn texture(texture: impl Texture + 'static) -> Self {
        Self::from_arc(Arc::new(texture))
    }
}

impl<T: ?Sized> Clone for ResourceHandle<T> {
    fn clone(&self) -> Self {
        self.add_ref()
    }
}

impl<T: ?Sized> Deref for ResourceHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("resource", &&*self.inner)
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::resources::MeshDesc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Tracked<'a> {
        destroyed: &'a AtomicUsize,
    }

    impl Drop for Tracked<'_> {
        fn drop(&mut self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_add_ref_and_release_are_symmetric() {
        let mesh = MeshHandle::mesh(MeshDesc::new("cube", 36));
        assert_eq!(mesh.ref_count(), 1);

        let queued = mesh.add_ref();
        assert_eq!(mesh.ref_count(), 2);
        assert!(queued.ptr_eq(&mesh));
        assert_eq!(queued.index_count(), 36);

        queued.release();
        assert_eq!(mesh.ref_count(), 1);
    }

    #[test]
    fn test_destroyed_exactly_once_after_last_release() {
        let destroyed = AtomicUsize::new(0);
        let owner = ResourceHandle::new(Tracked { destroyed: &destroyed });
        let queued = owner.add_ref();

        owner.release();
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);

        queued.release();
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    }
}
