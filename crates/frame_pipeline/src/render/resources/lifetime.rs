//! Reference bookkeeping for queued draws
//!
//! Every resource a draw entry names is held through a [`DrawRef`]. Creating
//! one adds a reference to the resource and records an acquisition in the
//! shared [`LifetimeTracker`]; dropping it releases the reference and records
//! the release. Because the release lives in `Drop`, every acquisition is
//! matched by exactly one release whichever path tears the entry down: the
//! render loop clearing its lists, shutdown cleanup, or plain unwinding.

use super::handle::ResourceHandle;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Snapshot of the tracker's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifetimeStats {
    /// References taken by submitted draws
    pub acquired: usize,
    /// References given back by rendered or discarded draws
    pub released: usize,
}

impl LifetimeStats {
    /// References still held by queued draws
    pub const fn outstanding(&self) -> usize {
        self.acquired.saturating_sub(self.released)
    }
}

/// Shared ledger of references held by queued draws
///
/// Cheap to clone; all clones share one set of counters.
#[derive(Debug, Clone, Default)]
pub struct LifetimeTracker {
    counters: Arc<Counters>,
}

impl LifetimeTracker {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference to `resource` on behalf of a queued draw
    pub fn acquire<T: ?Sized>(&self, resource: &ResourceHandle<T>) -> DrawRef<T> {
        self.counters.acquired.fetch_add(1, Ordering::Relaxed);
        DrawRef {
            handle: resource.add_ref(),
            counters: Arc::clone(&self.counters),
        }
    }

    /// Current counter values
    pub fn stats(&self) -> LifetimeStats {
        LifetimeStats {
            acquired: self.counters.acquired.load(Ordering::Acquire),
            released: self.counters.released.load(Ordering::Acquire),
        }
    }

    /// References still held by queued draws
    pub fn outstanding(&self) -> usize {
        self.stats().outstanding()
    }
}

/// One draw entry's reference to a resource
pub struct DrawRef<T: ?Sized> {
    handle: ResourceHandle<T>,
    counters: Arc<Counters>,
}

impl<T: ?Sized> DrawRef<T> {
    /// The underlying handle
    pub const fn handle(&self) -> &ResourceHandle<T> {
        &self.handle
    }
}

impl<T: ?Sized> Deref for DrawRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.handle
    }
}

impl<T: ?Sized> Drop for DrawRef<T> {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::Release);
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for DrawRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DrawRef").field(&self.handle).finish()
    }
}
