//! Cross-thread synchronization for the frame handoff
//!
//! Producer and render thread only ever meet here. Buffer payloads are never
//! shared; ownership of each half moves between threads, and the two events
//! in [`SyncGate`] decide when it may move.

pub mod event;
pub mod gate;

pub use event::{Event, EventState, SyncError};
pub use gate::{SyncGate, SUBMISSION_COMPLETE, SWAP_COMPLETE};
