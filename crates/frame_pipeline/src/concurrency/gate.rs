//! Two-signal handshake between the producer and the render thread
//!
//! ```text
//! producer:  wait(swap_complete, timeout) -> submit ... -> signal(submission_complete)
//! renderer:  wait(submission_complete)    -> swap       -> signal(swap_complete) -> render
//! ```
//!
//! `swap_complete` starts signaled so the very first submission window opens
//! without a preceding swap. The two sides therefore alternate strictly: the
//! producer can never open window N+1 before the renderer has taken window N.

use super::event::{Event, EventState, SyncError};
use std::time::Duration;

/// Name of the event the producer signals
pub const SUBMISSION_COMPLETE: &str = "submission_complete";

/// Name of the event the renderer signals
pub const SWAP_COMPLETE: &str = "swap_complete";

/// The pair of events that serializes buffer ownership
#[derive(Debug)]
pub struct SyncGate {
    submission_complete: Event,
    swap_complete: Event,
}

impl SyncGate {
    /// Create a gate with the first submission window already open
    pub fn new() -> Self {
        Self {
            submission_complete: Event::new(SUBMISSION_COMPLETE, EventState::Unsignaled),
            swap_complete: Event::new(SWAP_COMPLETE, EventState::Signaled),
        }
    }

    /// Producer side: wait until a new frame may be submitted
    pub fn wait_for_submission_window(&self, timeout: Duration) -> Result<(), SyncError> {
        self.swap_complete.wait(Some(timeout))
    }

    /// Producer side: announce that every write to the submit target is done
    pub fn signal_submission_complete(&self) -> Result<(), SyncError> {
        self.submission_complete.signal()
    }

    /// Render side: wait, without a bound, for the producer to finish a frame
    pub fn wait_for_submission(&self) -> Result<(), SyncError> {
        self.submission_complete.wait(None)
    }

    /// Render side: announce that the buffers have been swapped
    pub fn signal_swap_complete(&self) -> Result<(), SyncError> {
        self.swap_complete.signal()
    }

    /// Whether a finished submission is waiting for the renderer
    pub fn is_submission_pending(&self) -> bool {
        self.submission_complete.is_signaled()
    }

    /// Close both events; every blocked or future wait fails
    pub fn close(&self) {
        self.submission_complete.close();
        self.swap_complete.close();
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.submission_complete.is_closed() && self.swap_complete.is_closed()
    }
}

impl Default for SyncGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(20);

    #[test]
    fn test_first_window_opens_immediately() {
        let gate = SyncGate::new();
        assert!(gate.wait_for_submission_window(SHORT).is_ok());
    }

    #[test]
    fn test_second_window_blocks_without_swap() {
        let gate = SyncGate::new();
        gate.wait_for_submission_window(SHORT).unwrap();
        gate.signal_submission_complete().unwrap();

        let second = gate.wait_for_submission_window(SHORT);
        assert!(matches!(second, Err(SyncError::TimedOut { signal: SWAP_COMPLETE, .. })));
    }

    #[test]
    fn test_handshake_alternates() {
        let gate = SyncGate::new();
        for _ in 0..3 {
            gate.wait_for_submission_window(SHORT).unwrap();
            gate.signal_submission_complete().unwrap();
            gate.wait_for_submission().unwrap();
            gate.signal_swap_complete().unwrap();
        }
    }

    #[test]
    fn test_close_fails_both_sides() {
        let gate = SyncGate::new();
        gate.close();
        assert!(gate.is_closed());
        assert_eq!(gate.wait_for_submission(), Err(SyncError::Closed { signal: SUBMISSION_COMPLETE }));
        assert!(gate.signal_swap_complete().is_err());
    }
}
