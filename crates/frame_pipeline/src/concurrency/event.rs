//! Binary auto-reset signal shared by two threads
//!
//! An [`Event`] is either signaled or unsignaled. Waiting on a signaled event
//! consumes the signal: the event flips back to unsignaled at the instant the
//! waiter is released, so exactly one wait succeeds per signal.
//!
//! Closing an event is terminal. Waiters blocked on a closed event are woken
//! with [`SyncError::Closed`] and every later wait or signal fails the same
//! way; this is how shutdown unblocks a render thread parked in an unbounded
//! wait.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failure of a wait or signal operation
///
/// Every variant is fatal for the running session: once a handshake is missed
/// nobody can tell which side owns which buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A bounded wait expired before the event was signaled
    #[error("timed out after {waited:?} waiting for `{signal}`")]
    TimedOut {
        /// Name of the event that was waited on
        signal: &'static str,
        /// How long the caller waited
        waited: Duration,
    },

    /// The event was closed before or during the operation
    #[error("`{signal}` was closed")]
    Closed {
        /// Name of the closed event
        signal: &'static str,
    },
}

/// Initial state of an [`Event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    /// The first wait returns immediately
    Signaled,
    /// The first wait blocks until [`Event::signal`]
    Unsignaled,
}

#[derive(Debug)]
struct Inner {
    signaled: bool,
    closed: bool,
}

/// Binary signal that resets automatically when a waiter is released
#[derive(Debug)]
pub struct Event {
    name: &'static str,
    state: Mutex<Inner>,
    condvar: Condvar,
}

impl Event {
    /// Create a named event in the given initial state
    pub fn new(name: &'static str, initial: EventState) -> Self {
        Self {
            name,
            state: Mutex::new(Inner {
                signaled: initial == EventState::Signaled,
                closed: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Name used in diagnostics
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Block until the event is signaled, consuming the signal
    ///
    /// `None` waits forever. `Some(timeout)` gives up with
    /// [`SyncError::TimedOut`] once the timeout has elapsed; a timeout too
    /// large to represent as a deadline waits forever.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<(), SyncError> {
        let started = Instant::now();
        let deadline = timeout.and_then(|timeout| started.checked_add(timeout));
        let mut state = self.state.lock();

        loop {
            if state.closed {
                return Err(SyncError::Closed { signal: self.name });
            }
            if state.signaled {
                state.signaled = false;
                return Ok(());
            }

            match deadline {
                None => self.condvar.wait(&mut state),
                Some(deadline) => {
                    // Re-check the state once more after a timeout; a signal may
                    // have landed between the wakeup and reacquiring the lock.
                    if self.condvar.wait_until(&mut state, deadline).timed_out()
                        && !state.signaled
                        && !state.closed
                    {
                        return Err(SyncError::TimedOut {
                            signal: self.name,
                            waited: started.elapsed(),
                        });
                    }
                }
            }
        }
    }

    /// Signal the event, releasing one waiter
    ///
    /// Signaling an already signaled event leaves it signaled; signals do not
    /// accumulate.
    pub fn signal(&self) -> Result<(), SyncError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SyncError::Closed { signal: self.name });
        }
        state.signaled = true;
        drop(state);
        self.condvar.notify_one();
        Ok(())
    }

    /// Close the event, failing every current and future wait or signal
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.signaled = false;
        drop(state);
        self.condvar.notify_all();
    }

    /// Whether the event is currently signaled
    pub fn is_signaled(&self) -> bool {
        self.state.lock().signaled
    }

    /// Whether the event has been closed
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_signaled_event_releases_one_wait() {
        let event = Event::new("test", EventState::Signaled);
        assert!(event.wait(Some(Duration::from_millis(10))).is_ok());
        assert!(!event.is_signaled());
        assert!(matches!(
            event.wait(Some(Duration::from_millis(10))),
            Err(SyncError::TimedOut { signal: "test", .. })
        ));
    }

    #[test]
    fn test_signals_do_not_accumulate() {
        let event = Event::new("test", EventState::Unsignaled);
        event.signal().unwrap();
        event.signal().unwrap();
        assert!(event.wait(Some(Duration::from_millis(10))).is_ok());
        assert!(event.wait(Some(Duration::from_millis(10))).is_err());
    }

    #[test]
    fn test_signal_from_other_thread_wakes_unbounded_wait() {
        let event = Arc::new(Event::new("test", EventState::Unsignaled));
        let signaller = Arc::clone(&event);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            signaller.signal().unwrap();
        });

        assert!(event.wait(None).is_ok());
        handle.join().unwrap();
    }

    #[test]
    fn test_close_wakes_blocked_waiter() {
        let event = Arc::new(Event::new("test", EventState::Unsignaled));
        let waiter = Arc::clone(&event);

        let handle = thread::spawn(move || waiter.wait(None));
        thread::sleep(Duration::from_millis(20));
        event.close();

        assert_eq!(handle.join().unwrap(), Err(SyncError::Closed { signal: "test" }));
    }

    #[test]
    fn test_huge_timeout_waits_until_signaled() {
        let event = Arc::new(Event::new("test", EventState::Unsignaled));
        let signaller = Arc::clone(&event);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            signaller.signal().unwrap();
        });

        assert!(event.wait(Some(Duration::MAX)).is_ok());
        handle.join().unwrap();
    }

    #[test]
    fn test_signal_after_close_fails() {
        let event = Event::new("test", EventState::Signaled);
        event.close();
        assert!(event.is_closed());
        assert!(!event.is_signaled());
        assert_eq!(event.signal(), Err(SyncError::Closed { signal: "test" }));
    }
}
