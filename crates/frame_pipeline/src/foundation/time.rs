//! Frame timing

use std::time::{Duration, Instant};

/// Wall-clock timer started at creation
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Start timing now
    pub fn start_new() -> Self {
        Self { started: Instant::now() }
    }

    /// Time since the stopwatch was started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Seconds since the stopwatch was started, as submitted in per-frame constants
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Return the elapsed time and start over
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let lap = now.duration_since(self.started);
        self.started = now;
        lap
    }
}

/// Running statistics over rendered frame durations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameTimings {
    frames: u32,
    total: Duration,
    fastest: Option<Duration>,
    slowest: Duration,
}

impl FrameTimings {
    /// Record one frame
    pub fn record(&mut self, frame: Duration) {
        self.frames += 1;
        self.total += frame;
        self.fastest = Some(self.fastest.map_or(frame, |fastest| fastest.min(frame)));
        self.slowest = self.slowest.max(frame);
    }

    /// Frames recorded
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    /// Mean frame duration, zero before the first frame
    pub fn mean(&self) -> Duration {
        self.total.checked_div(self.frames).unwrap_or_default()
    }

    /// Shortest frame recorded
    pub const fn fastest(&self) -> Option<Duration> {
        self.fastest
    }

    /// Longest frame recorded
    pub const fn slowest(&self) -> Duration {
        self.slowest
    }
}
