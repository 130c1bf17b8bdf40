//! Time management for the game loop.
//!
//! `Time` is the only clock in the simulation. Systems never read it
//! directly; the frame loop passes `now_seconds()` and `delta_seconds()`
//! into every update call.

use std::time::{Duration, Instant};

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time of the last wall-clock frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Update timing from the wall clock at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.step(now - self.last_frame);
        self.last_frame = now;
    }

    /// Advance by an explicit delta without consulting the wall clock.
    /// Headless runs and tests drive the clock this way.
    pub fn advance(&mut self, delta: Duration) {
        self.step(delta);
    }

    fn step(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Monotonic timestamp in seconds since start.
    pub fn now_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
