use std::time::Instant;

/// Longest frame delta handed to animation, in seconds
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Wall clock measuring time between frames
///
/// Deltas are clamped to [`MAX_FRAME_DELTA`] so a stalled window (dragged,
/// minimized) does not make auto-rotation jump on the next frame.
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
    max_delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_max_delta(MAX_FRAME_DELTA)
    }

    pub fn with_max_delta(max_delta: f32) -> Self {
        Self {
            last_tick: Instant::now(),
            max_delta,
        }
    }

    /// Seconds since the previous tick, at most `max_delta`
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta.min(self.max_delta)
    }

    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

/// Fixed rate timer, accumulates frame deltas and fires at a given frequency
#[derive(Debug, Clone, Copy)]
pub struct FixedHz {
    pub interval: f32,
    pub accumulator: f32,
}

impl FixedHz {
    pub fn new(hz: f32) -> Self {
        Self::every(1.0 / hz)
    }

    /// Fire once per elapsed interval
    pub fn every(seconds: f32) -> Self {
        Self {
            interval: seconds,
            accumulator: 0.0,
        }
    }

    /// Update with delta, returns true if should fire
    pub fn tick(&mut self, delta: f32) -> bool {
        self.accumulator += delta;
        if self.accumulator < self.interval {
            return false;
        }
        // A long stall fires once, not once per missed interval
        self.accumulator = (self.accumulator - self.interval) % self.interval;
        true
    }
}
