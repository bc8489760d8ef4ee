use crate::core::timer::{FixedHz, FrameClock};

/// Seconds between FPS reports
pub const REPORT_INTERVAL: f32 = 1.0;

/// Frame rate counter
///
/// Every frame is sampled; the averaged rate is refreshed once per
/// [`REPORT_INTERVAL`].
#[derive(Debug)]
pub struct FrameStats {
    clock: FrameClock,
    report: FixedHz,
    frames: u32,
    elapsed: f32,
    fps: f32,
    frame_ms: f32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            clock: FrameClock::new(),
            report: FixedHz::every(REPORT_INTERVAL),
            frames: 0,
            elapsed: 0.0,
            fps: 0.0,
            frame_ms: 0.0,
        }
    }

    /// Sample the wall clock; returns the frame delta in seconds
    pub fn begin_frame(&mut self) -> f32 {
        let delta = self.clock.tick();
        self.record(delta);
        delta
    }

    /// Record a frame of `delta` seconds; true when a new FPS value is ready
    pub fn record(&mut self, delta: f32) -> bool {
        self.frames += 1;
        self.elapsed += delta;
        self.frame_ms = delta * 1000.0;

        if !self.report.tick(delta) {
            return false;
        }

        self.fps = if self.elapsed > 0.0 {
            self.frames as f32 / self.elapsed
        } else {
            0.0
        };
        log::debug!("FPS: {:.1} ({:.2} ms)", self.fps, self.frame_ms);
        self.frames = 0;
        self.elapsed = 0.0;
        true
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_ms(&self) -> f32 {
        self.frame_ms
    }

    pub fn reset(&mut self) {
        self.clock.reset();
        self.frames = 0;
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_after_one_second() {
        let mut stats = FrameStats::new();
        for _ in 0..59 {
            assert!(!stats.record(1.0 / 60.0));
        }
        assert!(stats.record(1.0 / 60.0 + 1e-4));
        assert!((stats.fps() - 60.0).abs() < 0.5);
        assert!((stats.frame_ms() - 16.77).abs() < 0.1);
    }

    #[test]
    fn fps_zero_before_first_report() {
        let mut stats = FrameStats::new();
        stats.record(0.1);
        assert_eq!(stats.fps(), 0.0);
        assert!((stats.frame_ms() - 100.0).abs() < 1e-3);
    }
}
