use glam::Vec2;

/// Window dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Map a pixel position (origin top-left, y down) to normalized device
    /// coordinates in [-1, 1] with y up
    ///
    /// Returns `None` for non-finite input or an empty window.
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<Vec2> {
        if self.is_empty() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Vec2::new(
            x / self.width as f32 * 2.0 - 1.0,
            -(y / self.height as f32) * 2.0 + 1.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_dimensions_new() {
        let dims = WindowDimensions::new(1920, 1080);
        assert_eq!(dims.width, 1920);
        assert_eq!(dims.height, 1080);
    }

    #[test]
    fn test_window_dimensions_various_aspects() {
        let test_cases = [(640, 480), (1280, 720), (1920, 1080), (3840, 2160), (1, 1)];

        for (width, height) in test_cases {
            let dims = WindowDimensions::new(width, height);
            assert_eq!(dims.aspect(), width as f32 / height as f32);
        }
    }

    #[test]
    fn test_empty_window() {
        let dims = WindowDimensions::new(0, 480);
        assert!(dims.is_empty());
        assert_eq!(dims.aspect(), 1.0);
        assert_eq!(dims.to_ndc(10.0, 10.0), None);
    }

    #[test]
    fn test_ndc_corners() {
        let dims = WindowDimensions::new(800, 600);
        assert_eq!(dims.to_ndc(0.0, 0.0), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(dims.to_ndc(800.0, 600.0), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(dims.to_ndc(400.0, 300.0), Some(Vec2::ZERO));
    }

    #[test]
    fn test_ndc_rejects_nan() {
        let dims = WindowDimensions::new(800, 600);
        assert_eq!(dims.to_ndc(f32::NAN, 1.0), None);
        assert_eq!(dims.to_ndc(1.0, f32::INFINITY), None);
    }
}
