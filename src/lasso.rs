use glam::{Mat4, Vec3};

use crate::camera::PerspectiveCamera;
use crate::input::POINT_STRIDE;

/// Camera-space z of the lasso plane
pub const LASSO_DEPTH: f32 = -0.2;

/// Scale that maps NDC outline points onto the view plane at `depth`
///
/// With `y = tan(fov / 2) * depth` and `x = y * aspect`, the result is
/// `(-x, -y, 1)`: a negative depth in front of the camera gives a positive
/// scale, so NDC +x/+y stay screen right/up.
pub fn lasso_scale(fov_deg: f32, depth: f32, aspect: f32) -> Vec3 {
    let y = (fov_deg.to_radians() / 2.0).tan() * depth;
    let x = y * aspect;
    Vec3::new(-x, -y, 1.0)
}

/// Screen-space selection outline drawn as a child of the camera
#[derive(Debug, Clone)]
pub struct LassoOverlay {
    /// Line-list vertices, two per segment, in NDC with z = 0
    segments: Vec<Vec3>,
    scale: Vec3,
    depth: f32,
}

impl Default for LassoOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl LassoOverlay {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            scale: Vec3::ONE,
            depth: LASSO_DEPTH,
        }
    }

    pub fn segments(&self) -> &[Vec3] {
        &self.segments
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Rebuild the line list from flat `[x, y, z]` outline points
    pub fn rebuild(&mut self, points: &[f32]) {
        self.segments.clear();
        let vertices: Vec<Vec3> = points
            .chunks_exact(POINT_STRIDE)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();
        for pair in vertices.windows(2) {
            self.segments.extend_from_slice(&[pair[0], pair[1]]);
        }
    }

    pub fn update_scale(&mut self, camera: &PerspectiveCamera) {
        self.scale = lasso_scale(camera.fov, self.depth, camera.aspect);
    }

    /// Transform relative to the camera node
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            glam::Quat::IDENTITY,
            Vec3::new(0.0, 0.0, self.depth),
        )
    }
}
