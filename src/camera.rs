use glam::{Mat4, Vec3};

pub const DEFAULT_FOV: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const MAX_FAR: f32 = 100.0;
pub const INITIAL_POSITION: Vec3 = Vec3::new(2.0, 4.0, 6.0);

/// Perspective camera looking at a target point
///
/// `fov` is the vertical field of view in degrees. The projection matrix is
/// cached; call [`PerspectiveCamera::update_projection_matrix`] after
/// touching `fov`, `aspect`, `near` or `far` directly.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            fov: DEFAULT_FOV,
            aspect,
            near: DEFAULT_NEAR,
            far: MAX_FAR,
            position: INITIAL_POSITION,
            target: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn with_far(mut self, far: f32) -> Self {
        self.set_far(far);
        self
    }

    /// Far plane, clamped to `(near, MAX_FAR]`
    pub fn set_far(&mut self, far: f32) {
        self.far = if far.is_finite() && far > self.near {
            far.min(MAX_FAR)
        } else {
            MAX_FAR
        };
        self.update_projection_matrix();
    }

    /// Match a `width` x `height` viewport; zero-sized viewports are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        self.update_projection_matrix();
        true
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Camera-to-world transform
    pub fn world_matrix(&self) -> Mat4 {
        self.view_matrix().inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }
}
