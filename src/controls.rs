use glam::{Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::core::controller::Button;

const ROTATE_SPEED: f32 = 1.0;
const ZOOM_SPEED: f32 = 0.95;
/// Keeps the camera off the poles where `look_at` degenerates
const MAX_POLAR: f32 = std::f32::consts::PI - 0.01;
const MIN_POLAR: f32 = 0.01;

/// What a pointer drag does to the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitAction {
    Rotate,
    Pan,
    Dolly,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonBindings {
    pub primary: OrbitAction,
    pub secondary: OrbitAction,
    pub middle: OrbitAction,
}

impl Default for ButtonBindings {
    fn default() -> Self {
        Self {
            primary: OrbitAction::Pan,
            secondary: OrbitAction::Rotate,
            middle: OrbitAction::Dolly,
        }
    }
}

impl ButtonBindings {
    pub fn action(&self, button: Button) -> OrbitAction {
        match button {
            Button::Primary => self.primary,
            Button::Secondary => self.secondary,
            Button::Middle => self.middle,
        }
    }
}

/// Orbit/pan/zoom camera controller around a target point
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_pan: bool,
    pub enable_rotate: bool,
    pub bindings: ButtonBindings,
    active: OrbitAction,
    last: Option<Vec2>,
}

impl OrbitControls {
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            min_distance: 3.0,
            max_distance: camera.far,
            enable_pan: true,
            enable_rotate: true,
            bindings: ButtonBindings::default(),
            active: OrbitAction::None,
            last: None,
        }
    }

    pub fn active(&self) -> OrbitAction {
        self.active
    }

    pub fn pointer_down(&mut self, button: Button, x: f32, y: f32) {
        let action = match self.bindings.action(button) {
            OrbitAction::Pan if !self.enable_pan => OrbitAction::None,
            OrbitAction::Rotate if !self.enable_rotate => OrbitAction::None,
            action => action,
        };
        self.active = action;
        self.last = Some(Vec2::new(x, y));
    }

    pub fn pointer_up(&mut self) {
        self.active = OrbitAction::None;
        self.last = None;
    }

    /// Apply a drag to `camera`; `viewport_height` in pixels
    pub fn pointer_move(
        &mut self,
        camera: &mut PerspectiveCamera,
        x: f32,
        y: f32,
        viewport_height: f32,
    ) {
        let current = Vec2::new(x, y);
        let Some(last) = self.last.replace(current) else {
            return;
        };
        let delta = current - last;
        if viewport_height <= 0.0 || !delta.is_finite() {
            return;
        }

        match self.active {
            OrbitAction::Rotate => {
                let angle = std::f32::consts::TAU * delta / viewport_height * ROTATE_SPEED;
                self.rotate(camera, angle.x, angle.y);
            }
            OrbitAction::Pan => self.pan(camera, delta, viewport_height),
            OrbitAction::Dolly => {
                let scale = if delta.y > 0.0 { 1.0 / ZOOM_SPEED } else { ZOOM_SPEED };
                if delta.y != 0.0 {
                    self.dolly(camera, scale);
                }
            }
            OrbitAction::None => {}
        }
    }

    /// Positive `delta` zooms out
    pub fn wheel(&mut self, camera: &mut PerspectiveCamera, delta: f32) {
        if delta > 0.0 {
            self.dolly(camera, 1.0 / ZOOM_SPEED);
        } else if delta < 0.0 {
            self.dolly(camera, ZOOM_SPEED);
        }
    }

    /// Orbit by azimuth `theta` and polar `phi` radians
    pub fn rotate(&self, camera: &mut PerspectiveCamera, theta: f32, phi: f32) {
        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }

        let azimuth = offset.x.atan2(offset.z) - theta;
        let polar = ((offset.y / radius).clamp(-1.0, 1.0).acos() - phi).clamp(MIN_POLAR, MAX_POLAR);

        camera.position = camera.target
            + Vec3::new(
                radius * polar.sin() * azimuth.sin(),
                radius * polar.cos(),
                radius * polar.sin() * azimuth.cos(),
            );
    }

    /// Move camera and target together in the view plane
    pub fn pan(&self, camera: &mut PerspectiveCamera, delta: Vec2, viewport_height: f32) {
        let distance = camera.distance() * (camera.fov.to_radians() / 2.0).tan();
        let scale = 2.0 * distance / viewport_height;
        let offset = camera.right() * -delta.x * scale + camera.up() * delta.y * scale;
        camera.position += offset;
        camera.target += offset;
    }

    /// Scale the camera-target distance, clamped to the distance limits
    pub fn dolly(&self, camera: &mut PerspectiveCamera, scale: f32) {
        let offset = camera.position - camera.target;
        let radius = (offset.length() * scale).clamp(self.min_distance, self.max_distance);
        camera.position = camera.target + offset.normalize_or_zero() * radius;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (OrbitControls, PerspectiveCamera) {
        let camera = PerspectiveCamera::new(1.0);
        (OrbitControls::new(&camera), camera)
    }

    #[test]
    fn default_bindings() {
        let (controls, _) = setup();
        assert_eq!(controls.bindings.action(Button::Primary), OrbitAction::Pan);
        assert_eq!(controls.bindings.action(Button::Secondary), OrbitAction::Rotate);
    }

    #[test]
    fn disabled_pan_ignores_primary() {
        let (mut controls, mut camera) = setup();
        controls.enable_pan = false;
        controls.pointer_down(Button::Primary, 0.0, 0.0);
        assert_eq!(controls.active(), OrbitAction::None);

        let before = camera.position;
        controls.pointer_move(&mut camera, 50.0, 50.0, 600.0);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn rotate_preserves_distance() {
        let (mut controls, mut camera) = setup();
        let distance = camera.distance();
        controls.pointer_down(Button::Secondary, 100.0, 100.0);
        controls.pointer_move(&mut camera, 180.0, 140.0, 600.0);
        assert!((camera.distance() - distance).abs() < 1e-4);
        assert_ne!(camera.position, Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn pan_moves_target_with_camera() {
        let (mut controls, mut camera) = setup();
        let offset = camera.position - camera.target;
        controls.pointer_down(Button::Primary, 0.0, 0.0);
        controls.pointer_move(&mut camera, 30.0, 0.0, 600.0);
        assert!(camera.target.length() > 0.0);
        assert!(((camera.position - camera.target) - offset).length() < 1e-4);
    }

    #[test]
    fn wheel_respects_min_distance() {
        let (mut controls, mut camera) = setup();
        for _ in 0..200 {
            controls.wheel(&mut camera, -1.0);
        }
        assert!((camera.distance() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn pointer_up_ends_drag() {
        let (mut controls, _) = setup();
        controls.pointer_down(Button::Secondary, 0.0, 0.0);
        controls.pointer_up();
        assert_eq!(controls.active(), OrbitAction::None);
    }
}
