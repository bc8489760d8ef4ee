use glam::Vec3;
use mesh_lasso::camera::PerspectiveCamera;
use mesh_lasso::lasso::{lasso_scale, LassoOverlay, LASSO_DEPTH};

fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-5, "{} != {}", a, b);
}

#[cfg(test)]
mod lasso_scale_tests {
    use super::*;

    #[test]
    fn test_scale_fov_75_depth_02() {
        let aspect = 16.0 / 9.0;
        let scale = lasso_scale(75.0, -0.2, aspect);

        let y = (75.0f32.to_radians() / 2.0).tan() * -0.2;
        assert_close(scale.y, -y);
        assert_close(scale.x, -y * aspect);
        assert_eq!(scale.z, 1.0);
        assert!(scale.x > 0.0 && scale.y > 0.0);
    }

    #[test]
    fn test_scale_fov_50_depth_05() {
        let scale = lasso_scale(50.0, -0.5, 1.0);

        let y = (50.0f32.to_radians() / 2.0).tan() * -0.5;
        assert_close(scale.y, -y);
        assert_close(scale.x, -y);
    }

    #[test]
    fn test_overlay_tracks_camera_aspect() {
        let mut camera = PerspectiveCamera::new(1.0);
        let mut overlay = LassoOverlay::new();

        overlay.update_scale(&camera);
        assert_eq!(overlay.scale(), lasso_scale(camera.fov, LASSO_DEPTH, 1.0));

        camera.set_viewport(1600, 800);
        overlay.update_scale(&camera);
        assert_close(overlay.scale().x, overlay.scale().y * 2.0);
    }

    #[test]
    fn test_ndc_corner_lands_on_frustum_edge() {
        let camera = PerspectiveCamera::new(4.0 / 3.0);
        let mut overlay = LassoOverlay::new();
        overlay.update_scale(&camera);

        // NDC (1, 1) on the lasso plane must project back to the screen corner
        let corner = overlay.local_matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        let clip = camera.projection_matrix() * corner.extend(1.0);
        assert_close(clip.x / clip.w, 1.0);
        assert_close(clip.y / clip.w, 1.0);
    }
}
