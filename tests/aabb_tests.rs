use glam::{Mat4, Vec3};
use mesh_lasso::math::AABB;

#[cfg(test)]
mod aabb_tests {
    use super::*;

    #[test]
    fn test_aabb_union_creates_bounding_box() {
        let aabb1 = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 10.0));
        let aabb2 = AABB::new(Vec3::new(5.0, 5.0, 5.0), Vec3::new(15.0, 15.0, 15.0));

        let union = aabb1.union(&aabb2);

        assert_eq!(union.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(union.max, Vec3::new(15.0, 15.0, 15.0));
    }

    #[test]
    fn test_aabb_union_with_contained_box() {
        let outer = AABB::new(Vec3::ZERO, Vec3::splat(10.0));
        let inner = AABB::new(Vec3::splat(2.0), Vec3::splat(8.0));

        assert_eq!(outer.union(&inner), outer, "Union should equal larger box");
    }

    #[test]
    fn test_empty_box_is_union_identity() {
        let aabb = AABB::new(Vec3::new(-1.0, 2.0, -3.0), Vec3::new(1.0, 4.0, 3.0));

        assert!(AABB::empty().is_empty());
        assert_eq!(AABB::empty().union(&aabb), aabb);
    }

    #[test]
    fn test_from_points_of_triangle() {
        let aabb = AABB::from_points(&[
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 2.0, 0.5),
            Vec3::new(0.0, -3.0, 0.0),
        ]);

        assert_eq!(aabb.min, Vec3::new(-1.0, -3.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 0.5));
        assert_eq!(aabb.center(), Vec3::new(0.0, -0.5, 0.25));
    }

    #[test]
    fn test_corners_cover_every_extreme() {
        let aabb = AABB::new(Vec3::ZERO, Vec3::ONE);
        let corners = aabb.corners();

        assert_eq!(AABB::from_points(&corners), aabb);
        for (a, b) in AABB::EDGES {
            // every edge runs along exactly one axis
            let d = (corners[a] - corners[b]).abs();
            assert_eq!(d.x + d.y + d.z, 1.0, "edge {}-{}", a, b);
        }
    }

    #[test]
    fn test_transform_rotated_box() {
        let aabb = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let rotated = aabb.transform(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));

        let s = std::f32::consts::SQRT_2;
        assert!((rotated.max.x - s).abs() < 1e-5);
        assert!((rotated.max.z - s).abs() < 1e-5);
        assert!((rotated.max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_surface_area_unit_cube() {
        let aabb = AABB::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.surface_area(), 6.0);
    }
}
