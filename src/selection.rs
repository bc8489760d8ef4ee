//! Screen-space triangle selection against a closed lasso polygon.
//!
//! Everything here works in normalized device coordinates: mesh-space points
//! are pushed through `view_proj * world` and divided by `w`. Geometry behind
//! the camera has no meaningful projection, so triangles touching it are
//! never selected and bounds reaching it are always descended into.

use glam::{Mat4, Vec2, Vec3};

use crate::config::SelectionMode;
use crate::core::bvh::ShapeIntersection;
use crate::math::{
    distinct_vertex_count, point_in_polygon, polygon_crosses_segment, triangle_contains_point, Rect, AABB,
};
use crate::mesh::Mesh;

/// Project a mesh-space point to NDC; `None` at or behind the camera plane
pub fn project(mvp: &Mat4, point: Vec3) -> Option<Vec2> {
    let clip = *mvp * point.extend(1.0);
    if clip.w <= 0.0 || !clip.is_finite() {
        return None;
    }
    Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
}

/// Classify a mesh-space box by its projected screen rectangle
pub fn classify_bounds(bounds: &AABB, mvp: &Mat4, polygon: &[Vec2]) -> ShapeIntersection {
    let mut projected = [Vec2::ZERO; 8];
    for (slot, corner) in projected.iter_mut().zip(bounds.corners()) {
        match project(mvp, corner) {
            Some(p) => *slot = p,
            None => return ShapeIntersection::Intersected,
        }
    }

    classify_rect(&Rect::from_points(&projected), polygon)
}

/// Classify a screen rectangle against a polygon
pub fn classify_rect(rect: &Rect, polygon: &[Vec2]) -> ShapeIntersection {
    if !rect.overlaps(&Rect::from_points(polygon)) {
        return ShapeIntersection::NotIntersected;
    }

    if rect
        .edges()
        .iter()
        .any(|&(a, b)| polygon_crosses_segment(polygon, a, b))
    {
        return ShapeIntersection::Intersected;
    }

    let corners_inside = rect
        .corners()
        .iter()
        .filter(|&&c| point_in_polygon(c, polygon))
        .count();
    let vertex_inside = polygon.iter().any(|&p| rect.contains_strict(p));

    match (corners_inside, vertex_inside) {
        (4, false) => ShapeIntersection::Contained,
        (0, false) => ShapeIntersection::NotIntersected,
        _ => ShapeIntersection::Intersected,
    }
}

/// Per-triangle test on already projected vertices
///
/// `centroid` is the projection of the mesh-space centroid.
pub fn triangle_selected(
    tri: [Vec2; 3],
    centroid: Vec2,
    polygon: &[Vec2],
    mode: SelectionMode,
) -> bool {
    match mode {
        SelectionMode::Centroid => point_in_polygon(centroid, polygon),
        SelectionMode::Intersection => {
            let [a, b, c] = tri;
            tri.iter().any(|&v| point_in_polygon(v, polygon))
                || polygon_crosses_segment(polygon, a, b)
                || polygon_crosses_segment(polygon, b, c)
                || polygon_crosses_segment(polygon, c, a)
                || triangle_contains_point(a, b, c, polygon[0])
        }
    }
}

fn test_triangle(
    mesh: &Mesh,
    index: u32,
    mvp: &Mat4,
    polygon: &[Vec2],
    mode: SelectionMode,
) -> bool {
    let [a, b, c] = mesh.geometry().triangle(index as usize);
    let (Some(pa), Some(pb), Some(pc)) = (project(mvp, a), project(mvp, b), project(mvp, c))
    else {
        return false;
    };
    let Some(centroid) = project(mvp, (a + b + c) / 3.0) else {
        return false;
    };
    triangle_selected([pa, pb, pc], centroid, polygon, mode)
}

/// Indices of the triangles of `mesh` selected by `polygon`, sorted ascending
///
/// `mvp` maps mesh space to clip space. The bounds tree is used when present
/// and `use_bounds_tree` is set; otherwise every triangle is tested. Both
/// paths give the same set. Outlines with fewer than three distinct vertices
/// enclose nothing and select nothing.
pub fn select_triangles(
    mesh: &Mesh,
    mvp: &Mat4,
    polygon: &[Vec2],
    mode: SelectionMode,
    use_bounds_tree: bool,
) -> Vec<u32> {
    if distinct_vertex_count(polygon) < 3 {
        return Vec::new();
    }

    let mut selected = Vec::new();
    match mesh.bounds_tree().filter(|_| use_bounds_tree) {
        Some(tree) => tree.shapecast(
            &mut |bounds: &AABB| classify_bounds(bounds, mvp, polygon),
            &mut |indices: &[u32], contained: bool| {
                if contained {
                    selected.extend_from_slice(indices);
                } else {
                    selected.extend(
                        indices
                            .iter()
                            .copied()
                            .filter(|&i| test_triangle(mesh, i, mvp, polygon, mode)),
                    );
                }
            },
        ),
        None => {
            let count = mesh.geometry().triangle_count() as u32;
            selected.extend((0..count).filter(|&i| test_triangle(mesh, i, mvp, polygon, mode)));
        }
    }

    selected.sort_unstable();
    selected
}
