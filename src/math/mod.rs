mod aabb;
mod polygon;

pub use aabb::AABB;
pub use polygon::{
    distinct_vertex_count, point_in_polygon, polygon_crosses_segment, polygon_edges, segments_intersect,
    triangle_contains_point, Rect,
};
