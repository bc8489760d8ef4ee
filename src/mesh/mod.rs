//! Triangle meshes, their materials and the bounds tree attached to them.

mod torus_knot;

pub use torus_knot::TorusKnot;

use glam::Vec3;

use crate::core::bvh::{BVHNode, BVHPrimitive};
use crate::math::AABB;

/// Shared-vertex triangle list
#[derive(Debug, Clone, Default)]
pub struct IndexedGeometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl IndexedGeometry {
    /// Expand into one vertex per triangle corner
    ///
    /// Missing or mismatched normals fall back to flat face normals.
    pub fn to_non_indexed(&self) -> Geometry {
        let positions = self.indices.iter().map(|&i| self.positions[i as usize]).collect();
        let normals = if self.normals.len() == self.positions.len() {
            self.indices.iter().map(|&i| self.normals[i as usize]).collect()
        } else {
            Vec::new()
        };
        Geometry::new(positions, normals)
    }
}

/// Non-indexed triangle list: vertices `3i..3i+3` form triangle `i`
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl Geometry {
    /// Trailing vertices that do not complete a triangle are dropped
    pub fn new(mut positions: Vec<Vec3>, mut normals: Vec<Vec3>) -> Self {
        let len = positions.len() / 3 * 3;
        positions.truncate(len);
        if normals.len() != len {
            normals = flat_normals(&positions);
        }
        Self { positions, normals }
    }

    /// Geometry with per-face normals
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self::new(positions, Vec::new())
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle(&self, index: usize) -> [Vec3; 3] {
        let base = index * 3;
        [
            self.positions[base],
            self.positions[base + 1],
            self.positions[base + 2],
        ]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.positions.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn bounds(&self) -> AABB {
        AABB::from_points(&self.positions)
    }

    /// Line-list vertices tracing every triangle edge
    pub fn wireframe_lines(&self) -> Vec<Vec3> {
        self.triangles()
            .flat_map(|[a, b, c]| [a, b, b, c, c, a])
            .collect()
    }
}

fn flat_normals(positions: &[Vec3]) -> Vec<Vec3> {
    positions
        .chunks_exact(3)
        .flat_map(|t| {
            let n = (t[1] - t[0]).cross(t[2] - t[0]).normalize_or_zero();
            [n, n, n]
        })
        .collect()
}

/// Physically based surface parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMaterial {
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub polygon_offset: bool,
    pub polygon_offset_factor: f32,
    pub polygon_offset_units: f32,
    pub wireframe: bool,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            roughness: 1.0,
            metalness: 0.0,
            polygon_offset: false,
            polygon_offset_factor: 0.0,
            polygon_offset_units: 0.0,
            wireframe: false,
        }
    }
}

impl StandardMaterial {
    /// Pushes the surface back in depth so overlay lines win ties
    pub fn with_polygon_offset(mut self, factor: f32, units: f32) -> Self {
        self.polygon_offset = true;
        self.polygon_offset_factor = factor;
        self.polygon_offset_units = units;
        self
    }
}

struct TrianglePrimitive {
    bounds: AABB,
    centroid: Vec3,
}

impl BVHPrimitive for TrianglePrimitive {
    fn bounds(&self) -> AABB {
        self.bounds
    }

    fn centroid(&self) -> Vec3 {
        self.centroid
    }
}

/// Geometry plus material, optionally indexed by a bounds tree
///
/// The tree indexes triangles of the current positions. It is built on demand
/// and dropped whenever the positions are replaced; it is never rebuilt
/// implicitly.
#[derive(Debug, Clone)]
pub struct Mesh {
    geometry: Geometry,
    pub material: StandardMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    bounds_tree: Option<BVHNode>,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: StandardMaterial) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
            bounds_tree: None,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn bounds_tree(&self) -> Option<&BVHNode> {
        self.bounds_tree.as_ref()
    }

    /// Build (or rebuild) the bounds tree from the current triangles
    pub fn compute_bounds_tree(&mut self) -> &BVHNode {
        let primitives: Vec<TrianglePrimitive> = self
            .geometry
            .triangles()
            .map(|t| TrianglePrimitive {
                bounds: AABB::from_points(&t),
                centroid: (t[0] + t[1] + t[2]) / 3.0,
            })
            .collect();

        self.bounds_tree.insert(BVHNode::build(&primitives))
    }

    pub fn dispose_bounds_tree(&mut self) {
        self.bounds_tree = None;
    }

    /// Replace vertex positions, invalidating the bounds tree
    pub fn set_positions(&mut self, positions: Vec<Vec3>) {
        self.geometry = Geometry::from_positions(positions);
        if self.bounds_tree.take().is_some() {
            log::debug!("Mesh positions replaced, bounds tree dropped");
        }
    }
}
