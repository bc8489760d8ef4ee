use glam::Vec3;

use crate::core::bvh::BVHNode;
use crate::math::AABB;

/// Wire boxes of a bounds tree down to a fixed depth
#[derive(Debug, Clone)]
pub struct BvhHelper {
    depth: usize,
    segments: Vec<Vec3>,
}

impl BvhHelper {
    pub fn new(tree: &BVHNode, depth: usize) -> Self {
        let mut helper = Self {
            depth,
            segments: Vec::new(),
        };
        helper.rebuild(tree);
        helper
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Line-list vertices in mesh space
    pub fn segments(&self) -> &[Vec3] {
        &self.segments
    }

    /// Returns true if the depth changed and the lines were rebuilt
    pub fn set_depth(&mut self, tree: &BVHNode, depth: usize) -> bool {
        if depth == self.depth {
            return false;
        }
        self.depth = depth;
        self.rebuild(tree);
        true
    }

    pub fn rebuild(&mut self, tree: &BVHNode) {
        let boxes = tree.boxes_to_depth(self.depth);
        self.segments.clear();
        self.segments.reserve(boxes.len() * AABB::EDGES.len() * 2);
        for aabb in &boxes {
            let corners = aabb.corners();
            for (a, b) in AABB::EDGES {
                self.segments.push(corners[a]);
                self.segments.push(corners[b]);
            }
        }
        log::debug!("BVH helper: {} boxes at depth {}", boxes.len(), self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Mesh, StandardMaterial, TorusKnot};

    fn tree() -> BVHNode {
        let geometry = TorusKnot::new(1.0, 0.3, 32, 8).build().to_non_indexed();
        let mut mesh = Mesh::new(geometry, StandardMaterial::default());
        mesh.compute_bounds_tree().clone()
    }

    #[test]
    fn root_only_at_depth_zero() {
        let helper = BvhHelper::new(&tree(), 0);
        assert_eq!(helper.segments().len(), 24);
    }

    #[test]
    fn rebuild_only_on_depth_change() {
        let tree = tree();
        let mut helper = BvhHelper::new(&tree, 2);
        assert!(!helper.set_depth(&tree, 2));
        assert!(helper.set_depth(&tree, 3));
        assert_eq!(helper.depth(), 3);
        assert!(helper.segments().len() > 24);
    }
}
