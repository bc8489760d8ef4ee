use crate::math::AABB;
use glam::Vec3;

/// Maximum primitives per leaf node before splitting
const MAX_LEAF_SIZE: usize = 4;

/// Number of SAH buckets for binned building
const SAH_BUCKETS: usize = 12;

/// BVH node using compact representation
#[derive(Clone, Debug)]
pub enum BVHNode {
    Leaf {
        bounds: AABB,
        primitive_indices: Vec<u32>,
    },
    Internal {
        bounds: AABB,
        left: Box<BVHNode>,
        right: Box<BVHNode>,
    },
}

/// Primitive trait for objects that can be inserted into BVH
pub trait BVHPrimitive {
    fn bounds(&self) -> AABB;
    fn centroid(&self) -> Vec3 {
        self.bounds().center()
    }
}

/// Outcome of testing a node's bounds against a query shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeIntersection {
    /// Bounds lie entirely inside the shape
    Contained,
    /// Bounds partially overlap the shape
    Intersected,
    /// Bounds and shape are disjoint
    NotIntersected,
}

/// BVH build statistics for profiling
#[derive(Debug, Clone, Copy)]
pub struct BVHStats {
    pub num_nodes: usize,
    pub num_leaves: usize,
    pub max_depth: usize,
    pub total_primitives: usize,
    pub avg_leaf_size: f32,
}

/// Per-primitive data cached for the duration of a build
#[derive(Debug, Clone, Copy)]
struct BuildEntry {
    index: u32,
    bounds: AABB,
    centroid: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    bounds: AABB,
    count: usize,
}

impl Default for Bucket {
    fn default() -> Self {
        Self {
            bounds: AABB::empty(),
            count: 0,
        }
    }
}

impl Bucket {
    fn add(&mut self, bounds: &AABB, count: usize) {
        self.bounds = self.bounds.union(bounds);
        self.count += count;
    }
}

/// Entries binned below `bucket` on `axis` go left
#[derive(Debug, Clone, Copy)]
struct Split {
    axis: usize,
    bucket: usize,
    cost: f32,
}

impl BVHNode {
    /// Build BVH using binned SAH (Surface Area Heuristic) over primitive centroids
    pub fn build<P: BVHPrimitive>(primitives: &[P]) -> Self {
        let mut entries: Vec<BuildEntry> = primitives
            .iter()
            .enumerate()
            .map(|(i, p)| BuildEntry {
                index: i as u32,
                bounds: p.bounds(),
                centroid: p.centroid(),
            })
            .collect();

        Self::build_recursive(&mut entries)
    }

    fn build_recursive(entries: &mut [BuildEntry]) -> Self {
        let bounds = entries
            .iter()
            .fold(AABB::empty(), |acc, e| acc.union(&e.bounds));

        if entries.len() <= MAX_LEAF_SIZE {
            return Self::leaf(bounds, entries);
        }

        let centroid_bounds = entries
            .iter()
            .fold(AABB::empty(), |acc, e| acc.expand(e.centroid));

        let mid = match Self::find_best_split(entries, &centroid_bounds) {
            Some(split) => Self::partition(entries, &centroid_bounds, &split),
            None => 0,
        };

        let mid = if mid == 0 || mid == entries.len() {
            // Median split on the widest centroid axis
            let axis = Self::widest_axis(&centroid_bounds);
            if centroid_bounds.max[axis] <= centroid_bounds.min[axis] {
                // All centroids coincide
                return Self::leaf(bounds, entries);
            }
            let half = entries.len() / 2;
            entries.select_nth_unstable_by(half, |a, b| {
                a.centroid[axis].total_cmp(&b.centroid[axis])
            });
            half
        } else {
            mid
        };

        let (left, right) = entries.split_at_mut(mid);
        BVHNode::Internal {
            bounds,
            left: Box::new(Self::build_recursive(left)),
            right: Box::new(Self::build_recursive(right)),
        }
    }

    fn leaf(bounds: AABB, entries: &[BuildEntry]) -> Self {
        BVHNode::Leaf {
            bounds,
            primitive_indices: entries.iter().map(|e| e.index).collect(),
        }
    }

    fn widest_axis(bounds: &AABB) -> usize {
        let extent = bounds.max - bounds.min;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    fn find_best_split(entries: &[BuildEntry], centroid_bounds: &AABB) -> Option<Split> {
        (0..3)
            .filter_map(|axis| Self::evaluate_sah_axis(entries, centroid_bounds, axis))
            .min_by(|a, b| a.cost.total_cmp(&b.cost))
    }

    fn bucket_of(centroid: Vec3, centroid_bounds: &AABB, axis: usize) -> usize {
        let extent = centroid_bounds.max[axis] - centroid_bounds.min[axis];
        let offset = (centroid[axis] - centroid_bounds.min[axis]) / extent;
        ((offset * SAH_BUCKETS as f32) as usize).min(SAH_BUCKETS - 1)
    }

    /// Cheapest bucket boundary on `axis`, `None` when the centroids are flat
    fn evaluate_sah_axis(
        entries: &[BuildEntry],
        centroid_bounds: &AABB,
        axis: usize,
    ) -> Option<Split> {
        if centroid_bounds.max[axis] - centroid_bounds.min[axis] < 1e-6 {
            return None;
        }

        let mut buckets = [Bucket::default(); SAH_BUCKETS];
        for entry in entries {
            buckets[Self::bucket_of(entry.centroid, centroid_bounds, axis)].add(&entry.bounds, 1);
        }

        // Suffix sweep: right side of every boundary in one pass
        let mut right_side = [(0.0f32, 0usize); SAH_BUCKETS];
        let mut right = Bucket::default();
        for i in (1..SAH_BUCKETS).rev() {
            right.add(&buckets[i].bounds, buckets[i].count);
            right_side[i] = (right.bounds.surface_area(), right.count);
        }

        let mut best: Option<Split> = None;
        let mut left = Bucket::default();
        for split in 1..SAH_BUCKETS {
            left.add(&buckets[split - 1].bounds, buckets[split - 1].count);
            let (right_area, right_count) = right_side[split];
            if left.count == 0 || right_count == 0 {
                continue;
            }

            let cost = Self::sah_cost(
                left.bounds.surface_area(),
                left.count,
                right_area,
                right_count,
            );
            if best.map_or(true, |b| cost < b.cost) {
                best = Some(Split {
                    axis,
                    bucket: split,
                    cost,
                });
            }
        }

        best
    }

    fn sah_cost(left_area: f32, left_count: usize, right_area: f32, right_count: usize) -> f32 {
        const TRAVERSAL_COST: f32 = 0.125;
        const INTERSECTION_COST: f32 = 1.0;

        TRAVERSAL_COST
            + INTERSECTION_COST * (left_area * left_count as f32 + right_area * right_count as f32)
    }

    /// Reorder so entries left of the split come first; returns their count
    fn partition(entries: &mut [BuildEntry], centroid_bounds: &AABB, split: &Split) -> usize {
        let mut left = 0;
        let mut right = entries.len();

        while left < right {
            if Self::bucket_of(entries[left].centroid, centroid_bounds, split.axis) < split.bucket {
                left += 1;
            } else {
                right -= 1;
                entries.swap(left, right);
            }
        }

        left
    }

    pub fn bounds(&self) -> &AABB {
        match self {
            BVHNode::Leaf { bounds, .. } => bounds,
            BVHNode::Internal { bounds, .. } => bounds,
        }
    }

    /// Gather statistics about the BVH
    pub fn stats(&self) -> BVHStats {
        let mut stats = BVHStats {
            num_nodes: 0,
            num_leaves: 0,
            max_depth: 0,
            total_primitives: 0,
            avg_leaf_size: 0.0,
        };

        self.gather_stats(&mut stats, 0);

        if stats.num_leaves > 0 {
            stats.avg_leaf_size = stats.total_primitives as f32 / stats.num_leaves as f32;
        }

        stats
    }

    fn gather_stats(&self, stats: &mut BVHStats, depth: usize) {
        stats.num_nodes += 1;
        stats.max_depth = stats.max_depth.max(depth);

        match self {
            BVHNode::Leaf {
                primitive_indices, ..
            } => {
                stats.num_leaves += 1;
                stats.total_primitives += primitive_indices.len();
            }
            BVHNode::Internal { left, right, .. } => {
                left.gather_stats(stats, depth + 1);
                right.gather_stats(stats, depth + 1);
            }
        }
    }

    /// Append every primitive index below this node
    pub fn collect_primitives(&self, out: &mut Vec<u32>) {
        match self {
            BVHNode::Leaf {
                primitive_indices, ..
            } => out.extend_from_slice(primitive_indices),
            BVHNode::Internal { left, right, .. } => {
                left.collect_primitives(out);
                right.collect_primitives(out);
            }
        }
    }

    /// Traverse the tree against a query shape
    ///
    /// `classify` is asked about each visited node's bounds. Disjoint nodes are
    /// pruned, contained subtrees are reported whole with `contained = true`,
    /// and leaves of intersected branches are reported with `contained = false`
    /// so the caller can test their primitives individually.
    pub fn shapecast<C, V>(&self, classify: &mut C, visit: &mut V)
    where
        C: FnMut(&AABB) -> ShapeIntersection,
        V: FnMut(&[u32], bool),
    {
        match classify(self.bounds()) {
            ShapeIntersection::NotIntersected => {}
            ShapeIntersection::Contained => {
                let mut subtree = Vec::new();
                self.collect_primitives(&mut subtree);
                visit(&subtree, true);
            }
            ShapeIntersection::Intersected => match self {
                BVHNode::Leaf {
                    primitive_indices, ..
                } => visit(primitive_indices, false),
                BVHNode::Internal { left, right, .. } => {
                    left.shapecast(classify, visit);
                    right.shapecast(classify, visit);
                }
            },
        }
    }

    /// Bounds of every node exactly `max_depth` deep, plus shallower leaves
    pub fn boxes_to_depth(&self, max_depth: usize) -> Vec<AABB> {
        let mut boxes = Vec::new();
        self.gather_boxes(max_depth, 0, &mut boxes);
        boxes
    }

    fn gather_boxes(&self, max_depth: usize, depth: usize, boxes: &mut Vec<AABB>) {
        match self {
            BVHNode::Internal { left, right, .. } if depth < max_depth => {
                left.gather_boxes(max_depth, depth + 1, boxes);
                right.gather_boxes(max_depth, depth + 1, boxes);
            }
            node if !node.bounds().is_empty() => boxes.push(*node.bounds()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestPrimitive {
        bounds: AABB,
    }

    impl BVHPrimitive for TestPrimitive {
        fn bounds(&self) -> AABB {
            self.bounds
        }
    }

    fn row(count: usize) -> Vec<TestPrimitive> {
        (0..count)
            .map(|i| TestPrimitive {
                bounds: AABB::new(
                    Vec3::new(i as f32 * 10.0, 0.0, 0.0),
                    Vec3::new(i as f32 * 10.0 + 1.0, 1.0, 1.0),
                ),
            })
            .collect()
    }

    #[test]
    fn test_bvh_single_primitive() {
        let bvh = BVHNode::build(&row(1));
        match bvh {
            BVHNode::Leaf {
                primitive_indices, ..
            } => assert_eq!(primitive_indices, vec![0]),
            _ => panic!("Expected leaf node"),
        }
    }

    #[test]
    fn test_bvh_empty_input() {
        let bvh = BVHNode::build::<TestPrimitive>(&[]);
        assert!(bvh.bounds().is_empty());
        assert_eq!(bvh.stats().total_primitives, 0);
        assert!(bvh.boxes_to_depth(4).is_empty());
    }

    #[test]
    fn test_bvh_split() {
        let bvh = BVHNode::build(&row(5));
        assert!(matches!(bvh, BVHNode::Internal { .. }));
    }

    #[test]
    fn test_bvh_stats() {
        let stats = BVHNode::build(&row(10)).stats();
        assert_eq!(stats.total_primitives, 10);
        assert!(stats.num_leaves > 0);
        assert!(stats.max_depth > 0);
        assert!(stats.avg_leaf_size > 0.0);
    }

    #[test]
    fn test_coincident_centroids_stay_in_one_leaf() {
        let stacked = vec![
            TestPrimitive {
                bounds: AABB::new(Vec3::ZERO, Vec3::ONE),
            };
            9
        ];
        let bvh = BVHNode::build(&stacked);
        assert_eq!(bvh.stats().num_leaves, 1);
        assert_eq!(bvh.stats().total_primitives, 9);
    }

    #[test]
    fn test_every_leaf_is_inside_its_parent() {
        fn check(node: &BVHNode) {
            if let BVHNode::Internal { bounds, left, right } = node {
                for child in [left, right] {
                    assert_eq!(bounds.union(child.bounds()), *bounds);
                    check(child);
                }
            }
        }
        check(&BVHNode::build(&row(50)));
    }

    #[test]
    fn test_sah_cost_calculation() {
        let cost = BVHNode::sah_cost(100.0, 5, 200.0, 10);
        assert!(cost > 0.0);
        assert!(BVHNode::sah_cost(50.0, 2, 50.0, 2) < cost);
    }

    #[test]
    fn test_collect_primitives_covers_everything() {
        let bvh = BVHNode::build(&row(37));
        let mut all = Vec::new();
        bvh.collect_primitives(&mut all);
        all.sort_unstable();
        assert_eq!(all, (0..37).collect::<Vec<u32>>());
    }

    #[test]
    fn test_shapecast_prunes_disjoint_nodes() {
        let bvh = BVHNode::build(&row(32));
        // Everything with min.x below 100 counts as inside the query
        let mut classify = |b: &AABB| {
            if b.max.x < 100.0 {
                ShapeIntersection::Contained
            } else if b.min.x >= 100.0 {
                ShapeIntersection::NotIntersected
            } else {
                ShapeIntersection::Intersected
            }
        };

        let mut hits = Vec::new();
        bvh.shapecast(&mut classify, &mut |indices, contained| {
            if contained {
                hits.extend_from_slice(indices);
            } else {
                hits.extend(indices.iter().copied().filter(|&i| (i as f32) * 10.0 < 100.0));
            }
        });

        hits.sort_unstable();
        assert_eq!(hits, (0..10).collect::<Vec<u32>>());
    }

    #[test]
    fn test_boxes_to_depth() {
        let bvh = BVHNode::build(&row(64));
        assert_eq!(bvh.boxes_to_depth(0).len(), 1);
        assert_eq!(bvh.boxes_to_depth(1).len(), 2);

        // Past the tree depth we get exactly the leaves
        let stats = bvh.stats();
        assert_eq!(bvh.boxes_to_depth(stats.max_depth + 5).len(), stats.num_leaves);
    }
}
