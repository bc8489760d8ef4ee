use glam::Vec2;

/// Screen-space axis-aligned rectangle
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Vec2]) -> Self {
        points.iter().fold(
            Rect::new(Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |acc, &p| Rect::new(acc.min.min(p), acc.max.max(p)),
        )
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Strictly inside, boundary excluded
    pub fn contains_strict(&self, p: Vec2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Consecutive edges of a polygon, closing edge included
///
/// An explicitly closed polygon (last == first) yields one zero-length edge,
/// which every test below tolerates.
pub fn polygon_edges(polygon: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| (polygon[i], polygon[(i + 1) % n]))
}

/// Number of distinct vertices of an outline
///
/// Consecutive repeats collapse, and a closing point equal to the first does
/// not count.
pub fn distinct_vertex_count(polygon: &[Vec2]) -> usize {
    let mut open = polygon;
    while let [first, rest @ .., last] = open {
        if rest.is_empty() || first != last {
            break;
        }
        open = &open[..open.len() - 1];
    }
    let mut points: Vec<Vec2> = open.to_vec();
    points.dedup();
    points.len()
}

/// Even-odd point-in-polygon test
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    polygon_edges(polygon).fold(false, |inside, (a, b)| {
        let crosses = (a.y > p.y) != (b.y > p.y)
            && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
        inside ^ crosses
    })
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Segment-segment intersection, touching endpoints count
pub fn segments_intersect(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> bool {
    let d1 = orientation(b0, b1, a0);
    let d2 = orientation(b0, b1, a1);
    let d3 = orientation(a0, a1, b0);
    let d4 = orientation(a0, a1, b1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b0, b1, a0))
        || (d2 == 0.0 && on_segment(b0, b1, a1))
        || (d3 == 0.0 && on_segment(a0, a1, b0))
        || (d4 == 0.0 && on_segment(a0, a1, b1))
}

pub fn triangle_contains_point(a: Vec2, b: Vec2, c: Vec2, p: Vec2) -> bool {
    let d1 = orientation(a, b, p);
    let d2 = orientation(b, c, p);
    let d3 = orientation(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// True if any edge of `polygon` crosses the segment `a`-`b`
pub fn polygon_crosses_segment(polygon: &[Vec2], a: Vec2, b: Vec2) -> bool {
    polygon_edges(polygon).any(|(p0, p1)| segments_intersect(p0, p1, a, b))
}
