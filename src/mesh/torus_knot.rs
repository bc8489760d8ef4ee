use glam::Vec3;
use std::f32::consts::TAU;

use super::IndexedGeometry;

/// Parametric (p, q) torus knot with a circular tube swept along it
#[derive(Debug, Clone, Copy)]
pub struct TorusKnot {
    pub radius: f32,
    pub tube: f32,
    pub tubular_segments: u32,
    pub radial_segments: u32,
    pub p: u32,
    pub q: u32,
}

impl Default for TorusKnot {
    fn default() -> Self {
        Self {
            radius: 1.5,
            tube: 0.5,
            tubular_segments: 500,
            radial_segments: 60,
            p: 2,
            q: 3,
        }
    }
}

impl TorusKnot {
    pub fn new(radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32) -> Self {
        Self {
            radius,
            tube,
            tubular_segments: tubular_segments.max(3),
            radial_segments: radial_segments.max(3),
            ..Self::default()
        }
    }

    pub fn triangle_count(&self) -> usize {
        (self.tubular_segments * self.radial_segments * 2) as usize
    }

    fn curve_point(&self, u: f32) -> Vec3 {
        let (p, q) = (self.p as f32, self.q as f32);
        let qu_over_p = q / p * u;
        let cs = qu_over_p.cos();

        Vec3::new(
            self.radius * (2.0 + cs) * 0.5 * u.cos(),
            self.radius * (2.0 + cs) * 0.5 * u.sin(),
            self.radius * qu_over_p.sin() * 0.5,
        )
    }

    pub fn build(&self) -> IndexedGeometry {
        let tubular = self.tubular_segments;
        let radial = self.radial_segments;
        let vertex_count = ((tubular + 1) * (radial + 1)) as usize;

        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);

        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * self.p as f32 * TAU;

            // Frenet-like frame from two nearby curve samples
            let p1 = self.curve_point(u);
            let p2 = self.curve_point(u + 0.01);
            let t = p2 - p1;
            let n = p2 + p1;
            let b = t.cross(n).normalize();
            let n = b.cross(t).normalize();

            for j in 0..=radial {
                let v = j as f32 / radial as f32 * TAU;
                let cx = -self.tube * v.cos();
                let cy = self.tube * v.sin();

                let vertex = p1 + n * cx + b * cy;
                positions.push(vertex);
                normals.push((vertex - p1).normalize());
            }
        }

        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        for j in 1..=tubular {
            for i in 1..=radial {
                let a = (radial + 1) * (j - 1) + (i - 1);
                let b = (radial + 1) * j + (i - 1);
                let c = (radial + 1) * j + i;
                let d = (radial + 1) * (j - 1) + i;

                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        IndexedGeometry {
            positions,
            normals,
            indices,
        }
    }
}
