use glam::{Mat4, Vec3};

use crate::mesh::{Geometry, StandardMaterial};
use crate::scene::{AmbientLight, DirectionalLight};

/// Per-frame scene uniforms shared by the mesh and shadow passes
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub light_dir: [f32; 3],
    pub light_intensity: f32,
    pub light_color: [f32; 3],
    pub ambient_intensity: f32,
    pub ambient_color: [f32; 3],
    pub shadow_texel: f32,
}

impl Globals {
    pub fn new(
        view_proj: Mat4,
        light_view_proj: Mat4,
        light_dir: Vec3,
        sun: &DirectionalLight,
        ambient: &AmbientLight,
    ) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_view_proj: light_view_proj.to_cols_array_2d(),
            light_dir: light_dir.normalize_or_zero().to_array(),
            light_intensity: sun.intensity,
            light_color: sun.color,
            ambient_intensity: ambient.intensity,
            ambient_color: ambient.color,
            shadow_texel: 1.0 / sun.shadow_map_size.max(1) as f32,
        }
    }
}

/// Mesh transform and material
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub highlight: [f32; 4],
    /// x: receive shadow, y: roughness, z: metalness
    pub flags: [f32; 4],
}

impl ModelUniform {
    pub fn new(
        model: Mat4,
        material: &StandardMaterial,
        highlight: [f32; 3],
        receive_shadow: bool,
    ) -> Self {
        let [r, g, b] = material.color;
        let [hr, hg, hb] = highlight;
        Self {
            model: model.to_cols_array_2d(),
            color: [r, g, b, 1.0],
            highlight: [hr, hg, hb, 1.0],
            flags: [
                if receive_shadow { 1.0 } else { 0.0 },
                material.roughness,
                material.metalness,
                0.0,
            ],
        }
    }
}

/// Clip-space transform and flat color for a line list
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineUniform {
    pub transform: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl LineUniform {
    pub fn new(transform: Mat4, color: [f32; 3]) -> Self {
        let [r, g, b] = color;
        Self {
            transform: transform.to_cols_array_2d(),
            color: [r, g, b, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    pub fn from_geometry(geometry: &Geometry) -> Vec<MeshVertex> {
        geometry
            .positions()
            .iter()
            .zip(geometry.normals())
            .map(|(p, n)| MeshVertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect()
    }
}

/// Per-vertex selection weight, 1.0 for corners of selected triangles
pub struct SelectionVertex;

impl SelectionVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<f32>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Expand sorted triangle indices into per-vertex weights
    pub fn weights(selected: &[u32], vertex_count: usize) -> Vec<f32> {
        let mut weights = vec![0.0; vertex_count];
        for &triangle in selected {
            let base = triangle as usize * 3;
            if let Some(corners) = weights.get_mut(base..base + 3) {
                corners.fill(1.0);
            }
        }
        weights
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    pub fn from_points(points: &[Vec3]) -> Vec<LineVertex> {
        points
            .iter()
            .map(|p| LineVertex {
                position: p.to_array(),
            })
            .collect()
    }
}

/// Line-list indices tracing the edges of each non-indexed triangle
pub fn wireframe_indices(triangle_count: usize) -> Vec<u32> {
    (0..triangle_count as u32)
        .flat_map(|t| {
            let i = t * 3;
            [i, i + 1, i + 1, i + 2, i + 2, i]
        })
        .collect()
}
