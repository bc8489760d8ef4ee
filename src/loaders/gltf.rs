use anyhow::{bail, Context, Result};
use glam::{Mat3, Mat4, Vec3};
use std::path::Path;

use crate::mesh::{Geometry, IndexedGeometry};

/// Loads every triangle of a glTF file into one non-indexed geometry
///
/// Node transforms are baked into the positions. Primitives without normals
/// make the whole geometry fall back to flat normals.
pub fn load_gltf_geometry(path: impl AsRef<Path>) -> Result<Geometry> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (gltf, buffers, _images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    log::debug!(
        "glTF loaded: {} scenes, {} nodes, {} meshes",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count()
    );

    let mut geometry = IndexedGeometry::default();
    let mut has_normals = true;

    for scene in gltf.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, &Mat4::IDENTITY, &mut geometry, &mut has_normals)?;
        }
    }

    if geometry.indices.is_empty() {
        bail!("No triangles found in glTF file: {:?}", path);
    }
    if !has_normals {
        geometry.normals.clear();
    }

    let geometry = geometry.to_non_indexed();
    log::info!("Extracted {} triangles from glTF", geometry.triangle_count());
    Ok(geometry)
}

/// Recursively processes glTF nodes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    geometry: &mut IndexedGeometry,
    has_normals: &mut bool,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, geometry, has_normals)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, geometry, has_normals)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    geometry: &mut IndexedGeometry,
    has_normals: &mut bool,
) -> Result<()> {
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let base = geometry.positions.len() as u32;

        let positions = reader
            .read_positions()
            .context("Mesh primitive has no positions")?;
        geometry
            .positions
            .extend(positions.map(|p| transform.transform_point3(Vec3::from_array(p))));
        let count = geometry.positions.len() as u32 - base;

        match reader.read_normals() {
            Some(normals) => geometry.normals.extend(
                normals.map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero()),
            ),
            None => {
                *has_normals = false;
                geometry
                    .normals
                    .extend(std::iter::repeat(Vec3::ZERO).take(count as usize));
            }
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..count).collect(),
        };
        if let Some(bad) = indices.iter().find(|&&i| i >= count) {
            bail!("Index {} out of range for {} vertices", bad, count);
        }

        let complete = indices.len() / 3 * 3;
        geometry
            .indices
            .extend(indices[..complete].iter().map(|&i| base + i));
    }

    Ok(())
}
