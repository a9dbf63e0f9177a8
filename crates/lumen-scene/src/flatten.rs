//! Index expansion of every mesh into one shared vertex array.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::model::Scene;

/// Vertex layout consumed by the object pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PosNorTexVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texcoord: [f32; 2],
}

/// A mesh's slice of the shared vertex array.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct VertexSpan {
    pub first: u32,
    pub count: u32,
}

impl VertexSpan {
    pub fn range(&self) -> std::ops::Range<u32> {
        self.first..self.first + self.count
    }
}

/// Vertices of every mesh, plus where each mesh landed (indexed by `MeshId`).
#[derive(Debug, Clone, Default)]
pub struct FlatMeshes {
    pub vertices: Vec<PosNorTexVertex>,
    pub spans: Vec<VertexSpan>,
}

impl FlatMeshes {
    pub fn byte_len(&self) -> usize {
        std::mem::size_of_val(self.vertices.as_slice())
    }
}

/// Expands each mesh in id order.
///
/// Index ranges are validated by the loader, so every lookup here is in
/// bounds. Missing normals face `+Z`; missing texcoords are zero.
pub fn flatten(scene: &Scene) -> FlatMeshes {
    let total: usize = scene.meshes.iter().map(|m| m.draw_count() as usize).sum();
    let mut out = FlatMeshes {
        vertices: Vec::with_capacity(total),
        spans: Vec::with_capacity(scene.meshes.len()),
    };

    for mesh in &scene.meshes {
        let first = out.vertices.len() as u32;

        let vertex = |i: usize| PosNorTexVertex {
            position: mesh.positions[i].to_array(),
            normal: mesh.normals.as_ref().map_or(Vec3::Z, |n| n[i]).to_array(),
            texcoord: mesh.texcoords.as_ref().map_or(Vec2::ZERO, |t| t[i]).to_array(),
        };

        match &mesh.indices {
            Some(indices) => out.vertices.extend(indices.iter().map(|&i| vertex(i as usize))),
            None => out.vertices.extend((0..mesh.positions.len()).map(vertex)),
        }

        let count = out.vertices.len() as u32 - first;
        log::debug!("flattened mesh '{}': {count} vertices at {first}", mesh.name);
        out.spans.push(VertexSpan { first, count });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use crate::model::{Mesh, Topology};

    fn mesh(name: &str, positions: Vec<Vec3>, indices: Option<Vec<u32>>) -> Mesh {
        Mesh {
            name: name.into(),
            topology: Topology::TriangleList,
            count: indices.as_ref().map_or(positions.len(), Vec::len) as u32,
            bounds: Aabb::from_points(&positions),
            positions,
            normals: None,
            tangents: None,
            texcoords: None,
            colors: None,
            indices,
            material: None,
        }
    }

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<PosNorTexVertex>(), 32);
    }

    #[test]
    fn spans_are_contiguous_in_mesh_order() {
        let quad = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        let mut scene = Scene::new("s");
        scene.push_mesh(mesh("quad", quad.clone(), Some(vec![0, 1, 2, 0, 2, 3])));
        scene.push_mesh(mesh("tri", quad[..3].to_vec(), None));

        let flat = flatten(&scene);
        assert_eq!(flat.spans, vec![VertexSpan { first: 0, count: 6 }, VertexSpan { first: 6, count: 3 }]);
        assert_eq!(flat.vertices.len(), 9);
        assert_eq!(flat.byte_len(), 9 * 32);
    }

    #[test]
    fn expansion_follows_indices_and_defaults() {
        let mut scene = Scene::new("s");
        scene.push_mesh(mesh("m", vec![Vec3::X, Vec3::Y, Vec3::Z], Some(vec![2, 0, 1])));

        let flat = flatten(&scene);
        assert_eq!(flat.vertices[0].position, [0.0, 0.0, 1.0]);
        assert_eq!(flat.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(flat.vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(flat.vertices[0].texcoord, [0.0, 0.0]);
    }

    #[test]
    fn range_covers_span() {
        let s = VertexSpan { first: 6, count: 3 };
        assert_eq!(s.range(), 6..9);
    }
}
