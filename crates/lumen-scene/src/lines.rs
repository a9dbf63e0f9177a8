use bytemuck::{Pod, Zeroable};

use crate::bounds::Aabb;

/// Vertex layout consumed by the line pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PosColVertex {
    pub position: [f32; 3],
    /// Linear RGBA8.
    pub color: [u8; 4],
}

/// Appends the twelve edges of `bounds` as a line list.
pub fn push_box(out: &mut Vec<PosColVertex>, bounds: &Aabb, color: [u8; 4]) {
    if bounds.is_empty() {
        return;
    }
    for (a, b) in bounds.edges() {
        out.push(PosColVertex { position: a.to_array(), color });
        out.push(PosColVertex { position: b.to_array(), color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn vertex_is_16_bytes() {
        assert_eq!(std::mem::size_of::<PosColVertex>(), 16);
    }

    #[test]
    fn box_is_24_vertices_and_empty_is_nothing() {
        let mut out = Vec::new();
        push_box(&mut out, &Aabb::new(Vec3::ZERO, Vec3::ONE), [255; 4]);
        assert_eq!(out.len(), 24);
        push_box(&mut out, &Aabb::EMPTY, [255; 4]);
        assert_eq!(out.len(), 24);
    }
}
