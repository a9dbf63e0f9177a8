//! Per-frame scene walk: world transforms, camera resolution, culling, and
//! draw-instance emission.
//!
//! The walk is iterative. Every stack record pairs a node with the
//! world-from-parent matrix it inherits, so there is no second stack to keep
//! in step. Roots are walked one after another in declaration order; within a
//! root, children are pushed in declaration order and popped last-first.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::bounds::Aabb;
use crate::camera::{node_view, projection};
use crate::flatten::{FlatMeshes, VertexSpan};
use crate::model::{CameraId, MeshId, NodeId, Scene};
use crate::textures::TexturePlan;

// ── walk ──────────────────────────────────────────────────────────────────

/// Iterator over `(node, world_from_local)` in stack-pop pre-order.
pub struct WorldWalk<'s> {
    scene: &'s Scene,
    roots: std::slice::Iter<'s, NodeId>,
    stack: Vec<(NodeId, Mat4)>,
}

impl<'s> WorldWalk<'s> {
    pub fn new(scene: &'s Scene) -> Self {
        Self { scene, roots: scene.roots.iter(), stack: Vec::new() }
    }
}

impl Iterator for WorldWalk<'_> {
    type Item = (NodeId, Mat4);

    fn next(&mut self) -> Option<Self::Item> {
        if self.stack.is_empty() {
            let root = *self.roots.next()?;
            self.stack.push((root, Mat4::IDENTITY));
        }

        let (id, world_from_parent) = self.stack.pop()?;
        let node = self.scene.node(id);
        let world_from_local = world_from_parent * node.parent_from_local;

        self.stack
            .extend(node.children.iter().map(|&c| (c, world_from_local)));

        Some((id, world_from_local))
    }
}

// ── visibility ────────────────────────────────────────────────────────────

/// Decides whether a mesh with local `bounds` placed by `world_from_local`
/// should be drawn.
pub trait Visibility {
    fn is_visible(&self, bounds: &Aabb, world_from_local: &Mat4) -> bool;
}

/// Accepts everything.
#[derive(Debug, Copy, Clone, Default)]
pub struct AlwaysVisible;

impl Visibility for AlwaysVisible {
    fn is_visible(&self, _bounds: &Aabb, _world_from_local: &Mat4) -> bool {
        true
    }
}

/// Rejects boxes entirely outside one of the six clip planes.
#[derive(Debug, Copy, Clone)]
pub struct FrustumCulling {
    /// `(n, d)` with inside meaning `n·p + d >= 0`, in world space.
    planes: [Vec4; 6],
}

impl FrustumCulling {
    /// Extracts planes from a clip-from-world matrix with depth in `[0, 1]`.
    pub fn new(clip_from_world: &Mat4) -> Self {
        let r = |i| clip_from_world.row(i);
        Self {
            planes: [
                r(3) + r(0),
                r(3) - r(0),
                r(3) + r(1),
                r(3) - r(1),
                r(2),
                r(3) - r(2),
            ],
        }
    }
}

impl Visibility for FrustumCulling {
    fn is_visible(&self, bounds: &Aabb, world_from_local: &Mat4) -> bool {
        if bounds.is_empty() {
            return false;
        }
        let world = bounds.transform(world_from_local);
        self.planes.iter().all(|p| {
            // Corner furthest along the plane normal.
            let v = glam::Vec3::new(
                if p.x >= 0.0 { world.max.x } else { world.min.x },
                if p.y >= 0.0 { world.max.y } else { world.min.y },
                if p.z >= 0.0 { world.max.z } else { world.min.z },
            );
            p.truncate().dot(v) + p.w >= 0.0
        })
    }
}

/// Selects a [`Visibility`] implementation at runtime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CullMode {
    #[default]
    None,
    Frustum,
}

// ── instances ─────────────────────────────────────────────────────────────

/// Per-instance transforms as laid out in the transform storage buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectTransform {
    pub clip_from_local: Mat4,
    pub world_from_local: Mat4,
    /// Currently equal to `world_from_local`; not inverse-transposed.
    pub world_from_local_normal: Mat4,
}

/// One draw emitted by traversal. Rebuilt each frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawInstance {
    pub mesh: MeshId,
    pub span: VertexSpan,
    pub transform: ObjectTransform,
    pub texture: u32,
    /// Mesh bounds in world space.
    pub world_bounds: Aabb,
}

/// Clip-from-world for a scene camera, taken from the last node in walk order
/// that carries it. `None` if no node does.
pub fn scene_camera(scene: &Scene, camera: CameraId) -> Option<Mat4> {
    let proj = projection(&scene.camera(camera).perspective);
    WorldWalk::new(scene)
        .filter(|(id, _)| scene.node(*id).camera == Some(camera))
        .last()
        .map(|(_, world_from_local)| proj * node_view(&world_from_local))
}

/// Walks the scene and appends one [`DrawInstance`] per visible mesh node.
///
/// `out` is cleared first so callers can reuse its allocation across frames.
pub fn collect_instances(
    scene: &Scene,
    meshes: &FlatMeshes,
    textures: &TexturePlan,
    clip_from_world: &Mat4,
    visibility: &dyn Visibility,
    out: &mut Vec<DrawInstance>,
) {
    out.clear();

    for (id, world_from_local) in WorldWalk::new(scene) {
        let Some(mesh_id) = scene.node(id).mesh else { continue };
        let mesh = scene.mesh(mesh_id);

        if !visibility.is_visible(&mesh.bounds, &world_from_local) {
            continue;
        }

        out.push(DrawInstance {
            mesh: mesh_id,
            span: meshes.spans[mesh_id.index()],
            transform: ObjectTransform {
                clip_from_local: *clip_from_world * world_from_local,
                world_from_local,
                world_from_local_normal: world_from_local,
            },
            texture: textures.slot_for(mesh),
            world_bounds: mesh.bounds.transform(&world_from_local),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use crate::flatten::flatten;
    use crate::model::{Camera, Mesh, Node, Perspective, Topology};
    use glam::{Quat, Vec3};

    fn quad_mesh(name: &str) -> Mesh {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        Mesh {
            name: name.into(),
            topology: Topology::TriangleList,
            count: 6,
            bounds: Aabb::from_points(&positions),
            positions,
            normals: None,
            tangents: None,
            texcoords: None,
            colors: None,
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
            material: None,
        }
    }

    fn translated(name: &str, t: Vec3) -> Node {
        Node::new(name, t, Quat::IDENTITY, Vec3::ONE)
    }

    fn names(scene: &Scene) -> Vec<&str> {
        WorldWalk::new(scene).map(|(id, _)| scene.node(id).name.as_str()).collect()
    }

    /// root(a, b(c)), second root d. Every node carries the quad.
    fn tree() -> Scene {
        let mut s = Scene::new("tree");
        let mesh = s.push_mesh(quad_mesh("quad"));
        let a = s.push_node(translated("a", Vec3::new(1.0, 0.0, 0.0)));
        let c = s.push_node(translated("c", Vec3::new(0.0, 0.0, 1.0)));
        let mut b = translated("b", Vec3::new(0.0, 1.0, 0.0));
        b.children = vec![c];
        let b = s.push_node(b);
        let mut root = translated("root", Vec3::new(10.0, 0.0, 0.0));
        root.children = vec![a, b];
        let root = s.push_node(root);
        let d = s.push_node(translated("d", Vec3::new(-10.0, 0.0, 0.0)));
        s.roots = vec![root, d];
        for n in &mut s.nodes {
            n.mesh = Some(mesh);
        }
        s
    }

    // ── walk order ────────────────────────────────────────────────────────

    #[test]
    fn walk_is_stack_pop_preorder_root_by_root() {
        assert_eq!(names(&tree()), vec!["root", "b", "c", "a", "d"]);
    }

    #[test]
    fn walk_accumulates_transforms() {
        let s = tree();
        let c = s.node_by_name("c").unwrap();
        let (_, m) = WorldWalk::new(&s).find(|(id, _)| *id == c).unwrap();
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(10.0, 1.0, 1.0));
    }

    #[test]
    fn shared_children_are_visited_per_parent() {
        let mut s = Scene::new("dag");
        let leaf = s.push_node(Node::identity("leaf"));
        let mut p = translated("p", Vec3::X);
        p.children = vec![leaf];
        let mut q = translated("q", Vec3::Y);
        q.children = vec![leaf];
        let (p, q) = (s.push_node(p), s.push_node(q));
        s.roots = vec![p, q];

        let leaves: Vec<Vec3> = WorldWalk::new(&s)
            .filter(|(id, _)| *id == leaf)
            .map(|(_, m)| m.transform_point3(Vec3::ZERO))
            .collect();
        assert_eq!(leaves, vec![Vec3::X, Vec3::Y]);
    }

    // ── instances ─────────────────────────────────────────────────────────

    #[test]
    fn single_quad_scene_yields_one_instance() {
        let mut s = Scene::new("one");
        let mesh = s.push_mesh(quad_mesh("quad"));
        let mut n = Node::identity("n");
        n.mesh = Some(mesh);
        s.roots = vec![s.push_node(n)];

        let flat = flatten(&s);
        let plan = TexturePlan::new(&s);
        let clip_from_world = Mat4::perspective_rh(1.0, 1.5, 0.1, 100.0)
            * Mat4::look_at_rh(Vec3::new(3.0, 3.0, 3.0), Vec3::ZERO, Vec3::Z);

        let mut out = Vec::new();
        collect_instances(&s, &flat, &plan, &clip_from_world, &AlwaysVisible, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].span, VertexSpan { first: 0, count: 6 });
        assert_eq!(out[0].transform.clip_from_local, clip_from_world * Mat4::IDENTITY);
        assert_eq!(out[0].transform.world_from_local, Mat4::IDENTITY);
        assert_eq!(out[0].transform.world_from_local_normal, Mat4::IDENTITY);
        assert_eq!(out[0].texture, crate::textures::CHECKERBOARD);
    }

    #[test]
    fn traversal_is_deterministic() {
        let s = tree();
        let flat = flatten(&s);
        let plan = TexturePlan::new(&s);
        let cfw = Mat4::perspective_rh(1.0, 1.0, 0.1, 50.0)
            * Mat4::look_at_rh(Vec3::new(0.0, -20.0, 5.0), Vec3::ZERO, Vec3::Z);

        let (mut first, mut second) = (Vec::new(), Vec::new());
        collect_instances(&s, &flat, &plan, &cfw, &AlwaysVisible, &mut first);
        collect_instances(&s, &flat, &plan, &cfw, &AlwaysVisible, &mut second);

        assert_eq!(first.len(), 5);
        let bytes = |v: &[DrawInstance]| -> Vec<u8> {
            v.iter()
                .flat_map(|d| {
                    let mut b = bytemuck::bytes_of(&d.transform).to_vec();
                    b.extend_from_slice(bytemuck::bytes_of(&[d.span.first, d.span.count, d.texture]));
                    b
                })
                .collect()
        };
        assert_eq!(bytes(&first), bytes(&second));
    }

    #[test]
    fn out_is_cleared_between_frames() {
        let s = tree();
        let (flat, plan) = (flatten(&s), TexturePlan::new(&s));
        let mut out = Vec::new();
        collect_instances(&s, &flat, &plan, &Mat4::IDENTITY, &AlwaysVisible, &mut out);
        collect_instances(&s, &flat, &plan, &Mat4::IDENTITY, &AlwaysVisible, &mut out);
        assert_eq!(out.len(), 5);
    }

    // ── culling ───────────────────────────────────────────────────────────

    fn looking_down_neg_y() -> Mat4 {
        Mat4::perspective_rh(0.8, 1.0, 0.1, 30.0)
            * Mat4::look_at_rh(Vec3::new(0.0, 20.0, 0.0), Vec3::ZERO, Vec3::Z)
    }

    #[test]
    fn frustum_rejects_box_behind_camera() {
        let cull = FrustumCulling::new(&looking_down_neg_y());
        let unit = Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5));
        assert!(cull.is_visible(&unit, &Mat4::IDENTITY));
        assert!(!cull.is_visible(&unit, &Mat4::from_translation(Vec3::new(0.0, 40.0, 0.0))));
        assert!(!cull.is_visible(&unit, &Mat4::from_translation(Vec3::new(0.0, -20.0, 0.0))));
        assert!(!cull.is_visible(&unit, &Mat4::from_translation(Vec3::new(50.0, 0.0, 0.0))));
    }

    #[test]
    fn frustum_keeps_box_straddling_a_plane() {
        let cull = FrustumCulling::new(&looking_down_neg_y());
        let wide = Aabb::new(Vec3::new(-100.0, -0.5, -0.5), Vec3::new(100.0, 0.5, 0.5));
        assert!(cull.is_visible(&wide, &Mat4::IDENTITY));
    }

    #[test]
    fn culling_only_removes_instances() {
        let s = tree();
        let (flat, plan) = (flatten(&s), TexturePlan::new(&s));
        let cfw = looking_down_neg_y();

        let (mut all, mut culled) = (Vec::new(), Vec::new());
        collect_instances(&s, &flat, &plan, &cfw, &AlwaysVisible, &mut all);
        collect_instances(&s, &flat, &plan, &cfw, &FrustumCulling::new(&cfw), &mut culled);

        assert!(culled.len() <= all.len());
        assert!(culled.len() < all.len(), "root at x=10 is outside the frustum");
        for inst in &culled {
            assert!(all.contains(inst));
        }
    }

    // ── scene camera ──────────────────────────────────────────────────────

    #[test]
    fn scene_camera_uses_node_world_transform() {
        let mut s = Scene::new("cam");
        let p = Perspective { aspect: 1.0, vfov: 1.0, near: 0.1, far: Some(100.0) };
        let cam = s.push_camera(Camera { name: "main".into(), perspective: p });
        let mut holder = translated("holder", Vec3::new(0.0, 0.0, 5.0));
        holder.camera = Some(cam);
        let holder = s.push_node(holder);
        let mut parent = translated("parent", Vec3::new(2.0, 0.0, 0.0));
        parent.children = vec![holder];
        s.roots = vec![s.push_node(parent)];

        let cfw = scene_camera(&s, cam).unwrap();
        let eye = Vec3::new(2.0, 0.0, 5.0);
        let expected = projection(&p) * Mat4::look_at_rh(eye, eye - Vec3::Z, Vec3::Y);
        assert!(cfw.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn scene_camera_absent_from_graph() {
        let mut s = Scene::new("cam");
        let p = Perspective { aspect: 1.0, vfov: 1.0, near: 0.1, far: None };
        let cam = s.push_camera(Camera { name: "orphan".into(), perspective: p });
        assert!(scene_camera(&s, cam).is_none());
    }
}
