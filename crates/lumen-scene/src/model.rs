//! In-memory scene graph.
//!
//! Objects live in per-kind arenas and refer to each other through dense typed
//! ids. Names are only used at load time and for diagnostics; the per-frame
//! path never hashes a string.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::bounds::Aabb;

macro_rules! dense_id {
    ($($(#[$meta:meta])* $name:ident;)*) => {$(
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    )*};
}

dense_id! {
    /// Index into [`Scene::nodes`].
    NodeId;
    /// Index into [`Scene::meshes`].
    MeshId;
    /// Index into [`Scene::cameras`].
    CameraId;
    /// Index into [`Scene::materials`].
    MaterialId;
    /// Index into [`Scene::lights`].
    LightId;
    /// Index into [`Scene::environments`].
    EnvironmentId;
    /// Index into [`Scene::drivers`].
    DriverId;
}

// ── nodes ─────────────────────────────────────────────────────────────────

/// A transform in the scene graph, with optional attachments.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    /// `T * R * S`, cached at load.
    pub parent_from_local: Mat4,

    /// Children in declaration order.
    pub children: Vec<NodeId>,

    pub camera: Option<CameraId>,
    pub mesh: Option<MeshId>,
    pub light: Option<LightId>,
    pub environment: Option<EnvironmentId>,
}

impl Node {
    pub fn new(name: impl Into<String>, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            name: name.into(),
            translation,
            rotation,
            scale,
            parent_from_local: Mat4::from_scale_rotation_translation(scale, rotation, translation),
            children: Vec::new(),
            camera: None,
            mesh: None,
            light: None,
            environment: None,
        }
    }

    /// A node with an identity local transform.
    pub fn identity(name: impl Into<String>) -> Self {
        Self::new(name, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }
}

// ── meshes ────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Topology {
    TriangleList,
}

/// Decoded mesh data. Attribute arrays are indexed by vertex.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub topology: Topology,

    /// Vertex count as declared by the file.
    pub count: u32,

    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub tangents: Option<Vec<Vec4>>,
    pub texcoords: Option<Vec<Vec2>>,
    pub colors: Option<Vec<Vec4>>,

    /// Every entry is `< positions.len()`; checked at load.
    pub indices: Option<Vec<u32>>,

    pub material: Option<MaterialId>,

    /// Local-space bounds of `positions`.
    pub bounds: Aabb,
}

impl Mesh {
    /// Number of vertices after index expansion.
    pub fn draw_count(&self) -> u32 {
        match &self.indices {
            Some(idx) => idx.len() as u32,
            None => self.positions.len() as u32,
        }
    }
}

// ── cameras ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Perspective {
    /// Width over height.
    pub aspect: f32,
    /// Vertical field of view in radians.
    pub vfov: f32,
    pub near: f32,
    /// `None` means an infinite far plane.
    pub far: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub name: String,
    pub perspective: Perspective,
}

// ── materials ─────────────────────────────────────────────────────────────

/// A material parameter given either inline or as a texture path.
#[derive(Debug, Clone, PartialEq)]
pub enum Param<T> {
    Value(T),
    Texture(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    Lambertian { albedo: Param<Vec3> },
    Pbr { albedo: Param<Vec3>, roughness: Param<f32>, metalness: Param<f32> },
    Mirror,
    Environment,
}

impl MaterialKind {
    pub fn albedo(&self) -> Option<&Param<Vec3>> {
        match self {
            MaterialKind::Lambertian { albedo } | MaterialKind::Pbr { albedo, .. } => Some(albedo),
            MaterialKind::Mirror | MaterialKind::Environment => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    pub normal_map: Option<String>,
    pub displacement_map: Option<String>,
}

// ── lights ────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LightKind {
    Sun { angle: f32, strength: f32 },
    Sphere { radius: f32, power: f32, limit: Option<f32> },
    Spot { radius: f32, power: f32, fov: f32, blend: f32, limit: Option<f32> },
}

#[derive(Debug, Clone)]
pub struct Light {
    pub name: String,
    pub tint: Vec3,
    /// Shadow map resolution; zero disables shadows.
    pub shadow: u32,
    pub kind: LightKind,
}

// ── environments ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TextureRef {
    pub src: String,
    /// `"2D"` or `"cube"`.
    pub kind: String,
    /// `"linear"` or `"rgbe"`.
    pub format: String,
}

#[derive(Debug, Clone)]
pub struct Environment {
    pub name: String,
    pub radiance: TextureRef,
}

// ── drivers ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Channel {
    Translation,
    Rotation,
    Scale,
}

impl Channel {
    /// Number of floats per keyframe value.
    pub fn width(self) -> usize {
        match self {
            Channel::Translation | Channel::Scale => 3,
            Channel::Rotation => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Interpolation {
    Step,
    Linear,
    Slerp,
}

/// Keyframed animation of one node channel.
///
/// Drivers are kept for completeness; traversal does not evaluate them.
#[derive(Debug, Clone)]
pub struct Driver {
    pub name: String,
    pub node: NodeId,
    pub channel: Channel,
    pub times: Vec<f32>,
    /// `times.len() * channel.width()` floats.
    pub values: Vec<f32>,
    pub interpolation: Interpolation,
}

// ── scene ─────────────────────────────────────────────────────────────────

/// A loaded scene: arenas plus the name lookups built at load time.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: String,
    pub roots: Vec<NodeId>,

    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub cameras: Vec<Camera>,
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
    pub environments: Vec<Environment>,
    pub drivers: Vec<Driver>,

    pub(crate) node_names: HashMap<String, NodeId>,
    pub(crate) mesh_names: HashMap<String, MeshId>,
    pub(crate) camera_names: HashMap<String, CameraId>,
    pub(crate) material_names: HashMap<String, MaterialId>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.index()]
    }

    #[inline]
    pub fn camera(&self, id: CameraId) -> &Camera {
        &self.cameras[id.index()]
    }

    #[inline]
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_names.get(name).copied()
    }

    pub fn mesh_by_name(&self, name: &str) -> Option<MeshId> {
        self.mesh_names.get(name).copied()
    }

    pub fn camera_by_name(&self, name: &str) -> Option<CameraId> {
        self.camera_names.get(name).copied()
    }

    pub fn material_by_name(&self, name: &str) -> Option<MaterialId> {
        self.material_names.get(name).copied()
    }

    /// Appends a node and registers its name. Used by the loader and by tests
    /// that assemble scenes by hand.
    pub fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.node_names.insert(node.name.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn push_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.mesh_names.insert(mesh.name.clone(), id);
        self.meshes.push(mesh);
        id
    }

    pub fn push_camera(&mut self, camera: Camera) -> CameraId {
        let id = CameraId(self.cameras.len() as u32);
        self.camera_names.insert(camera.name.clone(), id);
        self.cameras.push(camera);
        id
    }

    pub fn push_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.material_names.insert(material.name.clone(), id);
        self.materials.push(material);
        id
    }
}
