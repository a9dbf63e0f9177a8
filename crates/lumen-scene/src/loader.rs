//! s72 scene loading.
//!
//! A scene file is a JSON array: the magic string `"s72-v2"` followed by typed
//! objects. Objects refer to each other by name, so loading runs in two passes:
//! the first registers every name and assigns dense ids in file order, the
//! second builds each object with its references already resolvable.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::{Quat, Vec3};
use serde_json::{Map, Value};

use crate::attributes::{self, AttributeFormat, AttributeLayout, IndexFormat};
use crate::bounds::Aabb;
use crate::error::{Result, SceneError};
use crate::model::{
    Camera, CameraId, Channel, Driver, Environment, EnvironmentId, Interpolation, Light, LightId,
    LightKind, Material, MaterialId, MaterialKind, Mesh, MeshId, Node, NodeId, Param, Perspective,
    Scene, TextureRef, Topology,
};
use crate::source::{DataSource, FsSource};

const MAGIC: [&str; 2] = ["s72-v2", "s72-v1"];

/// Loads a scene file, reading binaries relative to its directory.
pub fn load_file(path: &Path) -> Result<Scene> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| SceneError::Io { path: path.display().to_string(), source })?;

    let mut source = FsSource::beside(path);
    let scene = load_str(&text, &mut source)?;

    log::info!(
        "loaded scene '{}' from {}: {} nodes, {} meshes, {} cameras, {} materials, {} lights",
        scene.name,
        path.display(),
        scene.nodes.len(),
        scene.meshes.len(),
        scene.cameras.len(),
        scene.materials.len(),
        scene.lights.len(),
    );
    Ok(scene)
}

/// Loads a scene from JSON text, pulling binaries from `source`.
pub fn load_str(text: &str, source: &mut dyn DataSource) -> Result<Scene> {
    let doc: Value = serde_json::from_str(text)?;
    load_value(&doc, source)
}

pub fn load_value(doc: &Value, source: &mut dyn DataSource) -> Result<Scene> {
    let items = doc
        .as_array()
        .ok_or_else(|| SceneError::structure("top level must be an array"))?;

    let (magic, rest) = items
        .split_first()
        .ok_or_else(|| SceneError::structure("document is empty"))?;

    match magic.as_str() {
        Some(m) if MAGIC.contains(&m) => {}
        _ => return Err(SceneError::structure(format!("expected magic {:?}, got {magic}", MAGIC[0]))),
    }

    let mut index = Index::default();
    let mut objects = Vec::with_capacity(rest.len());
    for (i, v) in rest.iter().enumerate() {
        let obj = Obj::parse(v, i + 1)?;
        index.register(&obj)?;
        objects.push(obj);
    }

    let mut b = Builder { index: &index, source };
    let mut scene = Scene::default();

    for o in objects.iter() {
        match o.kind {
            Kind::Material => scene.materials.push(b.material(o)?),
            Kind::Mesh => scene.meshes.push(b.mesh(o)?),
            Kind::Camera => scene.cameras.push(b.camera(o)?),
            Kind::Light => scene.lights.push(b.light(o)?),
            Kind::Environment => scene.environments.push(b.environment(o)?),
            Kind::Node => scene.nodes.push(b.node(o)?),
            Kind::Driver => scene.drivers.push(b.driver(o)?),
            Kind::Scene => {
                scene.name = o.name.clone();
                scene.roots = o
                    .strings("roots")?
                    .iter()
                    .map(|n| b.resolve(Kind::Node, n, o).map(NodeId))
                    .collect::<Result<_>>()?;
            }
        }
    }

    match index.count(Kind::Scene) {
        1 => {}
        0 => return Err(SceneError::structure("no SCENE object")),
        n => return Err(SceneError::structure(format!("{n} SCENE objects; expected one"))),
    }

    scene.node_names = index.names(Kind::Node, NodeId);
    scene.mesh_names = index.names(Kind::Mesh, MeshId);
    scene.camera_names = index.names(Kind::Camera, CameraId);
    scene.material_names = index.names(Kind::Material, MaterialId);

    check_acyclic(&scene)?;
    Ok(scene)
}

/// Rejects node graphs with cycles; an explicit-stack walk would never end.
fn check_acyclic(scene: &Scene) -> Result<()> {
    #[derive(Copy, Clone, PartialEq)]
    enum Mark {
        New,
        Open,
        Done,
    }

    let mut marks = vec![Mark::New; scene.nodes.len()];
    for start in 0..scene.nodes.len() {
        if marks[start] != Mark::New {
            continue;
        }
        // (node, next child to visit)
        let mut stack = vec![(start, 0usize)];
        marks[start] = Mark::Open;

        while let Some(top) = stack.last_mut() {
            let (n, next) = *top;
            let children = &scene.nodes[n].children;
            if next == children.len() {
                marks[n] = Mark::Done;
                stack.pop();
                continue;
            }
            top.1 += 1;
            let child = children[next].index();
            match marks[child] {
                Mark::Open => {
                    return Err(SceneError::structure(format!(
                        "node '{}' is its own ancestor",
                        scene.nodes[child].name
                    )));
                }
                Mark::New => {
                    marks[child] = Mark::Open;
                    stack.push((child, 0));
                }
                Mark::Done => {}
            }
        }
    }
    Ok(())
}

// ── objects ───────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
enum Kind {
    Scene,
    Node,
    Mesh,
    Camera,
    Material,
    Light,
    Driver,
    Environment,
}

impl Kind {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "SCENE" => Kind::Scene,
            "NODE" => Kind::Node,
            "MESH" => Kind::Mesh,
            "CAMERA" => Kind::Camera,
            "MATERIAL" => Kind::Material,
            "LIGHT" => Kind::Light,
            "DRIVER" => Kind::Driver,
            "ENVIRONMENT" => Kind::Environment,
            _ => return None,
        })
    }

    fn label(self) -> &'static str {
        match self {
            Kind::Scene => "scene",
            Kind::Node => "node",
            Kind::Mesh => "mesh",
            Kind::Camera => "camera",
            Kind::Material => "material",
            Kind::Light => "light",
            Kind::Driver => "driver",
            Kind::Environment => "environment",
        }
    }
}

/// One typed object with field accessors that produce located errors.
struct Obj<'a> {
    kind: Kind,
    name: String,
    fields: &'a Map<String, Value>,
}

impl<'a> Obj<'a> {
    fn parse(v: &'a Value, position: usize) -> Result<Self> {
        let fields = v
            .as_object()
            .ok_or_else(|| SceneError::structure(format!("entry {position} is not an object")))?;

        let ty = fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| SceneError::structure(format!("entry {position} has no type")))?;
        let kind = Kind::parse(ty)
            .ok_or_else(|| SceneError::structure(format!("entry {position}: unknown type '{ty}'")))?;

        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SceneError::structure(format!("entry {position} ({ty}) has no name")))?
            .to_string();

        Ok(Self { kind, name, fields })
    }

    fn ctx(&self) -> String {
        format!("{} '{}'", self.kind.label(), self.name)
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key)
    }

    fn req(&self, key: &str) -> Result<&'a Value> {
        self.get(key)
            .ok_or_else(|| SceneError::structure(format!("{}: missing '{key}'", self.ctx())))
    }

    fn str(&self, key: &str) -> Result<&'a str> {
        as_str(self.req(key)?, &self.ctx(), key)
    }

    fn opt_str(&self, key: &str) -> Result<Option<&'a str>> {
        self.get(key).map(|v| as_str(v, &self.ctx(), key)).transpose()
    }

    fn object(&self, key: &str) -> Result<&'a Map<String, Value>> {
        as_object(self.req(key)?, &self.ctx(), key)
    }

    fn floats_n<const N: usize>(&self, key: &str, default: [f32; N]) -> Result<[f32; N]> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => floats_n(v, &self.ctx(), key),
        }
    }

    fn floats(&self, key: &str) -> Result<Vec<f32>> {
        as_floats(self.req(key)?, &self.ctx(), key)
    }

    fn strings(&self, key: &str) -> Result<Vec<&'a str>> {
        let Some(v) = self.get(key) else { return Ok(Vec::new()) };
        let arr = v
            .as_array()
            .ok_or_else(|| SceneError::structure(format!("{}: '{key}' must be an array", self.ctx())))?;
        arr.iter().map(|e| as_str(e, &self.ctx(), key)).collect()
    }
}

// ── field helpers ─────────────────────────────────────────────────────────

fn bad(ctx: &str, key: &str, what: &str) -> SceneError {
    SceneError::structure(format!("{ctx}: '{key}' must be {what}"))
}

fn as_str<'a>(v: &'a Value, ctx: &str, key: &str) -> Result<&'a str> {
    v.as_str().ok_or_else(|| bad(ctx, key, "a string"))
}

fn as_object<'a>(v: &'a Value, ctx: &str, key: &str) -> Result<&'a Map<String, Value>> {
    v.as_object().ok_or_else(|| bad(ctx, key, "an object"))
}

fn as_f32(v: &Value, ctx: &str, key: &str) -> Result<f32> {
    v.as_f64().map(|f| f as f32).ok_or_else(|| bad(ctx, key, "a number"))
}

fn as_usize(v: &Value, ctx: &str, key: &str) -> Result<usize> {
    v.as_u64().and_then(|n| usize::try_from(n).ok()).ok_or_else(|| bad(ctx, key, "a non-negative integer"))
}

fn as_floats(v: &Value, ctx: &str, key: &str) -> Result<Vec<f32>> {
    let arr = v.as_array().ok_or_else(|| bad(ctx, key, "an array of numbers"))?;
    arr.iter().map(|e| as_f32(e, ctx, key)).collect()
}

fn floats_n<const N: usize>(v: &Value, ctx: &str, key: &str) -> Result<[f32; N]> {
    let vals = as_floats(v, ctx, key)?;
    vals.try_into()
        .map_err(|_| bad(ctx, key, &format!("an array of {N} numbers")))
}

fn field<'a>(m: &'a Map<String, Value>, ctx: &str, key: &str) -> Result<&'a Value> {
    m.get(key)
        .ok_or_else(|| SceneError::structure(format!("{ctx}: missing '{key}'")))
}

fn f32_field(m: &Map<String, Value>, ctx: &str, key: &str) -> Result<f32> {
    as_f32(field(m, ctx, key)?, ctx, key)
}

fn opt_f32_field(m: &Map<String, Value>, ctx: &str, key: &str) -> Result<Option<f32>> {
    m.get(key).map(|v| as_f32(v, ctx, key)).transpose()
}

fn src_of(v: &Value, ctx: &str, key: &str) -> Result<String> {
    let m = as_object(v, ctx, key)?;
    Ok(as_str(field(m, ctx, "src")?, ctx, "src")?.to_string())
}

// ── name index ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Index {
    ids: HashMap<Kind, HashMap<String, u32>>,
}

impl Index {
    fn register(&mut self, o: &Obj<'_>) -> Result<()> {
        let table = self.ids.entry(o.kind).or_default();
        let next = table.len() as u32;
        if table.insert(o.name.clone(), next).is_some() {
            return Err(SceneError::structure(format!("duplicate {}", o.ctx())));
        }
        Ok(())
    }

    fn count(&self, kind: Kind) -> usize {
        self.ids.get(&kind).map_or(0, HashMap::len)
    }

    fn lookup(&self, kind: Kind, name: &str) -> Option<u32> {
        self.ids.get(&kind).and_then(|t| t.get(name)).copied()
    }

    fn names<I>(&self, kind: Kind, wrap: fn(u32) -> I) -> HashMap<String, I> {
        self.ids
            .get(&kind)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), wrap(*v))).collect())
            .unwrap_or_default()
    }
}

// ── builder ───────────────────────────────────────────────────────────────

struct Builder<'i, 's> {
    index: &'i Index,
    source: &'s mut dyn DataSource,
}

impl Builder<'_, '_> {
    fn resolve(&self, kind: Kind, name: &str, from: &Obj<'_>) -> Result<u32> {
        self.index.lookup(kind, name).ok_or_else(|| SceneError::UnknownReference {
            kind: kind.label(),
            name: name.to_string(),
            from: from.ctx(),
        })
    }

    fn opt_ref(&self, kind: Kind, key: &str, from: &Obj<'_>) -> Result<Option<u32>> {
        from.opt_str(key)?
            .map(|name| self.resolve(kind, name, from))
            .transpose()
    }

    fn node(&mut self, o: &Obj<'_>) -> Result<Node> {
        let translation = Vec3::from_array(o.floats_n("translation", [0.0; 3])?);
        let [x, y, z, w] = o.floats_n("rotation", [0.0, 0.0, 0.0, 1.0])?;
        let rotation = Quat::from_xyzw(x, y, z, w);
        if rotation.length_squared() < 1e-12 {
            return Err(SceneError::structure(format!("{}: zero rotation quaternion", o.ctx())));
        }
        let scale = Vec3::from_array(o.floats_n("scale", [1.0; 3])?);

        let mut node = Node::new(o.name.clone(), translation, rotation.normalize(), scale);
        node.children = o
            .strings("children")?
            .iter()
            .map(|c| self.resolve(Kind::Node, c, o).map(NodeId))
            .collect::<Result<_>>()?;
        node.camera = self.opt_ref(Kind::Camera, "camera", o)?.map(CameraId);
        node.mesh = self.opt_ref(Kind::Mesh, "mesh", o)?.map(MeshId);
        node.light = self.opt_ref(Kind::Light, "light", o)?.map(LightId);
        node.environment = self.opt_ref(Kind::Environment, "environment", o)?.map(EnvironmentId);
        Ok(node)
    }

    fn layout(&self, attrs: &Map<String, Value>, key: &str, ctx: &str) -> Result<Option<AttributeLayout>> {
        let Some(v) = attrs.get(key) else { return Ok(None) };
        let m = as_object(v, ctx, key)?;
        let fmt = as_str(field(m, ctx, "format")?, ctx, "format")?;
        let format = AttributeFormat::parse(fmt).ok_or_else(|| SceneError::UnsupportedFormat {
            context: format!("{ctx} {key}"),
            format: fmt.to_string(),
        })?;
        Ok(Some(AttributeLayout {
            src: as_str(field(m, ctx, "src")?, ctx, "src")?.to_string(),
            offset: m.get("offset").map(|v| as_usize(v, ctx, "offset")).transpose()?.unwrap_or(0),
            stride: as_usize(field(m, ctx, "stride")?, ctx, "stride")?,
            format,
        }))
    }

    /// An attribute's layout together with the blob it reads from.
    fn attribute(
        &mut self,
        attrs: &Map<String, Value>,
        key: &str,
        ctx: &str,
    ) -> Result<Option<(AttributeLayout, Arc<[u8]>)>> {
        let Some(layout) = self.layout(attrs, key, ctx)? else { return Ok(None) };
        let bytes = self.source.read(&layout.src)?;
        Ok(Some((layout, bytes)))
    }

    fn mesh(&mut self, o: &Obj<'_>) -> Result<Mesh> {
        let ctx = o.ctx();

        let topology = match o.str("topology")? {
            "TRIANGLE_LIST" => Topology::TriangleList,
            other => {
                return Err(SceneError::UnsupportedFormat {
                    context: format!("{ctx} topology"),
                    format: other.to_string(),
                });
            }
        };
        let count = as_usize(o.req("count")?, &ctx, "count")?;
        let attrs = o.object("attributes")?;

        let indices = match o.get("indices") {
            None => None,
            Some(v) => {
                let m = as_object(v, &ctx, "indices")?;
                let src = as_str(field(m, &ctx, "src")?, &ctx, "src")?;
                let offset = m.get("offset").map(|v| as_usize(v, &ctx, "offset")).transpose()?.unwrap_or(0);
                let fmt = as_str(field(m, &ctx, "format")?, &ctx, "format")?;
                let format = IndexFormat::parse(fmt).ok_or_else(|| SceneError::UnsupportedFormat {
                    context: format!("{ctx} indices"),
                    format: fmt.to_string(),
                })?;
                let bytes = self.source.read(src)?;
                Some(attributes::decode_indices(&bytes, src, offset, count, format)?)
            }
        };

        let position = self
            .attribute(attrs, "POSITION", &ctx)?
            .ok_or_else(|| SceneError::structure(format!("{ctx}: missing POSITION attribute")))?;
        let normal = self.attribute(attrs, "NORMAL", &ctx)?;
        let tangent = self.attribute(attrs, "TANGENT", &ctx)?;
        let texcoord = self.attribute(attrs, "TEXCOORD", &ctx)?;
        let color = self.attribute(attrs, "COLOR", &ctx)?;

        // With indices, `count` counts indices and the vertex arrays hold as
        // many elements as the shortest attribute has room for.
        let vertex_count = if indices.is_some() {
            [Some(&position), normal.as_ref(), tangent.as_ref(), texcoord.as_ref(), color.as_ref()]
                .into_iter()
                .flatten()
                .map(|(l, bytes)| l.available(bytes.len()))
                .min()
                .unwrap_or(0)
        } else {
            count
        };

        let positions = attributes::decode_vec3(&position.1, &position.0, vertex_count)?;
        let normals = normal
            .map(|(l, bytes)| attributes::decode_vec3(&bytes, &l, vertex_count))
            .transpose()?;
        let tangents = tangent
            .map(|(l, bytes)| attributes::decode(&bytes, &l, vertex_count))
            .transpose()?;
        let texcoords = texcoord
            .map(|(l, bytes)| attributes::decode_vec2(&bytes, &l, vertex_count))
            .transpose()?;
        let colors = color
            .map(|(l, bytes)| attributes::decode(&bytes, &l, vertex_count))
            .transpose()?;

        if let Some(idx) = &indices {
            if let Some(&oob) = idx.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(SceneError::IndexOutOfRange {
                    mesh: o.name.clone(),
                    index: oob,
                    vertex_count,
                });
            }
        }

        Ok(Mesh {
            name: o.name.clone(),
            topology,
            count: count as u32,
            bounds: Aabb::from_points(&positions),
            positions,
            normals,
            tangents,
            texcoords,
            colors,
            indices,
            material: self.opt_ref(Kind::Material, "material", o)?.map(MaterialId),
        })
    }

    fn camera(&mut self, o: &Obj<'_>) -> Result<Camera> {
        let ctx = o.ctx();
        let p = o.object("perspective")?;
        let perspective = Perspective {
            aspect: f32_field(p, &ctx, "aspect")?,
            vfov: f32_field(p, &ctx, "vfov")?,
            near: f32_field(p, &ctx, "near")?,
            far: opt_f32_field(p, &ctx, "far")?,
        };

        if perspective.near <= 0.0 || perspective.far.is_some_and(|f| f <= perspective.near) {
            return Err(SceneError::structure(format!("{ctx}: near/far planes out of order")));
        }
        if perspective.aspect <= 0.0 || perspective.vfov <= 0.0 {
            return Err(SceneError::structure(format!("{ctx}: aspect and vfov must be positive")));
        }

        Ok(Camera { name: o.name.clone(), perspective })
    }

    fn material(&mut self, o: &Obj<'_>) -> Result<Material> {
        let ctx = o.ctx();

        let albedo = |m: &Map<String, Value>| -> Result<Param<Vec3>> {
            match m.get("albedo") {
                None => Ok(Param::Value(Vec3::ONE)),
                Some(v) if v.is_object() => Ok(Param::Texture(src_of(v, &ctx, "albedo")?)),
                Some(v) => Ok(Param::Value(Vec3::from_array(floats_n(v, &ctx, "albedo")?))),
            }
        };
        let scalar = |m: &Map<String, Value>, key: &str, default: f32| -> Result<Param<f32>> {
            match m.get(key) {
                None => Ok(Param::Value(default)),
                Some(v) if v.is_object() => Ok(Param::Texture(src_of(v, &ctx, key)?)),
                Some(v) => Ok(Param::Value(as_f32(v, &ctx, key)?)),
            }
        };

        let kind = if let Some(v) = o.get("pbr") {
            let m = as_object(v, &ctx, "pbr")?;
            MaterialKind::Pbr {
                albedo: albedo(m)?,
                roughness: scalar(m, "roughness", 1.0)?,
                metalness: scalar(m, "metalness", 0.0)?,
            }
        } else if let Some(v) = o.get("lambertian") {
            MaterialKind::Lambertian { albedo: albedo(as_object(v, &ctx, "lambertian")?)? }
        } else if o.get("mirror").is_some() {
            MaterialKind::Mirror
        } else if o.get("environment").is_some() {
            MaterialKind::Environment
        } else {
            return Err(SceneError::structure(format!("{ctx}: no shading model")));
        };

        Ok(Material {
            name: o.name.clone(),
            kind,
            normal_map: o.get("normalMap").map(|v| src_of(v, &ctx, "normalMap")).transpose()?,
            displacement_map: o
                .get("displacementMap")
                .map(|v| src_of(v, &ctx, "displacementMap"))
                .transpose()?,
        })
    }

    fn light(&mut self, o: &Obj<'_>) -> Result<Light> {
        let ctx = o.ctx();
        let tint = Vec3::from_array(o.floats_n("tint", [1.0; 3])?);
        let shadow = o.get("shadow").map(|v| as_usize(v, &ctx, "shadow")).transpose()?.unwrap_or(0);

        let kind = if let Some(v) = o.get("sun") {
            let m = as_object(v, &ctx, "sun")?;
            LightKind::Sun { angle: f32_field(m, &ctx, "angle")?, strength: f32_field(m, &ctx, "strength")? }
        } else if let Some(v) = o.get("sphere") {
            let m = as_object(v, &ctx, "sphere")?;
            LightKind::Sphere {
                radius: f32_field(m, &ctx, "radius")?,
                power: f32_field(m, &ctx, "power")?,
                limit: opt_f32_field(m, &ctx, "limit")?,
            }
        } else if let Some(v) = o.get("spot") {
            let m = as_object(v, &ctx, "spot")?;
            LightKind::Spot {
                radius: f32_field(m, &ctx, "radius")?,
                power: f32_field(m, &ctx, "power")?,
                fov: f32_field(m, &ctx, "fov")?,
                blend: f32_field(m, &ctx, "blend")?,
                limit: opt_f32_field(m, &ctx, "limit")?,
            }
        } else {
            return Err(SceneError::structure(format!("{ctx}: no light kind")));
        };

        Ok(Light { name: o.name.clone(), tint, shadow: shadow as u32, kind })
    }

    fn environment(&mut self, o: &Obj<'_>) -> Result<Environment> {
        let ctx = o.ctx();
        let m = o.object("radiance")?;
        let text = |key: &str, default: &str| -> Result<String> {
            Ok(m.get(key).map(|v| as_str(v, &ctx, key)).transpose()?.unwrap_or(default).to_string())
        };
        Ok(Environment {
            name: o.name.clone(),
            radiance: TextureRef {
                src: as_str(field(m, &ctx, "src")?, &ctx, "src")?.to_string(),
                kind: text("type", "2D")?,
                format: text("format", "linear")?,
            },
        })
    }

    fn driver(&mut self, o: &Obj<'_>) -> Result<Driver> {
        let ctx = o.ctx();
        let node = NodeId(self.resolve(Kind::Node, o.str("node")?, o)?);

        let channel = match o.str("channel")? {
            "translation" => Channel::Translation,
            "rotation" => Channel::Rotation,
            "scale" => Channel::Scale,
            other => {
                return Err(SceneError::UnsupportedFormat { context: format!("{ctx} channel"), format: other.into() });
            }
        };
        let interpolation = match o.opt_str("interpolation")?.unwrap_or("LINEAR") {
            "STEP" => Interpolation::Step,
            "LINEAR" => Interpolation::Linear,
            "SLERP" => Interpolation::Slerp,
            other => {
                return Err(SceneError::UnsupportedFormat {
                    context: format!("{ctx} interpolation"),
                    format: other.into(),
                });
            }
        };

        let times = o.floats("times")?;
        let values = o.floats("values")?;
        if values.len() != times.len() * channel.width() {
            return Err(SceneError::structure(format!(
                "{ctx}: {} values for {} times of a {}-wide channel",
                values.len(),
                times.len(),
                channel.width()
            )));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(SceneError::structure(format!("{ctx}: times must not decrease")));
        }

        Ok(Driver { name: o.name.clone(), node, channel, times, values, interpolation })
    }
}
