//! Texture planning: which image each material samples, and the CPU pixels
//! for each image.
//!
//! Slot 0 is a checkerboard used by meshes without a material, slot 1 a
//! procedural xor pattern; every material then appends one slot of its own.

use glam::Vec3;

use crate::error::{Result, SceneError};
use crate::model::{Mesh, Param, Scene};
use crate::source::DataSource;

/// Where the pixels of one texture slot come from.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    Checkerboard,
    Xor,
    /// 1×1 texture of a linear RGBA8 color.
    Solid([u8; 4]),
    /// Image file, relative to the scene directory.
    File(String),
}

/// RGBA8 pixels ready for upload.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Whether texel values are sRGB-encoded.
    pub srgb: bool,
    pub pixels: Vec<u8>,
}

pub const CHECKERBOARD: u32 = 0;
pub const XOR: u32 = 1;

#[derive(Debug, Clone)]
pub struct TexturePlan {
    pub sources: Vec<TextureSource>,
    /// Slot for each material, indexed by `MaterialId`.
    material_slots: Vec<u32>,
}

impl TexturePlan {
    pub fn new(scene: &Scene) -> Self {
        let mut sources = vec![TextureSource::Checkerboard, TextureSource::Xor];
        let mut material_slots = Vec::with_capacity(scene.materials.len());

        for m in &scene.materials {
            let source = match m.kind.albedo() {
                Some(Param::Texture(src)) => TextureSource::File(src.clone()),
                Some(Param::Value(rgb)) => TextureSource::Solid(to_rgba8(*rgb)),
                None => TextureSource::Solid([255; 4]),
            };
            material_slots.push(sources.len() as u32);
            sources.push(source);
        }

        Self { sources, material_slots }
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Slot sampled when drawing `mesh`.
    pub fn slot_for(&self, mesh: &Mesh) -> u32 {
        mesh.material
            .and_then(|id| self.material_slots.get(id.index()).copied())
            .unwrap_or(CHECKERBOARD)
    }

    /// Produces the pixels for every slot, in slot order.
    pub fn build(&self, source: &mut dyn DataSource) -> Result<Vec<TextureImage>> {
        self.sources
            .iter()
            .map(|s| match s {
                TextureSource::Checkerboard => Ok(checkerboard(128)),
                TextureSource::Xor => Ok(xor(256)),
                TextureSource::Solid(rgba) => Ok(TextureImage {
                    width: 1,
                    height: 1,
                    srgb: false,
                    pixels: rgba.to_vec(),
                }),
                TextureSource::File(path) => decode_file(source, path),
            })
            .collect()
    }
}

fn to_rgba8(rgb: Vec3) -> [u8; 4] {
    let c = (rgb.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

fn decode_file(source: &mut dyn DataSource, path: &str) -> Result<TextureImage> {
    let bytes = source.read(path)?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| SceneError::Image { path: path.to_string(), message: e.to_string() })?
        .to_rgba8();

    log::debug!("decoded texture {path}: {}x{}", img.width(), img.height());
    Ok(TextureImage {
        width: img.width(),
        height: img.height(),
        srgb: true,
        pixels: img.into_raw(),
    })
}

/// Dark/light grey checkerboard with a red marker at the texture origin.
pub fn checkerboard(size: u32) -> TextureImage {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        let fy = (y as f32 + 0.5) / size as f32;
        for x in 0..size {
            let fx = (x as f32 + 0.5) / size as f32;
            let px = if fx < 0.05 && fy < 0.05 {
                [0xff, 0x00, 0x00, 0xff]
            } else if (fx < 0.5) == (fy < 0.5) {
                [0x44, 0x44, 0x44, 0xff]
            } else {
                [0xbb, 0xbb, 0xbb, 0xff]
            };
            pixels.extend_from_slice(&px);
        }
    }
    TextureImage { width: size, height: size, srgb: false, pixels }
}

/// The classic xor pattern, sRGB-encoded.
pub fn xor(size: u32) -> TextureImage {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let (x8, y8) = (x as u8, y as u8);
            pixels.extend_from_slice(&[
                x8 ^ y8,
                x8.wrapping_add(128) ^ y8,
                x8 ^ y8.wrapping_add(27),
                0xff,
            ]);
        }
    }
    TextureImage { width: size, height: size, srgb: true, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Material, MaterialId, MaterialKind};
    use crate::source::MemorySource;

    fn px(img: &TextureImage, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * img.width + x) * 4) as usize;
        [img.pixels[i], img.pixels[i + 1], img.pixels[i + 2], img.pixels[i + 3]]
    }

    // ── procedural ────────────────────────────────────────────────────────

    #[test]
    fn checkerboard_quadrants_and_marker() {
        let img = checkerboard(128);
        assert_eq!(img.pixels.len(), 128 * 128 * 4);
        assert_eq!(px(&img, 0, 0), [0xff, 0, 0, 0xff]);
        assert_eq!(px(&img, 10, 10), [0x44, 0x44, 0x44, 0xff]);
        assert_eq!(px(&img, 100, 10), [0xbb, 0xbb, 0xbb, 0xff]);
        assert_eq!(px(&img, 100, 100), [0x44, 0x44, 0x44, 0xff]);
    }

    #[test]
    fn xor_channels() {
        let img = xor(256);
        assert!(img.srgb);
        assert_eq!(px(&img, 3, 5), [3 ^ 5, 131 ^ 5, 3 ^ 32, 0xff]);
        assert_eq!(px(&img, 200, 0), [200, 200u8.wrapping_add(128), 200 ^ 27, 0xff]);
    }

    // ── planning ──────────────────────────────────────────────────────────

    fn material(name: &str, albedo: Param<Vec3>) -> Material {
        Material {
            name: name.into(),
            kind: MaterialKind::Lambertian { albedo },
            normal_map: None,
            displacement_map: None,
        }
    }

    #[test]
    fn materials_append_after_builtins() {
        let mut scene = Scene::new("s");
        scene.push_material(material("red", Param::Value(Vec3::new(1.0, 0.0, 0.0))));
        scene.push_material(material("wood", Param::Texture("wood.png".into())));

        let plan = TexturePlan::new(&scene);
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.sources[2], TextureSource::Solid([255, 0, 0, 255]));
        assert_eq!(plan.sources[3], TextureSource::File("wood.png".into()));
        assert_eq!(plan.material_slots, vec![2, 3]);
    }

    #[test]
    fn mesh_without_material_uses_checkerboard() {
        let scene = Scene::new("s");
        let plan = TexturePlan::new(&scene);
        let mesh = crate::model::Mesh {
            name: "m".into(),
            topology: crate::model::Topology::TriangleList,
            count: 0,
            positions: vec![],
            normals: None,
            tangents: None,
            texcoords: None,
            colors: None,
            indices: None,
            material: None,
            bounds: Default::default(),
        };
        assert_eq!(plan.slot_for(&mesh), CHECKERBOARD);

        let dangling = crate::model::Mesh { material: Some(MaterialId(7)), ..mesh };
        assert_eq!(plan.slot_for(&dangling), CHECKERBOARD);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut scene = Scene::new("s");
        scene.push_material(material("wood", Param::Texture("wood.png".into())));
        let plan = TexturePlan::new(&scene);
        assert!(plan.build(&mut MemorySource::new()).is_err());
    }

    #[test]
    fn garbage_file_is_an_image_error() {
        let mut scene = Scene::new("s");
        scene.push_material(material("wood", Param::Texture("wood.png".into())));
        let plan = TexturePlan::new(&scene);
        let mut src = MemorySource::new().with("wood.png", b"not a png".to_vec());
        assert!(matches!(plan.build(&mut src), Err(SceneError::Image { .. })));
    }
}
