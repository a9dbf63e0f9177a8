//! Everything the viewer mutates between frames, in one place.
//!
//! Input handlers and the per-frame traversal both take a `&mut RenderState`
//! instead of reaching for globals.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::camera::{projection, CameraMode, OrbitCamera};
use crate::error::{Result, SceneError};
use crate::flatten::{flatten, FlatMeshes};
use crate::lines::{push_box, PosColVertex};
use crate::model::{CameraId, LightKind, Perspective, Scene};
use crate::textures::TexturePlan;
use crate::traversal::{
    collect_instances, scene_camera, AlwaysVisible, CullMode, DrawInstance, FrustumCulling,
    Visibility, WorldWalk,
};

/// Animation time wraps at this many seconds.
pub const TIME_PERIOD: f32 = 60.0;

/// Pixels of drag per radian of orbit.
pub const DRAG_PIXELS_PER_RADIAN: f32 = 180.0;

const BOUNDS_COLOR: [u8; 4] = [0x88, 0xff, 0x44, 0xff];

// ── world constants ───────────────────────────────────────────────────────

/// Hemisphere sky plus one directional sun, std140-compatible.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct WorldUniform {
    /// Direction towards the sky, `w` unused.
    pub sky_direction: [f32; 4],
    pub sky_energy: [f32; 4],
    /// Direction towards the sun, `w` unused.
    pub sun_direction: [f32; 4],
    pub sun_energy: [f32; 4],
}

impl Default for WorldUniform {
    fn default() -> Self {
        Self {
            sky_direction: [0.0, 0.0, 1.0, 0.0],
            sky_energy: [0.2, 0.2, 0.4, 0.0],
            sun_direction: [6.0 / 23.0, 13.0 / 23.0, 18.0 / 23.0, 0.0],
            sun_energy: [1.0, 1.0, 0.9, 0.0],
        }
    }
}

impl WorldUniform {
    /// Defaults, with the sun replaced by the first sun light in the scene.
    ///
    /// A sun light shines along its local `-Z`.
    pub fn from_scene(scene: &Scene) -> Self {
        let mut world = Self::default();

        let sun = WorldWalk::new(scene).find_map(|(id, world_from_local)| {
            let light = &scene.lights[scene.node(id).light?.index()];
            match light.kind {
                LightKind::Sun { strength, .. } => Some((light, strength, world_from_local)),
                _ => None,
            }
        });

        if let Some((light, strength, world_from_local)) = sun {
            let to_sun = world_from_local.transform_vector3(Vec3::Z).normalize_or_zero();
            let energy = light.tint * strength;
            world.sun_direction = to_sun.extend(0.0).to_array();
            world.sun_energy = energy.extend(0.0).to_array();
            log::debug!("sun light '{}': direction {to_sun}, energy {energy}", light.name);
        }

        world
    }
}

// ── options ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct StateOptions {
    /// Scene camera to start with; the first camera when `None`.
    pub camera: Option<String>,
    pub cull: CullMode,
}

/// The matrices and instances for one frame.
pub struct FrameView<'a> {
    pub clip_from_world: Mat4,
    pub instances: &'a [DrawInstance],
    pub time: f32,
    pub world: &'a WorldUniform,
}

// ── state ─────────────────────────────────────────────────────────────────

pub struct RenderState {
    scene: Scene,
    meshes: FlatMeshes,
    textures: TexturePlan,

    mode: CameraMode,
    active_camera: Option<CameraId>,
    user_camera: OrbitCamera,
    user_perspective: Perspective,
    cull: CullMode,

    time: f32,
    world: WorldUniform,
    show_bounds: bool,

    drag_origin: Option<(f32, f32)>,
    instances: Vec<DrawInstance>,
}

impl RenderState {
    pub fn new(scene: Scene, options: StateOptions) -> Result<Self> {
        let active_camera = match &options.camera {
            Some(name) => Some(scene.camera_by_name(name).ok_or_else(|| {
                SceneError::UnknownReference {
                    kind: "camera",
                    name: name.clone(),
                    from: format!("scene '{}'", scene.name),
                }
            })?),
            None => (!scene.cameras.is_empty()).then_some(CameraId(0)),
        };

        let user_perspective = active_camera
            .map(|id| scene.camera(id).perspective)
            .unwrap_or(Perspective {
                aspect: 1.0,
                vfov: 60f32.to_radians(),
                near: 0.1,
                far: Some(1000.0),
            });

        let mode = match active_camera {
            Some(id) => {
                log::info!("active camera: '{}'", scene.camera(id).name);
                CameraMode::Scene
            }
            None => {
                log::info!("scene has no cameras; using the orbit camera");
                CameraMode::User
            }
        };

        let meshes = flatten(&scene);
        let textures = TexturePlan::new(&scene);
        let world = WorldUniform::from_scene(&scene);

        Ok(Self {
            scene,
            meshes,
            textures,
            mode,
            active_camera,
            user_camera: OrbitCamera::default(),
            user_perspective,
            cull: options.cull,
            time: 0.0,
            world,
            show_bounds: false,
            drag_origin: None,
            instances: Vec::new(),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn meshes(&self) -> &FlatMeshes {
        &self.meshes
    }

    pub fn textures(&self) -> &TexturePlan {
        &self.textures
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn active_camera(&self) -> Option<CameraId> {
        self.active_camera
    }

    pub fn user_camera(&self) -> &OrbitCamera {
        &self.user_camera
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn show_bounds(&self) -> bool {
        self.show_bounds
    }

    // ── controls ──────────────────────────────────────────────────────────

    /// Switches camera mode. Scene mode needs an active camera.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == CameraMode::Scene && self.active_camera.is_none() {
            log::warn!("no scene camera to switch to");
            return;
        }
        if self.mode != mode {
            log::info!("camera mode: {mode:?}");
        }
        self.mode = mode;
    }

    /// Advances the active scene camera to the next one in file order.
    pub fn cycle_camera(&mut self) {
        let n = self.scene.cameras.len() as u32;
        if let Some(id) = self.active_camera.as_mut().filter(|_| n > 0) {
            id.0 = (id.0 + 1) % n;
            log::info!("active camera: '{}'", self.scene.camera(*id).name);
        }
    }

    pub fn toggle_bounds(&mut self) {
        self.show_bounds = !self.show_bounds;
    }

    pub fn set_cull_mode(&mut self, cull: CullMode) {
        self.cull = cull;
    }

    /// Tracks the window aspect ratio for the orbit camera.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.user_perspective.aspect = width as f32 / height as f32;
        }
    }

    pub fn begin_drag(&mut self, x: f32, y: f32) {
        self.drag_origin = Some((x, y));
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = None;
    }

    /// Orbits the user camera by the pointer travel since the last call.
    pub fn drag_to(&mut self, x: f32, y: f32) {
        let Some((x0, y0)) = self.drag_origin else { return };
        if self.mode == CameraMode::User {
            self.user_camera.orbit(
                (x0 - x) / DRAG_PIXELS_PER_RADIAN,
                (y0 - y) / DRAG_PIXELS_PER_RADIAN,
            );
        }
        self.drag_origin = Some((x, y));
    }

    pub fn zoom(&mut self, delta: f32) {
        if self.mode == CameraMode::User {
            self.user_camera.zoom(delta);
        }
    }

    // ── per frame ─────────────────────────────────────────────────────────

    pub fn update(&mut self, dt: f32) {
        self.time = (self.time + dt).rem_euclid(TIME_PERIOD);
    }

    pub fn clip_from_world(&self) -> Mat4 {
        let user = || projection(&self.user_perspective) * self.user_camera.view();
        match (self.mode, self.active_camera) {
            (CameraMode::Scene, Some(id)) => scene_camera(&self.scene, id).unwrap_or_else(|| {
                log::debug!("camera '{}' is not attached to any node", self.scene.camera(id).name);
                user()
            }),
            _ => user(),
        }
    }

    /// Traverses the scene for the current camera.
    pub fn prepare_frame(&mut self) -> FrameView<'_> {
        let clip_from_world = self.clip_from_world();

        let frustum;
        let visibility: &dyn Visibility = match self.cull {
            CullMode::None => &AlwaysVisible,
            CullMode::Frustum => {
                frustum = FrustumCulling::new(&clip_from_world);
                &frustum
            }
        };

        collect_instances(
            &self.scene,
            &self.meshes,
            &self.textures,
            &clip_from_world,
            visibility,
            &mut self.instances,
        );

        FrameView {
            clip_from_world,
            instances: &self.instances,
            time: self.time,
            world: &self.world,
        }
    }

    /// World-space wireframe boxes for the instances of the last frame.
    pub fn bounds_lines(&self, out: &mut Vec<PosColVertex>) {
        out.clear();
        if !self.show_bounds {
            return;
        }
        for inst in &self.instances {
            push_box(out, &inst.world_bounds, BOUNDS_COLOR);
        }
    }
}
