use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

use crate::model::Perspective;

/// Which camera drives the frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CameraMode {
    /// A camera attached to a scene node.
    #[default]
    Scene,
    /// The free orbit camera.
    User,
}

/// Clip-from-view for a perspective camera (right-handed, depth in `[0, 1]`).
pub fn projection(p: &Perspective) -> Mat4 {
    match p.far {
        Some(far) => Mat4::perspective_rh(p.vfov, p.aspect, p.near, far),
        None => Mat4::perspective_infinite_rh(p.vfov, p.aspect, p.near),
    }
}

/// Camera orbiting a target point, Z up.
///
/// Elevation is measured from `+Z` and stays in `[0, π]`; azimuth is measured
/// in the XY plane from `+X` and stays in `[0, 2π)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            radius: 10.0,
            azimuth: 0.25 * PI,
            elevation: 0.3 * PI,
        }
    }
}

impl OrbitCamera {
    pub const MIN_RADIUS: f32 = 0.01;

    pub fn eye(&self) -> Vec3 {
        let (sa, ca) = self.azimuth.sin_cos();
        let (se, ce) = self.elevation.sin_cos();
        self.target + self.radius * Vec3::new(ca * se, sa * se, ce)
    }

    /// View-from-world.
    pub fn view(&self) -> Mat4 {
        // Looking straight along Z makes +Z a degenerate up vector.
        let up = if self.elevation.sin().abs() < 1e-4 { Vec3::Y } else { Vec3::Z };
        Mat4::look_at_rh(self.eye(), self.target, up)
    }

    /// Rotates by an angular delta in radians.
    pub fn orbit(&mut self, d_azimuth: f32, d_elevation: f32) {
        self.elevation = (self.elevation + d_elevation).clamp(0.0, PI);
        self.azimuth = (self.azimuth + d_azimuth).rem_euclid(TAU);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.radius = (self.radius + delta).max(Self::MIN_RADIUS);
    }
}

/// View-from-world for a camera node, given the node's world transform.
///
/// The camera sits at the node origin, looks down local `-Z`, and has local
/// `+Y` as up.
pub fn node_view(world_from_local: &Mat4) -> Mat4 {
    let eye = world_from_local.transform_point3(Vec3::ZERO);
    let target = world_from_local.transform_point3(Vec3::NEG_Z);
    let up = world_from_local.transform_vector3(Vec3::Y);
    Mat4::look_at_rh(eye, target, up)
}
