use glam::{Mat4, Vec3};

/// Axis-aligned bounding box.
///
/// An empty box has `min > max` on every axis and absorbs nothing when
/// transformed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point; `EMPTY` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |acc, p| acc.including(*p))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn including(self, p: Vec3) -> Self {
        Self { min: self.min.min(p), max: self.max.max(p) }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners, bit `i` of the index selecting max on axis `i`.
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after an affine transform.
    pub fn transform(&self, m: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        self.corners()
            .iter()
            .fold(Aabb::EMPTY, |acc, c| acc.including(m.transform_point3(*c)))
    }

    /// The twelve edges as endpoint pairs, for wireframe display.
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        const PAIRS: [(usize, usize); 12] = [
            (0, 1), (2, 3), (4, 5), (6, 7),
            (0, 2), (1, 3), (4, 6), (5, 7),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        let c = self.corners();
        PAIRS.map(|(i, j)| (c[i], c[j]))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_spans_all_axes() {
        let pts = [
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
        ];
        let b = Aabb::from_points(&pts);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 3.0, 4.0));
    }

    #[test]
    fn no_points_is_empty() {
        let none: &[Vec3] = &[];
        assert!(Aabb::from_points(none).is_empty());
        assert!(!Aabb::new(Vec3::ZERO, Vec3::ZERO).is_empty());
    }

    #[test]
    fn translate_moves_box() {
        let b = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let t = b.transform(&Mat4::from_translation(Vec3::new(2.0, 0.0, -1.0)));
        assert_eq!(t.min, Vec3::new(2.0, 0.0, -1.0));
        assert_eq!(t.max, Vec3::new(3.0, 1.0, 0.0));
    }

    #[test]
    fn rotation_grows_box_to_contain_corners() {
        let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let t = b.transform(&Mat4::from_rotation_z(std::f32::consts::FRAC_PI_4));
        let r = 2.0f32.sqrt();
        assert!((t.max.x - r).abs() < 1e-5);
        assert!((t.min.y + r).abs() < 1e-5);
        assert!((t.max.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn edges_cover_each_corner_three_times() {
        let b = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let corners = b.corners();
        for c in corners {
            let n = b.edges().iter().filter(|(p, q)| *p == c || *q == c).count();
            assert_eq!(n, 3);
        }
    }
}
