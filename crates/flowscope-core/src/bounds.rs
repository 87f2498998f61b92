//! Axis-aligned bounding boxes.

use glam::{Mat4, Vec3};

/// An axis-aligned bounding box.
///
/// The empty box has inverted infinite corners so that expanding it by any
/// point yields that point. Its size and center are reported as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    #[must_use]
    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Creates a box from its corners.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates a box centered on `center` with the given full extents.
    #[must_use]
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Smallest box containing every point.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut bbox = Self::EMPTY;
        for p in points {
            bbox.expand_point(p);
        }
        bbox
    }

    /// Returns true when no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn expand_box(&mut self, other: &Aabb) {
        if !other.is_empty() {
            self.expand_point(other.min);
            self.expand_point(other.max);
        }
    }

    #[must_use]
    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        out.expand_box(other);
        out
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Largest extent along any axis.
    #[must_use]
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// The eight corners, min corner first.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]
    }

    /// The twelve edges as corner pairs, in the order a box helper draws them.
    #[must_use]
    pub fn edges(&self) -> [[Vec3; 2]; 12] {
        let c = self.corners();
        [
            [c[0], c[1]],
            [c[1], c[2]],
            [c[2], c[3]],
            [c[3], c[0]],
            [c[4], c[5]],
            [c[5], c[6]],
            [c[6], c[7]],
            [c[7], c[4]],
            [c[0], c[4]],
            [c[1], c[5]],
            [c[2], c[6]],
            [c[3], c[7]],
        ]
    }

    /// Box enclosing this box after an affine transform.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return Aabb::EMPTY;
        }
        Aabb::from_points(self.corners().map(|c| matrix.transform_point3(c)))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_box_has_zero_size() {
        let bbox = Aabb::EMPTY;
        assert!(bbox.is_empty());
        assert_eq!(bbox.size(), Vec3::ZERO);
        assert_eq!(bbox.center(), Vec3::ZERO);
        assert_eq!(bbox.max_dimension(), 0.0);
    }

    #[test]
    fn test_expand_and_union() {
        let mut bbox = Aabb::EMPTY;
        bbox.expand_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(!bbox.is_empty());
        assert_eq!(bbox.size(), Vec3::ZERO);

        let other = Aabb::new(Vec3::splat(-1.0), Vec3::ZERO);
        let merged = bbox.union(&other);
        assert_eq!(merged.min, Vec3::splat(-1.0));
        assert_eq!(merged.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(merged.max_dimension(), 4.0);

        // the empty box is the identity of union
        assert_eq!(merged.union(&Aabb::EMPTY), merged);
    }

    #[test]
    fn test_transformed_box() {
        let bbox = Aabb::from_center_size(Vec3::ZERO, Vec3::ONE);
        let moved = bbox.transformed(&Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        assert!((moved.center() - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);

        let rotated = bbox.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));
        // a rotated unit cube needs a wider box
        assert!(rotated.size().x > 1.4);
        assert!((rotated.size().y - 1.0).abs() < 1e-6);
    }
}
