//! Rays and the primitive intersection tests used by picking.

use glam::{Mat4, Vec3};

use crate::bounds::Aabb;

const EPSILON: f32 = 1e-6;

/// A half-line starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray with a normalized direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Applies an affine transform without renormalizing the direction, so
    /// that ray parameters stay comparable between the two spaces.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Slab test. Returns the entry parameter, or 0 when the origin is inside.
    #[must_use]
    pub fn intersect_aabb(&self, bbox: &Aabb) -> Option<f32> {
        if bbox.is_empty() {
            return None;
        }
        let inv = self.direction.recip();
        let t0 = (bbox.min - self.origin) * inv;
        let t1 = (bbox.max - self.origin) * inv;
        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();
        if t_far < t_near.max(0.0) {
            return None;
        }
        Some(t_near.max(0.0))
    }

    /// Moller-Trumbore ray/triangle intersection, both faces.
    #[must_use]
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < 1e-12 {
            return None;
        }
        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = f * edge2.dot(q);
        if t > EPSILON { Some(t) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::NEG_Z);
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Y);
        let t = ray.intersect_triangle(a, b, c).expect("should hit");
        assert!((t - 5.0).abs() < 1e-5);

        let away = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::Z);
        assert!(away.intersect_triangle(a, b, c).is_none());

        let outside = Ray::new(Vec3::new(2.0, 2.0, 5.0), Vec3::NEG_Z);
        assert!(outside.intersect_triangle(a, b, c).is_none());
    }

    #[test]
    fn test_aabb_slab() {
        let bbox = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!((ray.intersect_aabb(&bbox).unwrap() - 9.0).abs() < 1e-5);

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(inside.intersect_aabb(&bbox), Some(0.0));

        let miss = Ray::new(Vec3::new(5.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(miss.intersect_aabb(&bbox).is_none());
        assert!(ray.intersect_aabb(&Aabb::EMPTY).is_none());
    }

    #[test]
    fn test_transformed_ray_keeps_parameter() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let scale = Mat4::from_scale(Vec3::splat(0.5));
        let local = ray.transformed(&scale);
        let world_hit = ray.at(4.0);
        let local_hit = local.origin + local.direction * 4.0;
        assert!((scale.transform_point3(world_hit) - local_hit).length() < 1e-6);
    }
}
