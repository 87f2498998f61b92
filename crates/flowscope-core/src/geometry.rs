//! Triangle geometry handed to the viewer by upstream producers.

use std::collections::BTreeSet;

use glam::{UVec3, Vec3};

use crate::bounds::Aabb;
use crate::error::{FlowscopeError, Result};
use crate::ray::Ray;

/// An indexed triangle mesh in object space.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
    indices: Vec<UVec3>,
    bounds: Aabb,
}

impl Geometry {
    /// Creates a geometry, rejecting out-of-range indices and non-finite positions.
    pub fn new(positions: Vec<Vec3>, indices: Vec<UVec3>) -> Result<Self> {
        if let Some(p) = positions.iter().find(|p| !p.is_finite()) {
            return Err(FlowscopeError::InvalidGeometry(format!(
                "non-finite vertex position {p}"
            )));
        }
        let count = positions.len();
        if let Some(face) = indices
            .iter()
            .find(|f| f.to_array().iter().any(|&i| i as usize >= count))
        {
            return Err(FlowscopeError::InvalidGeometry(format!(
                "face {face} references a vertex beyond {count}"
            )));
        }
        let bounds = Aabb::from_points(positions.iter().copied());
        Ok(Self {
            positions,
            indices,
            bounds,
        })
    }

    /// An axis-aligned box centered on the origin.
    #[must_use]
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let corners = Aabb::from_center_size(Vec3::ZERO, Vec3::new(width, height, depth)).corners();
        // corners: 0-3 on the back face (min z), 4-7 on the front face
        let indices = vec![
            UVec3::new(4, 5, 6),
            UVec3::new(4, 6, 7),
            UVec3::new(1, 0, 3),
            UVec3::new(1, 3, 2),
            UVec3::new(5, 1, 2),
            UVec3::new(5, 2, 6),
            UVec3::new(0, 4, 7),
            UVec3::new(0, 7, 3),
            UVec3::new(7, 6, 2),
            UVec3::new(7, 2, 3),
            UVec3::new(0, 1, 5),
            UVec3::new(0, 5, 4),
        ];
        let bounds = Aabb::from_points(corners);
        Self {
            positions: corners.to_vec(),
            indices,
            bounds,
        }
    }

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[must_use]
    pub fn indices(&self) -> &[UVec3] {
        &self.indices
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates over the triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.iter().map(|f| {
            [
                self.positions[f.x as usize],
                self.positions[f.y as usize],
                self.positions[f.z as usize],
            ]
        })
    }

    /// Object-space bounding box.
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        self.bounds
    }

    /// Unique undirected triangle edges, i.e. the wireframe of the mesh.
    #[must_use]
    pub fn edges(&self) -> Vec<[Vec3; 2]> {
        let mut seen = BTreeSet::new();
        for face in &self.indices {
            for (a, b) in [(face.x, face.y), (face.y, face.z), (face.z, face.x)] {
                seen.insert((a.min(b), a.max(b)));
            }
        }
        seen.into_iter()
            .map(|(a, b)| [self.positions[a as usize], self.positions[b as usize]])
            .collect()
    }

    /// Closest hit of an object-space ray, as a ray parameter.
    #[must_use]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_aabb(&self.bounds)?;
        self.triangles()
            .filter_map(|[a, b, c]| ray.intersect_triangle(a, b, c))
            .min_by(f32::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_indices() {
        let err = Geometry::new(vec![Vec3::ZERO, Vec3::X], vec![UVec3::new(0, 1, 2)]);
        assert!(matches!(err, Err(FlowscopeError::InvalidGeometry(_))));

        let nan = Geometry::new(vec![Vec3::splat(f32::NAN)], vec![]);
        assert!(nan.is_err());
    }

    #[test]
    fn test_cuboid_shape() {
        let cube = Geometry::cuboid(1.0, 2.0, 3.0);
        assert_eq!(cube.indices().len(), 12);
        assert_eq!(cube.bounding_box().size(), Vec3::new(1.0, 2.0, 3.0));
        // 12 box edges plus one diagonal per face
        assert_eq!(cube.edges().len(), 18);
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let cube = Geometry::cuboid(1.0, 1.0, 1.0);
        for [a, b, c] in cube.triangles() {
            let normal = (b - a).cross(c - a);
            let center = (a + b + c) / 3.0;
            assert!(normal.dot(center) > 0.0, "inward face at {center}");
        }
    }

    #[test]
    fn test_ray_hits_nearest_face() {
        let cube = Geometry::cuboid(2.0, 2.0, 2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = cube.intersect_ray(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-5);

        let miss = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(cube.intersect_ray(&miss).is_none());
    }
}
