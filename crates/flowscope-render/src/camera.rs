//! Perspective camera.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use flowscope_core::Ray;

pub const DEFAULT_FOV_DEGREES: f32 = 70.0;
pub const DEFAULT_NEAR: f32 = 0.01;
pub const DEFAULT_FAR: f32 = 1000.0;

/// A perspective camera looking down its local -Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Up vector used by [`PerspectiveCamera::look_at`].
    pub up: Vec3,
    /// Camera-to-world rotation.
    pub orientation: Quat,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    /// Creates a camera at `(0, 0, 10)` looking at the origin.
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            up: Vec3::Y,
            orientation: Quat::IDENTITY,
            fov: DEFAULT_FOV_DEGREES,
            aspect: sanitize_aspect(aspect),
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        };
        camera.look_at(Vec3::ZERO);
        camera
    }

    /// Creates a camera sized for a `width` x `height` viewport.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self::new(width as f32 / height.max(1) as f32)
    }

    /// Rotates the camera so that it faces `target`. A target at the camera
    /// position leaves the orientation unchanged.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() < 1e-12 {
            return;
        }
        let up = if forward.cross(self.up).length_squared() < 1e-12 {
            // up parallel to the view direction, pick any perpendicular axis
            forward.normalize().any_orthonormal_vector()
        } else {
            self.up
        };
        let view = Mat4::look_at_rh(self.position, target, up);
        self.orientation = Quat::from_mat4(&view.inverse()).normalize();
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    /// Returns the projection matrix (wgpu depth range `[0, 1]`).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the direction the camera is facing.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// Vertical field of view in radians.
    #[must_use]
    pub fn fov_radians(&self) -> f32 {
        self.fov.to_radians()
    }

    /// Casts a ray from the camera position through a point given in
    /// normalized device coordinates (`[-1, 1]`, +Y up).
    #[must_use]
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let inv_view_proj = self.view_projection_matrix().inverse();
        let far = inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        if far.w.abs() < 1e-6 {
            return None;
        }
        let direction = far.truncate() / far.w - self.position;
        if direction.length_squared() < 1e-12 {
            return None;
        }
        Some(Ray::new(self.position, direction))
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = PerspectiveCamera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 10.0));
        assert!((camera.fov - 70.0).abs() < f32::EPSILON);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_look_at_rotates_forward() {
        let mut camera = PerspectiveCamera::new(1.0);
        camera.position = Vec3::new(10.0, 0.0, 0.0);
        camera.look_at(Vec3::ZERO);
        assert!((camera.forward() - Vec3::NEG_X).length() < 1e-5);

        // looking straight down still yields a valid orientation
        camera.position = Vec3::new(0.0, 10.0, 0.0);
        camera.look_at(Vec3::ZERO);
        assert!((camera.forward() - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_view_matrix_moves_target_to_negative_z() {
        let camera = PerspectiveCamera::new(1.0);
        let p = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = PerspectiveCamera::new(1.5);
        let ray = camera.ray_from_ndc(Vec2::ZERO).unwrap();
        assert_eq!(ray.origin, camera.position);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_corner_ray_matches_fov() {
        let camera = PerspectiveCamera::new(1.0);
        let ray = camera.ray_from_ndc(Vec2::new(0.0, 1.0)).unwrap();
        let angle = ray.direction.angle_between(Vec3::NEG_Z);
        assert!((angle - camera.fov_radians() / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_aspect_is_sanitized() {
        let mut camera = PerspectiveCamera::new(0.0);
        assert!((camera.aspect - 1.0).abs() < f32::EPSILON);
        camera.set_aspect(f32::NAN);
        assert!((camera.aspect - 1.0).abs() < f32::EPSILON);
    }
}
