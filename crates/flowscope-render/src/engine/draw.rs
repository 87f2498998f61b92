//! CPU-side frame assembly.
//!
//! A scene is flattened into world-space vertex lists and one uniform block
//! per frame. Nothing here touches the GPU.

use glam::{Mat4, Vec3};

use flowscope_core::{Color, Light, Material, NodeId, ObjectKind, Scene};

use crate::camera::PerspectiveCamera;

/// Point lights beyond this count are ignored.
pub const MAX_POINT_LIGHTS: usize = 4;

/// A lit triangle vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub emissive: [f32; 3],
}

/// An unlit line vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Per-frame uniforms shared by both pipelines.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    /// xyz world position.
    pub point_positions: [[f32; 4]; MAX_POINT_LIGHTS],
    /// rgb premultiplied by intensity, w is the cutoff distance (0 = none).
    pub point_colors: [[f32; 4]; MAX_POINT_LIGHTS],
    /// x is the number of active point lights.
    pub counts: [u32; 4],
}

/// Accumulated scene lighting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightRig {
    pub ambient: Vec3,
    pub sky: Vec3,
    pub ground: Vec3,
    pub points: [(Vec3, Vec3, f32); MAX_POINT_LIGHTS],
    pub point_count: usize,
}

impl LightRig {
    fn add(&mut self, light: &Light, world: &Mat4) {
        match *light {
            Light::Ambient { color, intensity } => self.ambient += color.to_vec3() * intensity,
            Light::Hemisphere {
                sky,
                ground,
                intensity,
            } => {
                self.sky += sky.to_vec3() * intensity;
                self.ground += ground.to_vec3() * intensity;
            }
            Light::Point {
                color,
                intensity,
                distance,
            } => {
                if self.point_count == MAX_POINT_LIGHTS {
                    log::debug!("ignoring point light beyond {MAX_POINT_LIGHTS}");
                    return;
                }
                self.points[self.point_count] = (
                    world.transform_point3(Vec3::ZERO),
                    color.to_vec3() * intensity,
                    distance,
                );
                self.point_count += 1;
            }
        }
    }
}

/// Everything drawn in one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameGeometry {
    pub triangles: Vec<MeshVertex>,
    pub lines: Vec<LineVertex>,
    pub lights: LightRig,
}

impl FrameGeometry {
    /// Collects every effectively visible node of `scene`.
    #[must_use]
    pub fn collect(scene: &Scene) -> Self {
        let mut frame = Self::default();
        for id in scene.traverse() {
            if !scene.is_effectively_visible(id) {
                continue;
            }
            frame.add_node(scene, id);
        }
        frame
    }

    fn add_node(&mut self, scene: &Scene, id: NodeId) {
        let Some(node) = scene.node(id) else { return };
        let world = scene.world_matrix(id);
        match &node.kind {
            ObjectKind::Group => {}
            ObjectKind::Light(light) => self.lights.add(light, &world),
            ObjectKind::LineSegments { segments, color } => {
                for [a, b] in segments {
                    self.push_line(world.transform_point3(*a), world.transform_point3(*b), *color);
                }
            }
            ObjectKind::Mesh { geometry, material } => {
                if material.wireframe {
                    for [a, b] in geometry.edges() {
                        self.push_line(
                            world.transform_point3(a),
                            world.transform_point3(b),
                            material.color,
                        );
                    }
                } else {
                    for triangle in geometry.triangles() {
                        self.push_triangle(triangle.map(|p| world.transform_point3(p)), material);
                    }
                }
            }
        }
    }

    fn push_line(&mut self, a: Vec3, b: Vec3, color: Color) {
        let color = color.to_array();
        self.lines.push(LineVertex {
            position: a.to_array(),
            color,
        });
        self.lines.push(LineVertex {
            position: b.to_array(),
            color,
        });
    }

    fn push_triangle(&mut self, [a, b, c]: [Vec3; 3], material: &Material) {
        let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
        let [r, g, bl] = material.color.to_array();
        let color = [r, g, bl, material.opacity];
        let emissive = material.emissive.to_array();
        for p in [a, b, c] {
            self.triangles.push(MeshVertex {
                position: p.to_array(),
                normal,
                color,
                emissive,
            });
        }
    }
}

impl FrameUniforms {
    #[must_use]
    pub fn new(camera: &PerspectiveCamera, lights: &LightRig) -> Self {
        let mut point_positions = [[0.0; 4]; MAX_POINT_LIGHTS];
        let mut point_colors = [[0.0; 4]; MAX_POINT_LIGHTS];
        for (i, (position, color, distance)) in
            lights.points.iter().take(lights.point_count).enumerate()
        {
            point_positions[i] = position.extend(1.0).to_array();
            point_colors[i] = color.extend(*distance).to_array();
        }
        #[allow(clippy::cast_possible_truncation)]
        let point_count = lights.point_count as u32;
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            ambient: lights.ambient.extend(0.0).to_array(),
            sky: lights.sky.extend(0.0).to_array(),
            ground: lights.ground.extend(0.0).to_array(),
            point_positions,
            point_colors,
            counts: [point_count, 0, 0, 0],
        }
    }
}
