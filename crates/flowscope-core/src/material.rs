//! Surface materials.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A standard (PBR-like) material. Only `color`, `emissive`, `opacity`,
/// `wireframe` and `visible` affect the built-in renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub color: Color,
    pub emissive: Color,
    pub opacity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub wireframe: bool,
    pub visible: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            emissive: Color::BLACK,
            opacity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            wireframe: false,
            visible: true,
        }
    }
}

impl Material {
    /// Creates a material with the given base color.
    #[must_use]
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// The material given to bare geometry when it is normalized into a mesh.
    #[must_use]
    pub fn default_mesh() -> Self {
        Self {
            color: Color::from_hex(0x0015_6289),
            emissive: Color::from_hex(0x0007_2534),
            opacity: 1.0,
            roughness: 0.5,
            metalness: 0.0,
            wireframe: true,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn with_emissive(mut self, emissive: Color) -> Self {
        self.emissive = emissive;
        self
    }
}
