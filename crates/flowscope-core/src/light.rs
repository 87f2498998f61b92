//! Light sources and the default light rig.

use glam::Vec3;

use crate::color::Color;
use crate::object::Object3D;

/// A light attached to an object node. Point lights take their position
/// from the node transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    /// `distance == 0` means no attenuation cut-off.
    Point {
        color: Color,
        intensity: f32,
        distance: f32,
    },
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
}

/// Name of the group produced by [`default_lights`].
pub const DEFAULT_LIGHTS_NAME: &str = "Lights";

/// Builds the synthetic rig injected when the default-lights policy is on:
/// one ambient light, one hemisphere light and two point lights.
#[must_use]
pub fn default_lights() -> Object3D {
    let point = |name: &str, position: Vec3| {
        Object3D::light(Light::Point {
            color: Color::WHITE,
            intensity: 1.0,
            distance: 0.0,
        })
        .with_name(name)
        .with_position(position)
    };
    Object3D::group()
        .with_name(DEFAULT_LIGHTS_NAME)
        .with_child(Object3D::light(Light::Ambient {
            color: Color::WHITE,
            intensity: 0.5,
        }))
        .with_child(
            Object3D::light(Light::Hemisphere {
                sky: Color::WHITE,
                ground: Color::from_hex(0x0000_0001),
                intensity: 1.0,
            })
            .with_name("hemisphere-light"),
        )
        .with_child(point("point-light0", Vec3::new(10.0, 10.0, 10.0)))
        .with_child(point("point-light1", Vec3::new(-10.0, 10.0, -10.0)))
}
