//! Core data model for flowscope.
//!
//! This crate holds everything a viewer needs that does not touch the GPU:
//! - [`Object3D`] trees as produced upstream, with meshes, lights and helpers
//! - the [`Scene`] arena they are flattened into, with ray casting
//! - the [`SelectorHandle`] channel carried by selectable objects
//! - [`ViewerConfig`] and the error type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Settings structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::module_name_repetitions)]

pub mod bounds;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod light;
pub mod material;
pub mod object;
pub mod ray;
pub mod scene;
pub mod selection;

pub use bounds::Aabb;
pub use color::Color;
pub use config::{DefaultLights, TrackballKeys, TrackballSettings, ViewerConfig};
pub use error::{FlowscopeError, Result};
pub use geometry::Geometry;
pub use light::{default_lights, Light, DEFAULT_LIGHTS_NAME};
pub use material::Material;
pub use object::{Capability, Object3D, ObjectId, ObjectKind, Transform};
pub use ray::Ray;
pub use scene::{Intersection, NodeId, Scene, SceneNode, DEFAULT_BACKGROUND};
pub use selection::{SelectionEvent, SelectionKind, SelectionSignal, SelectorHandle};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, UVec3, Vec2, Vec3, Vec4};
