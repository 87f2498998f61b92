//! Scene objects as delivered by upstream producers.
//!
//! An [`Object3D`] is an owned tree. Producers build it, the viewer flattens
//! it into its [`Scene`](crate::scene::Scene) on every render.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::color::Color;
use crate::geometry::Geometry;
use crate::light::Light;
use crate::material::Material;
use crate::selection::SelectorHandle;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique object identity. Clones of an object keep its id, so an
/// object delivered twice is recognized as the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps a raw id. Only meaningful for ids previously returned by [`ObjectId::raw`].
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Position, rotation and scale relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What a node carries.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// Pure grouping node.
    Group,
    Mesh {
        geometry: Arc<Geometry>,
        material: Material,
    },
    Light(Light),
    /// Line segments in node space, used for helpers and wireframes.
    LineSegments { segments: Vec<[Vec3; 2]>, color: Color },
}

/// Optional capabilities of an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Capability {
    #[default]
    Plain,
    Selectable(SelectorHandle),
}

/// A node of an object tree.
#[derive(Debug, Clone)]
pub struct Object3D {
    pub(crate) id: ObjectId,
    pub(crate) name: String,
    pub(crate) kind: ObjectKind,
    pub(crate) transform: Transform,
    pub(crate) visible: bool,
    pub(crate) capability: Capability,
    pub(crate) children: Vec<Object3D>,
}

impl Object3D {
    fn with_kind(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::next(),
            name: String::new(),
            kind,
            transform: Transform::IDENTITY,
            visible: true,
            capability: Capability::Plain,
            children: Vec::new(),
        }
    }

    /// An empty grouping node.
    #[must_use]
    pub fn group() -> Self {
        Self::with_kind(ObjectKind::Group)
    }

    #[must_use]
    pub fn mesh(geometry: impl Into<Arc<Geometry>>, material: Material) -> Self {
        Self::with_kind(ObjectKind::Mesh {
            geometry: geometry.into(),
            material,
        })
    }

    #[must_use]
    pub fn light(light: Light) -> Self {
        Self::with_kind(ObjectKind::Light(light))
    }

    #[must_use]
    pub fn line_segments(segments: Vec<[Vec3; 2]>, color: Color) -> Self {
        Self::with_kind(ObjectKind::LineSegments { segments, color })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Shorthand for `with_visible(false)`.
    #[must_use]
    pub fn hidden(self) -> Self {
        self.with_visible(false)
    }

    #[must_use]
    pub fn with_child(mut self, child: Object3D) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children<I: IntoIterator<Item = Object3D>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }

    /// Marks the object selectable through the given channel.
    #[must_use]
    pub fn selectable(mut self, selector: SelectorHandle) -> Self {
        self.capability = Capability::Selectable(selector);
        self
    }

    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    #[must_use]
    pub fn is_selectable(&self) -> bool {
        matches!(self.capability, Capability::Selectable(_))
    }

    #[must_use]
    pub fn selector(&self) -> Option<&SelectorHandle> {
        match &self.capability {
            Capability::Selectable(handle) => Some(handle),
            Capability::Plain => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Object3D] {
        &self.children
    }

    #[must_use]
    pub fn material(&self) -> Option<&Material> {
        match &self.kind {
            ObjectKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    #[must_use]
    pub fn geometry(&self) -> Option<&Arc<Geometry>> {
        match &self.kind {
            ObjectKind::Mesh { geometry, .. } => Some(geometry),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_survive_clone() {
        let a = Object3D::group();
        let b = Object3D::group();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn test_capability_query() {
        let plain = Object3D::mesh(Geometry::cuboid(1.0, 1.0, 1.0), Material::default());
        assert!(!plain.is_selectable());
        assert!(plain.selector().is_none());

        let handle = SelectorHandle::new();
        let picked = plain.selectable(handle.clone());
        assert!(picked.is_selectable());
        assert_eq!(picked.selector(), Some(&handle));
    }

    #[test]
    fn test_transform_matrix() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        };
        let p = transform.to_matrix().transform_point3(Vec3::ONE);
        assert_eq!(p, Vec3::new(3.0, 4.0, 5.0));
    }
}
