//! Highlight overlay for the selected object.

use flowscope_core::{Aabb, Color, NodeId, Object3D, ObjectKind, Scene};

/// Name of the helper group attached to the selected object.
pub const HIGHLIGHT_GROUP_NAME: &str = "selectionHelpers";

/// Highlight color for objects without a material.
pub const DEFAULT_HIGHLIGHT_COLOR: u32 = 0x00ff00;

/// Colors of the two overlay parts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    pub box_color: Color,
    pub wireframe_color: Color,
}

impl Highlight {
    /// Box in the material color, wireframe in its contrasting color.
    pub fn for_kind(kind: &ObjectKind) -> Self {
        match kind {
            ObjectKind::Mesh { material, .. } => Self {
                box_color: material.color,
                wireframe_color: material.color.contrasting(),
            },
            _ => {
                let color = Color::from_hex(DEFAULT_HIGHLIGHT_COLOR);
                Self {
                    box_color: color,
                    wireframe_color: color,
                }
            }
        }
    }

    /// Builds the helper group for `node`, expressed in the node's local
    /// space so it follows the object.
    ///
    /// Returns `None` for stale nodes and for nodes without any geometry
    /// below them.
    pub fn build(scene: &Scene, node: NodeId) -> Option<Object3D> {
        let target = scene.node(node)?;
        let colors = Self::for_kind(&target.kind);

        let (local_box, wireframe) = match &target.kind {
            ObjectKind::Mesh { geometry, .. } => (geometry.bounding_box(), Some(geometry.edges())),
            _ => (subtree_local_box(scene, node), None),
        };
        if local_box.is_empty() {
            return None;
        }

        let mut group = Object3D::group()
            .with_name(HIGHLIGHT_GROUP_NAME)
            .with_child(Object3D::line_segments(local_box.edges().to_vec(), colors.box_color));
        if let Some(edges) = wireframe {
            group = group.with_child(Object3D::line_segments(edges, colors.wireframe_color));
        }
        Some(group)
    }
}

fn subtree_local_box(scene: &Scene, node: NodeId) -> Aabb {
    let world = scene
        .descendants(node)
        .into_iter()
        .fold(Aabb::EMPTY, |acc, id| acc.union(&scene.mesh_world_box(id)));
    if world.is_empty() {
        return world;
    }
    world.transformed(&scene.world_matrix(node).inverse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowscope_core::{Geometry, Material, Vec3};

    fn children_of(object: &Object3D) -> Vec<&ObjectKind> {
        object.children().iter().map(Object3D::kind).collect()
    }

    #[test]
    fn test_mesh_highlight_uses_material_colors() {
        let mut scene = Scene::new();
        let id = scene.add(
            Object3D::mesh(
                Geometry::cuboid(2.0, 2.0, 2.0),
                Material::new(Color::from_hex(0xffffff)),
            )
            .with_position(Vec3::new(5.0, 0.0, 0.0)),
        );
        let helpers = Highlight::build(&scene, id).unwrap();
        assert_eq!(helpers.name(), HIGHLIGHT_GROUP_NAME);

        let kinds = children_of(&helpers);
        assert_eq!(kinds.len(), 2);
        let ObjectKind::LineSegments { segments, color } = kinds[0] else {
            panic!("expected box lines");
        };
        assert_eq!(segments.len(), 12);
        assert_eq!(color.to_hex(), 0xffffff);
        // local space: the box does not carry the object translation
        assert!(segments.iter().flatten().all(|p| p.x.abs() <= 1.0 + 1e-6));

        let ObjectKind::LineSegments { segments, color } = kinds[1] else {
            panic!("expected wireframe lines");
        };
        assert_eq!(segments.len(), 18);
        assert_eq!(*color, Color::BLACK);
    }

    #[test]
    fn test_group_highlight_uses_default_color() {
        let mut scene = Scene::new();
        let id = scene.add(
            Object3D::group().with_child(Object3D::mesh(
                Geometry::cuboid(1.0, 1.0, 1.0),
                Material::default(),
            )),
        );
        let helpers = Highlight::build(&scene, id).unwrap();
        let kinds = children_of(&helpers);
        assert_eq!(kinds.len(), 1);
        let ObjectKind::LineSegments { color, .. } = kinds[0] else {
            panic!("expected box lines");
        };
        assert_eq!(color.to_hex(), DEFAULT_HIGHLIGHT_COLOR);
    }

    #[test]
    fn test_empty_group_has_no_highlight() {
        let mut scene = Scene::new();
        let id = scene.add(Object3D::group());
        assert!(Highlight::build(&scene, id).is_none());
    }
}
