//! Bounding boxes and camera fitting.

use glam::Vec3;

use flowscope_core::{Aabb, NodeId, ObjectKind, Scene};

use crate::camera::PerspectiveCamera;
use crate::trackball::TrackballControls;

/// Margin applied around fitted content.
pub const FIT_RATIO: f32 = 1.2;

/// Relative corner shift above which [`fit_if_needed`] refits.
pub const REFIT_THRESHOLD: f32 = 0.1;

/// World-space box of everything drawable below the scene roots.
///
/// Groups are descended into; every mesh or line node reached that way
/// contributes its own geometry and that of its whole subtree. Lights
/// contribute nothing. An empty scene yields an empty (zero-size) box.
#[must_use]
pub fn compute_bounding_box(scene: &Scene) -> Aabb {
    let mut bbox = Aabb::EMPTY;
    let mut stack: Vec<NodeId> = scene.roots().to_vec();
    while let Some(id) = stack.pop() {
        let Some(node) = scene.node(id) else { continue };
        match node.kind {
            ObjectKind::Group => stack.extend_from_slice(node.children()),
            ObjectKind::Mesh { .. } | ObjectKind::LineSegments { .. } => {
                for descendant in scene.descendants(id) {
                    bbox.expand_box(&node_world_box(scene, descendant));
                }
            }
            ObjectKind::Light(_) => {}
        }
    }
    bbox
}

fn node_world_box(scene: &Scene, id: NodeId) -> Aabb {
    match scene.node(id).map(|n| &n.kind) {
        Some(ObjectKind::Mesh { .. }) => scene.mesh_world_box(id),
        Some(ObjectKind::LineSegments { segments, .. }) => {
            Aabb::from_points(segments.iter().flatten().copied())
                .transformed(&scene.world_matrix(id))
        }
        _ => Aabb::EMPTY,
    }
}

/// Camera distance at which a box of `max_size` fills the view with margin.
#[must_use]
pub fn fit_distance(camera: &PerspectiveCamera, max_size: f32) -> f32 {
    let fit_height = max_size / (2.0 * (camera.fov_radians() / 2.0).tan());
    let fit_width = fit_height / camera.aspect;
    FIT_RATIO * fit_height.max(fit_width)
}

/// Places the camera so that `bbox` is in view. Returns false for an empty
/// or zero-size box, leaving the camera untouched.
pub fn fit_to_box(
    bbox: &Aabb,
    camera: &mut PerspectiveCamera,
    controls: &mut TrackballControls,
) -> bool {
    if bbox.is_empty() || bbox.size().length() == 0.0 {
        return false;
    }
    let center = bbox.center();
    let distance = fit_distance(camera, bbox.max_dimension());

    let mut view_direction = (controls.target - camera.position).normalize_or_zero();
    if view_direction == Vec3::ZERO {
        view_direction = camera.forward();
    }

    controls.max_distance = distance * 10.0;
    controls.target = center;
    camera.near = distance / 100.0;
    camera.far = distance * 100.0;
    camera.position = center - view_direction * distance;

    controls.update(camera);
    log::debug!("fitted camera to {bbox:?} at distance {distance}");
    true
}

/// Fits the camera to the whole scene.
pub fn fit_to_content(
    scene: &Scene,
    camera: &mut PerspectiveCamera,
    controls: &mut TrackballControls,
) -> bool {
    fit_to_box(&compute_bounding_box(scene), camera, controls)
}

/// Refits when content appeared, or when either corner of the scene box moved
/// by at least [`REFIT_THRESHOLD`] of the previous box's largest dimension.
/// Returns whether a refit ran.
pub fn fit_if_needed(
    previous: &Aabb,
    scene: &Scene,
    camera: &mut PerspectiveCamera,
    controls: &mut TrackballControls,
) -> bool {
    let current = compute_bounding_box(scene);
    if current.is_empty() || current.max_dimension() == 0.0 {
        return false;
    }

    let from_size = previous.max_dimension();
    if previous.is_empty() || from_size == 0.0 {
        return fit_to_box(&current, camera, controls);
    }

    let min_shift = previous.min.distance(current.min) / from_size;
    let max_shift = previous.max.distance(current.max) / from_size;
    if min_shift >= REFIT_THRESHOLD || max_shift >= REFIT_THRESHOLD {
        return fit_to_box(&current, camera, controls);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ScreenRect;
    use flowscope_core::{Color, Geometry, Light, Material, Object3D, TrackballSettings};
    use proptest::prelude::*;

    fn controls_for(camera: &mut PerspectiveCamera) -> TrackballControls {
        TrackballControls::new(
            camera,
            &TrackballSettings::default(),
            ScreenRect::new(0.0, 0.0, 800.0, 600.0),
        )
    }

    fn cube_at(position: Vec3, size: f32) -> Object3D {
        Object3D::mesh(Geometry::cuboid(size, size, size), Material::default())
            .with_position(position)
    }

    #[test]
    fn test_empty_scene_box_is_zero_size() {
        let mut scene = Scene::new();
        scene.add(Object3D::light(Light::Ambient {
            color: Color::WHITE,
            intensity: 1.0,
        }));
        let bbox = compute_bounding_box(&scene);
        assert!(bbox.is_empty());
        assert_eq!(bbox.size(), Vec3::ZERO);
    }

    #[test]
    fn test_box_descends_groups() {
        let mut scene = Scene::new();
        scene.add(
            Object3D::group()
                .with_position(Vec3::new(10.0, 0.0, 0.0))
                .with_child(cube_at(Vec3::ZERO, 2.0)),
        );
        scene.add(cube_at(Vec3::new(-1.0, 0.0, 0.0), 2.0));
        let bbox = compute_bounding_box(&scene);
        assert!((bbox.min.x + 2.0).abs() < 1e-5);
        assert!((bbox.max.x - 11.0).abs() < 1e-5);
    }

    #[test]
    fn test_box_includes_mesh_helpers() {
        let mut scene = Scene::new();
        scene.add(cube_at(Vec3::ZERO, 1.0).with_child(Object3D::line_segments(
            vec![[Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0)]],
            Color::WHITE,
        )));
        let bbox = compute_bounding_box(&scene);
        assert!((bbox.max.y - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_fit_unit_cube_distance() {
        let mut scene = Scene::new();
        scene.add(cube_at(Vec3::ZERO, 1.0));
        let mut camera = PerspectiveCamera::new(800.0 / 600.0);
        let mut controls = controls_for(&mut camera);

        assert!(fit_to_content(&scene, &mut camera, &mut controls));

        let expected = 1.2 * (1.0 / (2.0 * (35.0f32).to_radians().tan()));
        assert!((camera.position.length() - expected).abs() < 1e-4);
        // stays on the prior view axis
        assert!(camera.position.x.abs() < 1e-5 && camera.position.y.abs() < 1e-5);
        assert!(camera.position.z > 0.0);
        assert!((camera.near - expected / 100.0).abs() < 1e-6);
        assert!((camera.far - expected * 100.0).abs() < 1e-3);
        assert!((controls.max_distance - expected * 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_narrow_viewport_uses_width() {
        let mut camera = PerspectiveCamera::new(0.5);
        let height_only = 1.2 / (2.0 * (camera.fov_radians() / 2.0).tan());
        assert!((fit_distance(&camera, 1.0) - height_only / 0.5).abs() < 1e-4);
        camera.set_aspect(2.0);
        assert!((fit_distance(&camera, 1.0) - height_only).abs() < 1e-4);
    }

    #[test]
    fn test_fit_empty_scene_is_noop() {
        let scene = Scene::new();
        let mut camera = PerspectiveCamera::default();
        let mut controls = controls_for(&mut camera);
        let before = camera.clone();
        assert!(!fit_to_content(&scene, &mut camera, &mut controls));
        assert_eq!(camera, before);
    }

    #[test]
    fn test_fit_if_needed_from_empty() {
        let mut scene = Scene::new();
        scene.add(cube_at(Vec3::ZERO, 1.0));
        let mut camera = PerspectiveCamera::default();
        let mut controls = controls_for(&mut camera);
        assert!(fit_if_needed(&Aabb::EMPTY, &scene, &mut camera, &mut controls));
        assert!(!fit_if_needed(&Aabb::EMPTY, &Scene::new(), &mut camera, &mut controls));
    }

    #[test]
    fn test_fit_if_needed_threshold() {
        let previous = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        let shifted = |dx: f32| {
            let mut scene = Scene::new();
            scene.add(cube_at(Vec3::new(5.0 + dx, 5.0, 5.0), 10.0));
            scene
        };
        let mut camera = PerspectiveCamera::default();
        let mut controls = controls_for(&mut camera);

        assert!(fit_if_needed(&previous, &shifted(1.0), &mut camera, &mut controls));
        assert!(!fit_if_needed(&previous, &shifted(0.5), &mut camera, &mut controls));
        assert!(!fit_if_needed(&previous, &shifted(0.0), &mut camera, &mut controls));
    }

    proptest! {
        #[test]
        fn prop_fit_is_idempotent(
            x in -50.0f32..50.0,
            y in -50.0f32..50.0,
            z in -50.0f32..50.0,
            size in 0.1f32..20.0,
        ) {
            let mut scene = Scene::new();
            scene.add(cube_at(Vec3::new(x, y, z), size));
            let mut camera = PerspectiveCamera::new(4.0 / 3.0);
            let mut controls = controls_for(&mut camera);

            prop_assert!(fit_to_content(&scene, &mut camera, &mut controls));
            let first = (camera.position, controls.target, camera.near, camera.far);
            prop_assert!(fit_to_content(&scene, &mut camera, &mut controls));

            let tolerance = 1e-4 * first.0.length().max(1.0);
            prop_assert!(camera.position.distance(first.0) < tolerance);
            prop_assert!(controls.target.distance(first.1) < tolerance);
            prop_assert!((camera.near - first.2).abs() < tolerance);
            prop_assert!((camera.far - first.3).abs() < tolerance * 100.0);
        }
    }
}
