//! Click detection and ray-cast picking.

use std::time::{Duration, Instant};

use flowscope_core::{NodeId, ObjectId, Scene, SelectorHandle, Vec2, Vec3};
use flowscope_render::{PerspectiveCamera, ScreenRect};

/// Longest press still counted as a click.
pub const DEFAULT_CLICK_THRESHOLD: Duration = Duration::from_millis(500);

/// Tells clicks from drags by the time between pointer down and up.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    threshold: Duration,
    pressed_at: Option<Instant>,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_THRESHOLD)
    }
}

impl ClickTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pressed_at: None,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn pointer_down(&mut self, at: Instant) {
        self.pressed_at = Some(at);
    }

    /// Returns true when the release at `at` completes a click. Each press
    /// yields at most one click.
    pub fn pointer_up(&mut self, at: Instant) -> bool {
        self.pressed_at
            .take()
            .and_then(|pressed| at.checked_duration_since(pressed))
            .is_some_and(|held| held < self.threshold)
    }
}

/// The object chosen by a pick.
#[derive(Debug, Clone)]
pub struct PickHit {
    pub node: NodeId,
    pub object: ObjectId,
    pub selector: SelectorHandle,
    pub distance: f32,
    pub point: Vec3,
}

/// Casts a ray from `camera` through the page position `pointer` inside
/// `rect` and returns the closest selectable, visible object it hits.
///
/// Hidden objects, including those under a hidden ancestor, never qualify.
pub fn pick(
    scene: &Scene,
    camera: &PerspectiveCamera,
    rect: ScreenRect,
    pointer: Vec2,
) -> Option<PickHit> {
    if !rect.is_measurable() {
        return None;
    }
    let ray = camera.ray_from_ndc(rect.to_ndc(pointer))?;
    scene.raycast(&ray).into_iter().find_map(|hit| {
        if !scene.is_effectively_visible(hit.node) {
            return None;
        }
        let selector = scene.node(hit.node)?.selector()?.clone();
        Some(PickHit {
            node: hit.node,
            object: hit.object,
            selector,
            distance: hit.distance,
            point: hit.point,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowscope_core::{Geometry, Material, Object3D};

    fn rect() -> ScreenRect {
        ScreenRect::new(0.0, 0.0, 200.0, 200.0)
    }

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(1.0)
    }

    fn cube() -> Object3D {
        Object3D::mesh(Geometry::cuboid(1.0, 1.0, 1.0), Material::default())
    }

    const CENTER: Vec2 = Vec2::new(100.0, 100.0);

    #[test]
    fn test_click_threshold() {
        let start = Instant::now();
        let mut tracker = ClickTracker::default();

        tracker.pointer_down(start);
        assert!(tracker.pointer_up(start + Duration::from_millis(499)));

        tracker.pointer_down(start);
        assert!(!tracker.pointer_up(start + Duration::from_millis(500)));

        // release without a press
        assert!(!tracker.pointer_up(start));
    }

    #[test]
    fn test_pick_selectable_in_front() {
        let selector = SelectorHandle::new();
        let mut scene = Scene::new();
        let id = scene.add(cube().selectable(selector.clone()));

        let hit = pick(&scene, &camera(), rect(), CENTER).unwrap();
        assert_eq!(hit.node, id);
        assert!(hit.selector.same_channel(&selector));
        assert!((hit.distance - 9.5).abs() < 1e-4);
    }

    #[test]
    fn test_pick_skips_plain_objects() {
        let selector = SelectorHandle::new();
        let mut scene = Scene::new();
        scene.add(cube().with_position(Vec3::new(0.0, 0.0, 2.0)));
        let behind = scene.add(cube().selectable(selector));

        assert_eq!(pick(&scene, &camera(), rect(), CENTER).unwrap().node, behind);
    }

    #[test]
    fn test_hidden_ancestor_vetoes_pick() {
        let mut scene = Scene::new();
        scene.add(
            Object3D::group()
                .hidden()
                .with_child(cube().selectable(SelectorHandle::new())),
        );
        assert!(pick(&scene, &camera(), rect(), CENTER).is_none());
    }

    #[test]
    fn test_pick_misses_outside_content() {
        let mut scene = Scene::new();
        scene.add(cube().selectable(SelectorHandle::new()));
        assert!(pick(&scene, &camera(), rect(), Vec2::new(2.0, 2.0)).is_none());
        assert!(pick(&scene, &camera(), ScreenRect::default(), CENTER).is_none());
    }
}
