//! Trackball camera controller.
//!
//! The controller orbits, zooms and pans a [`PerspectiveCamera`] around a
//! target point. It consumes [`InputEvent`]s, keeps its motion state between
//! frames and is advanced by [`TrackballControls::update`] once per frame,
//! which also applies momentum damping when `static_moving` is off.
//!
//! State machine:
//!
//! ```text
//!   pointer down (button) ──> Rotate | Zoom | Pan ──pointer up──> None
//!   key down (held)       ──> Rotate | Zoom | Pan ──key up──────> previous
//!   1 touch ──> TouchRotate ──2nd touch──> TouchZoomPan
//!   TouchZoomPan ──release to 1──> TouchRotate ──release all──> None
//! ```

use glam::{Quat, Vec2, Vec3};

use flowscope_core::{TrackballKeys, TrackballSettings};

use crate::camera::PerspectiveCamera;
use crate::input::{EventResponse, InputEvent, PointerButton};
use crate::platform::ScreenRect;

/// Squared position change below which no [`ControlEvent::Change`] is emitted.
pub const CHANGE_EPSILON: f32 = 1e-6;

/// Interaction state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    None,
    Rotate,
    Zoom,
    Pan,
    TouchRotate,
    TouchZoomPan,
}

impl ControlState {
    fn from_button(button: PointerButton) -> Self {
        match button.index() {
            0 => Self::Rotate,
            1 => Self::Zoom,
            2 => Self::Pan,
            _ => Self::None,
        }
    }
}

/// Notifications emitted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// The camera moved.
    Change,
    /// An interaction started.
    Start,
    /// An interaction ended.
    End,
}

/// Orbit/zoom/pan controller bound to one camera.
#[derive(Debug, Clone)]
pub struct TrackballControls {
    pub enabled: bool,
    pub screen: ScreenRect,

    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,

    pub no_rotate: bool,
    pub no_zoom: bool,
    pub no_pan: bool,

    pub static_moving: bool,
    pub dynamic_damping_factor: f32,

    pub min_distance: f32,
    pub max_distance: f32,

    pub keys: TrackballKeys,

    /// Point the camera orbits around.
    pub target: Vec3,

    state: ControlState,
    prev_state: ControlState,
    pointer_captured: bool,
    key_listening: bool,

    last_position: Vec3,

    // per-frame motion state, reused across updates
    eye: Vec3,
    move_prev: Vec2,
    move_curr: Vec2,
    last_axis: Vec3,
    last_angle: f32,
    zoom_start: Vec2,
    zoom_end: Vec2,
    pan_start: Vec2,
    pan_end: Vec2,
    touch_zoom_distance_start: f32,
    touch_zoom_distance_end: f32,

    target0: Vec3,
    position0: Vec3,
    up0: Vec3,

    events: Vec<ControlEvent>,
}

impl TrackballControls {
    /// Creates a controller for `camera` and runs a first update.
    pub fn new(
        camera: &mut PerspectiveCamera,
        settings: &TrackballSettings,
        screen: ScreenRect,
    ) -> Self {
        let mut controls = Self {
            enabled: true,
            screen,
            rotate_speed: settings.rotate_speed,
            zoom_speed: settings.zoom_speed,
            pan_speed: settings.pan_speed,
            no_rotate: settings.no_rotate,
            no_zoom: settings.no_zoom,
            no_pan: settings.no_pan,
            static_moving: settings.static_moving,
            dynamic_damping_factor: settings.dynamic_damping_factor,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance_or_infinity(),
            keys: settings.keys.clone(),
            target: Vec3::ZERO,
            state: ControlState::None,
            prev_state: ControlState::None,
            pointer_captured: false,
            key_listening: true,
            last_position: Vec3::ZERO,
            eye: Vec3::ZERO,
            move_prev: Vec2::ZERO,
            move_curr: Vec2::ZERO,
            last_axis: Vec3::ZERO,
            last_angle: 0.0,
            zoom_start: Vec2::ZERO,
            zoom_end: Vec2::ZERO,
            pan_start: Vec2::ZERO,
            pan_end: Vec2::ZERO,
            touch_zoom_distance_start: 0.0,
            touch_zoom_distance_end: 0.0,
            target0: Vec3::ZERO,
            position0: camera.position,
            up0: camera.up,
            events: Vec::new(),
        };
        controls.update(camera);
        controls
    }

    #[must_use]
    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Updates the screen rectangle used to normalize pointer positions.
    pub fn handle_resize(&mut self, screen: ScreenRect) {
        self.screen = screen;
    }

    /// Takes the notifications emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advances the controller by one frame and moves the camera.
    /// Returns whether a [`ControlEvent::Change`] was emitted.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        self.eye = camera.position - self.target;

        if !self.no_rotate {
            self.rotate_camera(camera);
        }
        if !self.no_zoom {
            self.zoom_camera();
        }
        if !self.no_pan {
            self.pan_camera(camera);
        }

        camera.position = self.target + self.eye;
        self.check_distances(camera);
        camera.look_at(self.target);

        if self.last_position.distance_squared(camera.position) > CHANGE_EPSILON {
            self.events.push(ControlEvent::Change);
            self.last_position = camera.position;
            true
        } else {
            false
        }
    }

    /// Restores the pose captured at construction.
    pub fn reset(&mut self, camera: &mut PerspectiveCamera) {
        self.state = ControlState::None;
        self.prev_state = ControlState::None;

        self.target = self.target0;
        camera.position = self.position0;
        camera.up = self.up0;

        self.eye = camera.position - self.target;
        camera.look_at(self.target);

        self.events.push(ControlEvent::Change);
        self.last_position = camera.position;
    }

    /// Feeds one input event. Events are ignored while disabled.
    pub fn handle_event(
        &mut self,
        camera: &mut PerspectiveCamera,
        event: &InputEvent,
    ) -> EventResponse {
        if !self.enabled {
            return EventResponse::IGNORED;
        }
        match event {
            // positions are normalized by the screen size
            InputEvent::PointerDown { .. }
            | InputEvent::PointerMove { .. }
            | InputEvent::TouchStart { .. }
            | InputEvent::TouchMove { .. }
                if !self.screen.is_measurable() =>
            {
                EventResponse::IGNORED
            }
            InputEvent::PointerDown { button, position } => self.pointer_down(*button, *position),
            InputEvent::PointerMove { position } => self.pointer_move(camera, *position),
            InputEvent::PointerUp { .. } => self.pointer_up(),
            InputEvent::Wheel { delta_y, mode } => {
                self.zoom_start.y -= delta_y * mode.zoom_scale();
                self.events.push(ControlEvent::Start);
                self.events.push(ControlEvent::End);
                self.update(camera);
                EventResponse::CONSUMED
            }
            InputEvent::TouchStart { touches } => self.touch_start(touches),
            InputEvent::TouchMove { touches } => self.touch_move(camera, touches),
            InputEvent::TouchEnd { touches } => self.touch_end(touches),
            InputEvent::KeyDown { code } => {
                self.key_down(code);
                EventResponse::IGNORED
            }
            InputEvent::KeyUp { .. } => {
                self.key_up();
                EventResponse::IGNORED
            }
            InputEvent::ContextMenu => EventResponse::PREVENT_DEFAULT,
        }
    }

    fn rotate_camera(&mut self, camera: &mut PerspectiveCamera) {
        let delta = self.move_curr - self.move_prev;
        let mut angle = delta.length();

        if angle > 0.0 {
            self.eye = camera.position - self.target;

            let eye_direction = self.eye.normalize_or_zero();
            let up_direction = camera.up.normalize_or_zero();
            let sideways = up_direction.cross(eye_direction).normalize_or_zero();
            let move_direction = up_direction * delta.y + sideways * delta.x;

            let axis = move_direction.cross(self.eye).normalize_or_zero();
            if axis != Vec3::ZERO {
                angle *= self.rotate_speed;
                let rotation = Quat::from_axis_angle(axis, angle);
                self.eye = rotation * self.eye;
                camera.up = rotation * camera.up;

                self.last_axis = axis;
                self.last_angle = angle;
            }
        } else if !self.static_moving && self.last_angle != 0.0 && self.last_axis != Vec3::ZERO {
            self.last_angle *= (1.0 - self.dynamic_damping_factor).sqrt();
            self.eye = camera.position - self.target;
            let rotation = Quat::from_axis_angle(self.last_axis, self.last_angle);
            self.eye = rotation * self.eye;
            camera.up = rotation * camera.up;
        }

        self.move_prev = self.move_curr;
    }

    #[allow(clippy::float_cmp)]
    fn zoom_camera(&mut self) {
        if self.state == ControlState::TouchZoomPan {
            if self.touch_zoom_distance_end > 0.0 {
                let factor = self.touch_zoom_distance_start / self.touch_zoom_distance_end;
                self.touch_zoom_distance_start = self.touch_zoom_distance_end;
                self.eye *= factor;
            }
        } else {
            let factor = 1.0 + (self.zoom_end.y - self.zoom_start.y) * self.zoom_speed;
            if factor != 1.0 && factor > 0.0 {
                self.eye *= factor;
            }

            if self.static_moving {
                self.zoom_start = self.zoom_end;
            } else {
                self.zoom_start.y +=
                    (self.zoom_end.y - self.zoom_start.y) * self.dynamic_damping_factor;
            }
        }
    }

    fn pan_camera(&mut self, camera: &mut PerspectiveCamera) {
        let mut mouse_change = self.pan_end - self.pan_start;
        if mouse_change.length_squared() == 0.0 {
            return;
        }
        mouse_change *= self.eye.length() * self.pan_speed;

        let pan = with_length(self.eye.cross(camera.up), mouse_change.x)
            + with_length(camera.up, mouse_change.y);

        camera.position += pan;
        self.target += pan;

        if self.static_moving {
            self.pan_start = self.pan_end;
        } else {
            self.pan_start += (self.pan_end - self.pan_start) * self.dynamic_damping_factor;
        }
    }

    fn check_distances(&mut self, camera: &mut PerspectiveCamera) {
        if self.no_zoom && self.no_pan {
            return;
        }
        let length_sq = self.eye.length_squared();
        if length_sq > self.max_distance * self.max_distance {
            self.eye = with_length(self.eye, self.max_distance);
            camera.position = self.target + self.eye;
            self.zoom_start = self.zoom_end;
        }
        if self.eye.length_squared() < self.min_distance * self.min_distance {
            self.eye = with_length(self.eye, self.min_distance);
            camera.position = self.target + self.eye;
            self.zoom_start = self.zoom_end;
        }
    }

    /// Pointer position relative to the screen, `[0, 1]` on both axes.
    fn mouse_on_screen(&self, page: Vec2) -> Vec2 {
        Vec2::new(
            (page.x - self.screen.left) / self.screen.width,
            (page.y - self.screen.top) / self.screen.height,
        )
    }

    /// Pointer position on the virtual trackball. Both axes are scaled by the
    /// screen width so the ball stays round on non-square screens.
    fn mouse_on_circle(&self, page: Vec2) -> Vec2 {
        Vec2::new(
            (page.x - self.screen.width * 0.5 - self.screen.left) / (self.screen.width * 0.5),
            (self.screen.height + 2.0 * (self.screen.top - page.y)) / self.screen.width,
        )
    }

    fn pointer_down(&mut self, button: PointerButton, position: Vec2) -> EventResponse {
        if self.state == ControlState::None {
            self.state = ControlState::from_button(button);
        }

        match self.state {
            ControlState::Rotate if !self.no_rotate => {
                self.move_curr = self.mouse_on_circle(position);
                self.move_prev = self.move_curr;
            }
            ControlState::Zoom if !self.no_zoom => {
                self.zoom_start = self.mouse_on_screen(position);
                self.zoom_end = self.zoom_start;
            }
            ControlState::Pan if !self.no_pan => {
                self.pan_start = self.mouse_on_screen(position);
                self.pan_end = self.pan_start;
            }
            _ => {}
        }

        self.pointer_captured = true;
        self.events.push(ControlEvent::Start);
        EventResponse::CONSUMED
    }

    fn pointer_move(&mut self, camera: &mut PerspectiveCamera, position: Vec2) -> EventResponse {
        if !self.pointer_captured {
            return EventResponse::IGNORED;
        }

        match self.state {
            ControlState::Rotate if !self.no_rotate => {
                self.move_prev = self.move_curr;
                self.move_curr = self.mouse_on_circle(position);
            }
            ControlState::Zoom if !self.no_zoom => {
                self.zoom_end = self.mouse_on_screen(position);
            }
            ControlState::Pan if !self.no_pan => {
                self.pan_end = self.mouse_on_screen(position);
            }
            _ => {}
        }

        self.update(camera);
        EventResponse::CONSUMED
    }

    fn pointer_up(&mut self) -> EventResponse {
        if !self.pointer_captured {
            return EventResponse::IGNORED;
        }
        self.state = ControlState::None;
        self.pointer_captured = false;
        self.events.push(ControlEvent::End);
        EventResponse::CONSUMED
    }

    fn touch_start(&mut self, touches: &[Vec2]) -> EventResponse {
        match touches {
            [] => return EventResponse::IGNORED,
            [single] => {
                self.state = ControlState::TouchRotate;
                self.move_curr = self.mouse_on_circle(*single);
                self.move_prev = self.move_curr;
            }
            [first, second, ..] => {
                self.state = ControlState::TouchZoomPan;
                let distance = first.distance(*second);
                self.touch_zoom_distance_start = distance;
                self.touch_zoom_distance_end = distance;
                self.pan_start = self.mouse_on_screen((*first + *second) * 0.5);
                self.pan_end = self.pan_start;
            }
        }
        self.events.push(ControlEvent::Start);
        EventResponse::IGNORED
    }

    fn touch_move(&mut self, camera: &mut PerspectiveCamera, touches: &[Vec2]) -> EventResponse {
        match touches {
            [] => return EventResponse::CONSUMED,
            [single] => {
                self.move_prev = self.move_curr;
                self.move_curr = self.mouse_on_circle(*single);
            }
            [first, second, ..] => {
                self.touch_zoom_distance_end = first.distance(*second);
                self.pan_end = self.mouse_on_screen((*first + *second) * 0.5);
            }
        }
        self.update(camera);
        EventResponse::CONSUMED
    }

    fn touch_end(&mut self, touches: &[Vec2]) -> EventResponse {
        match touches {
            [] => self.state = ControlState::None,
            [_] if !self.screen.is_measurable() => self.state = ControlState::None,
            [single] => {
                self.state = ControlState::TouchRotate;
                self.move_curr = self.mouse_on_circle(*single);
                self.move_prev = self.move_curr;
            }
            _ => {}
        }
        self.events.push(ControlEvent::End);
        EventResponse::IGNORED
    }

    /// Only the first key down is honored until the matching key up.
    fn key_down(&mut self, code: &str) {
        if !self.key_listening {
            return;
        }
        self.key_listening = false;
        self.prev_state = self.state;

        if self.state != ControlState::None {
            return;
        }
        if code == self.keys.rotate && !self.no_rotate {
            self.state = ControlState::Rotate;
        } else if code == self.keys.zoom && !self.no_zoom {
            self.state = ControlState::Zoom;
        } else if code == self.keys.pan && !self.no_pan {
            self.state = ControlState::Pan;
        }
    }

    fn key_up(&mut self) {
        if self.key_listening {
            return;
        }
        self.state = self.prev_state;
        self.key_listening = true;
    }
}

fn with_length(v: Vec3, length: f32) -> Vec3 {
    v.normalize_or_zero() * length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::WheelDeltaMode;
    use proptest::prelude::*;

    fn screen() -> ScreenRect {
        ScreenRect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn setup(settings: &TrackballSettings) -> (PerspectiveCamera, TrackballControls) {
        let mut camera = PerspectiveCamera::new(800.0 / 600.0);
        let mut controls = TrackballControls::new(&mut camera, settings, screen());
        controls.drain_events();
        (camera, controls)
    }

    fn drag(
        camera: &mut PerspectiveCamera,
        controls: &mut TrackballControls,
        button: PointerButton,
        from: Vec2,
        to: Vec2,
    ) {
        controls.handle_event(camera, &InputEvent::PointerDown { button, position: from });
        controls.handle_event(camera, &InputEvent::PointerMove { position: to });
        controls.handle_event(camera, &InputEvent::PointerUp { button, position: to });
    }

    #[test]
    fn test_construction_emits_change() {
        let mut camera = PerspectiveCamera::default();
        let mut controls =
            TrackballControls::new(&mut camera, &TrackballSettings::default(), screen());
        assert_eq!(controls.drain_events(), vec![ControlEvent::Change]);
        assert!(controls.drain_events().is_empty());
    }

    #[test]
    fn test_idle_update_is_silent() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        assert!(!controls.update(&mut camera));
        assert!(controls.drain_events().is_empty());
    }

    #[test]
    fn test_unit_move_emits_change() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        camera.position.x += 1.0;
        assert!(controls.update(&mut camera));
        assert_eq!(controls.drain_events(), vec![ControlEvent::Change]);
    }

    #[test]
    fn test_rotate_drag_keeps_distance() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        drag(
            &mut camera,
            &mut controls,
            PointerButton::Primary,
            Vec2::new(400.0, 300.0),
            Vec2::new(500.0, 300.0),
        );
        assert!((camera.position.length() - 10.0).abs() < 1e-3);
        assert!(camera.position.x.abs() > 0.1);
        let events = controls.drain_events();
        assert_eq!(events.first(), Some(&ControlEvent::Start));
        assert!(events.contains(&ControlEvent::Change));
        assert_eq!(events.last(), Some(&ControlEvent::End));
        assert_eq!(controls.state(), ControlState::None);
    }

    #[test]
    fn test_rotation_coasts_then_stops_when_static() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        drag(
            &mut camera,
            &mut controls,
            PointerButton::Primary,
            Vec2::new(400.0, 300.0),
            Vec2::new(420.0, 300.0),
        );
        let before = camera.position;
        assert!(controls.update(&mut camera));
        assert!(camera.position.distance(before) > 0.0);

        let settings = TrackballSettings {
            static_moving: true,
            ..TrackballSettings::default()
        };
        let (mut camera, mut controls) = setup(&settings);
        drag(
            &mut camera,
            &mut controls,
            PointerButton::Primary,
            Vec2::new(400.0, 300.0),
            Vec2::new(420.0, 300.0),
        );
        let before = camera.position;
        assert!(!controls.update(&mut camera));
        assert_eq!(camera.position, before);
    }

    #[test]
    fn test_wheel_zooms_out_and_consumes() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        let response = controls.handle_event(
            &mut camera,
            &InputEvent::Wheel {
                delta_y: 100.0,
                mode: WheelDeltaMode::Pixel,
            },
        );
        assert_eq!(response, EventResponse::CONSUMED);
        // 1 + 100 * 0.00025 * 1.2
        assert!((camera.position.length() - 10.3).abs() < 1e-3);
        let events = controls.drain_events();
        assert_eq!(&events[..2], &[ControlEvent::Start, ControlEvent::End]);
    }

    #[test]
    fn test_wheel_units_are_normalized() {
        assert!((WheelDeltaMode::Line.zoom_scale() / WheelDeltaMode::Pixel.zoom_scale() - 40.0).abs() < 1e-3);
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        controls.handle_event(
            &mut camera,
            &InputEvent::Wheel {
                delta_y: -1.0,
                mode: WheelDeltaMode::Page,
            },
        );
        // 1 - 0.025 * 1.2
        assert!((camera.position.length() - 9.7).abs() < 1e-3);
    }

    #[test]
    fn test_pan_moves_target() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        drag(
            &mut camera,
            &mut controls,
            PointerButton::Secondary,
            Vec2::new(400.0, 300.0),
            Vec2::new(480.0, 300.0),
        );
        assert!(controls.target.x.abs() > 0.0);
        assert!(((camera.position - controls.target).length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_distance_clamped() {
        let settings = TrackballSettings {
            max_distance: Some(10.5),
            ..TrackballSettings::default()
        };
        let (mut camera, mut controls) = setup(&settings);
        for _ in 0..10 {
            controls.handle_event(
                &mut camera,
                &InputEvent::Wheel {
                    delta_y: 3.0,
                    mode: WheelDeltaMode::Page,
                },
            );
        }
        assert!(camera.position.length() <= 10.5 + 1e-4);

        camera.position = Vec3::new(0.0, 0.0, 20.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 10.5).abs() < 1e-4);
    }

    #[test]
    fn test_disabled_ignores_input() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        controls.set_enabled(false);
        let response = controls.handle_event(
            &mut camera,
            &InputEvent::Wheel {
                delta_y: 100.0,
                mode: WheelDeltaMode::Pixel,
            },
        );
        assert_eq!(response, EventResponse::IGNORED);
        assert!(controls.drain_events().is_empty());
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        let response = controls.handle_event(
            &mut camera,
            &InputEvent::PointerMove {
                position: Vec2::new(10.0, 10.0),
            },
        );
        assert_eq!(response, EventResponse::IGNORED);
        assert_eq!(
            controls.handle_event(
                &mut camera,
                &InputEvent::PointerUp {
                    button: PointerButton::Primary,
                    position: Vec2::ZERO
                }
            ),
            EventResponse::IGNORED
        );
    }

    #[test]
    fn test_key_forces_state_until_release() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        let key = |code: &str| InputEvent::KeyDown { code: code.into() };
        controls.handle_event(&mut camera, &key("KeyS"));
        assert_eq!(controls.state(), ControlState::Zoom);
        // a second key is not honored while the first is held
        controls.handle_event(&mut camera, &key("KeyD"));
        assert_eq!(controls.state(), ControlState::Zoom);
        controls.handle_event(&mut camera, &InputEvent::KeyUp { code: "KeyS".into() });
        assert_eq!(controls.state(), ControlState::None);

        controls.handle_event(&mut camera, &key("KeyD"));
        assert_eq!(controls.state(), ControlState::Pan);
    }

    #[test]
    fn test_key_ignored_while_dragging() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        controls.handle_event(
            &mut camera,
            &InputEvent::PointerDown {
                button: PointerButton::Secondary,
                position: Vec2::new(1.0, 1.0),
            },
        );
        controls.handle_event(&mut camera, &InputEvent::KeyDown { code: "KeyA".into() });
        assert_eq!(controls.state(), ControlState::Pan);
    }

    #[test]
    fn test_touch_states() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        let a = Vec2::new(300.0, 300.0);
        let b = Vec2::new(500.0, 300.0);
        controls.handle_event(&mut camera, &InputEvent::TouchStart { touches: vec![a] });
        assert_eq!(controls.state(), ControlState::TouchRotate);
        controls.handle_event(&mut camera, &InputEvent::TouchStart { touches: vec![a, b] });
        assert_eq!(controls.state(), ControlState::TouchZoomPan);

        // spreading the fingers zooms in
        let response = controls.handle_event(
            &mut camera,
            &InputEvent::TouchMove {
                touches: vec![Vec2::new(200.0, 300.0), Vec2::new(600.0, 300.0)],
            },
        );
        assert_eq!(response, EventResponse::CONSUMED);
        assert!(camera.position.length() < 10.0);

        controls.handle_event(&mut camera, &InputEvent::TouchEnd { touches: vec![a] });
        assert_eq!(controls.state(), ControlState::TouchRotate);
        controls.handle_event(&mut camera, &InputEvent::TouchEnd { touches: vec![] });
        assert_eq!(controls.state(), ControlState::None);
    }

    #[test]
    fn test_unmeasured_screen_ignores_pointers() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = TrackballControls::new(
            &mut camera,
            &TrackballSettings::default(),
            ScreenRect::default(),
        );
        controls.drain_events();

        for button in [PointerButton::Primary, PointerButton::Secondary] {
            let down = InputEvent::PointerDown {
                button,
                position: Vec2::new(10.0, 10.0),
            };
            assert_eq!(controls.handle_event(&mut camera, &down), EventResponse::IGNORED);
            let moved = InputEvent::PointerMove {
                position: Vec2::new(40.0, 30.0),
            };
            assert_eq!(controls.handle_event(&mut camera, &moved), EventResponse::IGNORED);
        }
        controls.handle_event(
            &mut camera,
            &InputEvent::TouchStart {
                touches: vec![Vec2::ZERO, Vec2::ONE],
            },
        );
        controls.handle_event(
            &mut camera,
            &InputEvent::TouchMove {
                touches: vec![Vec2::ZERO, Vec2::new(5.0, 5.0)],
            },
        );
        controls.handle_event(&mut camera, &InputEvent::TouchEnd { touches: vec![Vec2::ONE] });
        controls.update(&mut camera);

        assert!(camera.position.is_finite());
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(controls.state(), ControlState::None);

        // input works once the viewport has been laid out
        controls.handle_resize(screen());
        drag(
            &mut camera,
            &mut controls,
            PointerButton::Primary,
            Vec2::new(400.0, 300.0),
            Vec2::new(500.0, 300.0),
        );
        assert!(camera.position.is_finite());
        assert!(camera.position.x.abs() > 0.1);
    }

    #[test]
    fn test_context_menu_prevented() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        let response = controls.handle_event(&mut camera, &InputEvent::ContextMenu);
        assert!(response.prevent_default);
        assert!(!response.stop_propagation);
    }

    #[test]
    fn test_reset_restores_pose() {
        let (mut camera, mut controls) = setup(&TrackballSettings::default());
        drag(
            &mut camera,
            &mut controls,
            PointerButton::Secondary,
            Vec2::new(400.0, 300.0),
            Vec2::new(480.0, 350.0),
        );
        controls.drain_events();
        controls.reset(&mut camera);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(controls.target, Vec3::ZERO);
        assert_eq!(controls.drain_events(), vec![ControlEvent::Change]);
    }

    proptest! {
        #[test]
        fn prop_sub_epsilon_moves_are_silent(
            dx in -1e-6f32..1e-6,
            dy in -1e-6f32..1e-6,
            dz in -1e-6f32..1e-6,
        ) {
            let (mut camera, mut controls) = setup(&TrackballSettings::default());
            camera.position += Vec3::new(dx, dy, dz);
            prop_assert!(!controls.update(&mut camera));
            prop_assert!(controls.drain_events().is_empty());
        }

        #[test]
        fn prop_unit_moves_notify(axis in 0usize..3, sign in prop::bool::ANY) {
            let (mut camera, mut controls) = setup(&TrackballSettings::default());
            let mut delta = Vec3::ZERO;
            delta[axis] = if sign { 1.0 } else { -1.0 };
            camera.position += delta;
            prop_assert!(controls.update(&mut camera));
        }
    }
}
