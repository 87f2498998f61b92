//! One rendering context per viewport.
//!
//! A context owns the renderer, camera and controller bound to one viewport,
//! plus its animation-frame request and resize observation. Several contexts
//! may draw the same [`Scene`]; they never mutate it.

use flowscope_core::{Aabb, Scene, TrackballSettings};

use crate::camera::PerspectiveCamera;
use crate::fit;
use crate::input::{EventResponse, InputEvent};
use crate::platform::{FrameHandle, Platform, ResizeHandle, ScreenRect, ViewportId};
use crate::renderer::{RendererInfo, SceneRenderer};
use crate::trackball::{ControlEvent, TrackballControls};

/// Renderer, camera and controller of one viewport.
pub struct RenderingContext {
    viewport: ViewportId,
    rect: ScreenRect,
    camera: PerspectiveCamera,
    controls: TrackballControls,
    renderer: Option<Box<dyn SceneRenderer>>,
    canvas_attached: bool,
    frame: Option<FrameHandle>,
    resize: Option<ResizeHandle>,
    fit_count: u64,
    disposed: bool,
}

impl std::fmt::Debug for RenderingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderingContext")
            .field("viewport", &self.viewport)
            .field("rect", &self.rect)
            .field("camera", &self.camera)
            .field("has_renderer", &self.renderer.is_some())
            .field("frame", &self.frame)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl RenderingContext {
    /// Sets up a context on `viewport`, fits the camera to `scene`, draws a
    /// first frame and starts the animation loop.
    ///
    /// A renderer that cannot be created is logged and the context keeps
    /// working without drawing.
    pub fn create(
        platform: &mut dyn Platform,
        viewport: ViewportId,
        scene: &Scene,
        settings: &TrackballSettings,
    ) -> Self {
        let rect = platform.viewport_rect(viewport).unwrap_or_default();
        let mut camera = PerspectiveCamera::new(rect.aspect());
        let controls = TrackballControls::new(&mut camera, settings, rect);

        let renderer = match platform.create_renderer(viewport, rect) {
            Ok(mut renderer) => {
                let (width, height) = rect.pixel_size();
                renderer.set_size(width, height);
                Some(renderer)
            }
            Err(e) => {
                log::error!("viewport {}: renderer unavailable, drawing disabled: {e}", viewport.0);
                None
            }
        };
        let canvas_attached = renderer.is_some();
        if canvas_attached {
            platform.attach_canvas(viewport);
        }
        let resize = Some(platform.observe_resize(viewport));

        let mut context = Self {
            viewport,
            rect,
            camera,
            controls,
            renderer,
            canvas_attached,
            frame: None,
            resize,
            fit_count: 0,
            disposed: false,
        };
        context.fit_to_content(scene);
        context.animate(platform, scene);
        log::debug!("viewport {}: rendering context created", viewport.0);
        context
    }

    /// Handles the animation frame `handle`. Stale handles and disposed
    /// contexts are ignored. Returns whether a frame was processed.
    pub fn tick(&mut self, platform: &mut dyn Platform, handle: FrameHandle, scene: &Scene) -> bool {
        if self.disposed || self.frame != Some(handle) {
            return false;
        }
        self.animate(platform, scene);
        true
    }

    fn animate(&mut self, platform: &mut dyn Platform, scene: &Scene) {
        self.frame = Some(platform.request_animation_frame(self.viewport));
        self.controls.update(&mut self.camera);
        self.draw(scene);
    }

    /// Draws `scene` once. A no-op without a renderer.
    pub fn draw(&mut self, scene: &Scene) {
        if self.disposed {
            return;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(e) = renderer.render(scene, &self.camera) {
                log::warn!("viewport {}: render failed: {e}", self.viewport.0);
            }
        }
    }

    /// Keeps renderer, camera and controller in sync with the viewport box.
    pub fn resize(&mut self, rect: ScreenRect) {
        if self.disposed {
            return;
        }
        self.rect = rect;
        if let Some(renderer) = self.renderer.as_mut() {
            let (width, height) = rect.pixel_size();
            renderer.set_size(width, height);
        }
        self.camera.set_aspect(rect.aspect());
        self.controls.handle_resize(rect);
    }

    /// Forwards an input event to the camera controller.
    pub fn handle_input(&mut self, event: &InputEvent) -> EventResponse {
        if self.disposed {
            return EventResponse::IGNORED;
        }
        self.controls.handle_event(&mut self.camera, event)
    }

    /// Fits the camera to the whole scene.
    pub fn fit_to_content(&mut self, scene: &Scene) -> bool {
        let fitted = fit::fit_to_content(scene, &mut self.camera, &mut self.controls);
        if fitted {
            self.fit_count += 1;
        }
        fitted
    }

    /// Refits when the scene box changed substantially since `previous`.
    pub fn fit_if_needed(&mut self, previous: &Aabb, scene: &Scene) -> bool {
        let fitted = fit::fit_if_needed(previous, scene, &mut self.camera, &mut self.controls);
        if fitted {
            self.fit_count += 1;
        }
        fitted
    }

    /// Releases everything the context holds: animation frame, resize
    /// observer, graphics context, canvas and controller. Returns false when
    /// the context was already disposed.
    pub fn dispose(&mut self, platform: &mut dyn Platform) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;

        if let Some(handle) = self.resize.take() {
            platform.disconnect_resize(handle);
        }
        if let Some(handle) = self.frame.take() {
            platform.cancel_animation_frame(handle);
        }
        if let Some(mut renderer) = self.renderer.take() {
            renderer.force_context_loss();
            renderer.dispose();
        }
        if self.canvas_attached {
            platform.detach_canvas(self.viewport);
            self.canvas_attached = false;
        }
        self.controls.set_enabled(false);
        self.controls.drain_events();
        log::debug!("viewport {}: rendering context disposed", self.viewport.0);
        true
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportId {
        self.viewport
    }

    #[must_use]
    pub fn rect(&self) -> ScreenRect {
        self.rect
    }

    #[must_use]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    #[must_use]
    pub fn controls(&self) -> &TrackballControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut TrackballControls {
        &mut self.controls
    }

    /// Takes the controller notifications emitted since the last call.
    pub fn drain_control_events(&mut self) -> Vec<ControlEvent> {
        self.controls.drain_events()
    }

    #[must_use]
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    #[must_use]
    pub fn renderer_info(&self) -> Option<RendererInfo> {
        self.renderer.as_ref().map(|r| r.describe())
    }

    /// Number of camera fits performed so far.
    #[must_use]
    pub fn fit_count(&self) -> u64 {
        self.fit_count
    }

    /// The animation frame this context is waiting for.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
