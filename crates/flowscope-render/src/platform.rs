//! The platform surface a viewer runs on.
//!
//! Viewports, animation frames, resize observation and canvas management are
//! reached exclusively through the [`Platform`] trait so that everything above
//! it can run without a window system. [`HeadlessPlatform`] is the in-process
//! implementation used for offscreen rendering and tests: it records frame
//! requests and observers, and the embedding code pumps frames explicitly.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use glam::Vec2;

use crate::engine::WgpuRenderer;
use crate::error::{RenderError, RenderResult};
use crate::renderer::SceneRenderer;

/// Identifies one attachment point (the host element a view is mounted in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(pub u64);

/// Rectangle of a viewport in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether the rectangle has a usable layout box.
    #[must_use]
    pub fn is_measurable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Width over height, 1 when unmeasurable.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.is_measurable() {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Size in whole pixels, at least 1x1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width.round() as u32).max(1),
            (self.height.round() as u32).max(1),
        )
    }

    #[must_use]
    pub fn contains(&self, page: Vec2) -> bool {
        page.x >= self.left
            && page.x <= self.left + self.width
            && page.y >= self.top
            && page.y <= self.top + self.height
    }

    /// Converts a page position to normalized device coordinates (+Y up).
    #[must_use]
    pub fn to_ndc(&self, page: Vec2) -> Vec2 {
        Vec2::new(
            (page.x - self.left) / self.width * 2.0 - 1.0,
            -((page.y - self.top) / self.height) * 2.0 + 1.0,
        )
    }
}

/// A pending animation-frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// An active resize observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResizeHandle(pub u64);

/// Host services needed by rendering contexts.
pub trait Platform {
    /// Current layout box of a viewport, `None` when it is not in the layout.
    fn viewport_rect(&self, viewport: ViewportId) -> Option<ScreenRect>;

    /// Asks for one callback on the next frame. The host answers by calling
    /// the viewer's animation-frame entry point with the returned handle.
    fn request_animation_frame(&mut self, viewport: ViewportId) -> FrameHandle;

    fn cancel_animation_frame(&mut self, handle: FrameHandle);

    fn observe_resize(&mut self, viewport: ViewportId) -> ResizeHandle;

    fn disconnect_resize(&mut self, handle: ResizeHandle);

    /// Creates the renderer drawing into a viewport's canvas.
    fn create_renderer(
        &mut self,
        viewport: ViewportId,
        rect: ScreenRect,
    ) -> RenderResult<Box<dyn SceneRenderer>>;

    /// Inserts the canvas into the viewport.
    fn attach_canvas(&mut self, viewport: ViewportId);

    /// Removes the canvas from the viewport.
    fn detach_canvas(&mut self, viewport: ViewportId);
}

/// Builds renderers for [`HeadlessPlatform`].
pub type RendererFactory =
    Box<dyn FnMut(ViewportId, ScreenRect) -> RenderResult<Box<dyn SceneRenderer>>>;

/// Offscreen platform.
pub struct HeadlessPlatform {
    rects: HashMap<ViewportId, ScreenRect>,
    frames: BTreeMap<FrameHandle, ViewportId>,
    observers: HashMap<ResizeHandle, ViewportId>,
    canvases: HashSet<ViewportId>,
    next_handle: u64,
    factory: RendererFactory,
}

impl fmt::Debug for HeadlessPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessPlatform")
            .field("rects", &self.rects)
            .field("frames", &self.frames)
            .field("observers", &self.observers)
            .field("canvases", &self.canvases)
            .finish_non_exhaustive()
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// A platform whose renderers are offscreen [`WgpuRenderer`]s.
    #[must_use]
    pub fn new() -> Self {
        Self::with_renderer_factory(|_, rect| {
            let (width, height) = rect.pixel_size();
            let renderer = WgpuRenderer::headless(width, height)?;
            Ok(Box::new(renderer) as Box<dyn SceneRenderer>)
        })
    }

    /// A platform that obtains renderers from `factory`.
    pub fn with_renderer_factory<F>(factory: F) -> Self
    where
        F: FnMut(ViewportId, ScreenRect) -> RenderResult<Box<dyn SceneRenderer>> + 'static,
    {
        Self {
            rects: HashMap::new(),
            frames: BTreeMap::new(),
            observers: HashMap::new(),
            canvases: HashSet::new(),
            next_handle: 1,
            factory: Box::new(factory),
        }
    }

    /// A platform without any graphics backend; every renderer request fails.
    #[must_use]
    pub fn without_renderer() -> Self {
        Self::with_renderer_factory(|viewport, _| {
            Err(RenderError::Unavailable(format!(
                "no graphics backend for viewport {}",
                viewport.0
            )))
        })
    }

    /// Lays out a viewport. Returns true when the viewport is observed, in
    /// which case the caller forwards the new size to the viewer.
    pub fn set_viewport_rect(&mut self, viewport: ViewportId, rect: ScreenRect) -> bool {
        self.rects.insert(viewport, rect);
        self.is_observed(viewport)
    }

    pub fn remove_viewport(&mut self, viewport: ViewportId) {
        self.rects.remove(&viewport);
    }

    /// Frame requests not yet delivered, oldest first.
    #[must_use]
    pub fn pending_frames(&self) -> Vec<(FrameHandle, ViewportId)> {
        self.frames.iter().map(|(h, v)| (*h, *v)).collect()
    }

    /// Removes and returns every pending frame request.
    pub fn take_pending_frames(&mut self) -> Vec<(FrameHandle, ViewportId)> {
        std::mem::take(&mut self.frames).into_iter().collect()
    }

    #[must_use]
    pub fn has_pending_frame(&self, viewport: ViewportId) -> bool {
        self.frames.values().any(|v| *v == viewport)
    }

    #[must_use]
    pub fn is_observed(&self, viewport: ViewportId) -> bool {
        self.observers.values().any(|v| *v == viewport)
    }

    #[must_use]
    pub fn has_canvas(&self, viewport: ViewportId) -> bool {
        self.canvases.contains(&viewport)
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl Platform for HeadlessPlatform {
    fn viewport_rect(&self, viewport: ViewportId) -> Option<ScreenRect> {
        self.rects.get(&viewport).copied()
    }

    fn request_animation_frame(&mut self, viewport: ViewportId) -> FrameHandle {
        let handle = FrameHandle(self.next_handle());
        self.frames.insert(handle, viewport);
        handle
    }

    fn cancel_animation_frame(&mut self, handle: FrameHandle) {
        self.frames.remove(&handle);
    }

    fn observe_resize(&mut self, viewport: ViewportId) -> ResizeHandle {
        let handle = ResizeHandle(self.next_handle());
        self.observers.insert(handle, viewport);
        handle
    }

    fn disconnect_resize(&mut self, handle: ResizeHandle) {
        self.observers.remove(&handle);
    }

    fn create_renderer(
        &mut self,
        viewport: ViewportId,
        rect: ScreenRect,
    ) -> RenderResult<Box<dyn SceneRenderer>> {
        (self.factory)(viewport, rect)
    }

    fn attach_canvas(&mut self, viewport: ViewportId) {
        self.canvases.insert(viewport);
    }

    fn detach_canvas(&mut self, viewport: ViewportId) {
        self.canvases.remove(&viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndc_conversion() {
        let rect = ScreenRect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(rect.to_ndc(Vec2::new(200.0, 100.0)), Vec2::ZERO);
        assert_eq!(rect.to_ndc(Vec2::new(100.0, 50.0)), Vec2::new(-1.0, 1.0));
        assert_eq!(rect.to_ndc(Vec2::new(300.0, 150.0)), Vec2::new(1.0, -1.0));
        assert!(rect.contains(Vec2::new(150.0, 60.0)));
        assert!(!rect.contains(Vec2::new(50.0, 60.0)));
    }

    #[test]
    fn test_pixel_size_and_aspect() {
        assert_eq!(ScreenRect::new(0.0, 0.0, 0.0, 0.0).pixel_size(), (1, 1));
        assert_eq!(ScreenRect::new(0.0, 0.0, 640.4, 480.0).pixel_size(), (640, 480));
        assert!((ScreenRect::default().aspect() - 1.0).abs() < f32::EPSILON);
        assert!(!ScreenRect::default().is_measurable());
    }

    #[test]
    fn test_frames_and_observers() {
        let mut platform = HeadlessPlatform::without_renderer();
        let viewport = ViewportId(1);
        let a = platform.request_animation_frame(viewport);
        let b = platform.request_animation_frame(ViewportId(2));
        assert!(platform.has_pending_frame(viewport));
        platform.cancel_animation_frame(a);
        assert!(!platform.has_pending_frame(viewport));
        assert_eq!(platform.take_pending_frames(), vec![(b, ViewportId(2))]);
        assert!(platform.pending_frames().is_empty());

        let observer = platform.observe_resize(viewport);
        assert!(platform.set_viewport_rect(viewport, ScreenRect::new(0.0, 0.0, 10.0, 10.0)));
        platform.disconnect_resize(observer);
        assert!(!platform.set_viewport_rect(viewport, ScreenRect::new(0.0, 0.0, 20.0, 10.0)));
        assert_eq!(platform.viewport_rect(viewport).map(|r| r.width), Some(20.0));
    }

    #[test]
    fn test_without_renderer_fails() {
        let mut platform = HeadlessPlatform::without_renderer();
        let result = platform.create_renderer(ViewportId(3), ScreenRect::new(0.0, 0.0, 4.0, 4.0));
        assert!(matches!(result, Err(RenderError::Unavailable(_))));
    }
}
