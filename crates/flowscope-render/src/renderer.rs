//! The renderer seam between rendering contexts and graphics backends.

use serde::Serialize;

use flowscope_core::Scene;

use crate::camera::PerspectiveCamera;
use crate::error::RenderResult;

/// Summary of a renderer, recorded in render journals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RendererInfo {
    pub backend: String,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub frames_rendered: u64,
    pub context_lost: bool,
}

/// Draws a scene through a camera into one viewport.
pub trait SceneRenderer {
    /// Resizes the drawing buffer.
    fn set_size(&mut self, width: u32, height: u32);

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> RenderResult<()>;

    /// Releases the GPU context immediately. Later renders fail with
    /// [`RenderError::ContextLost`](crate::RenderError::ContextLost).
    fn force_context_loss(&mut self);

    /// Frees every remaining resource. Safe to call more than once.
    fn dispose(&mut self);

    fn describe(&self) -> RendererInfo;
}
