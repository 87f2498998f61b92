//! Rendering backend for flowscope-rs.
//!
//! This crate provides everything between a [`Scene`](flowscope_core::Scene)
//! and pixels:
//! - the perspective camera and the trackball controller driving it
//! - camera fitting to scene bounds
//! - the [`Platform`] surface (viewports, animation frames, resize observation)
//! - per-viewport [`RenderingContext`]s
//! - the wgpu-based [`WgpuRenderer`]

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
// Controller settings mirror the upstream option flags
#![allow(clippy::struct_excessive_bools)]
// Pixel sizes and vertex counts are converted between u32/usize/f32 routinely
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod camera;
pub mod context;
pub mod engine;
pub mod error;
pub mod fit;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod trackball;

pub use camera::PerspectiveCamera;
pub use context::RenderingContext;
pub use engine::WgpuRenderer;
pub use error::{RenderError, RenderResult};
pub use fit::{
    compute_bounding_box, fit_distance, fit_if_needed, fit_to_box, fit_to_content, FIT_RATIO,
    REFIT_THRESHOLD,
};
pub use input::{EventResponse, InputEvent, PointerButton, WheelDeltaMode};
pub use platform::{
    FrameHandle, HeadlessPlatform, Platform, RendererFactory, ResizeHandle, ScreenRect, ViewportId,
};
pub use renderer::{RendererInfo, SceneRenderer};
pub use trackball::{ControlEvent, ControlState, TrackballControls, CHANGE_EPSILON};
