//! flowscope: an embeddable 3D viewer node for dataflow editors.
//!
//! Upstream nodes produce [`Object3D`] trees (meshes, groups, lights), the
//! viewer node renders them into one or more viewports, fits the camera to the
//! content and lets the user pick selectable objects.
//!
//! # Quick Start
//!
//! ```no_run
//! use flowscope::*;
//! use std::time::Instant;
//!
//! fn main() -> Result<()> {
//!     let mut platform = HeadlessPlatform::new();
//!     platform.set_viewport_rect(ViewportId(1), ScreenRect::new(0.0, 0.0, 640.0, 480.0));
//!
//!     let mut module = ViewerModule::new(ViewerConfig::default(), platform);
//!     module.connected(ViewportId(1));
//!     module.flush_deferred();
//!
//!     let selector = SelectorHandle::new();
//!     let cube = Object3D::mesh(Geometry::cuboid(1.0, 1.0, 1.0), Material::default())
//!         .selectable(selector);
//!     module.process(InputMessage::new([cube]))?;
//!
//!     module.state_mut().run_pending_frames();
//!     let _ = module.dispatch_input(ViewportId(1), &InputEvent::ContextMenu, Instant::now());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`ViewerModule`] checks the input contract and writes the render journal
//! - [`ViewerState`] owns the [`Scene`], its [`RenderingContext`]s and the selection
//! - [`ViewerView`] is the attachable surface with its deferred attach
//! - [`PluginsGateway`] relays pointer events to plugins

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]

pub mod gateway;
pub mod highlight;
pub mod journal;
pub mod module;
pub mod picking;
pub mod state;
pub mod view;
pub mod winit_input;

pub use gateway::{PluginsGateway, PointerEvent, PointerEventKind, GATEWAY_QUEUE_CAPACITY};
pub use highlight::{Highlight, DEFAULT_HIGHLIGHT_COLOR, HIGHLIGHT_GROUP_NAME};
pub use journal::{Journal, JournalEntry, JournalPage, LogContext, JOURNAL_CAPACITY};
pub use module::{InputItem, InputMessage, ViewerModule, RENDER_PAGE_TITLE};
pub use picking::{pick, ClickTracker, PickHit, DEFAULT_CLICK_THRESHOLD};
pub use state::{RenderLoopAction, RenderLoopFrame, Selection, ViewerState};
pub use view::{ViewerView, DEFAULT_VIEW_CLASS};
pub use winit_input::{pointer_button, WinitInputTranslator};

// Re-export core types
pub use flowscope_core::{
    default_lights, Aabb, Capability, Color, DefaultLights, FlowscopeError, Geometry, Intersection,
    Light, Material, NodeId, Object3D, ObjectId, ObjectKind, Ray, Result, Scene, SceneNode,
    SelectionEvent, SelectionKind, SelectionSignal, SelectorHandle, TrackballKeys,
    TrackballSettings, Transform, ViewerConfig, DEFAULT_BACKGROUND, DEFAULT_LIGHTS_NAME,
};
pub use flowscope_core::{Mat4, Quat, UVec3, Vec2, Vec3, Vec4};

// Re-export render types
pub use flowscope_render::{
    compute_bounding_box, fit_distance, fit_if_needed, fit_to_box, fit_to_content, ControlEvent,
    ControlState, EventResponse, FrameHandle, HeadlessPlatform, InputEvent, PerspectiveCamera,
    Platform, PointerButton, RenderError, RenderResult, RendererInfo, RenderingContext,
    ResizeHandle, SceneRenderer, ScreenRect, TrackballControls, ViewportId, WgpuRenderer,
    WheelDeltaMode,
};
