//! Viewer state: the shared scene, its rendering contexts and the selection.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use flowscope_core::{
    default_lights, DefaultLights, NodeId, Object3D, ObjectId, Scene, SelectionKind,
    SelectionSignal, SelectorHandle, TrackballSettings, Vec2, ViewerConfig,
};
use flowscope_render::{
    compute_bounding_box, EventResponse, FrameHandle, HeadlessPlatform, InputEvent,
    PerspectiveCamera, Platform, RenderingContext, ViewportId,
};
use serde_json::{json, Value};

use crate::gateway::PluginsGateway;
use crate::highlight::Highlight;
use crate::journal::LogContext;
use crate::picking::{pick, ClickTracker};

/// What a render-loop action sees on every animation tick.
#[derive(Debug, Clone, Copy)]
pub struct RenderLoopFrame<'a> {
    pub viewport: ViewportId,
    pub scene: &'a Scene,
    pub camera: &'a PerspectiveCamera,
}

/// Callback run on every animation tick of every context.
pub type RenderLoopAction = Box<dyn FnMut(&RenderLoopFrame<'_>)>;

/// The currently selected object and its overlay.
#[derive(Debug, Clone)]
pub struct Selection {
    pub object: ObjectId,
    pub node: NodeId,
    pub helpers: NodeId,
    pub selector: SelectorHandle,
}

struct ViewportSlot {
    context: RenderingContext,
    clicks: ClickTracker,
}

/// Owns the scene and coordinates every rendering context drawing it.
pub struct ViewerState<P: Platform> {
    platform: P,
    scene: Scene,
    default_lights: DefaultLights,
    controls: TrackballSettings,
    click_threshold: Duration,
    slots: Vec<ViewportSlot>,
    selectors: Vec<SelectorHandle>,
    selection: Option<Selection>,
    render_loop_actions: BTreeMap<String, RenderLoopAction>,
    gateway: PluginsGateway,
}

impl<P: Platform> std::fmt::Debug for ViewerState<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerState")
            .field("nodes", &self.scene.len())
            .field("default_lights", &self.default_lights)
            .field("viewports", &self.viewports())
            .field("selection", &self.selection)
            .field("render_loop_actions", &self.render_loop_actions.len())
            .finish_non_exhaustive()
    }
}

impl<P: Platform> ViewerState<P> {
    pub fn new(config: &ViewerConfig, platform: P) -> Self {
        let mut scene = Scene::new();
        scene.set_background(config.background);
        Self {
            platform,
            scene,
            default_lights: config.default_lights,
            controls: config.controls.clone(),
            click_threshold: Duration::from_millis(config.click_threshold_ms),
            slots: Vec::new(),
            selectors: Vec::new(),
            selection: None,
            render_loop_actions: BTreeMap::new(),
            gateway: PluginsGateway::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn default_lights(&self) -> DefaultLights {
        self.default_lights
    }

    pub fn gateway(&self) -> &PluginsGateway {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut PluginsGateway {
        &mut self.gateway
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Distinct selection channels found in the scene at the last render.
    pub fn selectors(&self) -> &[SelectorHandle] {
        &self.selectors
    }

    pub fn viewports(&self) -> Vec<ViewportId> {
        self.slots.iter().map(|s| s.context.viewport()).collect()
    }

    pub fn rendering_context(&self, viewport: ViewportId) -> Option<&RenderingContext> {
        self.slot_index(viewport).map(|i| &self.slots[i].context)
    }

    pub fn rendering_context_mut(&mut self, viewport: ViewportId) -> Option<&mut RenderingContext> {
        let index = self.slot_index(viewport)?;
        Some(&mut self.slots[index].context)
    }

    fn slot_index(&self, viewport: ViewportId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.context.viewport() == viewport)
    }

    /// Registers an action run on every animation tick. An action with the
    /// same `uid` is replaced.
    pub fn add_render_loop_action(&mut self, uid: impl Into<String>, action: RenderLoopAction) {
        self.render_loop_actions.insert(uid.into(), action);
    }

    pub fn remove_render_loop_action(&mut self, uid: &str) -> bool {
        self.render_loop_actions.remove(uid).is_some()
    }

    /// Creates a rendering context on `viewport`. A context already bound to
    /// the viewport is disposed first.
    pub fn register_rendering_context(&mut self, viewport: ViewportId) -> &RenderingContext {
        self.dispose_rendering_context(viewport);
        let context =
            RenderingContext::create(&mut self.platform, viewport, &self.scene, &self.controls);
        self.slots.push(ViewportSlot {
            context,
            clicks: ClickTracker::new(self.click_threshold),
        });
        self.gateway.notify_viewport(viewport);
        log::info!("viewport {} registered ({} active)", viewport.0, self.slots.len());
        let last = self.slots.len() - 1;
        &self.slots[last].context
    }

    /// Disposes the context bound to `viewport`. Returns false when there is
    /// none.
    pub fn dispose_rendering_context(&mut self, viewport: ViewportId) -> bool {
        let Some(index) = self.slot_index(viewport) else {
            return false;
        };
        let mut slot = self.slots.remove(index);
        slot.context.dispose(&mut self.platform);
        log::info!("viewport {} disposed ({} active)", viewport.0, self.slots.len());
        true
    }

    /// Disposes every context.
    pub fn disconnect_all(&mut self) {
        for mut slot in self.slots.drain(..) {
            slot.context.dispose(&mut self.platform);
        }
    }

    /// Replaces the scene content with `objects` and redraws every context.
    ///
    /// Writes exactly one entry to `log` and terminates it.
    pub fn render(&mut self, objects: Vec<Object3D>, log: &mut dyn LogContext) {
        let previous = compute_bounding_box(&self.scene);

        self.selection = None;
        self.scene.clear();
        if self.default_lights == DefaultLights::Default {
            self.scene.add(default_lights());
        }
        for object in objects {
            self.scene.add(object);
        }
        self.collect_selectors();
        self.gateway.notify_scene(self.scene.generation());

        let mut renderers = Vec::new();
        for slot in &mut self.slots {
            slot.context.fit_if_needed(&previous, &self.scene);
            slot.context.draw(&self.scene);
            if let Some(info) = slot.context.renderer_info() {
                renderers.push(json!({
                    "viewport": slot.context.viewport().0,
                    "renderer": info,
                }));
            }
        }

        let scene = self.scene_summary();
        if renderers.is_empty() {
            log.info("No renderer available", json!({ "scene": scene }));
        } else {
            log.info(
                "Scene updated",
                json!({ "scene": scene, "renderers": renderers }),
            );
        }
        log.terminate();
    }

    fn scene_summary(&self) -> Value {
        json!({
            "generation": self.scene.generation(),
            "nodes": self.scene.len(),
            "roots": self.scene.roots().len(),
            "selectables": self.selectors.len(),
            "background": format!("#{:06x}", self.scene.background().to_hex()),
        })
    }

    fn collect_selectors(&mut self) {
        self.selectors.clear();
        for id in self.scene.selectable_nodes() {
            let Some(handle) = self.scene.node(id).and_then(|n| n.selector()) else {
                continue;
            };
            if !self.selectors.iter().any(|h| h.same_channel(handle)) {
                self.selectors.push(handle.clone());
            }
        }
    }

    /// Applies the messages pending on the selection channels.
    pub fn process_selection_signals(&mut self) {
        let signals: Vec<SelectionSignal> =
            self.selectors.iter().filter_map(SelectorHandle::take).collect();
        for signal in signals {
            match signal {
                SelectionSignal::Select(event) => {
                    self.select(event.target);
                }
                SelectionSignal::Clear => self.clear_selection(),
            }
        }
    }

    /// Selects `target`, replacing any current selection. Returns false when
    /// the object is not in the scene.
    pub fn select(&mut self, target: ObjectId) -> bool {
        self.clear_selection();
        let Some(node) = self.scene.find(target) else {
            log::debug!("selection target {} is not in the scene", target.raw());
            return false;
        };
        let Some(selector) = self.scene.node(node).and_then(|n| n.selector().cloned()) else {
            return false;
        };
        let Some(overlay) = Highlight::build(&self.scene, node) else {
            return false;
        };
        match self.scene.add_child(node, overlay) {
            Ok(helpers) => {
                self.selection = Some(Selection {
                    object: target,
                    node,
                    helpers,
                    selector,
                });
                true
            }
            Err(e) => {
                log::warn!("cannot attach selection highlight: {e}");
                false
            }
        }
    }

    /// Drops the current selection and its overlay.
    pub fn clear_selection(&mut self) {
        if let Some(selection) = self.selection.take() {
            self.scene.remove_subtree(selection.helpers);
        }
    }

    /// Handles the animation frame `handle`: the owning context updates its
    /// controller and redraws, then render-loop actions run.
    pub fn on_animation_frame(&mut self, handle: FrameHandle) -> bool {
        let Some(index) = self
            .slots
            .iter()
            .position(|s| s.context.pending_frame() == Some(handle))
        else {
            return false;
        };
        self.process_selection_signals();
        let context = &mut self.slots[index].context;
        if !context.tick(&mut self.platform, handle, &self.scene) {
            return false;
        }
        let frame = RenderLoopFrame {
            viewport: context.viewport(),
            scene: &self.scene,
            camera: context.camera(),
        };
        for action in self.render_loop_actions.values_mut() {
            action(&frame);
        }
        true
    }

    /// Syncs the context on `viewport` with its current size.
    pub fn on_resize(&mut self, viewport: ViewportId) -> bool {
        let Some(rect) = self.platform.viewport_rect(viewport) else {
            return false;
        };
        match self.rendering_context_mut(viewport) {
            Some(context) => {
                context.resize(rect);
                true
            }
            None => false,
        }
    }

    /// Routes an input event received at `at` to the context on `viewport`.
    /// A short press and release picks.
    pub fn on_input(&mut self, viewport: ViewportId, event: &InputEvent, at: Instant) -> EventResponse {
        let Some(index) = self.slot_index(viewport) else {
            return EventResponse::IGNORED;
        };
        let slot = &mut self.slots[index];
        let response = slot.context.handle_input(event);
        match event {
            InputEvent::PointerDown { .. } => slot.clicks.pointer_down(at),
            InputEvent::PointerUp { position, .. } => {
                if slot.clicks.pointer_up(at) {
                    self.handle_click(index, *position);
                }
            }
            _ => {}
        }
        response
    }

    fn handle_click(&mut self, index: usize, position: Vec2) {
        let context = &self.slots[index].context;
        match pick(&self.scene, context.camera(), context.rect(), position) {
            Some(hit) => hit.selector.select(hit.object, SelectionKind::Clicked),
            None => {
                if let Some(selection) = &self.selection {
                    selection.selector.clear();
                }
            }
        }
        self.process_selection_signals();
    }
}

impl ViewerState<HeadlessPlatform> {
    /// Runs every animation frame currently requested on the headless
    /// platform. Returns how many were processed.
    pub fn run_pending_frames(&mut self) -> usize {
        let frames = self.platform.take_pending_frames();
        frames
            .into_iter()
            .filter(|&(handle, _)| self.on_animation_frame(handle))
            .count()
    }
}

impl<P: Platform> Drop for ViewerState<P> {
    fn drop(&mut self) {
        self.disconnect_all();
    }
}
