//! Pointer relay and scene notifications for plugins.
//!
//! Plugins observe what happens in a viewer without intercepting the original
//! events: pointer events are copied into bounded queues they drain at their
//! own pace, and the latest scene generation and rendering viewport are kept
//! for late subscribers.

use std::collections::VecDeque;

use flowscope_render::{PointerButton, ViewportId};
use glam::Vec2;

/// Events kept per queue before the oldest are dropped.
pub const GATEWAY_QUEUE_CAPACITY: usize = 256;

/// Which relay a pointer event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Click,
}

/// A relayed pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub viewport: ViewportId,
    pub kind: PointerEventKind,
    pub button: Option<PointerButton>,
    pub position: Vec2,
}

/// Channels exposed to plugins.
#[derive(Debug, Default)]
pub struct PluginsGateway {
    mouse_down: VecDeque<PointerEvent>,
    mouse_move: VecDeque<PointerEvent>,
    mouse_up: VecDeque<PointerEvent>,
    click: VecDeque<PointerEvent>,
    scene_generation: Option<u32>,
    rendering_viewport: Option<ViewportId>,
}

impl PluginsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `event` into the queue of its kind.
    pub fn publish(&mut self, event: PointerEvent) {
        let queue = self.queue_mut(event.kind);
        if queue.len() == GATEWAY_QUEUE_CAPACITY {
            queue.pop_front();
        }
        queue.push_back(event);
    }

    fn queue_mut(&mut self, kind: PointerEventKind) -> &mut VecDeque<PointerEvent> {
        match kind {
            PointerEventKind::Down => &mut self.mouse_down,
            PointerEventKind::Move => &mut self.mouse_move,
            PointerEventKind::Up => &mut self.mouse_up,
            PointerEventKind::Click => &mut self.click,
        }
    }

    /// Drains the queued events of one kind, oldest first.
    pub fn drain(&mut self, kind: PointerEventKind) -> Vec<PointerEvent> {
        self.queue_mut(kind).drain(..).collect()
    }

    pub fn take_mouse_down(&mut self) -> Vec<PointerEvent> {
        self.drain(PointerEventKind::Down)
    }

    pub fn take_mouse_move(&mut self) -> Vec<PointerEvent> {
        self.drain(PointerEventKind::Move)
    }

    pub fn take_mouse_up(&mut self) -> Vec<PointerEvent> {
        self.drain(PointerEventKind::Up)
    }

    pub fn take_click(&mut self) -> Vec<PointerEvent> {
        self.drain(PointerEventKind::Click)
    }

    /// Generation of the scene after the latest render.
    pub fn scene_generation(&self) -> Option<u32> {
        self.scene_generation
    }

    /// The viewport most recently attached.
    pub fn rendering_viewport(&self) -> Option<ViewportId> {
        self.rendering_viewport
    }

    pub(crate) fn notify_scene(&mut self, generation: u32) {
        self.scene_generation = Some(generation);
    }

    pub(crate) fn notify_viewport(&mut self, viewport: ViewportId) {
        self.rendering_viewport = Some(viewport);
    }
}
