//! The attachable view a host mounts into its layout.
//!
//! `connected` relays pointer events to the plugins gateway immediately and
//! defers the rendering-context creation until the viewport has a measurable
//! box; `flush_deferred` performs the pending attaches. `disconnected`
//! disposes the context synchronously.

use std::time::Instant;

use flowscope_render::{EventResponse, InputEvent, Platform, PointerButton, ViewportId};

use crate::gateway::{PointerEvent, PointerEventKind};
use crate::state::ViewerState;

/// CSS class of the viewer element.
pub const DEFAULT_VIEW_CLASS: &str = "h-100 w-100";

#[derive(Debug, Clone)]
pub struct ViewerView {
    pub class: String,
    pub style: String,
    connected: Vec<ViewportId>,
    deferred: Vec<ViewportId>,
    pressed: Vec<(ViewportId, PointerButton)>,
}

impl Default for ViewerView {
    fn default() -> Self {
        Self {
            class: DEFAULT_VIEW_CLASS.to_string(),
            style: String::new(),
            connected: Vec::new(),
            deferred: Vec::new(),
            pressed: Vec::new(),
        }
    }
}

impl ViewerView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Starts relaying events from `viewport` and schedules its attach.
    pub fn connected(&mut self, viewport: ViewportId) {
        if self.connected.contains(&viewport) {
            return;
        }
        self.connected.push(viewport);
        self.deferred.push(viewport);
        log::debug!("viewport {} connected, attach deferred", viewport.0);
    }

    /// Stops relaying and disposes the rendering context of `viewport`.
    pub fn disconnected<P: Platform>(
        &mut self,
        state: &mut ViewerState<P>,
        viewport: ViewportId,
    ) -> bool {
        self.connected.retain(|&v| v != viewport);
        self.deferred.retain(|&v| v != viewport);
        self.pressed.retain(|&(v, _)| v != viewport);
        state.dispose_rendering_context(viewport)
    }

    /// Attaches every deferred viewport whose box is measurable by now.
    /// Returns the number of contexts created.
    pub fn flush_deferred<P: Platform>(&mut self, state: &mut ViewerState<P>) -> usize {
        let pending = std::mem::take(&mut self.deferred);
        let mut attached = 0;
        for viewport in pending {
            let measurable = state
                .platform()
                .viewport_rect(viewport)
                .is_some_and(|rect| rect.is_measurable());
            if measurable {
                state.register_rendering_context(viewport);
                attached += 1;
            } else {
                self.deferred.push(viewport);
            }
        }
        attached
    }

    pub fn is_connected(&self, viewport: ViewportId) -> bool {
        self.connected.contains(&viewport)
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Relays `event` to the plugins gateway, then hands it to the state.
    /// Events from viewports that are not connected are ignored.
    pub fn dispatch<P: Platform>(
        &mut self,
        state: &mut ViewerState<P>,
        viewport: ViewportId,
        event: &InputEvent,
        at: Instant,
    ) -> EventResponse {
        if !self.is_connected(viewport) {
            return EventResponse::IGNORED;
        }
        for relayed in self.relay(viewport, event) {
            state.gateway_mut().publish(relayed);
        }
        state.on_input(viewport, event, at)
    }

    fn relay(&mut self, viewport: ViewportId, event: &InputEvent) -> Vec<PointerEvent> {
        let relayed = |kind, button, position| PointerEvent {
            viewport,
            kind,
            button,
            position,
        };
        match *event {
            InputEvent::PointerDown { button, position } => {
                self.pressed.retain(|&(v, _)| v != viewport);
                self.pressed.push((viewport, button));
                vec![relayed(PointerEventKind::Down, Some(button), position)]
            }
            InputEvent::PointerMove { position } => {
                vec![relayed(PointerEventKind::Move, None, position)]
            }
            InputEvent::PointerUp { button, position } => {
                let mut out = vec![relayed(PointerEventKind::Up, Some(button), position)];
                let was_pressed = self.pressed.contains(&(viewport, button));
                self.pressed.retain(|&(v, _)| v != viewport);
                if was_pressed && button == PointerButton::Primary {
                    out.push(relayed(PointerEventKind::Click, Some(button), position));
                }
                out
            }
            _ => Vec::new(),
        }
    }
}
