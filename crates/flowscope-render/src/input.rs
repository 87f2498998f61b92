//! Platform-independent input events.
//!
//! Every pointer, wheel, touch and keyboard event reaching a viewport is
//! translated into an [`InputEvent`] and handed to the camera controller,
//! which answers with an [`EventResponse`] instead of touching the platform
//! event itself.

use glam::Vec2;

/// Mouse button, numbered like DOM `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(u8),
}

impl PointerButton {
    /// Index of the button (0 primary, 1 auxiliary, 2 secondary).
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            Self::Primary => 0,
            Self::Auxiliary => 1,
            Self::Secondary => 2,
            Self::Other(index) => index,
        }
    }
}

/// Unit of a wheel delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelDeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    /// Factor turning a delta in this unit into zoom units.
    #[must_use]
    pub fn zoom_scale(self) -> f32 {
        match self {
            Self::Page => 0.025,
            Self::Line => 0.01,
            Self::Pixel => 0.000_25,
        }
    }
}

/// One input event. Positions are page coordinates in pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { button: PointerButton, position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { button: PointerButton, position: Vec2 },
    Wheel { delta_y: f32, mode: WheelDeltaMode },
    /// `touches` lists every touch point still active after the event.
    TouchStart { touches: Vec<Vec2> },
    TouchMove { touches: Vec<Vec2> },
    TouchEnd { touches: Vec<Vec2> },
    /// `code` follows DOM `KeyboardEvent.code` naming (`"KeyA"`).
    KeyDown { code: String },
    KeyUp { code: String },
    ContextMenu,
}

impl InputEvent {
    /// Pointer position for pointer events.
    #[must_use]
    pub fn pointer_position(&self) -> Option<Vec2> {
        match self {
            Self::PointerDown { position, .. }
            | Self::PointerMove { position }
            | Self::PointerUp { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// What the platform should do with the original event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventResponse {
    /// The event was not consumed.
    pub const IGNORED: EventResponse = EventResponse {
        prevent_default: false,
        stop_propagation: false,
    };

    /// The event was consumed; suppress default handling and bubbling.
    pub const CONSUMED: EventResponse = EventResponse {
        prevent_default: true,
        stop_propagation: true,
    };

    /// Suppress default handling only.
    pub const PREVENT_DEFAULT: EventResponse = EventResponse {
        prevent_default: true,
        stop_propagation: false,
    };

    /// Combines two responses, keeping every request of either.
    #[must_use]
    pub fn merge(self, other: EventResponse) -> EventResponse {
        EventResponse {
            prevent_default: self.prevent_default || other.prevent_default,
            stop_propagation: self.stop_propagation || other.stop_propagation,
        }
    }
}
