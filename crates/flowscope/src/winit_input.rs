//! Translation of winit window events into viewer input events.
//!
//! winit reports button presses without a position and touches one finger at
//! a time, so the translator keeps the cursor position and the set of active
//! touches between events.

use std::collections::BTreeMap;

use flowscope_render::{InputEvent, PointerButton, WheelDeltaMode};
use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::keyboard::PhysicalKey;

/// Stateful `WindowEvent` to [`InputEvent`] translator for one window.
#[derive(Debug, Clone, Default)]
pub struct WinitInputTranslator {
    /// Page position of the window's top-left corner.
    pub origin: Vec2,
    cursor: Vec2,
    touches: BTreeMap<u64, Vec2>,
}

impl WinitInputTranslator {
    pub fn new(origin: Vec2) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// Last known cursor position in page coordinates.
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    fn page(&self, position: PhysicalPosition<f64>) -> Vec2 {
        #[allow(clippy::cast_possible_truncation)]
        let local = Vec2::new(position.x as f32, position.y as f32);
        self.origin + local
    }

    fn active_touches(&self) -> Vec<Vec2> {
        self.touches.values().copied().collect()
    }

    /// Translates one window event. Events the viewer does not consume
    /// yield `None`.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = self.page(*position);
                Some(InputEvent::PointerMove {
                    position: self.cursor,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = pointer_button(*button);
                let position = self.cursor;
                Some(match state {
                    ElementState::Pressed => InputEvent::PointerDown { button, position },
                    ElementState::Released => InputEvent::PointerUp { button, position },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => Some(wheel(*delta)),
            WindowEvent::Touch(touch) => {
                let position = self.page(touch.location);
                match touch.phase {
                    TouchPhase::Started => {
                        self.touches.insert(touch.id, position);
                        Some(InputEvent::TouchStart {
                            touches: self.active_touches(),
                        })
                    }
                    TouchPhase::Moved => {
                        self.touches.insert(touch.id, position);
                        Some(InputEvent::TouchMove {
                            touches: self.active_touches(),
                        })
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.touches.remove(&touch.id);
                        Some(InputEvent::TouchEnd {
                            touches: self.active_touches(),
                        })
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                // KeyCode debug names match DOM codes ("KeyA", "ShiftLeft")
                let code = format!("{code:?}");
                Some(match event.state {
                    ElementState::Pressed => InputEvent::KeyDown { code },
                    ElementState::Released => InputEvent::KeyUp { code },
                })
            }
            _ => None,
        }
    }
}

/// Maps a winit button onto DOM button numbering.
pub fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Middle => PointerButton::Auxiliary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(index) => PointerButton::Other(u8::try_from(index).unwrap_or(u8::MAX)),
    }
}

/// Wheel deltas are positive when scrolling down, as in the DOM.
#[allow(clippy::cast_possible_truncation)]
fn wheel(delta: MouseScrollDelta) -> InputEvent {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => InputEvent::Wheel {
            delta_y: -y,
            mode: WheelDeltaMode::Line,
        },
        MouseScrollDelta::PixelDelta(position) => InputEvent::Wheel {
            delta_y: -(position.y as f32),
            mode: WheelDeltaMode::Pixel,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping() {
        assert_eq!(pointer_button(MouseButton::Left), PointerButton::Primary);
        assert_eq!(pointer_button(MouseButton::Middle), PointerButton::Auxiliary);
        assert_eq!(pointer_button(MouseButton::Right), PointerButton::Secondary);
        assert_eq!(pointer_button(MouseButton::Other(900)), PointerButton::Other(u8::MAX));
    }

    #[test]
    fn test_wheel_sign_follows_dom() {
        assert_eq!(
            wheel(MouseScrollDelta::LineDelta(0.0, 2.0)),
            InputEvent::Wheel {
                delta_y: -2.0,
                mode: WheelDeltaMode::Line
            }
        );
        assert_eq!(
            wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -30.0))),
            InputEvent::Wheel {
                delta_y: 30.0,
                mode: WheelDeltaMode::Pixel
            }
        );
    }

    #[test]
    fn test_page_offset() {
        let translator = WinitInputTranslator::new(Vec2::new(10.0, 20.0));
        assert_eq!(
            translator.page(PhysicalPosition::new(1.0, 2.0)),
            Vec2::new(11.0, 22.0)
        );
    }
}
