use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use super::controller::{Button, Buttons};
use crate::input::InputEvent;

/// Pixels per scroll line when the platform reports line deltas
const LINE_HEIGHT: f32 = 40.0;

/// Adapter that bridges Winit events to [`InputEvent`]s
///
/// Winit reports button presses without a position and cursor motion without
/// the held buttons, so both are tracked here. The position outlives
/// `CursorLeft`: a button released outside the window still ends the drag at
/// the last point seen inside it.
#[derive(Debug, Clone, Default)]
pub struct WinitPointer {
    /// Current cursor position (relative to window)
    position: Option<(f32, f32)>,
    /// Buttons currently held
    buttons: Buttons,
}

impl WinitPointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a window event, updating tracked pointer state
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                self.position = Some((x, y));
                Some(InputEvent::PointerMove {
                    x,
                    y,
                    buttons: self.buttons,
                })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = Self::mouse_button_to_button(*button)?;
                self.press(button, *state == ElementState::Pressed)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Winit reports scrolling up as positive; flip to zoom-out positive
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                Some(InputEvent::Wheel { delta })
            }
            WindowEvent::Resized(size) => Some(InputEvent::Resize {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }

    /// Record a press or release at the last known cursor position
    ///
    /// The held buttons are updated even when no position is known yet; only
    /// the event is dropped then.
    pub fn press(&mut self, button: Button, pressed: bool) -> Option<InputEvent> {
        self.buttons = if pressed {
            self.buttons.with(button)
        } else {
            self.buttons.without(button)
        };
        let (x, y) = self.position?;
        Some(if pressed {
            InputEvent::PointerDown { x, y, button }
        } else {
            InputEvent::PointerUp { x, y, button }
        })
    }

    /// Remember a cursor position without emitting an event
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Some((x, y));
    }

    pub fn position(&self) -> Option<(f32, f32)> {
        self.position
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::Primary),
            MouseButton::Right => Some(Button::Secondary),
            MouseButton::Middle => Some(Button::Middle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::DeviceId;

    fn device() -> DeviceId {
        // SAFETY: only compared, never handed to the platform backend
        unsafe { DeviceId::dummy() }
    }

    fn cursor_moved(x: f64, y: f64) -> WindowEvent {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
        }
    }

    fn left(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_new_pointer_empty() {
        let pointer = WinitPointer::new();
        assert_eq!(pointer.position(), None);
        assert!(pointer.buttons().is_empty());
    }

    #[test]
    fn test_press_without_position_is_dropped() {
        let mut pointer = WinitPointer::new();
        assert_eq!(pointer.press(Button::Primary, true), None);
        assert!(pointer.buttons().contains(Button::Primary));

        assert_eq!(pointer.press(Button::Primary, false), None);
        assert!(pointer.buttons().is_empty());
    }

    #[test]
    fn test_release_after_cursor_left_ends_drag() {
        let mut pointer = WinitPointer::new();

        pointer.translate(&cursor_moved(120.0, 80.0));
        assert!(matches!(
            pointer.translate(&left(ElementState::Pressed)),
            Some(InputEvent::PointerDown { .. })
        ));
        assert!(matches!(
            pointer.translate(&cursor_moved(300.0, 200.0)),
            Some(InputEvent::PointerMove { buttons: Buttons::PRIMARY, .. })
        ));

        let leave = WindowEvent::CursorLeft { device_id: device() };
        assert_eq!(pointer.translate(&leave), None);

        assert_eq!(
            pointer.translate(&left(ElementState::Released)),
            Some(InputEvent::PointerUp {
                x: 300.0,
                y: 200.0,
                button: Button::Primary
            })
        );
        assert!(pointer.buttons().is_empty());

        assert_eq!(
            pointer.translate(&cursor_moved(10.0, 10.0)),
            Some(InputEvent::PointerMove {
                x: 10.0,
                y: 10.0,
                buttons: Buttons::NONE
            })
        );
    }

    #[test]
    fn test_press_and_release_track_buttons() {
        let mut pointer = WinitPointer::new();
        pointer.set_position(12.0, 34.0);

        let down = pointer.press(Button::Primary, true);
        assert_eq!(
            down,
            Some(InputEvent::PointerDown {
                x: 12.0,
                y: 34.0,
                button: Button::Primary
            })
        );
        assert!(pointer.buttons().contains(Button::Primary));

        let up = pointer.press(Button::Primary, false);
        assert!(matches!(up, Some(InputEvent::PointerUp { .. })));
        assert!(pointer.buttons().is_empty());
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(
            WinitPointer::mouse_button_to_button(MouseButton::Left),
            Some(Button::Primary)
        );
        assert_eq!(
            WinitPointer::mouse_button_to_button(MouseButton::Right),
            Some(Button::Secondary)
        );
        assert_eq!(WinitPointer::mouse_button_to_button(MouseButton::Back), None);
    }
}
