use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::scheduler::Axis;

/// UI units one arrow-key press moves the selected rate.
pub const RATE_STEP: f32 = 10.0;

/// A user command derived from window input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    /// Make `axis` the target of rate changes.
    SelectAxis(Axis),
    /// Move the selected rate by this many UI units.
    StepRate(f32),
    CycleLightAxis,
    Restart,
    /// Stop the loop if it runs, start it if it does not.
    ToggleRunning,
    Quit,
    /// Left click at a window position in pixels.
    Click(Vec2),
}

/// Keyboard binding of the scene controls.
pub fn control_for_key(key: KeyCode) -> Option<Control> {
    let control = match key {
        KeyCode::Digit1 => Control::SelectAxis(Axis::X),
        KeyCode::Digit2 => Control::SelectAxis(Axis::Y),
        KeyCode::Digit3 => Control::SelectAxis(Axis::Z),
        KeyCode::ArrowUp => Control::StepRate(RATE_STEP),
        KeyCode::ArrowDown => Control::StepRate(-RATE_STEP),
        KeyCode::KeyL => Control::CycleLightAxis,
        KeyCode::KeyR => Control::Restart,
        KeyCode::Space => Control::ToggleRunning,
        KeyCode::Escape => Control::Quit,
        _ => return None,
    };
    Some(control)
}

/// Tracks keyboard and mouse state and queues controls in arrival order.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    mouse_position: Vec2,
    controls: Vec<Control>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a window event and update input state.
    ///
    /// Held keys do not repeat.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if self.keys_down.insert(key)
                                && let Some(control) = control_for_key(key)
                            {
                                self.controls.push(control);
                            }
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.controls.push(Control::Click(self.mouse_position));
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::Focused(false) => {
                self.keys_down.clear();
            }
            _ => {}
        }
    }

    /// Takes the queued controls.
    pub fn drain_controls(&mut self) -> Vec<Control> {
        std::mem::take(&mut self.controls)
    }
}
