use glam::Vec2;
use winit::event::{ElementState, MouseButton, TouchPhase as HostTouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::aggregator::InputAggregator;
use super::input::InputAction;
use super::touch::TouchPhase;

pub fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveForward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveBack),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::Space => Some(InputAction::Jump),
        KeyCode::KeyK => Some(InputAction::SaveSlot),
        KeyCode::KeyL => Some(InputAction::LoadSlot),
        KeyCode::KeyO => Some(InputAction::LoadAuto),
        KeyCode::KeyT => Some(InputAction::CycleLanguage),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

fn touch_phase(phase: HostTouchPhase) -> TouchPhase {
    match phase {
        HostTouchPhase::Started => TouchPhase::Started,
        HostTouchPhase::Moved => TouchPhase::Moved,
        HostTouchPhase::Ended => TouchPhase::Ended,
        HostTouchPhase::Cancelled => TouchPhase::Cancelled,
    }
}

/// Translates window events into aggregator state. Holds only what winit
/// reports separately from the press itself (cursor position, button level).
#[derive(Debug, Default)]
pub struct HostInputCollector {
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    quit_requested: bool,
}

impl HostInputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent, input: &mut InputAggregator) {
        match event {
            WindowEvent::Resized(size) => input.set_viewport(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                self.set_cursor_position_px(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => self.cursor_position_px = None,
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_input(*button, *state, input);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_physical_key(event.physical_key, event.state, input);
            }
            WindowEvent::Touch(touch) => {
                input.handle_touch(
                    touch.id,
                    touch_phase(touch.phase),
                    Vec2::new(touch.location.x as f32, touch.location.y as f32),
                );
            }
            _ => {}
        }
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2::new(x, y));
    }

    fn handle_physical_key(
        &mut self,
        key: PhysicalKey,
        state: ElementState,
        input: &mut InputAggregator,
    ) {
        let Some(action) = action_for_key(key) else {
            return;
        };
        let is_pressed = state == ElementState::Pressed;
        if action == InputAction::Quit && is_pressed {
            self.quit_requested = true;
        }
        input.set_key(action, is_pressed);
    }

    fn handle_mouse_input(
        &mut self,
        button: MouseButton,
        state: ElementState,
        input: &mut InputAggregator,
    ) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    if let Some(position) = self.cursor_position_px {
                        input.press_pointer(position);
                    }
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }
}
