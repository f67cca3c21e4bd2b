use glam::Vec2;

use super::input::{InputAction, KeyboardSource, PointerPress};
use super::touch::{TouchControls, TouchLayout, TouchPhase};

/// Normalized per-tick movement request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub move_x: f32,
    pub move_z: f32,
    pub jump_requested: bool,
}

/// One-shot commands gathered since the previous tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickCommands {
    pub save_slot: bool,
    pub load_slot: bool,
    pub load_auto: bool,
    pub cycle_language: bool,
    pub pointer: Option<PointerPress>,
}

/// Merges the keyboard and the on-screen touch controls into one
/// [`InputFrame`]. Neither source sees the other; a non-zero touch axis
/// replaces the keyboard value for that axis.
#[derive(Debug, Default)]
pub struct InputAggregator {
    keyboard: KeyboardSource,
    touch: Option<TouchControls>,
    pointer_press: Option<PointerPress>,
    viewport: (u32, u32),
}

impl InputAggregator {
    pub fn new(viewport: (u32, u32)) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn set_key(&mut self, action: InputAction, is_down: bool) {
        self.keyboard.set(action, is_down);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        if let Some(touch) = self.touch.as_mut() {
            touch.set_viewport(self.viewport);
        }
    }

    pub fn install_touch_controls(&mut self, layout: TouchLayout) {
        self.touch = Some(TouchControls::new(layout, self.viewport));
    }

    pub fn remove_touch_controls(&mut self) -> bool {
        self.touch.take().is_some()
    }

    pub fn has_touch_controls(&self) -> bool {
        self.touch.is_some()
    }

    /// Touch events reach the controls only while a level instance has them
    /// installed. A touch start also counts as a pointer press.
    pub fn handle_touch(&mut self, finger: u64, phase: TouchPhase, position_px: Vec2) {
        if let Some(touch) = self.touch.as_mut() {
            touch.handle(finger, phase, position_px);
        }
        if phase == TouchPhase::Started {
            self.press_pointer(position_px);
        }
    }

    pub fn press_pointer(&mut self, position_px: Vec2) {
        self.pointer_press = Some(PointerPress {
            position_px,
            window_size: self.viewport,
        });
    }

    pub fn sample(&mut self) -> InputFrame {
        let (mut move_x, mut move_z) = self.keyboard.axes();
        let mut jump_requested = self.keyboard.take_pressed(InputAction::Jump);

        if let Some(touch) = self.touch.as_mut() {
            let (touch_x, touch_z) = touch.axes();
            if touch_x != 0.0 {
                move_x = touch_x;
            }
            if touch_z != 0.0 {
                move_z = touch_z;
            }
            if touch.take_jump() {
                jump_requested = true;
            }
        }

        InputFrame {
            move_x,
            move_z,
            jump_requested,
        }
    }

    pub fn take_commands(&mut self) -> TickCommands {
        let commands = TickCommands {
            save_slot: self.keyboard.take_pressed(InputAction::SaveSlot),
            load_slot: self.keyboard.take_pressed(InputAction::LoadSlot),
            load_auto: self.keyboard.take_pressed(InputAction::LoadAuto),
            cycle_language: self.keyboard.take_pressed(InputAction::CycleLanguage),
            pointer: self.pointer_press.take(),
        };
        self.keyboard.clear_edges();
        commands
    }
}
