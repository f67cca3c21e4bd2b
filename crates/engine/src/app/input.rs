use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Jump,
    SaveSlot,
    LoadSlot,
    LoadAuto,
    CycleLanguage,
    Quit,
}

const ACTION_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveForward => 0,
            InputAction::MoveBack => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Jump => 4,
            InputAction::SaveSlot => 5,
            InputAction::LoadSlot => 6,
            InputAction::LoadAuto => 7,
            InputAction::CycleLanguage => 8,
            InputAction::Quit => 9,
        }
    }
}

/// Discrete key source: held state per action plus a just-pressed edge that
/// survives until the tick that consumes it.
#[derive(Debug, Clone, Default)]
pub struct KeyboardSource {
    held: ActionStates,
    pressed_edges: ActionStates,
}

impl KeyboardSource {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        if is_down && !self.held.is_down(action) {
            self.pressed_edges.set(action, true);
        }
        self.held.set(action, is_down);
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    pub fn just_pressed(&self, action: InputAction) -> bool {
        self.pressed_edges.is_down(action)
    }

    pub(crate) fn take_pressed(&mut self, action: InputAction) -> bool {
        let was_pressed = self.pressed_edges.is_down(action);
        self.pressed_edges.set(action, false);
        was_pressed
    }

    pub(crate) fn clear_edges(&mut self) {
        self.pressed_edges.clear();
    }

    /// Each held direction key writes a fixed unit value; when opposite keys
    /// are held together the later check (back, right) wins.
    pub fn axes(&self) -> (f32, f32) {
        let mut move_x = 0.0;
        let mut move_z = 0.0;
        if self.is_down(InputAction::MoveForward) {
            move_z = -1.0;
        }
        if self.is_down(InputAction::MoveBack) {
            move_z = 1.0;
        }
        if self.is_down(InputAction::MoveLeft) {
            move_x = -1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            move_x = 1.0;
        }
        (move_x, move_z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPress {
    pub position_px: Vec2,
    pub window_size: (u32, u32),
}
