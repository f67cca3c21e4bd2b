use glam::Vec2;

pub const DEFAULT_JOYSTICK_RADIUS_PX: f32 = 60.0;
pub const DEFAULT_JUMP_ZONE_START: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// Screen split for the on-screen controls: touches starting left of
/// `jump_zone_start * width` drive the joystick, the rest press jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchLayout {
    pub joystick_radius_px: f32,
    pub jump_zone_start: f32,
}

impl Default for TouchLayout {
    fn default() -> Self {
        Self {
            joystick_radius_px: DEFAULT_JOYSTICK_RADIUS_PX,
            jump_zone_start: DEFAULT_JUMP_ZONE_START,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct JoystickDrag {
    finger: u64,
    origin_px: Vec2,
    axes: Vec2,
}

/// Virtual joystick plus jump button for one level instance.
#[derive(Debug)]
pub struct TouchControls {
    layout: TouchLayout,
    viewport: (u32, u32),
    joystick: Option<JoystickDrag>,
    jump_finger: Option<u64>,
    jump_pending: bool,
}

impl TouchControls {
    pub fn new(layout: TouchLayout, viewport: (u32, u32)) -> Self {
        Self {
            layout,
            viewport,
            joystick: None,
            jump_finger: None,
            jump_pending: false,
        }
    }

    pub fn set_viewport(&mut self, viewport: (u32, u32)) {
        self.viewport = viewport;
    }

    pub fn handle(&mut self, finger: u64, phase: TouchPhase, position_px: Vec2) {
        match phase {
            TouchPhase::Started => {
                if self.in_jump_zone(position_px) {
                    self.jump_finger = Some(finger);
                    self.jump_pending = true;
                } else if self.joystick.is_none() {
                    self.joystick = Some(JoystickDrag {
                        finger,
                        origin_px: position_px,
                        axes: Vec2::ZERO,
                    });
                }
            }
            TouchPhase::Moved => {
                let radius = self.layout.joystick_radius_px.max(1.0);
                if let Some(drag) = self.joystick.as_mut().filter(|drag| drag.finger == finger) {
                    drag.axes = ((position_px - drag.origin_px) / radius).clamp_length_max(1.0);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.joystick.is_some_and(|drag| drag.finger == finger) {
                    self.joystick = None;
                }
                if self.jump_finger == Some(finger) {
                    self.jump_finger = None;
                }
            }
        }
    }

    /// Screen-space drag mapped onto `(move_x, move_z)`; dragging up is forward.
    pub fn axes(&self) -> (f32, f32) {
        self.joystick
            .map(|drag| (drag.axes.x, drag.axes.y))
            .unwrap_or((0.0, 0.0))
    }

    pub fn jump_held(&self) -> bool {
        self.jump_finger.is_some()
    }

    /// Returns the pending jump request and clears it, so a held button only
    /// yields one impulse.
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_pending)
    }

    fn in_jump_zone(&self, position_px: Vec2) -> bool {
        let width = self.viewport.0;
        if width == 0 {
            return false;
        }
        position_px.x >= width as f32 * self.layout.jump_zone_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> TouchControls {
        TouchControls::new(TouchLayout::default(), (800, 600))
    }

    #[test]
    fn drag_is_normalized_by_radius() {
        let mut touch = controls();
        touch.handle(1, TouchPhase::Started, Vec2::new(100.0, 400.0));
        touch.handle(1, TouchPhase::Moved, Vec2::new(130.0, 400.0));

        let (x, z) = touch.axes();
        assert!((x - 0.5).abs() < 1e-6);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn drag_is_clamped_to_unit_length() {
        let mut touch = controls();
        touch.handle(1, TouchPhase::Started, Vec2::new(100.0, 400.0));
        touch.handle(1, TouchPhase::Moved, Vec2::new(100.0, 100.0));

        let (x, z) = touch.axes();
        assert_eq!(x, 0.0);
        assert!((z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn release_recenters_joystick() {
        let mut touch = controls();
        touch.handle(4, TouchPhase::Started, Vec2::new(100.0, 400.0));
        touch.handle(4, TouchPhase::Moved, Vec2::new(160.0, 400.0));
        touch.handle(4, TouchPhase::Ended, Vec2::new(160.0, 400.0));

        assert_eq!(touch.axes(), (0.0, 0.0));
    }

    #[test]
    fn other_finger_does_not_steer_joystick() {
        let mut touch = controls();
        touch.handle(1, TouchPhase::Started, Vec2::new(100.0, 400.0));
        touch.handle(2, TouchPhase::Moved, Vec2::new(160.0, 400.0));

        assert_eq!(touch.axes(), (0.0, 0.0));
    }

    #[test]
    fn held_jump_button_yields_one_request() {
        let mut touch = controls();
        touch.handle(9, TouchPhase::Started, Vec2::new(700.0, 500.0));

        assert!(touch.jump_held());
        assert!(touch.take_jump());
        assert!(!touch.take_jump());
        assert!(touch.jump_held());
    }

    #[test]
    fn tap_released_before_sample_still_jumps() {
        let mut touch = controls();
        touch.handle(9, TouchPhase::Started, Vec2::new(700.0, 500.0));
        touch.handle(9, TouchPhase::Ended, Vec2::new(700.0, 500.0));

        assert!(!touch.jump_held());
        assert!(touch.take_jump());
    }
}
