use glam::Vec3;
use tracing::debug;

use crate::app::InputFrame;
use crate::physics::{BodyHandle, PhysicsWorld};

pub const DEFAULT_MOVE_SPEED: f32 = 5.0;
pub const DEFAULT_JUMP_IMPULSE: f32 = 7.0;
pub const DEFAULT_GROUND_EPSILON: f32 = 0.1;
pub const DEFAULT_FRICTION: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub move_speed: f32,
    pub jump_impulse: f32,
    pub ground_epsilon: f32,
    pub friction: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            jump_impulse: DEFAULT_JUMP_IMPULSE,
            ground_epsilon: DEFAULT_GROUND_EPSILON,
            friction: DEFAULT_FRICTION,
        }
    }
}

/// What one controller tick asked of the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionCommand {
    pub velocity: Vec3,
    pub jump_impulse: Option<f32>,
    pub grounded: bool,
}

/// Turns an [`InputFrame`] into velocity and impulse commands on an
/// externally simulated body.
#[derive(Debug, Clone)]
pub struct CharacterController {
    body: Option<BodyHandle>,
    config: ControllerConfig,
}

impl CharacterController {
    /// Locks rotation and applies friction once; ticks never touch either.
    pub fn new<P>(body: BodyHandle, config: ControllerConfig, physics: &mut P) -> Self
    where
        P: PhysicsWorld + ?Sized,
    {
        let locked = physics.set_angular_factor(body, Vec3::ZERO);
        let rubbed = physics.set_friction(body, config.friction);
        if !locked || !rubbed {
            debug!(body = body.0, "controller_body_missing_at_attach");
        }
        Self {
            body: Some(body),
            config,
        }
    }

    pub fn detached(config: ControllerConfig) -> Self {
        Self { body: None, config }
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn config(&self) -> ControllerConfig {
        self.config
    }

    pub fn release_body(&mut self) -> Option<BodyHandle> {
        self.body.take()
    }

    /// Silent no-op when no body is attached or physics no longer knows it.
    pub fn tick<P>(&self, input: &InputFrame, physics: &mut P) -> Option<MotionCommand>
    where
        P: PhysicsWorld + ?Sized,
    {
        let body = self.body?;
        let current = physics.body_state(body)?;

        let velocity = Vec3::new(
            input.move_x * self.config.move_speed,
            current.velocity.y,
            input.move_z * self.config.move_speed,
        );
        physics.set_velocity(body, velocity);

        let grounded = current.velocity.y.abs() < self.config.ground_epsilon;
        let jump_impulse = if input.jump_requested && grounded {
            physics.apply_impulse_y(body, self.config.jump_impulse);
            Some(self.config.jump_impulse)
        } else {
            None
        };

        Some(MotionCommand {
            velocity,
            jump_impulse,
            grounded,
        })
    }
}
