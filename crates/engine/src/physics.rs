//! Surface of the rigid-body and picking services the core drives.
//!
//! Simulation itself lives behind [`PhysicsWorld`]; the core only spawns
//! boxes, reads live state, issues velocity and impulse commands and watches
//! body pairs for contact.

use glam::Vec3;

use crate::app::PointerPress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactWatchId(pub u64);

/// Box-shaped body request. `size` is full width/height/depth; a mass of
/// zero makes the body static.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub name: String,
    pub position: Vec3,
    pub size: Vec3,
    pub mass: f32,
}

impl BodyDesc {
    pub fn new(name: impl Into<String>, position: Vec3, size: Vec3, mass: f32) -> Self {
        Self {
            name: name.into(),
            position,
            size,
            mass,
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub velocity: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub watch: ContactWatchId,
    pub a: BodyHandle,
    pub b: BodyHandle,
}

pub trait PhysicsWorld {
    fn spawn_box(&mut self, desc: BodyDesc) -> BodyHandle;
    /// `None` once the body has been destroyed or was never spawned.
    fn body_state(&self, body: BodyHandle) -> Option<BodyState>;
    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> bool;
    fn apply_impulse_y(&mut self, body: BodyHandle, impulse: f32) -> bool;
    fn set_angular_factor(&mut self, body: BodyHandle, factor: Vec3) -> bool;
    fn set_friction(&mut self, body: BodyHandle, friction: f32) -> bool;
    fn watch_contact(&mut self, a: BodyHandle, b: BodyHandle) -> ContactWatchId;
    fn drain_contacts(&mut self) -> Vec<ContactEvent>;
    /// Also drops every contact watch that references the body.
    fn destroy(&mut self, body: BodyHandle) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub body: BodyHandle,
    pub name: String,
    pub distance: f32,
}

pub trait ObjectPicker {
    /// Every body under the pointer, nearest first.
    fn pick(&self, press: &PointerPress) -> Vec<PickHit>;
}
