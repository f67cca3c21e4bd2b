//! Minimal headless stand-in for the physics and picking services.
//!
//! Axis-aligned boxes under constant gravity. Each moving body is pushed out
//! of every other body along the axis of least penetration; there is no
//! restitution, rotation or mass ratio. Enough to run levels without a real
//! engine attached.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};

use crate::app::PointerPress;
use crate::physics::{
    BodyDesc, BodyHandle, BodyState, ContactEvent, ContactWatchId, ObjectPicker, PhysicsWorld,
    PickHit,
};

pub const SANDBOX_GRAVITY: f32 = -9.81;
pub const SANDBOX_PIXELS_PER_UNIT: f32 = 32.0;
const CONTACT_SLOP: f32 = 0.01;

#[derive(Debug, Clone)]
struct SandboxBody {
    name: String,
    position: Vec3,
    velocity: Vec3,
    half_extents: Vec3,
    mass: f32,
    friction: f32,
    angular_factor: Vec3,
}

impl SandboxBody {
    fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct ContactWatch {
    id: ContactWatchId,
    a: BodyHandle,
    b: BodyHandle,
}

#[derive(Debug)]
pub struct SandboxWorld {
    gravity: f32,
    next_body: u64,
    bodies: BTreeMap<BodyHandle, SandboxBody>,
    next_watch: u64,
    watches: Vec<ContactWatch>,
    pending_contacts: Vec<ContactEvent>,
    focus: Option<BodyHandle>,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self {
            gravity: SANDBOX_GRAVITY,
            next_body: 0,
            bodies: BTreeMap::new(),
            next_watch: 0,
            watches: Vec::new(),
            pending_contacts: Vec::new(),
            focus: None,
        }
    }

    pub fn friction(&self, body: BodyHandle) -> Option<f32> {
        self.bodies.get(&body).map(|body| body.friction)
    }

    pub fn angular_factor(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|body| body.angular_factor)
    }

    /// Body the side-view picker centres on, normally the player.
    pub fn set_focus(&mut self, body: Option<BodyHandle>) {
        self.focus = body;
    }

    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let moving = self
            .bodies
            .iter()
            .filter(|(_, body)| !body.is_static())
            .map(|(handle, _)| *handle)
            .collect::<Vec<_>>();

        for handle in moving {
            let Some(mut body) = self.bodies.remove(&handle) else {
                continue;
            };
            body.velocity.y += self.gravity * dt;
            body.position += body.velocity * dt;
            for other in self.bodies.values() {
                push_out(&mut body, other);
            }
            self.bodies.insert(handle, body);
        }

        for watch in &self.watches {
            let (Some(a), Some(b)) = (self.bodies.get(&watch.a), self.bodies.get(&watch.b)) else {
                continue;
            };
            if touching(a, b) {
                self.pending_contacts.push(ContactEvent {
                    watch: watch.id,
                    a: watch.a,
                    b: watch.b,
                });
            }
        }
    }

    fn focus_position(&self) -> Vec3 {
        self.focus
            .and_then(|handle| self.bodies.get(&handle))
            .map(|body| body.position)
            .unwrap_or(Vec3::ZERO)
    }
}

fn push_out(body: &mut SandboxBody, other: &SandboxBody) {
    let delta = body.position - other.position;
    let overlap = body.half_extents + other.half_extents - delta.abs();
    if overlap.x <= 0.0 || overlap.y <= 0.0 || overlap.z <= 0.0 {
        return;
    }

    let axis = if overlap.y <= overlap.x && overlap.y <= overlap.z {
        1
    } else if overlap.x <= overlap.z {
        0
    } else {
        2
    };
    let direction = if delta[axis] >= 0.0 { 1.0 } else { -1.0 };
    body.position[axis] += overlap[axis] * direction;
    if body.velocity[axis] * direction < 0.0 {
        body.velocity[axis] = 0.0;
    }
}

fn touching(a: &SandboxBody, b: &SandboxBody) -> bool {
    let gap = (a.position - b.position).abs() - (a.half_extents + b.half_extents);
    gap.max_element() <= CONTACT_SLOP
}

impl PhysicsWorld for SandboxWorld {
    fn spawn_box(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_body);
        self.next_body = self.next_body.saturating_add(1);
        self.bodies.insert(
            handle,
            SandboxBody {
                name: desc.name,
                position: desc.position,
                velocity: Vec3::ZERO,
                half_extents: desc.size * 0.5,
                mass: desc.mass.max(0.0),
                friction: 0.5,
                angular_factor: Vec3::ONE,
            },
        );
        handle
    }

    fn body_state(&self, body: BodyHandle) -> Option<BodyState> {
        self.bodies.get(&body).map(|body| BodyState {
            position: body.position,
            velocity: body.velocity,
        })
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> bool {
        match self.bodies.get_mut(&body) {
            Some(body) if !body.is_static() => {
                body.velocity = velocity;
                true
            }
            _ => false,
        }
    }

    fn apply_impulse_y(&mut self, body: BodyHandle, impulse: f32) -> bool {
        match self.bodies.get_mut(&body) {
            Some(body) if !body.is_static() => {
                body.velocity.y += impulse / body.mass;
                true
            }
            _ => false,
        }
    }

    fn set_angular_factor(&mut self, body: BodyHandle, factor: Vec3) -> bool {
        self.bodies
            .get_mut(&body)
            .map(|body| body.angular_factor = factor)
            .is_some()
    }

    fn set_friction(&mut self, body: BodyHandle, friction: f32) -> bool {
        self.bodies
            .get_mut(&body)
            .map(|body| body.friction = friction)
            .is_some()
    }

    fn watch_contact(&mut self, a: BodyHandle, b: BodyHandle) -> ContactWatchId {
        let id = ContactWatchId(self.next_watch);
        self.next_watch = self.next_watch.saturating_add(1);
        self.watches.push(ContactWatch { id, a, b });
        id
    }

    fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.pending_contacts)
    }

    fn destroy(&mut self, body: BodyHandle) -> bool {
        let removed = self.bodies.remove(&body).is_some();
        self.watches
            .retain(|watch| watch.a != body && watch.b != body);
        self.pending_contacts
            .retain(|event| event.a != body && event.b != body);
        if self.focus == Some(body) {
            self.focus = None;
        }
        removed
    }
}

impl ObjectPicker for SandboxWorld {
    /// Orthographic side view looking down -z, centred on the focus body.
    fn pick(&self, press: &PointerPress) -> Vec<PickHit> {
        let (width, height) = press.window_size;
        let eye = self.focus_position();
        let screen_center = Vec2::new(width as f32 * 0.5, height as f32 * 0.5);
        let offset = (press.position_px - screen_center) / SANDBOX_PIXELS_PER_UNIT;
        let target = Vec2::new(eye.x + offset.x, eye.y - offset.y);

        let mut hits = self
            .bodies
            .iter()
            .filter(|(handle, _)| Some(**handle) != self.focus)
            .filter(|(_, body)| {
                (target.x - body.position.x).abs() <= body.half_extents.x
                    && (target.y - body.position.y).abs() <= body.half_extents.y
            })
            .map(|(handle, body)| PickHit {
                body: *handle,
                name: body.name.clone(),
                distance: body.position.distance(eye),
            })
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
