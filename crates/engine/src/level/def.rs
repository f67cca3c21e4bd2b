use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use tracing::debug;

use super::{LevelId, LevelSetupError};
use crate::physics::{
    BodyDesc, BodyHandle, BodyState, ContactEvent, ContactWatchId, PhysicsWorld,
};

pub const PLAYER_BODY_NAME: &str = "player";
pub const DEFAULT_GOAL_RADIUS: f32 = 2.5;
pub const DEFAULT_FALL_THRESHOLD: f32 = -30.0;
pub const DEFAULT_PLAYER_SIZE: Vec3 = Vec3::new(1.6, 2.5, 1.6);
pub const DEFAULT_PLAYER_MASS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropRole {
    Platform,
    KillFloor,
    Prop,
    /// Collectable by pointer press.
    Pickup,
    /// The player reaching it fires the level exit.
    Goal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropDef {
    pub name: String,
    pub role: PropRole,
    pub position: Vec3,
    pub size: Vec3,
    pub mass: f32,
}

impl PropDef {
    pub fn fixed(name: impl Into<String>, role: PropRole, position: Vec3, size: Vec3) -> Self {
        Self {
            name: name.into(),
            role,
            position,
            size,
            mass: 0.0,
        }
    }

    pub fn dynamic(name: impl Into<String>, position: Vec3, size: Vec3, mass: f32) -> Self {
        Self {
            name: name.into(),
            role: PropRole::Prop,
            position,
            size,
            mass,
        }
    }
}

/// Two named bodies whose contact ends the run. The player is
/// [`PLAYER_BODY_NAME`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardPair {
    pub a: String,
    pub b: String,
}

impl HazardPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitRule {
    /// Interior level: reaching the goal moves on to `next`.
    Advance { next: LevelId },
    /// Last level: reaching the goal wins if `required_item` is held and
    /// either way the next restart goes back to `reset_to`.
    Terminal {
        required_item: String,
        reset_to: LevelId,
    },
}

impl ExitRule {
    pub(crate) fn targets(&self) -> &LevelId {
        match self {
            ExitRule::Advance { next } => next,
            ExitRule::Terminal { reset_to, .. } => reset_to,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeTrigger {
    Hazard,
    Fell,
    GoalReached,
}

/// Axis-aligned extent of the goal body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalZone {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl GoalZone {
    pub fn distance_to(&self, point: Vec3) -> f32 {
        let nearest = point.clamp(
            self.center - self.half_extents,
            self.center + self.half_extents,
        );
        point.distance(nearest)
    }
}

/// Handles produced by one `setup_level` call, owned by that level instance.
#[derive(Debug, Clone)]
pub struct LevelBodies {
    pub player: BodyHandle,
    pub goal: Option<GoalZone>,
    pub interactables: BTreeMap<BodyHandle, String>,
    pub hazard_watches: Vec<ContactWatchId>,
    pub owned: Vec<BodyHandle>,
}

impl LevelBodies {
    pub(crate) fn forget(&mut self, body: BodyHandle) {
        self.interactables.remove(&body);
        self.owned.retain(|owned| *owned != body);
    }
}

/// Data-driven description of one level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDef {
    pub id: LevelId,
    pub assets: Vec<String>,
    pub default_spawn: Vec3,
    pub player_size: Vec3,
    pub player_mass: f32,
    pub props: Vec<PropDef>,
    pub hazards: Vec<HazardPair>,
    pub goal_radius: f32,
    pub fall_threshold: f32,
    pub exit: ExitRule,
}

impl LevelDef {
    pub fn new(id: impl Into<LevelId>, exit: ExitRule) -> Self {
        Self {
            id: id.into(),
            assets: Vec::new(),
            default_spawn: Vec3::new(0.0, 5.0, 0.0),
            player_size: DEFAULT_PLAYER_SIZE,
            player_mass: DEFAULT_PLAYER_MASS,
            props: Vec::new(),
            hazards: Vec::new(),
            goal_radius: DEFAULT_GOAL_RADIUS,
            fall_threshold: DEFAULT_FALL_THRESHOLD,
            exit,
        }
    }

    pub fn with_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets.extend(assets.into_iter().map(Into::into));
        self
    }

    pub fn with_spawn(mut self, spawn: Vec3) -> Self {
        self.default_spawn = spawn;
        self
    }

    pub fn with_prop(mut self, prop: PropDef) -> Self {
        self.props.push(prop);
        self
    }

    pub fn with_hazard(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.hazards.push(HazardPair::new(a, b));
        self
    }

    /// Spawns props, the player and hazard watches. Hazard names are checked
    /// before anything is spawned, so an error leaves the world untouched.
    pub fn setup_level<W>(
        &self,
        world: &mut W,
        spawn: Option<Vec3>,
    ) -> Result<LevelBodies, LevelSetupError>
    where
        W: PhysicsWorld + ?Sized,
    {
        let known = self
            .props
            .iter()
            .map(|prop| prop.name.as_str())
            .chain(std::iter::once(PLAYER_BODY_NAME))
            .collect::<BTreeSet<_>>();
        for pair in &self.hazards {
            for name in [&pair.a, &pair.b] {
                if !known.contains(name.as_str()) {
                    return Err(LevelSetupError::UnknownHazardBody {
                        level: self.id.to_string(),
                        name: name.clone(),
                    });
                }
            }
        }

        let mut by_name = BTreeMap::<&str, BodyHandle>::new();
        let mut owned = Vec::with_capacity(self.props.len() + 1);
        let mut interactables = BTreeMap::new();
        let mut goal = None;

        for prop in &self.props {
            let handle = world.spawn_box(BodyDesc::new(
                prop.name.clone(),
                prop.position,
                prop.size,
                prop.mass,
            ));
            owned.push(handle);
            by_name.insert(prop.name.as_str(), handle);
            match prop.role {
                PropRole::Pickup => {
                    interactables.insert(handle, prop.name.clone());
                }
                PropRole::Goal if goal.is_none() => {
                    goal = Some(GoalZone {
                        center: prop.position,
                        half_extents: prop.size * 0.5,
                    });
                }
                _ => {}
            }
        }

        let player = world.spawn_box(BodyDesc::new(
            PLAYER_BODY_NAME,
            spawn.unwrap_or(self.default_spawn),
            self.player_size,
            self.player_mass,
        ));
        owned.push(player);
        by_name.insert(PLAYER_BODY_NAME, player);

        let hazard_watches = self
            .hazards
            .iter()
            .filter_map(|pair| {
                let a = by_name.get(pair.a.as_str())?;
                let b = by_name.get(pair.b.as_str())?;
                Some(world.watch_contact(*a, *b))
            })
            .collect::<Vec<_>>();

        debug!(
            level = %self.id,
            bodies = owned.len(),
            hazards = hazard_watches.len(),
            "level_bodies_spawned"
        );

        Ok(LevelBodies {
            player,
            goal,
            interactables,
            hazard_watches,
            owned,
        })
    }

    /// Per-tick trigger check. Hazard contact wins over falling, which wins
    /// over the goal.
    pub fn on_tick(
        &self,
        bodies: &LevelBodies,
        player: Option<BodyState>,
        contacts: &[ContactEvent],
    ) -> Option<OutcomeTrigger> {
        if contacts
            .iter()
            .any(|event| bodies.hazard_watches.contains(&event.watch))
        {
            return Some(OutcomeTrigger::Hazard);
        }

        let position = player?.position;
        if position.y < self.fall_threshold {
            return Some(OutcomeTrigger::Fell);
        }
        if self.exit_condition(bodies, position) {
            return Some(OutcomeTrigger::GoalReached);
        }
        None
    }

    /// Within `goal_radius` of the goal body's surface.
    pub fn exit_condition(&self, bodies: &LevelBodies, position: Vec3) -> bool {
        bodies
            .goal
            .is_some_and(|goal| goal.distance_to(position) < self.goal_radius)
    }
}
