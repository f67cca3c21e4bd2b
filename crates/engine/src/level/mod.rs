mod catalog;
mod def;
mod machine;
#[cfg(test)]
mod tests;

use std::fmt;

use glam::Vec3;
use thiserror::Error;

use crate::assets::AssetError;
use crate::inventory::InventorySnapshot;

pub use catalog::{CatalogError, LevelCatalog};
pub use def::{
    ExitRule, GoalZone, HazardPair, LevelBodies, LevelDef, OutcomeTrigger, PropDef, PropRole,
    DEFAULT_FALL_THRESHOLD, DEFAULT_GOAL_RADIUS, PLAYER_BODY_NAME,
};
pub use machine::{LevelStateMachine, MachineConfig, DEFAULT_PICKUP_REACH};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(String);

impl LevelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LevelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Everything that crosses from one level instance into the next.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPayload {
    pub inventory: InventorySnapshot,
    /// `None` spawns the player at the level default.
    pub position: Option<Vec3>,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefeatReason {
    Fell,
    Hazard,
    MissingKey,
}

impl DefeatReason {
    pub fn message_key(self) -> &'static str {
        match self {
            DefeatReason::Fell | DefeatReason::Hazard => "game_over",
            DefeatReason::MissingKey => "no_key",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LevelOutcome {
    Loading {
        level: LevelId,
    },
    Active,
    Victory {
        reset_target: LevelId,
    },
    Defeat {
        reason: DefeatReason,
        /// `None` restarts the same level with the inventory rolled back.
        reset_target: Option<LevelId>,
    },
    AwaitingRestart {
        reset_target: Option<LevelId>,
    },
    Transitioning {
        next: LevelId,
        payload: TransitionPayload,
    },
}

impl LevelOutcome {
    pub fn is_active(&self) -> bool {
        matches!(self, LevelOutcome::Active)
    }
}

pub type Rgb = [u8; 3];

pub const VICTORY_COLOR: Rgb = [0x00, 0xff, 0x00];
pub const DEFEAT_COLOR: Rgb = [0xff, 0x00, 0x00];
pub const PROMPT_COLOR: Rgb = [0xff, 0xff, 0xff];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEmphasis {
    Title,
    Prompt,
}

/// One line of the end screen, as a message key to resolve at display time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiElement {
    pub message_key: &'static str,
    pub color: Rgb,
    pub emphasis: TextEmphasis,
}

pub const DEFAULT_HUD_MESSAGE_TTL: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HudMessage {
    pub message_key: &'static str,
    pub ttl_seconds: f32,
}

#[derive(Debug, Error)]
pub enum LevelSetupError {
    #[error("level '{level}' is not in the catalog")]
    UnknownLevel { level: String },
    #[error("level '{level}' failed to load an asset: {source}")]
    Asset {
        level: String,
        #[source]
        source: AssetError,
    },
    #[error("level '{level}' names unknown body '{name}' in a hazard pair")]
    UnknownHazardBody { level: String, name: String },
}
