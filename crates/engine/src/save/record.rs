use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::inventory::InventorySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SavedVec3 {
    pub fn from_vec3(value: Vec3) -> Self {
        Self {
            x: value.x,
            y: value.y,
            z: value.z,
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Persisted form of one save slot. `position: None` means the level's
/// default spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub level: String,
    pub inventory: InventorySnapshot,
    pub language: String,
    pub position: Option<SavedVec3>,
    pub timestamp: String,
}

/// Live values captured at save time.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveState {
    pub level: String,
    pub inventory: InventorySnapshot,
    pub language: String,
    pub position: Option<Vec3>,
}

impl LiveState {
    pub fn to_record(&self) -> SaveRecord {
        SaveRecord {
            level: self.level.clone(),
            inventory: self.inventory.clone(),
            language: self.language.clone(),
            position: self.position.map(SavedVec3::from_vec3),
            timestamp: String::new(),
        }
    }
}

/// Fields that replace captured live values. `position: Some(None)` forces
/// a null position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveOverrides {
    pub level: Option<String>,
    pub inventory: Option<InventorySnapshot>,
    pub language: Option<String>,
    pub position: Option<Option<SavedVec3>>,
}

impl SaveOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_position(mut self, position: Option<Vec3>) -> Self {
        self.position = Some(position.map(SavedVec3::from_vec3));
        self
    }
}

/// Applies each present override on top of `base`; absent fields keep the
/// base value.
pub fn merge_overrides(base: SaveRecord, overrides: &SaveOverrides) -> SaveRecord {
    SaveRecord {
        level: overrides.level.clone().unwrap_or(base.level),
        inventory: overrides.inventory.clone().unwrap_or(base.inventory),
        language: overrides.language.clone().unwrap_or(base.language),
        position: overrides.position.unwrap_or(base.position),
        timestamp: base.timestamp,
    }
}
