use std::collections::BTreeSet;

use thiserror::Error;

use super::{LevelDef, LevelId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("level catalog is empty")]
    Empty,
    #[error("level '{level}' is defined more than once")]
    DuplicateLevel { level: String },
    #[error("level '{level}' exits to unknown level '{target}'")]
    UnknownExitTarget { level: String, target: String },
}

/// Closed set of levels. The first entry is where a fresh run starts.
#[derive(Debug, Clone)]
pub struct LevelCatalog {
    levels: Vec<LevelDef>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelDef>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut ids = BTreeSet::new();
        for level in &levels {
            if !ids.insert(level.id.clone()) {
                return Err(CatalogError::DuplicateLevel {
                    level: level.id.to_string(),
                });
            }
        }
        for level in &levels {
            let target = level.exit.targets();
            if !ids.contains(target) {
                return Err(CatalogError::UnknownExitTarget {
                    level: level.id.to_string(),
                    target: target.to_string(),
                });
            }
        }

        Ok(Self { levels })
    }

    pub fn first(&self) -> &LevelDef {
        &self.levels[0]
    }

    pub fn get(&self, id: &LevelId) -> Option<&LevelDef> {
        self.levels.iter().find(|level| level.id == *id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.levels.iter().any(|level| level.id.as_str() == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &LevelId> {
        self.levels.iter().map(|level| &level.id)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
