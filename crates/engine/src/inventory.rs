use serde::{Deserialize, Serialize};

/// Items in pickup order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventorySnapshot(Vec<String>);

impl InventorySnapshot {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(items.into_iter().map(Into::into).collect())
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, item: &str) -> bool {
        self.0.iter().any(|held| held == item)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

/// Live inventory plus the copy taken when the current level instance began.
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    current: InventorySnapshot,
    start_of_level: InventorySnapshot,
}

impl InventoryLedger {
    pub fn start_level(&mut self, initial: InventorySnapshot) {
        self.start_of_level = initial.clone();
        self.current = initial;
    }

    pub fn pickup(&mut self, item: impl Into<String>) -> InventorySnapshot {
        self.current.0.push(item.into());
        self.current.clone()
    }

    pub fn rollback_to_level_start(&mut self) -> InventorySnapshot {
        self.current = self.start_of_level.clone();
        self.current.clone()
    }

    pub fn current(&self) -> InventorySnapshot {
        self.current.clone()
    }

    pub fn start_of_level(&self) -> &InventorySnapshot {
        &self.start_of_level
    }
}
