use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use super::backend::{MemorySaveBackend, SaveBackend};
use super::record::{merge_overrides, LiveState, SaveOverrides, SaveRecord};
use super::SaveError;

pub const SAVE_KEY_PREFIX: &str = "CHIPQUEST_SAVE_";
pub const AUTO_SLOT: &str = "auto";
pub const MANUAL_SLOT: &str = "slot1";

/// Named save slots over a [`SaveBackend`], each stored under
/// `<prefix><slot>`.
pub struct SaveStore {
    backend: Box<dyn SaveBackend>,
    prefix: String,
}

impl std::fmt::Debug for SaveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveStore")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl SaveStore {
    pub fn new(backend: impl SaveBackend + 'static) -> Self {
        Self::with_prefix(backend, SAVE_KEY_PREFIX)
    }

    pub fn in_memory() -> Self {
        Self::new(MemorySaveBackend::new())
    }

    pub fn with_prefix(backend: impl SaveBackend + 'static, prefix: impl Into<String>) -> Self {
        Self {
            backend: Box::new(backend),
            prefix: prefix.into(),
        }
    }

    fn key_for(&self, slot: &str) -> String {
        format!("{}{slot}", self.prefix)
    }

    /// Captures `live`, applies `overrides`, stamps the current UTC time and
    /// replaces whatever the slot held.
    pub fn save(
        &mut self,
        slot: &str,
        live: &LiveState,
        overrides: &SaveOverrides,
    ) -> Result<SaveRecord, SaveError> {
        let mut record = merge_overrides(live.to_record(), overrides);
        record.timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let encoded = serde_json::to_string_pretty(&record).map_err(SaveError::Encode)?;
        let key = self.key_for(slot);
        self.backend.write(&key, &encoded)?;

        info!(
            slot,
            level = %record.level,
            items = record.inventory.len(),
            "game_saved"
        );
        Ok(record)
    }

    /// `None` for a missing slot. Unreadable or mis-shaped records are logged
    /// and also reported as `None`.
    pub fn load(&self, slot: &str) -> Option<SaveRecord> {
        match self.try_load(slot) {
            Ok(record) => record,
            Err(error) => {
                warn!(slot, error = %error, "save_load_failed");
                None
            }
        }
    }

    pub fn try_load(&self, slot: &str) -> Result<Option<SaveRecord>, SaveError> {
        let key = self.key_for(slot);
        match self.backend.read(&key)? {
            Some(raw) => parse_save_record(&key, &raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn has_save(&self, slot: &str) -> bool {
        let key = self.key_for(slot);
        match self.backend.read(&key) {
            Ok(value) => value.is_some_and(|raw| !raw.trim().is_empty()),
            Err(error) => {
                warn!(slot, error = %error, "save_probe_failed");
                false
            }
        }
    }

    /// Removes every key under this store's prefix and nothing else.
    pub fn clear_all(&mut self) -> Result<usize, SaveError> {
        let mut removed = 0;
        for key in self.backend.keys()? {
            if key.starts_with(&self.prefix) && self.backend.remove(&key)? {
                removed += 1;
            }
        }
        info!(removed, "saves_cleared");
        Ok(removed)
    }
}

pub fn parse_save_record(key: &str, raw: &str) -> Result<SaveRecord, SaveError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, SaveRecord>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        SaveError::Parse {
            key: key.to_string(),
            path,
            source: error.into_inner(),
        }
    })
}
