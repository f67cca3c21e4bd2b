use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

/// Generation number of one level instance. Load completions carry it so a
/// torn-down instance never receives results meant for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelInstanceId(pub u64);

impl fmt::Display for LevelInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub instance: LevelInstanceId,
    pub asset: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("asset '{name}' is not in the manifest")]
    NotFound { name: String },
    #[error("asset '{name}' failed to load: {reason}")]
    Failed { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub result: Result<AssetHandle, AssetError>,
}

pub trait AssetLoader {
    fn request(&mut self, ticket: LoadTicket);
    fn poll_completed(&mut self) -> Vec<LoadCompletion>;
}

/// Resolves names against a fixed manifest. Requests complete on the next
/// poll, never inside `request`.
#[derive(Debug, Default)]
pub struct ManifestAssetLoader {
    manifest: BTreeMap<String, AssetHandle>,
    in_flight: Vec<LoadTicket>,
}

impl ManifestAssetLoader {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let manifest = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name.into(), AssetHandle(index as u64)))
            .collect();
        Self {
            manifest,
            in_flight: Vec::new(),
        }
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

impl AssetLoader for ManifestAssetLoader {
    fn request(&mut self, ticket: LoadTicket) {
        debug!(instance = %ticket.instance, asset = %ticket.asset, "asset_requested");
        self.in_flight.push(ticket);
    }

    fn poll_completed(&mut self) -> Vec<LoadCompletion> {
        self.in_flight
            .drain(..)
            .map(|ticket| {
                let result = self.manifest.get(&ticket.asset).copied().ok_or_else(|| {
                    AssetError::NotFound {
                        name: ticket.asset.clone(),
                    }
                });
                LoadCompletion { ticket, result }
            })
            .collect()
    }
}
