mod backend;
mod record;
mod store;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use backend::{FileSaveBackend, MemorySaveBackend, SaveBackend};
pub use record::{merge_overrides, LiveState, SaveOverrides, SaveRecord, SavedVec3};
pub use store::{parse_save_record, SaveStore, AUTO_SLOT, MANUAL_SLOT, SAVE_KEY_PREFIX};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save key '{key}' is not a plain file name")]
    InvalidKey { key: String },
    #[error("failed to read save '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write save '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove save '{path}': {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to list save directory '{path}': {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode save record: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to parse save '{key}' at {path}: {source}")]
    Parse {
        key: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
