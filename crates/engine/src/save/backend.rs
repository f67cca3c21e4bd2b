use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::SaveError;

/// Flat string key-value storage underneath [`super::SaveStore`].
pub trait SaveBackend {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError>;
    fn remove(&mut self, key: &str) -> Result<bool, SaveError>;
    fn keys(&self) -> Result<Vec<String>, SaveError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemorySaveBackend {
    entries: BTreeMap<String, String>,
}

impl MemorySaveBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveBackend for MemorySaveBackend {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, SaveError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, SaveError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

const SAVE_FILE_EXTENSION: &str = "json";

/// One `<key>.json` file per entry. Writes go through a sibling temp file
/// and a rename so a crash never leaves a half-written record.
#[derive(Debug, Clone)]
pub struct FileSaveBackend {
    dir: PathBuf,
}

impl FileSaveBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SaveError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\', ':']);
        if !valid {
            return Err(SaveError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{key}.{SAVE_FILE_EXTENSION}")))
    }
}

impl SaveBackend for FileSaveBackend {
    fn read(&self, key: &str) -> Result<Option<String>, SaveError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SaveError::Read { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        let path = self.path_for(key)?;
        write_text_atomic(&path, value).map_err(|source| SaveError::Write { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<bool, SaveError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SaveError::Remove { path, source }),
        }
    }

    fn keys(&self) -> Result<Vec<String>, SaveError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SaveError::ListDir {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SaveError::ListDir {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SAVE_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let staged = staging_path(path);
    fs::write(&staged, text.as_bytes())?;

    // `rename` replaces an existing target, so the old record stays readable
    // until the new one is in place.
    if let Err(error) = fs::rename(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(error);
    }
    Ok(())
}

// `.tmp` rather than `.json` so half-written files never show up in `keys`.
fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(".tmp");
    PathBuf::from(staged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backend_round_trips_and_lists_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut backend = FileSaveBackend::new(temp.path().join("saves"));

        assert_eq!(backend.read("A_auto").expect("read"), None);
        assert!(backend.keys().expect("keys").is_empty());

        backend.write("A_auto", "{}").expect("write");
        backend.write("A_slot1", "[]").expect("write");
        backend.write("A_slot1", "[1]").expect("overwrite");

        assert_eq!(backend.read("A_slot1").expect("read").as_deref(), Some("[1]"));
        assert_eq!(backend.keys().expect("keys"), ["A_auto", "A_slot1"]);
        assert!(!temp.path().join("saves").join("A_slot1.json.tmp").exists());
    }

    #[test]
    fn file_backend_remove_reports_presence() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut backend = FileSaveBackend::new(temp.path());
        backend.write("k", "v").expect("write");

        assert!(backend.remove("k").expect("remove"));
        assert!(!backend.remove("k").expect("remove missing"));
    }

    #[test]
    fn interrupted_write_leaves_previous_record_readable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut backend = FileSaveBackend::new(temp.path());
        backend.write("slot", "old").expect("write");

        // A staged file left behind by a write that never reached the rename.
        let staged = temp.path().join("slot.json.tmp");
        fs::write(&staged, "partial").expect("stage");

        assert_eq!(backend.read("slot").expect("read").as_deref(), Some("old"));
        assert_eq!(backend.keys().expect("keys"), ["slot"]);

        backend.write("slot", "new").expect("overwrite");
        assert_eq!(backend.read("slot").expect("read").as_deref(), Some("new"));
        assert!(!staged.exists());
    }

    #[test]
    fn file_backend_rejects_path_like_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut backend = FileSaveBackend::new(temp.path());

        for key in ["", "..", "../escape", "a/b", "c:\\d"] {
            assert!(
                matches!(backend.write(key, "x"), Err(SaveError::InvalidKey { .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn memory_backend_keys_are_sorted() {
        let mut backend = MemorySaveBackend::new();
        backend.write("b", "1").expect("write");
        backend.write("a", "2").expect("write");

        assert_eq!(backend.keys().expect("keys"), ["a", "b"]);
    }
}
