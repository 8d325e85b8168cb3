use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{PersistedSnapshot, StateStore, StoreError};

/// TOML-file backed store.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the snapshot on disk.
    ///
    /// Written to a sibling temp file and renamed so a concurrent reader never
    /// sees a half-written snapshot.
    pub fn save(&self, snapshot: &PersistedSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string(snapshot)?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<PersistedSnapshot, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PersistedSnapshot::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(toml::from_str(&text)?)
    }
}
