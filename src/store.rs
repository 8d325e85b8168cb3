//! Persisted now-playing snapshot.
//!
//! The host player writes the last known track into a small TOML file; the
//! widget reads it each tick as the fallback tier behind the live session.

mod file;
mod snapshot;

pub use file::FileStateStore;
pub use snapshot::PersistedSnapshot;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed store file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize snapshot: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown store key: {0}")]
    UnknownKey(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Source of the persisted snapshot.
pub trait StateStore {
    /// Read the current snapshot. Absent data is an empty snapshot, not an error.
    fn load(&self) -> Result<PersistedSnapshot, StoreError>;
}

/// Read the snapshot for a tick. A store that cannot be read reads as empty.
pub fn snapshot_or_default<S: StateStore + ?Sized>(store: &S) -> PersistedSnapshot {
    store.load().unwrap_or_else(|e| {
        warn!("ignoring persisted snapshot: {e}");
        PersistedSnapshot::default()
    })
}
