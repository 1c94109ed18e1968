//! Persistence layer for the progress store.
//!
//! The entire progress record is one versioned JSON document, loaded once at
//! startup and rewritten wholesale on every mutation. A missing or corrupt
//! document is never fatal - the store falls back to empty defaults.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::progress::GameProgress;

/// Current on-disk snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Storage error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Storage error: {} at {}:{}", message, file, line)]
pub struct StorageError {
    /// Error message.
    pub message: String,
    /// Line number where the error occurred.
    pub line: u32,
    /// Source file where the error occurred.
    pub file: &'static str,
}

impl StorageError {
    /// Creates a new storage error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for StorageError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for StorageError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Serialization error: {}", err))
    }
}

/// The full persisted progress record.
///
/// Maps game identifier to its [`GameProgress`]. The `version` field guards
/// against format drift: snapshots with an unknown version are treated as
/// corrupt and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// When this snapshot was written.
    pub saved_at: DateTime<Utc>,
    /// Per-game progress records.
    pub games: BTreeMap<String, GameProgress>,
}

impl ProgressSnapshot {
    /// Creates a snapshot of the given records, stamped with the current time.
    #[instrument(skip(games))]
    pub fn now(games: BTreeMap<String, GameProgress>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            games,
        }
    }
}

/// Backend behind the progress store.
///
/// Injected into [`ProgressStore`](crate::ProgressStore) so tests can swap
/// the file system for memory.
pub trait ProgressStorage: std::fmt::Debug + Send {
    /// Loads the persisted snapshot, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<ProgressSnapshot>, StorageError>;

    /// Replaces the persisted snapshot wholesale.
    fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError>;

    /// Removes the persisted snapshot entirely.
    fn clear(&self) -> Result<(), StorageError>;
}

/// File-backed storage writing one JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Creates storage writing to the given file path.
    #[instrument]
    pub fn new(path: impl Into<PathBuf> + std::fmt::Debug) -> Self {
        let path = path.into();
        info!(path = %path.display(), "Creating JSON file storage");
        Self { path }
    }

    /// The file path this storage writes to.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ProgressStorage for JsonFileStorage {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<ProgressSnapshot>, StorageError> {
        if !self.path.exists() {
            debug!("No snapshot file present");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let snapshot: ProgressSnapshot = serde_json::from_str(&content)?;
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                found = snapshot.version,
                expected = SNAPSHOT_VERSION,
                "Unknown snapshot version"
            );
            return Err(StorageError::new(format!(
                "Unknown snapshot version {}",
                snapshot.version
            )));
        }
        debug!(games = snapshot.games.len(), "Snapshot loaded");
        Ok(Some(snapshot))
    }

    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, content)?;
        debug!(games = snapshot.games.len(), "Snapshot saved");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        info!("Snapshot cleared");
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<ProgressSnapshot>>,
}

impl MemoryStorage {
    /// Creates empty in-memory storage.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStorage for MemoryStorage {
    fn load(&self) -> Result<Option<ProgressSnapshot>, StorageError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::new("Poisoned storage lock"))?;
        Ok(slot.clone())
    }

    fn save(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::new("Poisoned storage lock"))?;
        *slot = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| StorageError::new("Poisoned storage lock"))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = JsonFileStorage::new(dir.path().join("progress.json"));

        assert!(storage.load().expect("load").is_none());

        let mut games = BTreeMap::new();
        games.insert(
            "pattern_matrix".to_string(),
            GameProgress {
                unlocked_levels: 3,
                high_score: 1500,
            },
        );
        let snapshot = ProgressSnapshot::now(games);
        storage.save(&snapshot).expect("save");

        let loaded = storage.load().expect("load").expect("snapshot present");
        assert_eq!(loaded.games, snapshot.games);

        storage.clear().expect("clear");
        assert!(storage.load().expect("load").is_none());
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "{ not json").expect("write");

        let storage = JsonFileStorage::new(path);
        assert!(storage.load().is_err());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("progress.json");
        let mut snapshot = ProgressSnapshot::now(BTreeMap::new());
        snapshot.version = 99;
        std::fs::write(&path, serde_json::to_string(&snapshot).expect("json")).expect("write");

        let storage = JsonFileStorage::new(path);
        assert!(storage.load().is_err());
    }
}
