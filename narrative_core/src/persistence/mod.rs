//! Save/load of session snapshots.
//!
//! The store only knows a path. It takes a snapshot to write and hands back a
//! freshly parsed snapshot on load; it never holds on to live state. Writes go
//! to a temporary sibling file that is renamed over the save, so a failed save
//! never replaces a good one with a partial file.

mod record;

pub use record::*;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no saved game at {path}")]
    NotFound { path: PathBuf },

    #[error("saved game at {path} is unreadable: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to read save at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write save to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode save: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PersistError {
    /// Whether this error means "there is no usable save" rather than a
    /// failed write.
    pub fn is_no_usable_save(&self) -> bool {
        matches!(
            self,
            PersistError::NotFound { .. } | PersistError::Corrupt { .. } | PersistError::Read { .. }
        )
    }
}

/// Quick facts about a save, for a "continue" menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub player_name: String,
    pub character_key: String,
    pub difficulty_key: String,
    pub current_node: String,
    pub decision_count: usize,
}

/// A single save slot on disk.
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a save file is present. Says nothing about whether it parses.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write a snapshot, replacing any previous save.
    pub fn save(&self, record: &SaveRecord) -> Result<PathBuf, PersistError> {
        let content = serde_json::to_string_pretty(record)?;
        write_atomic(&self.path, content.as_bytes()).map_err(|source| PersistError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), node = %record.current_node, "game saved");
        Ok(self.path.clone())
    }

    /// Read and parse the snapshot.
    pub fn load(&self) -> Result<SaveRecord, PersistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PersistError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(PersistError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let record: SaveRecord =
            serde_json::from_str(&content).map_err(|e| PersistError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        debug!(path = %self.path.display(), version = record.version, "save record parsed");
        Ok(record)
    }

    /// Summarize the save without building a session.
    pub fn peek(&self) -> Result<SaveSummary, PersistError> {
        let record = self.load()?;
        Ok(SaveSummary {
            player_name: record.name,
            character_key: record.character,
            difficulty_key: record.difficulty,
            current_node: record.current_node,
            decision_count: record.decisions.len(),
        })
    }

    /// Remove the save. Returns `false` if there was nothing to remove.
    pub fn delete(&self) -> Result<bool, PersistError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(PersistError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Write `contents` to a temporary sibling of `path`, then rename it into place.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "save".to_string());
    let tmp = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let result = (|| -> io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SessionMetadata;
    use story_rules::PlayerState;
    use tempfile::TempDir;

    fn sample_record() -> SaveRecord {
        let mut player = PlayerState::new("Test", "jason_facil_inicio");
        player.record_decision("jason_facil_inicio", "Look around");
        SaveRecord::capture(&player, &SessionMetadata::new("jason", "facil"), None)
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SaveStore::new(temp_dir.path().join("slot.json"));

        assert!(!store.exists());
        let written = store.save(&sample_record()).expect("Save should succeed");
        assert_eq!(written, store.path());
        assert!(store.exists());

        let loaded = store.load().expect("Load should succeed");
        assert_eq!(loaded, sample_record());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SaveStore::new(temp_dir.path().join("saves").join("deep").join("slot.json"));

        store.save(&sample_record()).expect("Save should succeed");
        assert!(store.exists());
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SaveStore::new(temp_dir.path().join("slot.json"));

        store.save(&sample_record()).unwrap();
        store.save(&sample_record()).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["slot.json".to_string()]);
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("slot.json");
        let store = SaveStore::new(&path);
        store.save(&sample_record()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        // A store whose parent "directory" is the existing save file cannot write.
        let blocked = SaveStore::new(path.join("nested.json"));
        let err = blocked.save(&sample_record()).unwrap_err();
        assert!(matches!(err, PersistError::Write { .. }));
        assert!(!err.is_no_usable_save());

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert!(store.load().is_ok());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SaveStore::new(temp_dir.path().join("missing.json"));

        let err = store.load().unwrap_err();
        assert!(matches!(err, PersistError::NotFound { .. }));
        assert!(err.is_no_usable_save());
    }

    #[test]
    fn test_load_garbage_is_corrupt() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("slot.json");
        fs::write(&path, "{ not json").unwrap();

        let err = SaveStore::new(&path).load().unwrap_err();
        assert!(matches!(err, PersistError::Corrupt { .. }));
        assert!(err.is_no_usable_save());
    }

    #[test]
    fn test_load_missing_fields_is_corrupt() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("slot.json");
        fs::write(&path, r#"{ "nombre": "Half", "salud": 10 }"#).unwrap();

        let err = SaveStore::new(&path).load().unwrap_err();
        assert!(matches!(err, PersistError::Corrupt { .. }));
    }

    #[test]
    fn test_peek() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SaveStore::new(temp_dir.path().join("slot.json"));
        store.save(&sample_record()).unwrap();

        let summary = store.peek().expect("Peek should succeed");
        assert_eq!(summary.player_name, "Test");
        assert_eq!(summary.character_key, "jason");
        assert_eq!(summary.difficulty_key, "facil");
        assert_eq!(summary.current_node, "jason_facil_inicio");
        assert_eq!(summary.decision_count, 1);
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SaveStore::new(temp_dir.path().join("slot.json"));
        store.save(&sample_record()).unwrap();

        assert!(store.delete().unwrap());
        assert!(!store.exists());
        assert!(!store.delete().unwrap());
    }
}
