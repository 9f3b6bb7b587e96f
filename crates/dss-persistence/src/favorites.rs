//! Favorites store.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use dss_model::IodEntry;

use crate::error::{PersistenceError, Result};

/// File name of the favorites file inside the config directory.
pub const FAVORITES_FILE_NAME: &str = "favorites.json";

/// Timestamp format of the `last_updated` field.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Suffix format used when quarantining a corrupt favorites file.
const QUARANTINE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// On-disk shape of the favorites file.
#[derive(Debug, Serialize, Deserialize)]
struct FavoritesFile {
    favorites: Vec<String>,
    last_updated: String,
}

/// Persistent set of starred IOD table ids.
///
/// Loaded once at startup; every mutation saves the file atomically.
/// Load and save failures are absorbed (favorites are a convenience
/// feature), so none of the methods here can fail the caller.
#[derive(Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    favorites: BTreeSet<String>,
}

impl FavoritesStore {
    /// Open the store backed by the given file path.
    ///
    /// A missing file yields an empty store. A malformed file is renamed
    /// aside with a timestamp suffix and the store starts empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let favorites = match Self::load(&path) {
            Ok(favorites) => favorites,
            Err(err @ PersistenceError::MalformedJson { .. }) => {
                tracing::warn!(%err, "favorites file is corrupt, starting from an empty set");
                Self::quarantine(&path);
                BTreeSet::new()
            }
            Err(err) => {
                tracing::warn!(%err, "failed to load favorites, starting from an empty set");
                BTreeSet::new()
            }
        };
        Self { path, favorites }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `table_id` is starred.
    #[must_use]
    pub fn is_favorite(&self, table_id: &str) -> bool {
        self.favorites.contains(table_id)
    }

    /// Star a table id and save.
    pub fn add(&mut self, table_id: impl Into<String>) {
        let table_id = table_id.into();
        tracing::info!(%table_id, "added favorite");
        self.favorites.insert(table_id);
        self.save();
    }

    /// Unstar a table id and save.
    pub fn remove(&mut self, table_id: &str) {
        tracing::info!(table_id, "removed favorite");
        self.favorites.remove(table_id);
        self.save();
    }

    /// All starred table ids.
    #[must_use]
    pub fn all(&self) -> &BTreeSet<String> {
        &self.favorites
    }

    /// Number of starred table ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    /// `true` when nothing is starred.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// Entries whose table id is starred, in input order.
    #[must_use]
    pub fn filter_entries(&self, entries: &[IodEntry]) -> Vec<IodEntry> {
        entries
            .iter()
            .filter(|entry| self.is_favorite(&entry.table_id))
            .cloned()
            .collect()
    }

    fn load(path: &Path) -> Result<BTreeSet<String>> {
        if !path.exists() {
            return Ok(BTreeSet::new());
        }
        let content = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source,
        })?;
        let file: FavoritesFile =
            serde_json::from_str(&content).map_err(|source| PersistenceError::MalformedJson {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(file.favorites.into_iter().collect())
    }

    /// Rename a corrupt file aside so the next save starts clean.
    fn quarantine(path: &Path) {
        let timestamp = Local::now().format(QUARANTINE_TIMESTAMP_FORMAT);
        let mut quarantined = path.as_os_str().to_owned();
        quarantined.push(format!(".corrupt-{timestamp}"));
        if let Err(err) = fs::rename(path, &quarantined) {
            tracing::warn!(path = %path.display(), %err, "failed to move corrupt favorites file aside");
        }
    }

    /// Atomic save: sibling temp file, flush + sync, then rename onto the
    /// target. Failures remove the temp file and are logged, never raised -
    /// a failed save must not crash the UI interaction that triggered it.
    fn save(&self) {
        if let Err(err) = self.try_save() {
            tracing::error!(path = %self.path.display(), %err, "failed to save favorites");
        }
    }

    fn try_save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = FavoritesFile {
            favorites: self.favorites.iter().cloned().collect(),
            last_updated: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| {
            PersistenceError::MalformedJson {
                path: self.path.clone(),
                source,
            }
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        let result = Self::write_and_replace(&temp_path, &self.path, json.as_bytes());
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_and_replace(temp_path: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = File::create(temp_path).map_err(|source| PersistenceError::Io {
            operation: "create",
            path: temp_path.to_path_buf(),
            source,
        })?;
        file.write_all(bytes).map_err(|source| PersistenceError::Io {
            operation: "write",
            path: temp_path.to_path_buf(),
            source,
        })?;
        file.sync_all().map_err(|source| PersistenceError::Io {
            operation: "sync",
            path: temp_path.to_path_buf(),
            source,
        })?;
        fs::rename(temp_path, target).map_err(|source| PersistenceError::AtomicWriteFailed {
            temp_path: temp_path.to_path_buf(),
            target_path: target.to_path_buf(),
            source,
        })
    }
}
