//! On-disk cache layout and version archiving.
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/standard/ps3.3.html                    table-of-contents document
//! <root>/standard/Part3.xhtml                   full Part 3 document
//! <root>/model/Part3_<TableId>_expanded.json    derived per-IOD models
//! <root>/<version>/{standard,model}/...         archived prior generation
//! <root>/<version>_backup_<timestamp>/...       archive-of-archive
//! ```
//!
//! Archiving is best-effort: a cache generation that cannot be moved is
//! logged and left behind, never aborting the load that triggered it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Cache file name of the table-of-contents document.
pub const TOC_CACHE_FILE_NAME: &str = "ps3.3.html";

/// Cache file name of the full Part 3 document used for tree builds.
pub const PART3_CACHE_FILE_NAME: &str = "Part3.xhtml";

/// Timestamp suffix format for archive-of-archive directories.
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Paths of the specification cache.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    /// Create a layout rooted at `root`. No directories are created yet.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding raw fetched standard documents.
    #[must_use]
    pub fn standard_dir(&self) -> PathBuf {
        self.root.join("standard")
    }

    /// Directory holding derived per-IOD model artifacts.
    #[must_use]
    pub fn model_dir(&self) -> PathBuf {
        self.root.join("model")
    }

    /// Canonical path of the cached table-of-contents document.
    #[must_use]
    pub fn toc_cache_path(&self) -> PathBuf {
        self.standard_dir().join(TOC_CACHE_FILE_NAME)
    }

    /// Archive directory for a given standard version.
    #[must_use]
    pub fn versioned_dir(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }

    /// Derived model file name for one IOD.
    #[must_use]
    pub fn model_file_name(table_id: &str) -> String {
        format!("Part3_{table_id}_expanded.json")
    }

    /// Move the current cache generation into `<root>/<previous_version>/`.
    ///
    /// Called when a forced reload detects a version change. If an archive
    /// for that version already exists (re-entrant forced reloads) it is
    /// first renamed with a timestamp suffix so nothing is clobbered. Every
    /// failure to move an individual folder is logged as a warning; none
    /// aborts the load.
    pub fn archive_previous_version(&self, previous_version: &str) {
        let versioned_dir = self.versioned_dir(previous_version);

        if versioned_dir.exists() {
            let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT);
            let backup_dir = self
                .root
                .join(format!("{previous_version}_backup_{timestamp}"));
            match fs::rename(&versioned_dir, &backup_dir) {
                Ok(()) => tracing::info!(
                    from = %versioned_dir.display(),
                    to = %backup_dir.display(),
                    "existing archive moved to backup"
                ),
                Err(err) => tracing::warn!(
                    archive = %versioned_dir.display(),
                    %err,
                    "failed to move existing archive to backup"
                ),
            }
        }

        self.archive_folder(&self.standard_dir(), &versioned_dir.join("standard"));
        self.archive_folder(&self.model_dir(), &versioned_dir.join("model"));
    }

    /// Move one cache folder into the archive, best-effort.
    fn archive_folder(&self, from: &Path, to: &Path) {
        if !from.exists() {
            return;
        }
        if let Some(parent) = to.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(dir = %parent.display(), %err, "failed to create archive directory");
                return;
            }
        }
        match fs::rename(from, to) {
            Ok(()) => tracing::info!(
                from = %from.display(),
                to = %to.display(),
                "moved cache folder to versioned archive"
            ),
            Err(err) => tracing::warn!(
                from = %from.display(),
                to = %to.display(),
                %err,
                "failed to move cache folder"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seed(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_layout_paths() {
        let layout = CacheLayout::new("/tmp/cache");
        assert_eq!(layout.toc_cache_path(), PathBuf::from("/tmp/cache/standard/ps3.3.html"));
        assert_eq!(layout.model_dir(), PathBuf::from("/tmp/cache/model"));
        assert_eq!(
            CacheLayout::model_file_name("table_A.2-1"),
            "Part3_table_A.2-1_expanded.json"
        );
    }

    #[test]
    fn test_archive_moves_standard_and_model_folders() {
        let dir = tempdir().unwrap();
        let layout = CacheLayout::new(dir.path());
        seed(&layout.toc_cache_path(), "toc");
        seed(&layout.model_dir().join("Part3_table_A.2-1_expanded.json"), "{}");

        layout.archive_previous_version("2024e");

        assert!(!layout.standard_dir().exists());
        assert!(!layout.model_dir().exists());
        let archived = layout.versioned_dir("2024e");
        assert!(archived.join("standard").join(TOC_CACHE_FILE_NAME).exists());
        assert!(
            archived
                .join("model")
                .join("Part3_table_A.2-1_expanded.json")
                .exists()
        );
    }

    #[test]
    fn test_reentrant_archive_backs_up_existing() {
        let dir = tempdir().unwrap();
        let layout = CacheLayout::new(dir.path());
        seed(&layout.versioned_dir("2024e").join("standard").join(TOC_CACHE_FILE_NAME), "old");
        seed(&layout.toc_cache_path(), "new");

        layout.archive_previous_version("2024e");

        // The fresh archive holds the new document.
        let archived_toc = layout.versioned_dir("2024e").join("standard").join(TOC_CACHE_FILE_NAME);
        assert_eq!(fs::read_to_string(archived_toc).unwrap(), "new");

        // The prior archive was renamed aside, not clobbered.
        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("2024e_backup_"))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_archive_with_no_cache_is_a_no_op() {
        let dir = tempdir().unwrap();
        let layout = CacheLayout::new(dir.path());
        layout.archive_previous_version("2024e");
        assert!(!layout.versioned_dir("2024e").exists());
    }
}
