//! Specification loading facade.
//!
//! [`SpecGateway`] combines the external [`SpecSource`] collaborator with
//! the cache layout and version tracking, and memoizes loaded trees for the
//! session. It is shared with worker threads behind an `Arc`; all methods
//! take `&self` and may block on I/O.

use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex, PoisonError};

use dss_model::{IodEntry, IodKind, SpecTree};

use crate::cache::{CacheLayout, PART3_CACHE_FILE_NAME, TOC_CACHE_FILE_NAME};
use crate::error::{LoadError, Result};
use crate::progress::ProgressSink;
use crate::source::{
    SpecSource, SpecTreeRequest, TocDocument, iod_column_mapping, module_column_mapping,
};
use crate::toc::extract_iod_entries;
use crate::version::VersionTracker;

/// URL of the DICOM PS3.3 table-of-contents document.
pub const PART3_TOC_URL: &str =
    "https://dicom.nema.org/medical/dicom/current/output/chtml/part03/ps3.3.html";

/// URL of the single-page DICOM PS3.3 document used for tree builds.
pub const PART3_HTML_URL: &str =
    "https://dicom.nema.org/medical/dicom/current/output/html/part03.html";

/// Result of a successful entry-list load.
#[derive(Debug, Clone)]
pub struct ListLoadOutcome {
    /// The freshly extracted IOD list, in document order.
    pub entries: Vec<IodEntry>,
    /// Standard version of the loaded document.
    pub version: String,
    /// Whether the version differs from the previously loaded one.
    pub version_changed: bool,
}

/// Facade over the external specification source.
pub struct SpecGateway<S> {
    source: S,
    cache: CacheLayout,
    version: Mutex<VersionTracker>,
    trees: Mutex<HashMap<String, Arc<SpecTree>>>,
}

impl<S: SpecSource> SpecGateway<S> {
    /// Create a gateway over `source` with the given cache layout.
    pub fn new(source: S, cache: CacheLayout) -> Self {
        Self {
            source,
            cache,
            version: Mutex::new(VersionTracker::default()),
            trees: Mutex::new(HashMap::new()),
        }
    }

    /// The cache layout this gateway operates on.
    #[must_use]
    pub fn cache(&self) -> &CacheLayout {
        &self.cache
    }

    /// Version of the most recent successful list load.
    #[must_use]
    pub fn standard_version(&self) -> Option<String> {
        self.version
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current()
            .map(str::to_string)
    }

    /// Load the IOD entry list from the table-of-contents document.
    ///
    /// With `force_download`, the document is fetched into a uniquely-named
    /// temporary file and only promoted to the canonical cache name after a
    /// successful parse, so a half-downloaded or unparsable document never
    /// overwrites a good cache entry. A successful load is a session
    /// boundary: the per-IOD tree memo is cleared.
    pub fn load_entry_list(
        &self,
        force_download: bool,
        progress: &dyn ProgressSink,
    ) -> Result<ListLoadOutcome> {
        tracing::debug!(force_download, "loading IOD list");
        if force_download {
            self.load_entry_list_forced(progress)
        } else {
            let doc = self.source.fetch_table_of_contents(
                PART3_TOC_URL,
                TOC_CACHE_FILE_NAME,
                false,
                progress,
            )?;
            self.finish_list_load(&doc, false)
        }
    }

    fn load_entry_list_forced(&self, progress: &dyn ProgressSink) -> Result<ListLoadOutcome> {
        let standard_dir = self.cache.standard_dir();
        fs::create_dir_all(&standard_dir).map_err(|source| LoadError::Io {
            operation: "create directory",
            path: standard_dir.clone(),
            source,
        })?;

        // Unique temp name inside the standard cache dir; the collaborator
        // downloads into this cache entry instead of the canonical one.
        let temp = tempfile::Builder::new()
            .prefix("toc-")
            .suffix(".html")
            .tempfile_in(&standard_dir)
            .map_err(|source| LoadError::Io {
                operation: "create temp file in",
                path: standard_dir.clone(),
                source,
            })?;
        let temp_name = temp.path().file_name().map_or_else(
            || "toc-download.html".to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let mut temp_path = temp.into_temp_path().keep().map_err(|err| LoadError::Io {
            operation: "persist temp file",
            path: err.path.to_path_buf(),
            source: err.error,
        })?;

        let doc = match self
            .source
            .fetch_table_of_contents(PART3_TOC_URL, &temp_name, true, progress)
        {
            Ok(doc) => doc,
            Err(err) => {
                let _ = fs::remove_file(&temp_path);
                return Err(err);
            }
        };

        // Move the fresh download from standard/ to the cache root so that
        // archiving the standard folder cannot take it along.
        let root_temp = self.cache.root().join(&temp_name);
        match fs::rename(&temp_path, &root_temp) {
            Ok(()) => temp_path = root_temp,
            Err(err) => {
                tracing::warn!(%err, "failed to move fresh download to cache root");
            }
        }

        let outcome = self.finish_list_load(&doc, true);

        match &outcome {
            Ok(_) => {
                // Promote the download to the canonical name now that any
                // archiving of the previous generation is done.
                if let Err(err) = fs::create_dir_all(&standard_dir) {
                    tracing::warn!(dir = %standard_dir.display(), %err, "failed to recreate standard cache dir");
                }
                let canonical = self.cache.toc_cache_path();
                if let Err(err) = fs::rename(&temp_path, &canonical) {
                    tracing::warn!(to = %canonical.display(), %err, "failed to move new document into cache");
                }
            }
            Err(_) => {
                let _ = fs::remove_file(&temp_path);
            }
        }

        outcome
    }

    /// Extract entries and version, then apply version-change handling.
    fn finish_list_load(&self, doc: &TocDocument, force_download: bool) -> Result<ListLoadOutcome> {
        let version = doc.version.trim();
        if version.is_empty() {
            return Err(LoadError::Parse(
                "document carries no standard version".to_string(),
            ));
        }
        let anchors = doc.list_of_tables.as_ref().ok_or_else(|| {
            LoadError::Parse("could not find list-of-tables section in document".to_string())
        })?;
        let entries = extract_iod_entries(anchors, PART3_TOC_URL);

        let mut tracker = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        let version_changed = tracker.version_changed(version);
        if force_download && version_changed {
            if let Some(previous) = tracker.current() {
                tracing::info!(
                    previous,
                    new = version,
                    "new standard version detected, archiving previous cache"
                );
                self.cache.archive_previous_version(previous);
            }
        } else {
            tracing::info!(version, "standard version unchanged, keeping cached files");
        }
        tracker.record(version);
        drop(tracker);

        // A reloaded entry list starts a new session for per-IOD trees.
        self.clear_trees();

        Ok(ListLoadOutcome {
            entries,
            version: version.to_string(),
            version_changed,
        })
    }

    /// Load the specification tree for one IOD.
    ///
    /// Idempotent within a session: repeated calls for the same `table_id`
    /// return the memoized tree without consulting the source again. The
    /// column mappings handed to the builder are a static lookup keyed by
    /// the entry's kind.
    pub fn load_spec_tree(
        &self,
        table_id: &str,
        progress: &dyn ProgressSink,
    ) -> Result<Arc<SpecTree>> {
        if let Some(tree) = self
            .trees
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(table_id)
        {
            tracing::debug!(table_id, "specification tree already loaded");
            return Ok(Arc::clone(tree));
        }

        let kind = IodKind::from_table_id(table_id);
        let request = SpecTreeRequest {
            url: PART3_HTML_URL,
            cache_file_name: PART3_CACHE_FILE_NAME,
            model_file_name: CacheLayout::model_file_name(table_id),
            table_id,
            iod_mapping: iod_column_mapping(kind),
            module_mapping: module_column_mapping(kind),
        };
        let tree = self.source.build_spec_tree(&request, progress)?;

        // Defensive contract check against the external builder.
        if let Err(defect) = tree.validate() {
            tracing::error!(table_id, %defect, "external builder returned an inconsistent tree");
            return Err(LoadError::ModelIntegrity {
                table_id: table_id.to_string(),
                detail: defect.to_string(),
            });
        }
        if tree.is_empty() {
            tracing::error!(table_id, "external builder returned a tree without content");
            return Err(LoadError::ModelIntegrity {
                table_id: table_id.to_string(),
                detail: "tree has no module content".to_string(),
            });
        }

        let tree = Arc::new(tree);
        self.trees
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table_id.to_string(), Arc::clone(&tree));
        Ok(tree)
    }

    /// Drop all memoized trees (session boundary / total invalidation).
    pub fn clear_trees(&self) {
        self.trees
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
