//! Application-level state.
//!
//! `AppState` is the single source of truth the view model is built from.
//! It is only ever mutated on the UI thread, after background events have
//! been drained there, so none of it needs locking.

use std::collections::HashMap;
use std::sync::Arc;

use dss_model::{IodEntry, SpecTree};

use crate::view_model::SortSpec;

/// Top-level application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Flat IOD list in document order; rebuilt wholesale on every
    /// successful list load, never partially mutated.
    pub entries: Vec<IodEntry>,
    /// Loaded specification trees keyed by table id. Append-only within a
    /// session; cleared when the entry list is reloaded or the standard
    /// version changes.
    pub loaded_trees: HashMap<String, Arc<SpecTree>>,
    /// Version of the most recently loaded standard, if any.
    pub standard_version: Option<String>,
    /// Current search filter text (raw, untrimmed).
    pub search_text: String,
    /// Current sort state.
    pub sort: SortSpec,
    /// Whether only favorites are shown.
    pub favorites_only: bool,
    /// Table id of the selected row; tracked by id, never by index, so it
    /// survives rebuilds that reorder rows.
    pub selected: Option<String>,
    index: HashMap<String, usize>,
}

impl AppState {
    /// Fresh empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry list wholesale and clear all loaded trees.
    pub fn replace_entries(&mut self, entries: Vec<IodEntry>) {
        self.index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.table_id.clone(), i))
            .collect();
        self.entries = entries;
        self.loaded_trees.clear();
    }

    /// Look up an entry by table id.
    #[must_use]
    pub fn entry(&self, table_id: &str) -> Option<&IodEntry> {
        self.index.get(table_id).map(|&i| &self.entries[i])
    }

    /// Attach a loaded specification tree to its entry.
    pub fn attach_tree(&mut self, table_id: impl Into<String>, tree: Arc<SpecTree>) {
        self.loaded_trees.insert(table_id.into(), tree);
    }

    /// Drop every loaded tree (total invalidation).
    pub fn clear_trees(&mut self) {
        self.loaded_trees.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dss_model::NodeKind;

    #[test]
    fn test_replace_entries_rebuilds_index_and_clears_trees() {
        let mut state = AppState::new();
        state.replace_entries(vec![IodEntry::new("CR Image", "table_A.2-1", "u")]);

        let mut tree = SpecTree::new("CR Image");
        tree.add_child(
            tree.root(),
            "Patient",
            NodeKind::Module {
                reference: String::new(),
                usage: "M".to_string(),
            },
        );
        state.attach_tree("table_A.2-1", Arc::new(tree));
        assert!(state.loaded_trees.contains_key("table_A.2-1"));

        state.replace_entries(vec![
            IodEntry::new("CT Image", "table_A.3-1", "u"),
            IodEntry::new("CR Image", "table_A.2-1", "u"),
        ]);
        assert!(state.loaded_trees.is_empty());
        assert_eq!(state.entry("table_A.2-1").unwrap().name, "CR Image");
        assert!(state.entry("table_Z.9-9").is_none());
    }
}
