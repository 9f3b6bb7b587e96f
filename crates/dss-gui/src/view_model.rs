//! View-model construction: filter, sort, lazy-children reattachment.
//!
//! [`build`] is a pure function from application state to the displayed
//! tree. Rows are fully reconstructed on every refresh - there is no
//! incremental patching - so everything a later interaction needs
//! (table id, table URL, node path) is carried on the rows themselves.

use std::collections::HashMap;
use std::sync::Arc;

use dss_model::{IodEntry, IodKind, NodeId, NodeKind, SpecTree};
use dss_persistence::FavoritesStore;

/// Sortable columns of the top-level list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Sort by display name, case-insensitive.
    Name,
    /// Sort by kind, then name, both case-insensitive.
    Kind,
}

impl SortColumn {
    /// Map a clicked column index to a sort column.
    ///
    /// Only the Name (0) and Kind (1) columns support sorting.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Name),
            1 => Some(Self::Kind),
            _ => None,
        }
    }
}

/// Current sort state of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortSpec {
    /// Initial state: no ordering applied, insertion order preserved.
    #[default]
    Unsorted,
    /// Ordered by one column.
    By {
        /// Column the list is ordered by.
        column: SortColumn,
        /// Whether the order is reversed.
        descending: bool,
    },
}

impl SortSpec {
    /// Next sort state after a click on `column_index`.
    ///
    /// Same column toggles direction; a different sortable column resets to
    /// ascending; an unsupported column clears the sort entirely.
    #[must_use]
    pub fn cycled(self, column_index: usize) -> Self {
        match SortColumn::from_index(column_index) {
            None => Self::Unsorted,
            Some(clicked) => match self {
                Self::By { column, descending } if column == clicked => Self::By {
                    column,
                    descending: !descending,
                },
                _ => Self::By {
                    column: clicked,
                    descending: false,
                },
            },
        }
    }
}

/// Kind of a child row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A module of the IOD.
    Module,
    /// An attribute inside a module.
    Attribute,
    /// A node the builder could not classify.
    Unknown,
}

impl RowKind {
    /// Display label for the Kind column.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Module => "Module",
            Self::Attribute => "Attribute",
            Self::Unknown => "Unknown",
        }
    }
}

/// One module or attribute row beneath a top-level IOD row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRow {
    /// Display text (module name, or `"<tag> <name>"` for attributes).
    pub display: String,
    /// Row kind shown in the Kind column.
    pub kind: RowKind,
    /// Usage column content (usage code letter or attribute type code).
    pub usage: String,
    /// Slash-joined path from the tree root; the only handle that survives
    /// a rebuild.
    pub path: String,
    /// Nested child rows in tree order.
    pub children: Vec<NodeRow>,
}

/// One top-level row of the displayed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IodRow {
    /// Display name.
    pub name: String,
    /// IOD kind shown in the Kind column.
    pub kind: IodKind,
    /// Whether the entry is starred.
    pub favorite: bool,
    /// Back-reference resolving a click to domain data.
    pub table_id: String,
    /// Deep link into the source document.
    pub table_url: String,
    /// Reattached specification rows, empty until the tree is loaded.
    pub children: Vec<NodeRow>,
}

/// The fully built tree view model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeViewModel {
    /// Top-level rows after filtering and sorting.
    pub rows: Vec<IodRow>,
}

impl TreeViewModel {
    /// Number of top-level rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when no rows are visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the displayed tree from the current state.
///
/// Steps: case-sensitive substring filter on name or kind (after trimming
/// the search text), optional stable sort, row construction with favorite
/// flags, reattachment of loaded subtrees, and recovery of the selected
/// row's new index. A selected id filtered out by the search simply yields
/// `None` - selection lost, not a fault.
#[must_use]
pub fn build(
    entries: &[IodEntry],
    search_text: &str,
    sort: SortSpec,
    loaded_trees: &HashMap<String, Arc<SpecTree>>,
    favorites: &FavoritesStore,
    selected_id: Option<&str>,
) -> (TreeViewModel, Option<usize>) {
    let needle = search_text.trim();
    let mut filtered: Vec<&IodEntry> = entries
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.name.contains(needle)
                || entry.kind.label().contains(needle)
        })
        .collect();

    if let SortSpec::By { column, descending } = sort {
        filtered.sort_by(|a, b| {
            let ordering = match column {
                SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortColumn::Kind => (a.kind.label().to_lowercase(), a.name.to_lowercase())
                    .cmp(&(b.kind.label().to_lowercase(), b.name.to_lowercase())),
            };
            if descending { ordering.reverse() } else { ordering }
        });
    }

    let mut selected_row = None;
    let rows = filtered
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            if selected_id == Some(entry.table_id.as_str()) {
                selected_row = Some(index);
            }
            let children = loaded_trees
                .get(&entry.table_id)
                .map(|tree| subtree_rows(tree, tree.root()))
                .unwrap_or_default();
            IodRow {
                name: entry.name.clone(),
                kind: entry.kind,
                favorite: favorites.is_favorite(&entry.table_id),
                table_id: entry.table_id.clone(),
                table_url: entry.table_url.clone(),
                children,
            }
        })
        .collect();

    (TreeViewModel { rows }, selected_row)
}

/// Rows for the children of `parent`, in the tree's depth-first order.
fn subtree_rows(tree: &SpecTree, parent: NodeId) -> Vec<NodeRow> {
    tree.children(parent)
        .iter()
        .map(|&id| {
            let node = tree.node(id);
            let (display, kind, usage) = match &node.kind {
                NodeKind::Module { usage, .. } => (
                    node.name.clone(),
                    RowKind::Module,
                    usage.chars().next().map(String::from).unwrap_or_default(),
                ),
                NodeKind::Attribute { tag, attr_type, .. } => {
                    let display = if tag.is_empty() {
                        node.name.clone()
                    } else {
                        format!("{tag} {}", node.name)
                    };
                    (display, RowKind::Attribute, attr_type.clone())
                }
                NodeKind::Root => (node.name.clone(), RowKind::Unknown, String::new()),
            };
            NodeRow {
                display,
                kind,
                usage,
                path: tree.node_path(id),
                children: subtree_rows(tree, id),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entries() -> Vec<IodEntry> {
        vec![
            IodEntry::new("IOD-A", "table_A.1", "url-a"),
            IodEntry::new("IOD-B", "table_B.1", "url-b"),
            IodEntry::new("IOD-C", "table_A.2", "url-c"),
        ]
    }

    fn empty_favorites() -> FavoritesStore {
        // Backed by a throwaway path; nothing is ever saved in these tests.
        let dir = tempdir().unwrap();
        FavoritesStore::open(dir.path().join("favorites.json"))
    }

    fn names(model: &TreeViewModel) -> Vec<&str> {
        model.rows.iter().map(|row| row.name.as_str()).collect()
    }

    fn sample_tree() -> SpecTree {
        let mut tree = SpecTree::new("IOD-A");
        let patient = tree.add_child(
            tree.root(),
            "Patient",
            NodeKind::Module {
                reference: "C.7.1.1".to_string(),
                usage: "Mandatory".to_string(),
            },
        );
        tree.add_child(
            patient,
            "Patient's Name",
            NodeKind::Attribute {
                tag: "(0010,0010)".to_string(),
                attr_type: "2".to_string(),
                description: String::new(),
            },
        );
        tree.add_child(
            tree.root(),
            "General Study",
            NodeKind::Module {
                reference: "C.7.2.1".to_string(),
                usage: "U".to_string(),
            },
        );
        tree
    }

    #[test]
    fn test_empty_search_keeps_everything_in_order() {
        let favorites = empty_favorites();
        let (model, _) = build(&entries(), "", SortSpec::Unsorted, &HashMap::new(), &favorites, None);
        assert_eq!(names(&model), ["IOD-A", "IOD-B", "IOD-C"]);

        // Whitespace-only search behaves like no search.
        let (model, _) = build(&entries(), "   ", SortSpec::Unsorted, &HashMap::new(), &favorites, None);
        assert_eq!(names(&model), ["IOD-A", "IOD-B", "IOD-C"]);
    }

    #[test]
    fn test_filter_matches_name_or_kind_case_sensitively() {
        let favorites = empty_favorites();
        let (model, _) = build(
            &entries(),
            "Composite",
            SortSpec::Unsorted,
            &HashMap::new(),
            &favorites,
            None,
        );
        assert_eq!(names(&model), ["IOD-A", "IOD-C"]);

        // Lowercase does not match the "Composite" kind label.
        let (model, _) = build(
            &entries(),
            "composite",
            SortSpec::Unsorted,
            &HashMap::new(),
            &favorites,
            None,
        );
        assert!(model.is_empty());

        // Every surviving row contains the needle in name or kind.
        let (model, _) = build(&entries(), "B", SortSpec::Unsorted, &HashMap::new(), &favorites, None);
        assert!(
            model
                .rows
                .iter()
                .all(|row| row.name.contains('B') || row.kind.label().contains('B'))
        );
    }

    #[test]
    fn test_sort_by_name_is_idempotent() {
        let favorites = empty_favorites();
        let sort = SortSpec::By {
            column: SortColumn::Name,
            descending: false,
        };
        let (first, _) = build(&entries(), "", sort, &HashMap::new(), &favorites, None);
        let (second, _) = build(&entries(), "", sort, &HashMap::new(), &favorites, None);
        assert_eq!(first, second);
        assert_eq!(names(&first), ["IOD-A", "IOD-B", "IOD-C"]);
    }

    #[test]
    fn test_descending_reverses_ascending() {
        let favorites = empty_favorites();
        let (descending, _) = build(
            &entries(),
            "",
            SortSpec::By {
                column: SortColumn::Name,
                descending: true,
            },
            &HashMap::new(),
            &favorites,
            None,
        );
        assert_eq!(names(&descending), ["IOD-C", "IOD-B", "IOD-A"]);
    }

    #[test]
    fn test_sort_by_kind_then_name() {
        let favorites = empty_favorites();
        let (model, _) = build(
            &entries(),
            "",
            SortSpec::By {
                column: SortColumn::Kind,
                descending: false,
            },
            &HashMap::new(),
            &favorites,
            None,
        );
        // Composite (IOD-A, IOD-C) before Normalized (IOD-B).
        assert_eq!(names(&model), ["IOD-A", "IOD-C", "IOD-B"]);
    }

    #[test]
    fn test_sort_cycling_rules() {
        let sort = SortSpec::Unsorted;
        let sort = sort.cycled(0);
        assert_eq!(
            sort,
            SortSpec::By {
                column: SortColumn::Name,
                descending: false
            }
        );
        // Same column toggles direction; twice returns to the original.
        assert_eq!(
            sort.cycled(0),
            SortSpec::By {
                column: SortColumn::Name,
                descending: true
            }
        );
        assert_eq!(sort.cycled(0).cycled(0), sort);
        // A different column resets to ascending.
        assert_eq!(
            sort.cycled(0).cycled(1),
            SortSpec::By {
                column: SortColumn::Kind,
                descending: false
            }
        );
        // An unsupported column clears the sort.
        assert_eq!(sort.cycled(3), SortSpec::Unsorted);
    }

    #[test]
    fn test_build_is_deterministic() {
        let favorites = empty_favorites();
        let (first, sel_first) = build(&entries(), "", SortSpec::Unsorted, &HashMap::new(), &favorites, None);
        let (second, sel_second) = build(&entries(), "", SortSpec::Unsorted, &HashMap::new(), &favorites, None);
        assert_eq!(first, second);
        assert_eq!(sel_first, sel_second);
    }

    #[test]
    fn test_children_mirror_tree_depth_first_order() {
        let favorites = empty_favorites();
        let tree = Arc::new(sample_tree());
        let mut loaded = HashMap::new();
        loaded.insert("table_A.1".to_string(), Arc::clone(&tree));

        let (model, _) = build(&entries(), "", SortSpec::Unsorted, &loaded, &favorites, None);
        let row = &model.rows[0];

        fn flatten<'a>(rows: &'a [NodeRow], out: &mut Vec<&'a str>) {
            for row in rows {
                out.push(row.path.as_str());
                flatten(&row.children, out);
            }
        }
        let mut paths = Vec::new();
        flatten(&row.children, &mut paths);

        let expected: Vec<String> = tree.walk().map(|id| tree.node_path(id)).collect();
        assert_eq!(paths, expected.iter().map(String::as_str).collect::<Vec<_>>());

        // Rows of entries without a loaded tree stay childless.
        assert!(model.rows[1].children.is_empty());
    }

    #[test]
    fn test_child_row_display_and_usage() {
        let favorites = empty_favorites();
        let mut loaded = HashMap::new();
        loaded.insert("table_A.1".to_string(), Arc::new(sample_tree()));

        let (model, _) = build(&entries(), "", SortSpec::Unsorted, &loaded, &favorites, None);
        let modules = &model.rows[0].children;
        assert_eq!(modules[0].display, "Patient");
        assert_eq!(modules[0].kind, RowKind::Module);
        // Usage column shows the first letter of the usage code.
        assert_eq!(modules[0].usage, "M");

        let attribute = &modules[0].children[0];
        assert_eq!(attribute.display, "(0010,0010) Patient's Name");
        assert_eq!(attribute.kind, RowKind::Attribute);
        assert_eq!(attribute.usage, "2");
        assert_eq!(attribute.path, "IOD-A/Patient/Patient's Name");
    }

    #[test]
    fn test_selection_is_recovered_by_id() {
        let favorites = empty_favorites();
        let (_, selected) = build(
            &entries(),
            "",
            SortSpec::Unsorted,
            &HashMap::new(),
            &favorites,
            Some("table_A.2"),
        );
        assert_eq!(selected, Some(2));

        // Sorting moves the row; the reported index follows it.
        let (model, selected) = build(
            &entries(),
            "",
            SortSpec::By {
                column: SortColumn::Name,
                descending: true,
            },
            &HashMap::new(),
            &favorites,
            Some("table_A.2"),
        );
        assert_eq!(model.rows[selected.unwrap()].table_id, "table_A.2");
    }

    #[test]
    fn test_selection_filtered_out_is_lost_not_an_error() {
        let favorites = empty_favorites();
        let (_, selected) = build(
            &entries(),
            "Normalized",
            SortSpec::Unsorted,
            &HashMap::new(),
            &favorites,
            Some("table_A.2"),
        );
        assert_eq!(selected, None);
    }

    #[test]
    fn test_favorite_flags_come_from_the_store() {
        let dir = tempdir().unwrap();
        let mut favorites = FavoritesStore::open(dir.path().join("favorites.json"));
        favorites.add("table_B.1");

        let (model, _) = build(&entries(), "", SortSpec::Unsorted, &HashMap::new(), &favorites, None);
        let flags: Vec<bool> = model.rows.iter().map(|row| row.favorite).collect();
        assert_eq!(flags, [false, true, false]);
    }
}
