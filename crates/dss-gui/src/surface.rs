//! Seam between the application core and the widget toolkit.

use dss_loader::Progress;
use dss_model::{NodeKind, SpecTree};

use crate::view_model::TreeViewModel;

/// Detail view content for one resolved specification node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetails {
    /// Node display name.
    pub name: String,
    /// Path the node was resolved from.
    pub path: String,
    /// Typed payload carrying the module or attribute fields.
    pub kind: NodeKind,
}

impl NodeDetails {
    /// Resolve a node path against a loaded tree.
    #[must_use]
    pub fn resolve(tree: &SpecTree, path: &str) -> Option<Self> {
        let id = tree.node_by_path(path)?;
        let node = tree.node(id);
        Some(Self {
            name: node.name.clone(),
            path: path.to_string(),
            kind: node.kind.clone(),
        })
    }
}

/// Everything the core asks the toolkit to do.
///
/// Implementations live in the widget shell; the core only ever calls
/// these methods from the UI thread.
pub trait UiSurface {
    /// Replace the displayed tree and restore the selected row, if any.
    fn render_tree(&mut self, model: &TreeViewModel, selected_row: Option<usize>);

    /// Show the detail panel for a resolved node.
    fn show_node_details(&mut self, details: &NodeDetails);

    /// Update the status line.
    fn set_status(&mut self, message: &str);

    /// Update one stage of the progress dialog.
    fn show_progress(&mut self, progress: Progress);

    /// Dismiss the progress dialog.
    fn clear_progress(&mut self);

    /// Enable or disable interaction with the tree while a load runs.
    fn set_tree_enabled(&mut self, enabled: bool);

    /// Show a modal error notice.
    fn show_error(&mut self, message: &str);
}
