//! Input events received from the widget toolkit.

/// One user interaction reported by the shell.
///
/// Row events carry the opaque back-references stored on the rows when the
/// view model was built, never row indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The search field content changed.
    SearchChanged(String),

    /// A column header was clicked.
    HeaderClicked(usize),

    /// A row was clicked. `path` is `None` for top-level IOD rows and the
    /// node path for module/attribute rows.
    RowClicked {
        /// Table id of the owning IOD.
        table_id: String,
        /// Node path for child rows.
        path: Option<String>,
    },

    /// A row was right-clicked (context action: toggle favorite).
    RowRightClicked {
        /// Table id of the clicked IOD row.
        table_id: String,
    },

    /// The favorites-only view was toggled.
    ToggleFavoritesView,

    /// A forced reload was requested.
    ReloadRequested,
}
