//! Application controller.
//!
//! Routes UI events into state changes and background task launches, and
//! drains task events back onto the UI thread. The widget shell drives it
//! with [`Controller::handle`] for input and a [`POLL_INTERVAL`] timer
//! calling [`Controller::tick`]; that poll is the only place background
//! results touch UI-owned state, which keeps all view mutation effectively
//! single-threaded.

use std::sync::Arc;
use std::time::Duration;

use dss_loader::{ListLoadOutcome, SpecGateway, SpecSource};
use dss_model::SpecTree;
use dss_persistence::FavoritesStore;

use crate::message::UiEvent;
use crate::state::{AppState, Settings};
use crate::surface::{NodeDetails, UiSurface};
use crate::task::{Task, TaskEvent, TaskKind};
use crate::view_model;

/// How often the shell should call [`Controller::tick`].
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a finished tree load.
#[derive(Debug)]
struct TreeLoadOutcome {
    table_id: String,
    tree: Arc<SpecTree>,
}

/// Mediates between the domain model, background tasks and the UI surface.
pub struct Controller<S: SpecSource + 'static, U: UiSurface> {
    state: AppState,
    settings: Settings,
    gateway: Arc<SpecGateway<S>>,
    favorites: FavoritesStore,
    surface: U,
    // At most one task of each kind is tracked. Replacing a handle resets
    // its event channel, so a superseded worker's late events are dropped
    // instead of corrupting newer state.
    list_task: Option<Task<ListLoadOutcome>>,
    tree_task: Option<Task<TreeLoadOutcome>>,
}

impl<S: SpecSource + 'static, U: UiSurface> Controller<S, U> {
    /// Create a controller; call [`start`](Self::start) to begin loading.
    pub fn new(
        settings: Settings,
        gateway: SpecGateway<S>,
        favorites: FavoritesStore,
        surface: U,
    ) -> Self {
        Self {
            state: AppState::new(),
            settings,
            gateway: Arc::new(gateway),
            favorites,
            surface,
            list_task: None,
            tree_task: None,
        }
    }

    /// Apply startup settings and launch the initial list load.
    pub fn start(&mut self) {
        self.state.favorites_only = self.settings.show_favorites_on_start;
        self.start_list_load(false);
    }

    /// Current application state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The UI surface, for shells that need it back.
    #[must_use]
    pub fn surface(&self) -> &U {
        &self.surface
    }

    /// The favorites store.
    #[must_use]
    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// Whether a list or tree load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.list_task.is_some() || self.tree_task.is_some()
    }

    /// Handle one input event from the shell.
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::SearchChanged(text) => {
                self.state.search_text = text;
                self.refresh_view();
            }
            UiEvent::HeaderClicked(column) => {
                self.state.sort = self.state.sort.cycled(column);
                self.refresh_view();
            }
            UiEvent::RowClicked { table_id, path } => {
                self.state.selected = Some(table_id.clone());
                match path {
                    Some(path) => self.show_details(&table_id, &path),
                    None => {
                        // Lazy load on first activation of an IOD row.
                        if !self.state.loaded_trees.contains_key(&table_id) {
                            self.start_tree_load(&table_id);
                        }
                    }
                }
            }
            UiEvent::RowRightClicked { table_id } => {
                if self.favorites.is_favorite(&table_id) {
                    self.favorites.remove(&table_id);
                } else {
                    self.favorites.add(table_id);
                }
                self.refresh_view();
            }
            UiEvent::ToggleFavoritesView => {
                self.state.favorites_only = !self.state.favorites_only;
                self.refresh_view();
                if self.state.favorites_only {
                    self.surface.set_status(&format!(
                        "Showing {} favorite IOD modules.",
                        self.favorites.len()
                    ));
                } else {
                    self.surface.set_status("Showing all IOD modules.");
                }
            }
            UiEvent::ReloadRequested => self.start_list_load(true),
        }
    }

    /// Drain background task events. Must run on the UI thread.
    pub fn tick(&mut self) {
        let list_events = self.list_task.as_ref().map(Task::drain).unwrap_or_default();
        for event in list_events {
            self.on_list_event(event);
        }
        let tree_events = self.tree_task.as_ref().map(Task::drain).unwrap_or_default();
        for event in tree_events {
            self.on_tree_event(event);
        }
    }

    fn start_list_load(&mut self, force_download: bool) {
        self.surface.set_tree_enabled(false);
        self.surface.set_status("Loading IOD modules...");
        let gateway = Arc::clone(&self.gateway);
        self.list_task = Some(Task::spawn(TaskKind::ListLoad, move |progress| {
            gateway.load_entry_list(force_download, progress)
        }));
    }

    fn start_tree_load(&mut self, table_id: &str) {
        self.surface.set_tree_enabled(false);
        self.surface.set_status("Loading IOD definition...");
        let gateway = Arc::clone(&self.gateway);
        let table_id = table_id.to_string();
        self.tree_task = Some(Task::spawn(TaskKind::TreeLoad, move |progress| {
            gateway
                .load_spec_tree(&table_id, progress)
                .map(|tree| TreeLoadOutcome { table_id, tree })
        }));
    }

    fn on_list_event(&mut self, event: TaskEvent<ListLoadOutcome>) {
        match event {
            TaskEvent::Progress(progress) => {
                self.surface.show_progress(progress);
                if progress.is_unknown() {
                    self.surface
                        .set_status("Loading IOD modules... (unknown progress)");
                } else if progress.percent % 10 == 0 || progress.percent == 100 {
                    self.surface
                        .set_status(&format!("Loading IOD modules... {}%", progress.percent));
                }
            }
            TaskEvent::Completed(outcome) => {
                self.list_task = None;
                if outcome.version_changed {
                    tracing::info!(
                        version = %outcome.version,
                        "standard version changed, discarding all loaded trees"
                    );
                }
                self.state.standard_version = Some(outcome.version);
                let count = outcome.entries.len();
                // Wholesale rebuild; also clears every loaded tree.
                self.state.replace_entries(outcome.entries);
                self.surface.clear_progress();
                self.surface.set_tree_enabled(true);
                self.refresh_view();
                self.surface
                    .set_status(&format!("Loaded {count} IOD modules."));
            }
            TaskEvent::Failed(message) => {
                self.list_task = None;
                self.surface.clear_progress();
                self.surface.set_tree_enabled(true);
                self.surface.show_error(&message);
                self.surface.set_status("Error loading IOD modules.");
            }
        }
    }

    fn on_tree_event(&mut self, event: TaskEvent<TreeLoadOutcome>) {
        match event {
            TaskEvent::Progress(progress) => self.surface.show_progress(progress),
            TaskEvent::Completed(outcome) => {
                self.tree_task = None;
                let name = self
                    .state
                    .entry(&outcome.table_id)
                    .map_or_else(|| outcome.table_id.clone(), |entry| entry.name.clone());
                self.state.attach_tree(outcome.table_id, outcome.tree);
                self.surface.clear_progress();
                self.surface.set_tree_enabled(true);
                self.refresh_view();
                self.surface.set_status(&format!("Loaded {name}."));
            }
            TaskEvent::Failed(message) => {
                self.tree_task = None;
                self.surface.clear_progress();
                self.surface.set_tree_enabled(true);
                self.surface.show_error(&message);
                self.surface.set_status("Error loading IOD definition.");
            }
        }
    }

    fn show_details(&mut self, table_id: &str, path: &str) {
        let details = self
            .state
            .loaded_trees
            .get(table_id)
            .and_then(|tree| NodeDetails::resolve(tree, path));
        match details {
            Some(details) => self.surface.show_node_details(&details),
            None => tracing::warn!(%table_id, %path, "could not resolve node path"),
        }
    }

    /// Rebuild and render the tree view model from current state.
    fn refresh_view(&mut self) {
        let visible = if self.state.favorites_only {
            self.favorites.filter_entries(&self.state.entries)
        } else {
            self.state.entries.clone()
        };
        let (model, selected_row) = view_model::build(
            &visible,
            &self.state.search_text,
            self.state.sort,
            &self.state.loaded_trees,
            &self.favorites,
            self.state.selected.as_deref(),
        );
        self.surface.render_tree(&model, selected_row);
    }
}
