//! DICOM Spec Studio - application core.
//!
//! This crate is the toolkit-independent heart of the application: it owns
//! the entry store and loaded trees, launches list and tree loads on
//! background threads, drains their events back onto the UI thread, and
//! rebuilds the displayed tree view model on every filter/sort/completion.
//!
//! The widget shell plugs in through two seams:
//!
//! - [`surface::UiSurface`] - everything the core tells the toolkit to do
//!   (render the tree, progress dialog, status line, error notices),
//! - [`message::UiEvent`] - everything the toolkit reports back (search
//!   edits, header and row clicks, reloads).
//!
//! The shell is expected to call [`controller::Controller::tick`] on a
//! short timer ([`controller::POLL_INTERVAL`]); that poll is the single
//! point where background results cross into UI-owned state.

pub mod controller;
pub mod message;
pub mod state;
pub mod surface;
pub mod task;
pub mod view_model;

pub use controller::{Controller, POLL_INTERVAL};
pub use message::UiEvent;
pub use state::{AppState, Settings};
pub use surface::{NodeDetails, UiSurface};
pub use task::{Task, TaskEvent, TaskKind};
pub use view_model::{IodRow, NodeRow, RowKind, SortColumn, SortSpec, TreeViewModel};
