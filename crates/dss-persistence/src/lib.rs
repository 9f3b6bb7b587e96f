//! Persistent user data for DICOM Spec Studio.
//!
//! Currently this is the favorites store: a small JSON file of starred
//! IOD table ids, written atomically (temp file + fsync + rename) so a
//! crash mid-save can never corrupt it. Favorites are a convenience
//! feature; every failure here is logged and absorbed rather than raised
//! into the UI interaction that triggered it.

mod error;
mod favorites;

pub use error::{PersistenceError, Result};
pub use favorites::{FAVORITES_FILE_NAME, FavoritesStore};
