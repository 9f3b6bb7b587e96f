//! Specification loading for DICOM Spec Studio.
//!
//! This crate sits between the application core and the external DICOM
//! specification parsing library. It owns:
//!
//! - the [`SpecSource`] collaborator trait through which documents are
//!   fetched/parsed (the HTML machinery itself is not part of this crate),
//! - extraction of the IOD entry list from the table-of-contents document,
//! - the on-disk cache layout, version-change detection, and best-effort
//!   archiving of stale cache generations,
//! - the [`SpecGateway`] facade combining all of the above, with a
//!   per-session memo of loaded specification trees.
//!
//! All long-running work here is expected to run on a background thread;
//! progress crosses back to the caller through [`ProgressSink`].

mod cache;
mod error;
mod gateway;
mod progress;
mod source;
mod toc;
mod version;

pub use cache::{CacheLayout, PART3_CACHE_FILE_NAME, TOC_CACHE_FILE_NAME};
pub use error::{LoadError, Result};
pub use gateway::{ListLoadOutcome, PART3_HTML_URL, PART3_TOC_URL, SpecGateway};
pub use progress::{Progress, ProgressSink, ProgressStage};
pub use source::{
    ColumnMapping, SpecSource, SpecTreeRequest, TocAnchor, TocDocument, iod_column_mapping,
    module_column_mapping,
};
pub use toc::extract_iod_entries;
pub use version::VersionTracker;
