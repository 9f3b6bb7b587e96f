//! Error types for specification loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading the IOD list or a specification tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The table-of-contents or specification document could not be retrieved.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// An expected structural section of the document is absent.
    #[error("parse failed: {0}")]
    Parse(String),

    /// The external builder returned a structurally invalid artifact.
    #[error("invalid specification model for {table_id}: {detail}")]
    ModelIntegrity {
        /// Table identifier of the IOD being built.
        table_id: String,
        /// Precise structural defect, for the log.
        detail: String,
    },

    /// I/O failure inside the cache area.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        /// Short verb phrase describing the attempted operation.
        operation: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// User-facing message suitable for a modal notice.
    ///
    /// Deliberately generic for integrity failures; the precise cause is
    /// logged where the error is raised.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Fetch(_) => {
                "Could not retrieve the DICOM standard document. Please check your connection and try again."
            }
            Self::Parse(_) => {
                "The DICOM standard document does not have the expected structure. Try a forced reload."
            }
            Self::ModelIntegrity { .. } => {
                "The IOD specification could not be built. See the log for details."
            }
            Self::Io { .. } => "A cache file operation failed. See the log for details.",
        }
    }
}

/// Result type alias for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;
