//! Error types for persistent user data.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing persisted files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    /// I/O failure with operation context.
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

    /// The file exists but does not parse as the expected JSON shape.
    #[error("failed to parse {path}: {source}")]
    MalformedJson {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: serde_json::Error,
    },

    /// The final atomic rename of a temp file onto its target failed.
    #[error("atomic replace of {target_path} from {temp_path} failed: {source}")]
    AtomicWriteFailed {
        /// Temp file that held the new contents.
        temp_path: PathBuf,
        /// File that should have been replaced.
        target_path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
