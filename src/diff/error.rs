//! Diff error types.

use std::path::PathBuf;

use crate::snapshot::SnapshotError;

/// Errors that can occur while comparing revisions.
#[derive(thiserror::Error, Debug)]
pub enum DiffError {
    /// Fewer than two revisions exist for the file.
    #[error("Revisions not available for comparison: {0}")]
    RevisionsUnavailable(PathBuf),

    /// A captured revision could not be read back.
    #[error("Cannot read revision {location}: {source}")]
    ReadRevision {
        location: PathBuf,
        source: std::io::Error,
    },

    /// The revision store failed.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}
