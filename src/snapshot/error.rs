//! Snapshot error types.

use std::path::PathBuf;

/// Errors that can occur while capturing or listing revisions.
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    /// The monitored file could not be read.
    #[error("Cannot read source file {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A revision could not be written into the scratch directory.
    #[error("Scratch directory {dir} is not writable: {source}")]
    ScratchUnwritable {
        dir: PathBuf,
        source: std::io::Error,
    },

    /// The scratch directory could not be created or listed.
    #[error("Scratch directory {dir} is unavailable: {source}")]
    ScratchUnavailable {
        dir: PathBuf,
        source: std::io::Error,
    },
}

impl SnapshotError {
    /// Whether the error affects the scratch directory itself rather than a
    /// single source file.
    ///
    /// Scratch failures disable snapshotting for the rest of the session;
    /// source failures only skip one capture.
    #[must_use]
    pub fn is_scratch_failure(&self) -> bool {
        matches!(
            self,
            Self::ScratchUnwritable { .. } | Self::ScratchUnavailable { .. }
        )
    }
}
