//! Monitored files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A file named by the configuration that existed at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredFile {
    path: PathBuf,
    watch_dir: PathBuf,
}

impl MonitoredFile {
    /// Track `path`, watching its parent directory.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let watch_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
        Self { path, watch_dir }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that must be watched to see modifications of this file.
    #[must_use]
    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }

    /// Build the active set from configured paths.
    ///
    /// Paths that do not exist are dropped with a warning. Existing paths are
    /// canonicalized so they compare equal to paths reported by the
    /// filesystem watcher; duplicates are removed, first occurrence wins.
    #[must_use]
    pub fn from_paths(paths: &[PathBuf]) -> Vec<Self> {
        let mut files: Vec<Self> = Vec::with_capacity(paths.len());
        for path in paths {
            let Ok(resolved) = std::fs::canonicalize(path) else {
                tracing::warn!(path = %path.display(), "File was not found");
                continue;
            };
            if resolved.is_dir() {
                tracing::warn!(path = %path.display(), "Path is a directory, not monitoring");
                continue;
            }
            if files.iter().any(|f| f.path == resolved) {
                continue;
            }
            files.push(Self::new(resolved));
        }
        files
    }
}

/// Distinct directories to watch for a set of files.
#[must_use]
pub fn watch_dirs(files: &[MonitoredFile]) -> BTreeSet<PathBuf> {
    files.iter().map(|f| f.watch_dir.clone()).collect()
}
