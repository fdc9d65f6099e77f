//! Session-scoped revision store.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use tempfile::TempDir;

use super::error::SnapshotError;
use super::naming::{encode_path, parse_storage_name, storage_name};

/// Prefix of scratch directories created by [`SnapshotStore::new`].
const SCRATCH_PREFIX: &str = "filemon-";

/// Upper bound on name collisions tolerated by a single capture.
const MAX_NAME_ATTEMPTS: u32 = 16;

/// An immutable copy of a monitored file's content at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    /// Logical file this revision belongs to.
    path: PathBuf,
    /// Capture time, second resolution. Advanced past earlier revisions of
    /// the same file when captures share a second.
    timestamp: NaiveDateTime,
    /// Location of the copy inside the scratch directory.
    location: PathBuf,
}

impl Revision {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ordering key of the revision, normally the local time of capture.
    ///
    /// Captures of one file that land in the same second are pushed one
    /// second past the latest existing revision, so under rapid writes this
    /// can run ahead of the wall clock. It orders revisions; it is not an
    /// exact capture time.
    #[must_use]
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// File name of the copy in the scratch directory.
    #[must_use]
    pub fn storage_name(&self) -> String {
        self.location
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Read the captured content as text.
    ///
    /// Non-UTF-8 bytes are replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy cannot be read.
    pub fn read_text(&self) -> std::io::Result<String> {
        let bytes = fs::read(&self.location)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Copy the current bytes of `path` into `dir` as a new revision.
///
/// The entry is named after the current local time. When a revision of the
/// same file already holds that second (or a later one), the timestamp is
/// advanced past it so names never collide and stay chronologically ordered.
///
/// # Errors
///
/// Returns `SnapshotError::SourceUnreadable` if `path` cannot be read, and a
/// scratch error if `dir` cannot be listed or written.
pub fn capture_into(path: &Path, dir: &Path) -> Result<Revision, SnapshotError> {
    let bytes = fs::read(path).map_err(|source| SnapshotError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let now = Local::now().naive_local();
    let mut timestamp = now.with_nanosecond(0).unwrap_or(now);
    if let Some(latest) = list_revisions_in(dir, path)?.pop() {
        if latest.timestamp >= timestamp {
            timestamp = latest.timestamp + Duration::seconds(1);
        }
    }

    for _ in 0..MAX_NAME_ATTEMPTS {
        let location = dir.join(storage_name(&timestamp, path));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&location);

        let mut file = match file {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                timestamp += Duration::seconds(1);
                continue;
            }
            Err(source) => {
                return Err(SnapshotError::ScratchUnwritable {
                    dir: dir.to_path_buf(),
                    source,
                })
            }
        };

        file.write_all(&bytes)
            .and_then(|()| file.flush())
            .map_err(|source| SnapshotError::ScratchUnwritable {
                dir: dir.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            path = %path.display(),
            revision = %location.display(),
            bytes = bytes.len(),
            "Captured revision"
        );

        return Ok(Revision {
            path: path.to_path_buf(),
            timestamp,
            location,
        });
    }

    Err(SnapshotError::ScratchUnwritable {
        dir: dir.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "no free revision name",
        ),
    })
}

/// List the revisions of `path` stored in `dir`, oldest first.
///
/// Ordering is by timestamp, then by entry name. Entries belonging to other
/// files or not produced by this store are skipped.
///
/// # Errors
///
/// Returns `SnapshotError::ScratchUnavailable` if `dir` cannot be read.
pub fn list_revisions_in(dir: &Path, path: &Path) -> Result<Vec<Revision>, SnapshotError> {
    let unavailable = |source| SnapshotError::ScratchUnavailable {
        dir: dir.to_path_buf(),
        source,
    };

    let token = encode_path(path);
    let mut revisions = Vec::new();

    for entry in fs::read_dir(dir).map_err(unavailable)? {
        let entry = entry.map_err(unavailable)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some((timestamp, entry_token)) = parse_storage_name(name) else {
            continue;
        };
        if entry_token != token {
            continue;
        }
        revisions.push(Revision {
            path: path.to_path_buf(),
            timestamp,
            location: entry.path(),
        });
    }

    revisions.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.location.cmp(&b.location))
    });
    Ok(revisions)
}

/// Owns the scratch directory of one watch session.
///
/// The directory and every revision in it are deleted when the store is
/// dropped.
#[derive(Debug)]
pub struct SnapshotStore {
    scratch: TempDir,
}

impl SnapshotStore {
    /// Create a store backed by a fresh scratch directory.
    ///
    /// The directory is created under `root`, or under the OS temp directory
    /// when `root` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::ScratchUnavailable` if the directory cannot be
    /// created.
    pub fn new(root: Option<&Path>) -> Result<Self, SnapshotError> {
        let root = root.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&root)
            .map_err(|source| SnapshotError::ScratchUnavailable { dir: root, source })?;

        tracing::debug!(dir = %scratch.path().display(), "Created scratch directory");
        Ok(Self { scratch })
    }

    /// Path of the scratch directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Capture the current content of `path` as a new revision.
    ///
    /// # Errors
    ///
    /// See [`capture_into`].
    pub fn capture(&self, path: &Path) -> Result<Revision, SnapshotError> {
        capture_into(path, self.dir())
    }

    /// All revisions of `path`, oldest first.
    ///
    /// # Errors
    ///
    /// See [`list_revisions_in`].
    pub fn list_revisions(&self, path: &Path) -> Result<Vec<Revision>, SnapshotError> {
        list_revisions_in(self.dir(), path)
    }

    /// Most recent revision of `path`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory cannot be listed.
    pub fn latest(&self, path: &Path) -> Result<Option<Revision>, SnapshotError> {
        Ok(self.list_revisions(path)?.pop())
    }

    /// Revision captured just before the latest one, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory cannot be listed.
    pub fn previous(&self, path: &Path) -> Result<Option<Revision>, SnapshotError> {
        let mut revisions = self.list_revisions(path)?;
        revisions.pop();
        Ok(revisions.pop())
    }

    /// The previous and latest revisions of `path`, when both exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory cannot be listed.
    pub fn last_pair(&self, path: &Path) -> Result<Option<(Revision, Revision)>, SnapshotError> {
        let mut revisions = self.list_revisions(path)?;
        let latest = revisions.pop();
        let previous = revisions.pop();
        Ok(previous.zip(latest))
    }

    /// Delete all but the newest `keep` revisions of `path`.
    ///
    /// Returns the number of revisions removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the scratch directory cannot be listed or a
    /// revision cannot be deleted.
    pub fn prune(&self, path: &Path, keep: usize) -> Result<usize, SnapshotError> {
        let revisions = self.list_revisions(path)?;
        let excess = revisions.len().saturating_sub(keep);

        for revision in &revisions[..excess] {
            fs::remove_file(revision.location()).map_err(|source| {
                SnapshotError::ScratchUnwritable {
                    dir: self.dir().to_path_buf(),
                    source,
                }
            })?;
        }

        if excess > 0 {
            tracing::trace!(path = %path.display(), removed = excess, "Pruned revisions");
        }
        Ok(excess)
    }
}
