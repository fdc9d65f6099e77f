//! Reaction to modification notifications.
//!
//! Each notification for a monitored file captures a revision, compares it
//! with the one before, and logs an attribution line followed by one line
//! per change. A notification for the configuration file requests a restart
//! instead.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::config::SnapshotConfig;
use crate::diff::{ChangeRecord, DiffEngine};
use crate::snapshot::SnapshotStore;

use super::file::MonitoredFile;
use super::owner::{Attribution, OwnerResolver};

/// Revisions kept per file after a comparison. Only the latest is needed to
/// compare against the next capture.
const RETAINED_REVISIONS: usize = 1;

/// State of the notifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotifierState {
    /// Waiting for notifications.
    #[default]
    Idle,
    /// A restart was requested; further notifications are ignored.
    Restarting,
}

/// Outcome of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// The path is neither monitored nor the configuration file.
    Ignored,
    /// A monitored file was reported.
    Reported(Report),
    /// The configuration changed and the session must be rebuilt.
    Restart,
}

/// What was logged for a modified file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub path: PathBuf,
    pub attribution: Attribution,
    /// Whether a new revision was captured.
    pub captured: bool,
    pub changes: Vec<ChangeRecord>,
}

/// Per-file state. The mutex around it serializes reactions for one path.
#[derive(Debug, Default)]
struct FileSlot {
    last_attribution: Option<Attribution>,
}

/// Reacts to "path modified" notifications.
pub struct ChangeNotifier {
    config_path: PathBuf,
    files: HashMap<PathBuf, Mutex<FileSlot>>,
    store: Option<SnapshotStore>,
    engine: DiffEngine,
    snapshots_active: AtomicBool,
    resolver: Arc<dyn OwnerResolver>,
    restart: CancellationToken,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("config_path", &self.config_path)
            .field("files", &self.files.len())
            .field("store", &self.store)
            .field("engine", &self.engine)
            .field("snapshots_active", &self.snapshots_active)
            .field("restart", &self.restart.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl ChangeNotifier {
    /// Create a notifier for `files`.
    ///
    /// When snapshots are enabled a scratch directory is created; if that
    /// fails the notifier logs the error and reports attribution only.
    pub fn new(
        files: &[MonitoredFile],
        config_path: PathBuf,
        snapshots: &SnapshotConfig,
        resolver: Arc<dyn OwnerResolver>,
    ) -> Self {
        let store = if snapshots.enabled {
            match SnapshotStore::new(snapshots.scratch_root.as_deref()) {
                Ok(store) => Some(store),
                Err(e) => {
                    tracing::error!(error = %e, "Snapshots disabled for this session");
                    None
                }
            }
        } else {
            None
        };

        Self {
            config_path,
            files: files
                .iter()
                .map(|f| (f.path().to_path_buf(), Mutex::new(FileSlot::default())))
                .collect(),
            snapshots_active: AtomicBool::new(store.is_some()),
            store,
            engine: DiffEngine::new(snapshots.strategy),
            resolver,
            restart: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Whether `path` is a monitored file.
    #[must_use]
    pub fn is_monitored(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    #[must_use]
    pub fn state(&self) -> NotifierState {
        if self.restart.is_cancelled() {
            NotifierState::Restarting
        } else {
            NotifierState::Idle
        }
    }

    /// Token cancelled when a restart is requested.
    #[must_use]
    pub fn restart_token(&self) -> CancellationToken {
        self.restart.clone()
    }

    /// Whether revisions are still being captured.
    #[must_use]
    pub fn snapshots_active(&self) -> bool {
        self.snapshots_active.load(Ordering::Acquire)
    }

    /// The revision store, while snapshots are active.
    #[must_use]
    pub fn store(&self) -> Option<&SnapshotStore> {
        self.store.as_ref().filter(|_| self.snapshots_active())
    }

    /// React to a modification of `path`.
    ///
    /// Reactions for the same path never interleave; different paths may be
    /// handled concurrently.
    ///
    /// # Panics
    ///
    /// Panics if a previous reaction for the same path panicked.
    pub fn on_modified(&self, path: &Path) -> Reaction {
        if self.state() == NotifierState::Restarting {
            return Reaction::Ignored;
        }

        if path == self.config_path {
            tracing::info!(path = %path.display(), "Configuration file changed, restarting");
            self.restart.cancel();
            return Reaction::Restart;
        }

        let Some(slot) = self.files.get(path) else {
            tracing::trace!(path = %path.display(), "Ignoring untracked path");
            return Reaction::Ignored;
        };
        let mut slot = slot.lock().expect("File slot poisoned");

        let (captured, changes) = self.capture_and_compare(path);

        let attribution = self.resolver.resolve_owner(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Cannot resolve file owner");
            Attribution::unknown()
        });
        if let Some(previous) = slot
            .last_attribution
            .as_ref()
            .filter(|previous| **previous != attribution)
        {
            tracing::info!(
                path = %path.display(),
                from = %previous,
                to = %attribution,
                "File ownership changed"
            );
        }
        slot.last_attribution = Some(attribution.clone());

        tracing::info!(
            path = %path.display(),
            owner = %attribution.owner,
            group = %attribution.group,
            "File modified"
        );
        for (hunk, change) in changes.iter().enumerate() {
            tracing::info!(
                path = %path.display(),
                hunk,
                removed = ?change.removed,
                added = ?change.added,
                "Change detected"
            );
        }

        Reaction::Reported(Report {
            path: path.to_path_buf(),
            attribution,
            captured,
            changes,
        })
    }

    fn capture_and_compare(&self, path: &Path) -> (bool, Vec<ChangeRecord>) {
        let Some(store) = self.store() else {
            return (false, Vec::new());
        };

        match store.capture(path) {
            Ok(_) => {
                let changes = self.engine.compare(store, path);
                if let Err(e) = store.prune(path, RETAINED_REVISIONS) {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot prune revisions");
                }
                (true, changes)
            }
            Err(e) if e.is_scratch_failure() => {
                self.snapshots_active.store(false, Ordering::Release);
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Snapshot storage failed, reporting attribution only"
                );
                (false, Vec::new())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping capture");
                (false, Vec::new())
            }
        }
    }
}
