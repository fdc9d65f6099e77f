//! Watch sessions.
//!
//! A session owns the monitored set, the scratch directory and the event
//! source. It ends when the shutdown token is cancelled or when the
//! configuration file changes; in the latter case a fresh session is built
//! from re-read configuration.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::{ConfigLoader, MonitorConfig};

use super::error::MonitorError;
use super::events::{FsEvent, FsEventSource};
use super::file::{watch_dirs, MonitoredFile};
use super::notifier::ChangeNotifier;
use super::owner::{OwnerResolver, SystemOwnerResolver};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Shutdown was requested.
    Stopped,
    /// The configuration changed; a new session should be started.
    Restart,
}

/// One run of the monitor over a fixed configuration.
#[derive(Debug)]
pub struct WatchSession {
    files: Vec<MonitoredFile>,
    notifier: Arc<ChangeNotifier>,
}

impl WatchSession {
    /// Build a session resolving owners from the system user database.
    #[must_use]
    pub fn new(config_path: &Path, config: &MonitorConfig) -> Self {
        Self::with_resolver(config_path, config, Arc::new(SystemOwnerResolver))
    }

    /// Build a session with a custom owner resolver.
    ///
    /// Configured paths that do not exist are dropped with a warning.
    #[must_use]
    pub fn with_resolver(
        config_path: &Path,
        config: &MonitorConfig,
        resolver: Arc<dyn OwnerResolver>,
    ) -> Self {
        let config_path =
            std::fs::canonicalize(config_path).unwrap_or_else(|_| config_path.to_path_buf());
        let files = MonitoredFile::from_paths(&config.files);
        let notifier = Arc::new(ChangeNotifier::new(
            &files,
            config_path,
            &config.snapshots,
            resolver,
        ));
        Self { files, notifier }
    }

    #[must_use]
    pub fn files(&self) -> &[MonitoredFile] {
        &self.files
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    /// Directories to watch: the parents of every monitored file and of the
    /// configuration file.
    #[must_use]
    pub fn watch_dirs(&self) -> BTreeSet<PathBuf> {
        let mut dirs = watch_dirs(&self.files);
        if let Some(parent) = self.notifier.config_path().parent() {
            dirs.insert(parent.to_path_buf());
        }
        dirs
    }

    /// Watch until `shutdown` is cancelled or the configuration changes.
    ///
    /// Reactions run on blocking worker threads. On shutdown in-flight
    /// reactions are awaited; on restart they are left to finish on their
    /// own.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be watched or the event
    /// source stops unexpectedly.
    pub async fn run(self, shutdown: CancellationToken) -> Result<SessionOutcome, MonitorError> {
        let dirs = self.watch_dirs();
        let (source, mut events) = FsEventSource::new(&dirs)?;
        let restart = self.notifier.restart_token();
        let mut reactions = JoinSet::new();

        if self.files.is_empty() {
            tracing::warn!("No monitored files, waiting for configuration changes");
        }
        tracing::info!(
            files = self.files.len(),
            dirs = dirs.len(),
            "Monitoring started"
        );

        let outcome = loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => break Ok(SessionOutcome::Stopped),
                () = restart.cancelled() => break Ok(SessionOutcome::Restart),
                event = events.recv() => match event {
                    Some(FsEvent::Modified(path)) => {
                        let notifier = Arc::clone(&self.notifier);
                        reactions.spawn_blocking(move || {
                            notifier.on_modified(&path);
                        });
                    }
                    Some(FsEvent::Error(e)) => {
                        tracing::warn!(error = %e, "File watcher error");
                    }
                    None => break Err(MonitorError::ChannelClosed),
                },
                Some(result) = reactions.join_next(), if !reactions.is_empty() => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Reaction task failed");
                    }
                }
            }
        };

        drop(source);
        if matches!(outcome, Ok(SessionOutcome::Stopped)) {
            while reactions.join_next().await.is_some() {}
        } else {
            reactions.detach_all();
        }

        tracing::info!(outcome = ?outcome.as_ref().ok(), "Monitoring stopped");
        outcome
    }
}

/// Run sessions until shutdown, rebuilding the session whenever the
/// configuration file changes.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or a session
/// fails.
pub async fn supervise(
    loader: &ConfigLoader,
    shutdown: CancellationToken,
) -> Result<(), MonitorError> {
    loop {
        let (config_path, config) = loader.load_or_create()?;
        tracing::debug!(config = %config_path.display(), "Starting watch session");

        let session = WatchSession::new(&config_path, &config);
        match session.run(shutdown.clone()).await? {
            SessionOutcome::Stopped => return Ok(()),
            SessionOutcome::Restart => {}
        }
    }
}
