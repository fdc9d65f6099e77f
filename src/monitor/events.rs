//! Filesystem event source backed by notify.
//!
//! Watches directories non-recursively and forwards "path modified"
//! notifications for regular files to a tokio channel.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;

use notify_debouncer_full::{
    new_debouncer,
    notify::{
        self,
        event::{EventKind, ModifyKind},
        RecursiveMode,
    },
    DebounceEventResult,
};
use tokio::sync::mpsc;

use super::error::MonitorError;

/// Time writes are coalesced before a notification is emitted.
const DEBOUNCE_TIMEOUT: Duration = Duration::from_millis(100);

/// Events emitted by the filesystem event source.
#[derive(Debug)]
pub enum FsEvent {
    /// A regular file was written, created, or renamed into place.
    Modified(PathBuf),
    /// The underlying watcher reported an error.
    Error(notify::Error),
}

/// Watches a set of directories for file modifications.
///
/// Dropping the source stops watching.
pub struct FsEventSource {
    dirs: Vec<PathBuf>,
    stop_tx: std_mpsc::Sender<()>,
    bridge_handle: Option<thread::JoinHandle<()>>,
}

impl FsEventSource {
    /// Start watching `dirs`.
    ///
    /// Returns the source and a receiver for its events.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or a directory
    /// cannot be watched.
    pub fn new(
        dirs: &BTreeSet<PathBuf>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FsEvent>), MonitorError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = std_mpsc::channel();
        let (notify_tx, notify_rx) = std_mpsc::channel();

        let mut debouncer = new_debouncer(DEBOUNCE_TIMEOUT, None, move |result| {
            let _ = notify_tx.send(result);
        })?;

        for dir in dirs {
            debouncer.watch(dir, RecursiveMode::NonRecursive)?;
            tracing::debug!(dir = %dir.display(), "Watching directory");
        }

        // Bridge thread: forwards debounced batches to the tokio channel.
        let bridge_handle = thread::spawn(move || {
            loop {
                if stop_rx.try_recv().is_ok() {
                    break;
                }

                match notify_rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(result) => {
                        if !forward(result, &event_tx) {
                            break;
                        }
                    }
                    Err(std_mpsc::RecvTimeoutError::Timeout) => {}
                    Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }

            // Keep debouncer alive until thread exits
            drop(debouncer);
        });

        Ok((
            Self {
                dirs: dirs.iter().cloned().collect(),
                stop_tx,
                bridge_handle: Some(bridge_handle),
            },
            event_rx,
        ))
    }

    /// Directories being watched.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl Drop for FsEventSource {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.bridge_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Forward one debounced batch. Returns false once the receiver is gone.
fn forward(result: DebounceEventResult, event_tx: &mpsc::UnboundedSender<FsEvent>) -> bool {
    match result {
        Ok(events) => {
            let mut batch: Vec<PathBuf> = Vec::new();
            for event in &events {
                for path in modified_paths(event.kind, &event.paths) {
                    if !batch.contains(&path) {
                        batch.push(path);
                    }
                }
            }
            batch
                .into_iter()
                .all(|path| event_tx.send(FsEvent::Modified(path)).is_ok())
        }
        Err(errors) => errors
            .into_iter()
            .all(|error| event_tx.send(FsEvent::Error(error)).is_ok()),
    }
}

/// Paths of an event that count as modified regular files.
///
/// Metadata-only changes, accesses and removals are not modifications.
/// Directories are dropped unconditionally.
#[must_use]
pub fn modified_paths(kind: EventKind, paths: &[PathBuf]) -> Vec<PathBuf> {
    let relevant = matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(
                ModifyKind::Any | ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Other
            )
    );
    if !relevant {
        return Vec::new();
    }
    paths.iter().filter(|p| !p.is_dir()).cloned().collect()
}
