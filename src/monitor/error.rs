//! Monitor error types.

use crate::config::ConfigError;

/// Errors that can stop a watch session.
#[derive(thiserror::Error, Debug)]
pub enum MonitorError {
    /// Notify watcher error.
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// Configuration could not be loaded for a new session.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The event channel closed while the session was running.
    #[error("Channel closed")]
    ChannelClosed,
}
