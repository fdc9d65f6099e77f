//! File monitoring.
//!
//! Connects filesystem notifications to the snapshot and diff machinery and
//! reports who changed what.

mod error;
mod events;
mod file;
mod notifier;
mod owner;
mod session;

pub use error::MonitorError;
pub use events::{modified_paths, FsEvent, FsEventSource};
pub use file::{watch_dirs, MonitoredFile};
pub use notifier::{ChangeNotifier, NotifierState, Reaction, Report};
pub use owner::{Attribution, OwnerResolver, SystemOwnerResolver, UNKNOWN};
pub use session::{supervise, SessionOutcome, WatchSession};
