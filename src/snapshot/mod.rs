//! Revision snapshots of monitored files.
//!
//! Every capture copies the current bytes of a file into a flat scratch
//! directory. The logical file and capture time are encoded in the entry
//! name, so no separate index is kept.

mod error;
mod naming;
mod store;

pub use error::SnapshotError;
pub use naming::{decode_path, encode_path, parse_storage_name, storage_name, TIMESTAMP_FORMAT};
pub use store::{capture_into, list_revisions_in, Revision, SnapshotStore};
