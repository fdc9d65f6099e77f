//! Configuration module.
//!
//! The configuration names the files to monitor and controls snapshotting.
//! Its own path is passed explicitly to each watch session.

mod loader;
mod types;

pub use loader::*;
pub use types::*;
