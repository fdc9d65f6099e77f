//! Filemon - report who changed a watched file and what changed.

pub mod config;
pub mod diff;
pub mod display;
pub mod monitor;
pub mod snapshot;
