//! Line-level differences between revisions.
//!
//! A comparison walks the aligned lines of two revisions in file order and
//! groups contiguous removals and additions into [`ChangeRecord`]s with no
//! surrounding context.

mod align;
mod engine;
mod error;
mod record;

pub use align::align_lines;
pub use engine::{DiffEngine, DiffStrategy};
pub use error::DiffError;
pub use record::{group_hunks, ChangeRecord, LineChange};
