//! Revision comparison.

use std::path::Path;

use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

use crate::snapshot::{Revision, SnapshotStore};

use super::align::{align_lines, alignment_cells, MAX_ALIGNMENT_CELLS};
use super::error::DiffError;
use super::record::{group_hunks, ChangeRecord, LineChange};

/// Line alignment used when comparing two revisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffStrategy {
    /// Minimum edit script where a replaced line counts as one edit.
    #[default]
    EditDistance,
    /// Myers' longest-common-subsequence diff.
    Myers,
    /// Patience diff, anchored on lines unique to both sides.
    Patience,
}

/// Turns pairs of revisions into change records.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine {
    strategy: DiffStrategy,
}

impl DiffEngine {
    #[must_use]
    pub fn new(strategy: DiffStrategy) -> Self {
        Self { strategy }
    }

    #[must_use]
    pub fn strategy(&self) -> DiffStrategy {
        self.strategy
    }

    /// Compare the two most recent revisions of `path`.
    ///
    /// Never fails: when fewer than two revisions exist, or they cannot be
    /// read, a warning is logged and no records are returned.
    #[must_use]
    pub fn compare(&self, store: &SnapshotStore, path: &Path) -> Vec<ChangeRecord> {
        match self.try_compare(store, path) {
            Ok(records) => records,
            Err(DiffError::RevisionsUnavailable(_)) => {
                tracing::warn!(
                    path = %path.display(),
                    "Revisions not available for comparison"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Comparison failed");
                Vec::new()
            }
        }
    }

    /// Compare the two most recent revisions of `path`.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::RevisionsUnavailable` when fewer than two
    /// revisions exist, or an error if the store or a revision cannot be read.
    pub fn try_compare(
        &self,
        store: &SnapshotStore,
        path: &Path,
    ) -> Result<Vec<ChangeRecord>, DiffError> {
        let (previous, latest) = store
            .last_pair(path)?
            .ok_or_else(|| DiffError::RevisionsUnavailable(path.to_path_buf()))?;
        self.diff_revisions(&previous, &latest)
    }

    /// Compare two specific revisions, older first.
    ///
    /// # Errors
    ///
    /// Returns `DiffError::ReadRevision` if either copy cannot be read.
    pub fn diff_revisions(
        &self,
        previous: &Revision,
        latest: &Revision,
    ) -> Result<Vec<ChangeRecord>, DiffError> {
        let read = |revision: &Revision| {
            revision
                .read_text()
                .map_err(|source| DiffError::ReadRevision {
                    location: revision.location().to_path_buf(),
                    source,
                })
        };
        let old = read(previous)?;
        let new = read(latest)?;
        Ok(self.diff_text(&old, &new))
    }

    /// Compare two texts line by line.
    ///
    /// Trailing whitespace at the end of either text is ignored, so a missing
    /// final newline never produces a hunk.
    #[must_use]
    pub fn diff_text(&self, old: &str, new: &str) -> Vec<ChangeRecord> {
        let old: Vec<&str> = old.trim_end().lines().collect();
        let new: Vec<&str> = new.trim_end().lines().collect();

        match self.strategy {
            DiffStrategy::EditDistance => {
                let cells = alignment_cells(&old, &new);
                if cells > MAX_ALIGNMENT_CELLS {
                    tracing::debug!(cells, "Input too large for edit-distance, using Myers");
                    return diff_with(Algorithm::Myers, &old, &new);
                }
                group_hunks(align_lines(&old, &new))
            }
            DiffStrategy::Myers => diff_with(Algorithm::Myers, &old, &new),
            DiffStrategy::Patience => diff_with(Algorithm::Patience, &old, &new),
        }
    }
}

fn diff_with(algorithm: Algorithm, old: &[&str], new: &[&str]) -> Vec<ChangeRecord> {
    let diff = TextDiff::configure()
        .algorithm(algorithm)
        .diff_slices(old, new);

    group_hunks(diff.iter_all_changes().map(|change| match change.tag() {
        ChangeTag::Delete => LineChange::Removed(change.value()),
        ChangeTag::Insert => LineChange::Added(change.value()),
        ChangeTag::Equal => LineChange::Unchanged(change.value()),
    }))
}
