//! Change records and hunk grouping.

use std::fmt;

/// One line of an aligned pair of revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange<'a> {
    /// Present only in the older revision.
    Removed(&'a str),
    /// Present only in the newer revision.
    Added(&'a str),
    /// Present in both; closes the current hunk.
    Unchanged(&'a str),
}

/// One contiguous block of removed and added lines.
///
/// The two sides are independent: a hunk may remove three lines and add one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRecord {
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

impl ChangeRecord {
    /// Create a record from removed and added lines.
    pub fn new<R, A>(removed: R, added: A) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            removed: removed.into_iter().map(Into::into).collect(),
            added: added.into_iter().map(Into::into).collect(),
        }
    }

    /// True when neither side holds a line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "removed: {:?} added: {:?}", self.removed, self.added)
    }
}

/// Group aligned lines into change records.
///
/// Removed and added lines accumulate into two buffers; an unchanged line
/// flushes them as one record. Anything still buffered at the end becomes
/// the final record. Line order within each side is preserved.
pub fn group_hunks<'a, I>(changes: I) -> Vec<ChangeRecord>
where
    I: IntoIterator<Item = LineChange<'a>>,
{
    let mut records = Vec::new();
    let mut current = ChangeRecord::default();

    for change in changes {
        match change {
            LineChange::Removed(line) => current.removed.push(line.to_string()),
            LineChange::Added(line) => current.added.push(line.to_string()),
            LineChange::Unchanged(_) => {
                if !current.is_empty() {
                    records.push(std::mem::take(&mut current));
                }
            }
        }
    }

    if !current.is_empty() {
        records.push(current);
    }

    records
}
