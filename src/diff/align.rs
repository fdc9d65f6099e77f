//! Substitution-aware line alignment.
//!
//! Computes a minimum-cost edit script where replacing a line costs the same
//! as inserting or deleting one. Compared to a pure longest-common-subsequence
//! diff this keeps a line in place when its neighbours are swapped around it,
//! so reorderings are reported as in-place replacements.

use super::record::LineChange;

/// Largest edit table (old × new lines, after trimming common ends) that is
/// aligned directly. Bigger inputs should use a linear-space algorithm.
pub(crate) const MAX_ALIGNMENT_CELLS: usize = 4_000_000;

/// Align two line sequences, returning the edit script in file order.
///
/// Identical lines are always kept. Among equally cheap edits, deleting wins
/// over inserting, and both win over replacing. The table is O(n·m) in the
/// lines that differ between the common prefix and suffix.
#[must_use]
pub fn align_lines<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<LineChange<'a>> {
    let (prefix, suffix) = common_ends(old, new);

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut script = Vec::with_capacity(old.len().max(new.len()));
    script.extend(old[..prefix].iter().map(|&line| LineChange::Unchanged(line)));
    align_middle(old_mid, new_mid, &mut script);
    script.extend(
        old[old.len() - suffix..]
            .iter()
            .map(|&line| LineChange::Unchanged(line)),
    );
    script
}

/// Number of table cells needed to align the differing middle of two inputs.
pub(crate) fn alignment_cells(old: &[&str], new: &[&str]) -> usize {
    let (prefix, suffix) = common_ends(old, new);
    (old.len() - prefix - suffix + 1).saturating_mul(new.len() - prefix - suffix + 1)
}

/// Lengths of the common prefix and of the common suffix that follows it.
fn common_ends(old: &[&str], new: &[&str]) -> (usize, usize) {
    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    (prefix, suffix)
}

fn align_middle<'a>(old: &[&'a str], new: &[&'a str], script: &mut Vec<LineChange<'a>>) {
    let n = old.len();
    let m = new.len();
    let width = m + 1;

    // cost[i * width + j]: cheapest edit of old[i..] into new[j..].
    let mut cost = vec![0u32; (n + 1) * width];
    for i in (0..=n).rev() {
        for j in (0..=m).rev() {
            let idx = i * width + j;
            cost[idx] = if i == n {
                u32::try_from(m - j).unwrap_or(u32::MAX)
            } else if j == m {
                u32::try_from(n - i).unwrap_or(u32::MAX)
            } else if old[i] == new[j] {
                cost[idx + width + 1]
            } else {
                let replace = cost[idx + width + 1];
                let delete = cost[idx + width];
                let insert = cost[idx + 1];
                replace.min(delete).min(insert).saturating_add(1)
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        let idx = i * width + j;
        if i == n {
            script.push(LineChange::Added(new[j]));
            j += 1;
        } else if j == m {
            script.push(LineChange::Removed(old[i]));
            i += 1;
        } else if old[i] == new[j] {
            script.push(LineChange::Unchanged(old[i]));
            i += 1;
            j += 1;
        } else {
            let here = cost[idx];
            if cost[idx + width].saturating_add(1) == here {
                script.push(LineChange::Removed(old[i]));
                i += 1;
            } else if cost[idx + 1].saturating_add(1) == here {
                script.push(LineChange::Added(new[j]));
                j += 1;
            } else {
                script.push(LineChange::Removed(old[i]));
                script.push(LineChange::Added(new[j]));
                i += 1;
                j += 1;
            }
        }
    }
}
