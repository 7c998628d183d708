//! Dense ordering of tasks within a column.
//!
//! # Invariant
//!
//! After any successful write, the `order` values of the N tasks in a column
//! are exactly `{0, 1, ..., N-1}`. Every function here computes a complete
//! renumbering of one column from an in-memory sequence of task ids, so a
//! single batch write restores density no matter what the column held
//! before (including gaps left by an interrupted cross-column move).
//!
//! Nothing in this module touches storage; [`crate::board`] wires these
//! functions to a [`crate::store::BoardStore`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::model::{ColumnId, Task, TaskId};

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// One order assignment inside a column batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub task_id: TaskId,
    pub order: i64,
}

/// Assign `order = index` to every id in `sequence`.
#[must_use]
pub fn dense_updates(sequence: &[TaskId]) -> Vec<OrderUpdate> {
    sequence
        .iter()
        .zip(0_i64..)
        .map(|(task_id, order)| OrderUpdate {
            task_id: task_id.clone(),
            order,
        })
        .collect()
}

/// Order for a task appended to a column: `max + 1`, or 0 when empty.
#[must_use]
pub fn append_order(existing: impl IntoIterator<Item = i64>) -> i64 {
    existing.into_iter().max().map_or(0, |max| max + 1)
}

// ---------------------------------------------------------------------------
// Insertion
// ---------------------------------------------------------------------------

/// Clamp a caller-supplied insertion index to `[0, len]`.
///
/// Negative indices insert at the front; anything past the end appends.
#[must_use]
pub fn clamp_index(index: i64, len: usize) -> usize {
    if index <= 0 {
        return 0;
    }
    usize::try_from(index).map_or(len, |i| i.min(len))
}

/// Build the post-move sequence of a destination column.
///
/// `current` is the destination's ids in display order. Any existing
/// occurrence of `task_id` is removed first, so a same-column move relocates
/// the task instead of duplicating it. The index is interpreted against the
/// sequence *without* the moving task.
#[must_use]
pub fn insert_at(current: &[TaskId], task_id: &TaskId, index: i64) -> Vec<TaskId> {
    let mut sequence: Vec<TaskId> = current.iter().filter(|id| *id != task_id).cloned().collect();
    let at = clamp_index(index, sequence.len());
    sequence.insert(at, task_id.clone());
    sequence
}

/// Remove `task_id` from a sequence, keeping the relative order of the rest.
#[must_use]
pub fn without(current: &[TaskId], task_id: &TaskId) -> Vec<TaskId> {
    current.iter().filter(|id| *id != task_id).cloned().collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that `requested` is a permutation of `current`.
///
/// # Errors
///
/// Returns [`BoardError::PermutationMismatch`] listing the ids that are
/// missing from the request, the ids the column does not hold, and the ids
/// requested more than once.
pub fn check_permutation(
    column_id: &ColumnId,
    current: &[TaskId],
    requested: &[TaskId],
) -> Result<(), BoardError> {
    let current_set: HashSet<&TaskId> = current.iter().collect();

    let mut seen: HashSet<&TaskId> = HashSet::with_capacity(requested.len());
    let mut duplicated = Vec::new();
    let mut unexpected = Vec::new();
    for id in requested {
        if !seen.insert(id) {
            if !duplicated.contains(id) {
                duplicated.push(id.clone());
            }
            continue;
        }
        if !current_set.contains(id) {
            unexpected.push(id.clone());
        }
    }

    let missing: Vec<TaskId> = current
        .iter()
        .filter(|id| !seen.contains(id))
        .cloned()
        .collect();

    if missing.is_empty() && unexpected.is_empty() && duplicated.is_empty() {
        Ok(())
    } else {
        Err(BoardError::PermutationMismatch {
            column_id: column_id.clone(),
            missing,
            unexpected,
            duplicated,
        })
    }
}

/// True when `orders` is exactly `{0, .., n-1}` in any arrangement.
#[must_use]
pub fn is_dense(orders: &[i64]) -> bool {
    let mut sorted = orders.to_vec();
    sorted.sort_unstable();
    sorted.iter().zip(0_i64..).all(|(got, want)| *got == want)
}

// ---------------------------------------------------------------------------
// Read model
// ---------------------------------------------------------------------------

/// Prepare a column's tasks for display.
///
/// Drops incomplete records and records that claim a different column, then
/// sorts by persisted order (ties by id, so output is deterministic even on
/// corrupt data).
#[must_use]
pub fn sort_for_display(column_id: &ColumnId, tasks: Vec<Task>) -> Vec<Task> {
    let mut kept: Vec<Task> = tasks
        .into_iter()
        .filter(|task| {
            let keep = task.is_complete() && &task.column_id == column_id;
            if !keep {
                tracing::debug!(task_id = %task.id, column_id = %column_id, "dropping incomplete task record");
            }
            keep
        })
        .collect();
    kept.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    kept
}
