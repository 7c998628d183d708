//! Board service: the operations callers invoke.
//!
//! Every operation that writes order values follows the same cycle under the
//! lock of each column it touches:
//!
//! 1. re-read the column from the store (no cached order state),
//! 2. compute the complete new sequence with [`crate::ordering`],
//! 3. hand the store one [`ColumnBatch`] per column.
//!
//! A cross-column move writes the destination first. If the source batch then
//! fails, the source keeps a gap until its next renumbering; the failure is
//! still returned to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::BoardError;
use crate::lock::ColumnLocks;
use crate::model::{
    ActivityKind, ActivityRecord, Actor, Board, BoardId, BoardView, Column, ColumnId, ColumnView,
    DEFAULT_STATUS, NewTask, Task, TaskId, now_us,
};
use crate::ordering::{
    append_order, check_permutation, dense_updates, insert_at, is_dense, sort_for_display, without,
};
use crate::store::{BatchOutcome, BoardStore, ColumnBatch};

// ---------------------------------------------------------------------------
// Boundary types
// ---------------------------------------------------------------------------

/// Result shape handed back to UI callers: `{"success": ..}` or `{"error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionResult {
    Success(String),
    Error(String),
}

impl ActionResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(msg) | Self::Error(msg) => msg,
        }
    }
}

impl<T: fmt::Display> From<Result<T, BoardError>> for ActionResult {
    fn from(result: Result<T, BoardError>) -> Self {
        match result {
            Ok(done) => Self::Success(done.to_string()),
            Err(err) => Self::Error(err.to_string()),
        }
    }
}

/// A request to place `task_id` at `destination_index` of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub task_id: TaskId,
    /// Column the caller believes currently owns the task.
    pub source_column_id: ColumnId,
    pub destination_column_id: ColumnId,
    /// Position in the destination after the move. Clamped to the column.
    pub destination_index: i64,
}

/// What a successful move did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub task_id: TaskId,
    pub source_column_id: ColumnId,
    pub destination_column_id: ColumnId,
    /// Index the task landed at after clamping.
    pub index: usize,
}

impl MoveOutcome {
    #[must_use]
    pub fn is_cross_column(&self) -> bool {
        self.source_column_id != self.destination_column_id
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "moved {} to {} at index {}",
            self.task_id, self.destination_column_id, self.index
        )
    }
}

/// What a successful reorder did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderOutcome {
    pub column_id: ColumnId,
    pub task_count: usize,
}

impl fmt::Display for ReorderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reordered {} tasks in {}", self.task_count, self.column_id)
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Ordered task board over a [`BoardStore`].
#[derive(Debug)]
pub struct TaskBoard<S> {
    store: S,
    locks: ColumnLocks,
}

impl<S: BoardStore> TaskBoard<S> {
    /// Board with in-process column locks and the default lock timeout.
    pub fn new(store: S) -> Self {
        Self::with_locks(store, ColumnLocks::default())
    }

    pub const fn with_locks(store: S, locks: ColumnLocks) -> Self {
        Self { store, locks }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give up the service and keep the store.
    pub fn into_store(self) -> S {
        self.store
    }

    // -- reads --------------------------------------------------------------

    /// Board with its columns and tasks in display order.
    ///
    /// # Errors
    ///
    /// [`BoardError::BoardNotFound`] or a store failure.
    pub fn load_board(&self, board_id: &BoardId) -> Result<BoardView, BoardError> {
        let board = self
            .store
            .board(board_id)
            .map_err(BoardError::Persistence)?
            .ok_or_else(|| BoardError::BoardNotFound(board_id.clone()))?;

        let columns = self
            .store
            .columns_for_board(board_id)
            .map_err(BoardError::Persistence)?
            .into_iter()
            .map(|column| self.column_view_of(column))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BoardView { board, columns })
    }

    /// One column in display order.
    ///
    /// # Errors
    ///
    /// [`BoardError::ColumnNotFound`] or a store failure.
    pub fn column_view(&self, column_id: &ColumnId) -> Result<ColumnView, BoardError> {
        let column = self.require_column(column_id)?;
        self.column_view_of(column)
    }

    fn column_view_of(&self, column: Column) -> Result<ColumnView, BoardError> {
        let tasks = self
            .store
            .tasks_in_column(&column.id)
            .map_err(BoardError::Persistence)?;
        let tasks = sort_for_display(&column.id, tasks);
        Ok(ColumnView { column, tasks })
    }

    /// Activity for a task, newest first. Works for deleted tasks too.
    ///
    /// # Errors
    ///
    /// Store failure only.
    pub fn task_activity(&self, task_id: &TaskId) -> Result<Vec<ActivityRecord>, BoardError> {
        self.store
            .activity_for_task(task_id)
            .map_err(BoardError::Persistence)
    }

    /// Audit a column's persisted order values.
    ///
    /// # Errors
    ///
    /// [`BoardError::CorruptOrder`] when the values are not `{0..N-1}`.
    pub fn check_density(&self, column_id: &ColumnId) -> Result<(), BoardError> {
        self.require_column(column_id)?;
        let mut orders: Vec<i64> = self
            .store
            .tasks_in_column(column_id)
            .map_err(BoardError::Persistence)?
            .iter()
            .map(|t| t.order)
            .collect();
        if is_dense(&orders) {
            return Ok(());
        }
        orders.sort_unstable();
        Err(BoardError::CorruptOrder {
            column_id: column_id.clone(),
            orders,
        })
    }

    // -- structure ----------------------------------------------------------

    /// # Errors
    ///
    /// [`BoardError::InvalidInput`] for a blank name, or a store failure.
    pub fn create_board(&self, name: &str) -> Result<Board, BoardError> {
        let name = require_text("board name", name)?;
        let board = Board {
            id: BoardId::generate(&name),
            name,
            created_at_us: now_us(),
        };
        self.store
            .insert_board(&board)
            .map_err(BoardError::Persistence)?;
        info!(board_id = %board.id, name = %board.name, "board created");
        Ok(board)
    }

    /// Append a column to a board.
    ///
    /// # Errors
    ///
    /// [`BoardError::BoardNotFound`], [`BoardError::InvalidInput`] for a
    /// blank name, or a store failure.
    pub fn add_column(&self, board_id: &BoardId, name: &str) -> Result<Column, BoardError> {
        let name = require_text("column name", name)?;
        if self
            .store
            .board(board_id)
            .map_err(BoardError::Persistence)?
            .is_none()
        {
            return Err(BoardError::BoardNotFound(board_id.clone()));
        }

        let existing = self
            .store
            .columns_for_board(board_id)
            .map_err(BoardError::Persistence)?;
        let column = Column {
            id: ColumnId::generate(&format!("{board_id}/{name}")),
            board_id: board_id.clone(),
            name,
            order: i64::try_from(existing.len()).unwrap_or(i64::MAX),
            created_at_us: now_us(),
        };
        self.store
            .insert_column(&column)
            .map_err(BoardError::Persistence)?;
        info!(board_id = %board_id, column_id = %column.id, order = column.order, "column added");
        Ok(column)
    }

    // -- tasks --------------------------------------------------------------

    /// Create a task at the end of a column.
    ///
    /// # Errors
    ///
    /// [`BoardError::InvalidInput`] for a blank title or status,
    /// [`BoardError::ColumnNotFound`], lock contention, or a store failure.
    pub fn create_task(
        &self,
        actor: &Actor,
        column_id: &ColumnId,
        new_task: NewTask,
    ) -> Result<Task, BoardError> {
        let title = require_text("task title", &new_task.title)?;
        let status = match new_task.status {
            Some(status) => require_text("task status", &status)?,
            None => DEFAULT_STATUS.to_string(),
        };

        let _guard = self.locks.lock(column_id)?;
        self.require_column(column_id)?;

        let existing = self
            .store
            .tasks_in_column(column_id)
            .map_err(BoardError::Persistence)?;
        let order = append_order(existing.iter().map(|t| t.order));

        let now = now_us();
        let task = Task {
            id: TaskId::generate(&format!("{column_id}/{title}")),
            column_id: column_id.clone(),
            title,
            description: new_task.description,
            priority: new_task.priority,
            status,
            due_date: new_task.due_date,
            assignee: new_task.assignee,
            order,
            created_at_us: now,
            updated_at_us: now,
        };
        self.store
            .insert_task(&task)
            .map_err(BoardError::Persistence)?;

        self.record(ActivityRecord::now(
            task.id.clone(),
            actor,
            ActivityKind::Created,
            format!("created in {column_id} at {order}"),
        ));
        info!(actor = %actor, task_id = %task.id, column_id = %column_id, order, "task created");
        Ok(task)
    }

    /// Delete a task and compact its former siblings in the same write.
    ///
    /// # Errors
    ///
    /// [`BoardError::TaskNotFound`], [`BoardError::TaskNotInColumn`] if the
    /// task moved while waiting for the lock, lock contention, or a store
    /// failure.
    pub fn delete_task(&self, actor: &Actor, task_id: &TaskId) -> Result<(), BoardError> {
        let column_id = self.require_task(task_id)?.column_id;

        let _guard = self.locks.lock(&column_id)?;
        let task = self.require_task(task_id)?;
        if task.column_id != column_id {
            return Err(BoardError::TaskNotInColumn {
                task_id: task_id.clone(),
                claimed: column_id,
                actual: task.column_id,
            });
        }

        let current = self.column_task_ids(&column_id)?;
        let remaining = without(&current, task_id);
        let batch =
            ColumnBatch::new(column_id.clone(), dense_updates(&remaining)).with_delete(task_id.clone());
        debug!(column_id = %column_id, remaining = remaining.len(), "delete batch computed");
        self.apply(&batch)?;

        self.record(ActivityRecord::now(
            task_id.clone(),
            actor,
            ActivityKind::Deleted,
            format!("deleted from {column_id}"),
        ));
        info!(actor = %actor, task_id = %task_id, column_id = %column_id, "task deleted");
        Ok(())
    }

    // -- ordering -----------------------------------------------------------

    /// Replace a column's order with `ordered_task_ids`.
    ///
    /// The request must list exactly the tasks the column holds. Writes no
    /// activity.
    ///
    /// # Errors
    ///
    /// [`BoardError::ColumnNotFound`], [`BoardError::PermutationMismatch`],
    /// [`BoardError::WriteRejected`], lock contention, or a store failure.
    /// Nothing is written on any error.
    pub fn reorder_within_column(
        &self,
        actor: &Actor,
        column_id: &ColumnId,
        ordered_task_ids: &[TaskId],
    ) -> Result<ReorderOutcome, BoardError> {
        let _guard = self.locks.lock(column_id)?;
        self.require_column(column_id)?;

        let current = self.column_task_ids(column_id)?;
        check_permutation(column_id, &current, ordered_task_ids)?;

        let batch = ColumnBatch::new(column_id.clone(), dense_updates(ordered_task_ids));
        debug!(column_id = %column_id, updates = batch.updates.len(), "reorder batch computed");
        self.apply(&batch)?;

        info!(actor = %actor, column_id = %column_id, tasks = ordered_task_ids.len(), "column reordered");
        Ok(ReorderOutcome {
            column_id: column_id.clone(),
            task_count: ordered_task_ids.len(),
        })
    }

    /// Move a task within or across columns.
    ///
    /// The destination is renumbered with the task inserted at the clamped
    /// index, and the same write moves the task into the destination. For a
    /// cross-column move the source is then compacted.
    ///
    /// # Errors
    ///
    /// [`BoardError::ColumnNotFound`], [`BoardError::TaskNotFound`] or
    /// [`BoardError::TaskNotInColumn`] before anything is written;
    /// [`BoardError::WriteRejected`] or a store failure from either batch;
    /// lock contention.
    pub fn move_task(&self, actor: &Actor, request: &MoveRequest) -> Result<MoveOutcome, BoardError> {
        let MoveRequest {
            task_id,
            source_column_id: source,
            destination_column_id: destination,
            destination_index,
        } = request;

        let _guard = self.locks.lock_all(&[source.clone(), destination.clone()])?;
        self.require_column(source)?;
        self.require_column(destination)?;

        let task = self.require_task(task_id)?;
        if &task.column_id != source {
            return Err(BoardError::TaskNotInColumn {
                task_id: task_id.clone(),
                claimed: source.clone(),
                actual: task.column_id,
            });
        }

        let destination_ids = self.column_task_ids(destination)?;
        let sequence = insert_at(&destination_ids, task_id, *destination_index);
        let index = sequence.iter().position(|id| id == task_id).unwrap_or(0);

        let batch = ColumnBatch::new(destination.clone(), dense_updates(&sequence));
        debug!(
            task_id = %task_id,
            column_id = %destination,
            requested_index = destination_index,
            index,
            updates = batch.updates.len(),
            "destination batch computed"
        );
        self.apply(&batch)?;

        if source != destination {
            let remaining = without(&self.column_task_ids(source)?, task_id);
            let batch = ColumnBatch::new(source.clone(), dense_updates(&remaining));
            debug!(column_id = %source, updates = batch.updates.len(), "source compaction computed");
            if let Err(err) = self.apply(&batch) {
                warn!(
                    task_id = %task_id,
                    column_id = %source,
                    error = %err,
                    "source compaction failed after destination write; column keeps a gap"
                );
                return Err(err);
            }
        }

        self.record(ActivityRecord::now(
            task_id.clone(),
            actor,
            ActivityKind::Moved,
            format!("{source} -> {destination} at {index}"),
        ));
        info!(
            actor = %actor,
            task_id = %task_id,
            from = %source,
            to = %destination,
            index,
            "task moved"
        );

        Ok(MoveOutcome {
            task_id: task_id.clone(),
            source_column_id: source.clone(),
            destination_column_id: destination.clone(),
            index,
        })
    }

    // -- helpers ------------------------------------------------------------

    fn require_column(&self, column_id: &ColumnId) -> Result<Column, BoardError> {
        self.store
            .column(column_id)
            .map_err(BoardError::Persistence)?
            .ok_or_else(|| BoardError::ColumnNotFound(column_id.clone()))
    }

    fn require_task(&self, task_id: &TaskId) -> Result<Task, BoardError> {
        self.store
            .task(task_id)
            .map_err(BoardError::Persistence)?
            .ok_or_else(|| BoardError::TaskNotFound(task_id.clone()))
    }

    /// Every task the store holds for a column, in persisted order. Unlike
    /// the read model this keeps incomplete rows, so renumbering covers them.
    fn column_task_ids(&self, column_id: &ColumnId) -> Result<Vec<TaskId>, BoardError> {
        Ok(self
            .store
            .tasks_in_column(column_id)
            .map_err(BoardError::Persistence)?
            .into_iter()
            .map(|t| t.id)
            .collect())
    }

    fn apply(&self, batch: &ColumnBatch) -> Result<(), BoardError> {
        match self
            .store
            .apply_column_order(batch)
            .map_err(BoardError::Persistence)?
        {
            BatchOutcome::Applied => Ok(()),
            BatchOutcome::Rejected(task_ids) => Err(BoardError::WriteRejected {
                column_id: batch.column_id.clone(),
                task_ids,
            }),
        }
    }

    fn record(&self, record: ActivityRecord) {
        if let Err(err) = self.store.append_activity(&record) {
            warn!(
                task_id = %record.task_id,
                kind = %record.kind,
                error = %err,
                "failed to append activity record"
            );
        }
    }
}

fn require_text(what: &str, raw: &str) -> Result<String, BoardError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(BoardError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::Priority;
    use crate::store::MemoryStore;

    struct Fixture {
        board: TaskBoard<MemoryStore>,
        actor: Actor,
        col_a: ColumnId,
        col_b: ColumnId,
    }

    impl Fixture {
        /// Column A holds `a_titles`, column B holds `b_titles`.
        fn new(a_titles: &[&str], b_titles: &[&str]) -> Self {
            let board = TaskBoard::new(MemoryStore::new());
            let actor = Actor::new("property-manager");
            let b = board.create_board("Unit turnover").unwrap();
            let col_a = board.add_column(&b.id, "Todo").unwrap().id;
            let col_b = board.add_column(&b.id, "Doing").unwrap().id;
            for title in a_titles {
                board.create_task(&actor, &col_a, NewTask::titled(*title)).unwrap();
            }
            for title in b_titles {
                board.create_task(&actor, &col_b, NewTask::titled(*title)).unwrap();
            }
            Self {
                board,
                actor,
                col_a,
                col_b,
            }
        }

        fn id(&self, title: &str) -> TaskId {
            for column in [&self.col_a, &self.col_b] {
                let view = self.board.column_view(column).unwrap();
                if let Some(task) = view.tasks.iter().find(|t| t.title == title) {
                    return task.id.clone();
                }
            }
            panic!("no task titled {title}");
        }

        fn titles(&self, column: &ColumnId) -> Vec<String> {
            self.board
                .column_view(column)
                .unwrap()
                .tasks
                .into_iter()
                .map(|t| t.title)
                .collect()
        }

        fn orders(&self, column: &ColumnId) -> Vec<i64> {
            self.board
                .column_view(column)
                .unwrap()
                .tasks
                .iter()
                .map(|t| t.order)
                .collect()
        }

        fn move_to(&self, title: &str, from: &ColumnId, to: &ColumnId, index: i64) -> MoveOutcome {
            self.board
                .move_task(
                    &self.actor,
                    &MoveRequest {
                        task_id: self.id(title),
                        source_column_id: from.clone(),
                        destination_column_id: to.clone(),
                        destination_index: index,
                    },
                )
                .unwrap()
        }
    }

    #[test]
    fn reorder_reads_back_requested_permutation() {
        let fx = Fixture::new(&["t1", "t2", "t3"], &[]);
        let wanted = vec![fx.id("t3"), fx.id("t1"), fx.id("t2")];
        let outcome = fx
            .board
            .reorder_within_column(&fx.actor, &fx.col_a, &wanted)
            .unwrap();
        assert_eq!(outcome.task_count, 3);
        assert_eq!(fx.titles(&fx.col_a), vec!["t3", "t1", "t2"]);
        assert_eq!(fx.orders(&fx.col_a), vec![0, 1, 2]);
    }

    #[test]
    fn reorder_rejects_mismatched_sets_without_writing() {
        let fx = Fixture::new(&["t1", "t2", "t3"], &["t9"]);

        let missing = vec![fx.id("t2"), fx.id("t1")];
        let err = fx
            .board
            .reorder_within_column(&fx.actor, &fx.col_a, &missing)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PermutationMismatch);

        let foreign = vec![fx.id("t1"), fx.id("t2"), fx.id("t3"), fx.id("t9")];
        assert!(fx
            .board
            .reorder_within_column(&fx.actor, &fx.col_a, &foreign)
            .is_err());

        let duplicated = vec![fx.id("t1"), fx.id("t1"), fx.id("t3")];
        assert!(fx
            .board
            .reorder_within_column(&fx.actor, &fx.col_a, &duplicated)
            .is_err());

        assert_eq!(fx.titles(&fx.col_a), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn reorder_emits_no_activity() {
        let fx = Fixture::new(&["t1", "t2"], &[]);
        let before = fx.board.task_activity(&fx.id("t1")).unwrap().len();
        fx.board
            .reorder_within_column(&fx.actor, &fx.col_a, &[fx.id("t2"), fx.id("t1")])
            .unwrap();
        assert_eq!(fx.board.task_activity(&fx.id("t1")).unwrap().len(), before);
    }

    #[test]
    fn cross_column_append() {
        let fx = Fixture::new(&["t5", "t6"], &["t7", "t8"]);
        let outcome = fx.move_to("t5", &fx.col_a, &fx.col_b, 2);
        assert!(outcome.is_cross_column());
        assert_eq!(outcome.index, 2);
        assert_eq!(fx.titles(&fx.col_a), vec!["t6"]);
        assert_eq!(fx.titles(&fx.col_b), vec!["t7", "t8", "t5"]);
        assert_eq!(fx.orders(&fx.col_a), vec![0]);
        assert_eq!(fx.orders(&fx.col_b), vec![0, 1, 2]);
    }

    #[test]
    fn cross_column_middle_insert() {
        let fx = Fixture::new(&["t5", "t6"], &["t7", "t8"]);
        fx.move_to("t5", &fx.col_a, &fx.col_b, 1);
        assert_eq!(fx.titles(&fx.col_a), vec!["t6"]);
        assert_eq!(fx.titles(&fx.col_b), vec!["t7", "t5", "t8"]);
    }

    #[test]
    fn move_to_current_index_is_noop() {
        let fx = Fixture::new(&["t1", "t2", "t3"], &[]);
        let outcome = fx.move_to("t2", &fx.col_a, &fx.col_a, 1);
        assert!(!outcome.is_cross_column());
        assert_eq!(fx.titles(&fx.col_a), vec!["t1", "t2", "t3"]);
        assert_eq!(fx.orders(&fx.col_a), vec![0, 1, 2]);
    }

    #[test]
    fn same_column_move_relocates() {
        let fx = Fixture::new(&["t1", "t2", "t3", "t4"], &[]);
        fx.move_to("t1", &fx.col_a, &fx.col_a, 2);
        assert_eq!(fx.titles(&fx.col_a), vec!["t2", "t3", "t1", "t4"]);
    }

    #[test]
    fn index_is_clamped() {
        let fx = Fixture::new(&["t1"], &["t7", "t8"]);
        let outcome = fx.move_to("t1", &fx.col_a, &fx.col_b, 99);
        assert_eq!(outcome.index, 2);
        assert_eq!(fx.titles(&fx.col_b), vec!["t7", "t8", "t1"]);

        let outcome = fx.move_to("t8", &fx.col_b, &fx.col_a, -4);
        assert_eq!(outcome.index, 0);
        assert_eq!(fx.titles(&fx.col_a), vec!["t8"]);
        assert_eq!(fx.titles(&fx.col_b), vec!["t7", "t1"]);
    }

    #[test]
    fn move_with_wrong_source_is_precondition_error() {
        let fx = Fixture::new(&["t1"], &["t7"]);
        let err = fx
            .board
            .move_task(
                &fx.actor,
                &MoveRequest {
                    task_id: fx.id("t1"),
                    source_column_id: fx.col_b.clone(),
                    destination_column_id: fx.col_b.clone(),
                    destination_index: 0,
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::TaskNotInColumn);
        assert!(err.requires_refresh());
        assert_eq!(fx.titles(&fx.col_b), vec!["t7"]);
    }

    #[test]
    fn move_to_unknown_column_writes_nothing() {
        let fx = Fixture::new(&["t1", "t2"], &[]);
        let err = fx
            .board
            .move_task(
                &fx.actor,
                &MoveRequest {
                    task_id: fx.id("t1"),
                    source_column_id: fx.col_a.clone(),
                    destination_column_id: ColumnId::from("col-missing"),
                    destination_index: 0,
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ColumnNotFound);
        assert_eq!(fx.titles(&fx.col_a), vec!["t1", "t2"]);
    }

    #[test]
    fn move_records_activity() {
        let fx = Fixture::new(&["t5"], &["t7"]);
        fx.move_to("t5", &fx.col_a, &fx.col_b, 0);
        let log = fx.board.task_activity(&fx.id("t5")).unwrap();
        assert_eq!(log[0].kind, ActivityKind::Moved);
        assert_eq!(log[0].actor, fx.actor);
        assert_eq!(log.last().map(|r| r.kind), Some(ActivityKind::Created));
    }

    #[test]
    fn injected_destination_failure_leaves_both_columns() {
        let fx = Fixture::new(&["t5", "t6"], &["t7", "t8"]);
        let task_id = fx.id("t5");
        fx.board.store().fail_next_batch_after(1);
        let err = fx
            .board
            .move_task(
                &fx.actor,
                &MoveRequest {
                    task_id,
                    source_column_id: fx.col_a.clone(),
                    destination_column_id: fx.col_b.clone(),
                    destination_index: 1,
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::StoreFailure);
        assert_eq!(fx.titles(&fx.col_a), vec!["t5", "t6"]);
        assert_eq!(fx.titles(&fx.col_b), vec!["t7", "t8"]);
    }

    #[test]
    fn create_task_appends_after_max() {
        let fx = Fixture::new(&["t1", "t2"], &[]);
        let task = fx
            .board
            .create_task(
                &fx.actor,
                &fx.col_a,
                NewTask::titled("  Replace smoke detector  ").with_priority(Priority::Urgent),
            )
            .unwrap();
        assert_eq!(task.order, 2);
        assert_eq!(task.title, "Replace smoke detector");
        assert_eq!(task.status, DEFAULT_STATUS);
        assert_eq!(task.priority, Priority::Urgent);
    }

    #[test]
    fn create_task_rejects_blank_title() {
        let fx = Fixture::new(&[], &[]);
        let err = fx
            .board
            .create_task(&fx.actor, &fx.col_a, NewTask::titled("   "))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert!(fx.titles(&fx.col_a).is_empty());
    }

    #[test]
    fn delete_compacts_siblings() {
        let fx = Fixture::new(&["t1", "t2", "t3"], &[]);
        let gone = fx.id("t2");
        fx.board.delete_task(&fx.actor, &gone).unwrap();
        assert_eq!(fx.titles(&fx.col_a), vec!["t1", "t3"]);
        assert_eq!(fx.orders(&fx.col_a), vec![0, 1]);

        let log = fx.board.task_activity(&gone).unwrap();
        assert_eq!(log[0].kind, ActivityKind::Deleted);

        let err = fx.board.delete_task(&fx.actor, &gone).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TaskNotFound);
    }

    #[test]
    fn density_audit_flags_gaps_and_reorder_heals_them() {
        let fx = Fixture::new(&["t1", "t2"], &[]);
        let mut task = fx.board.store().task(&fx.id("t2")).unwrap().unwrap();
        task.order = 7;
        fx.board.store().put_task_raw(task);

        let err = fx.board.check_density(&fx.col_a).unwrap_err();
        assert!(matches!(err, BoardError::CorruptOrder { ref orders, .. } if orders == &vec![0, 7]));

        fx.board
            .reorder_within_column(&fx.actor, &fx.col_a, &[fx.id("t1"), fx.id("t2")])
            .unwrap();
        fx.board.check_density(&fx.col_a).unwrap();
    }

    #[test]
    fn load_board_filters_incomplete_and_sorts() {
        let fx = Fixture::new(&["t1", "t2"], &["t7"]);
        let mut broken = fx.board.store().task(&fx.id("t1")).unwrap().unwrap();
        broken.id = TaskId::from("tsk-broken");
        broken.title = String::new();
        broken.order = 0;
        fx.board.store().put_task_raw(broken);

        let b = fx.board.column_view(&fx.col_a).unwrap().column.board_id;
        let view = fx.board.load_board(&b).unwrap();
        assert_eq!(view.columns.len(), 2);
        assert_eq!(view.columns[0].column.id, fx.col_a);
        assert_eq!(view.task_count(), 3);
        let titles: Vec<&str> = view.columns[0].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["t1", "t2"]);
    }

    #[test]
    fn add_column_to_missing_board() {
        let board = TaskBoard::new(MemoryStore::new());
        let err = board.add_column(&BoardId::from("brd-nope"), "Todo").unwrap_err();
        assert_eq!(err.code(), ErrorCode::BoardNotFound);
    }

    #[test]
    fn action_result_wire_shape() {
        let ok: ActionResult = Ok::<_, BoardError>(ReorderOutcome {
            column_id: ColumnId::from("col-a"),
            task_count: 3,
        })
        .into();
        assert_eq!(
            serde_json::to_string(&ok).unwrap(),
            r#"{"success":"reordered 3 tasks in col-a"}"#
        );

        let err: ActionResult = Err::<MoveOutcome, _>(BoardError::TaskNotFound(TaskId::from("tsk-x"))).into();
        assert!(!err.is_success());
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({ "error": "task not found: tsk-x" })
        );
    }
}
