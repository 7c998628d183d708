//! Persistence contract for the board.
//!
//! The board service never writes a single task's order on its own: every
//! ordering change reaches the store as a [`ColumnBatch`], which
//! implementations must apply all-or-nothing.

pub mod memory;

use anyhow::Result;

use crate::model::{ActivityRecord, Board, BoardId, Column, ColumnId, Task, TaskId};
use crate::ordering::OrderUpdate;

pub use memory::MemoryStore;

/// A complete renumbering of one column.
///
/// Applying the batch sets `column_id = self.column_id` and the given order on
/// every listed task (which is how a moved task changes owner), and deletes
/// `delete` if set, all inside one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBatch {
    pub column_id: ColumnId,
    pub updates: Vec<OrderUpdate>,
    pub delete: Option<TaskId>,
}

impl ColumnBatch {
    #[must_use]
    pub const fn new(column_id: ColumnId, updates: Vec<OrderUpdate>) -> Self {
        Self {
            column_id,
            updates,
            delete: None,
        }
    }

    #[must_use]
    pub fn with_delete(mut self, task_id: TaskId) -> Self {
        self.delete = Some(task_id);
        self
    }
}

/// Outcome of applying a [`ColumnBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every update applied and committed.
    Applied,
    /// Nothing was committed; these updates found no task to write.
    Rejected(Vec<TaskId>),
}

/// Storage backing a board service.
///
/// Reads return tasks ordered by `order` ascending. Writes of order values go
/// exclusively through [`BoardStore::apply_column_order`].
pub trait BoardStore: Send + Sync {
    /// # Errors
    /// Returns an error if the underlying storage fails.
    fn board(&self, id: &BoardId) -> Result<Option<Board>>;

    /// # Errors
    /// Returns an error if the underlying storage fails.
    fn column(&self, id: &ColumnId) -> Result<Option<Column>>;

    /// # Errors
    /// Returns an error if the underlying storage fails.
    fn task(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Columns of a board ordered by column order.
    ///
    /// # Errors
    /// Returns an error if the underlying storage fails.
    fn columns_for_board(&self, board_id: &BoardId) -> Result<Vec<Column>>;

    /// Tasks of a column ordered by task order.
    ///
    /// # Errors
    /// Returns an error if the underlying storage fails.
    fn tasks_in_column(&self, column_id: &ColumnId) -> Result<Vec<Task>>;

    /// # Errors
    /// Returns an error if the board id already exists or storage fails.
    fn insert_board(&self, board: &Board) -> Result<()>;

    /// # Errors
    /// Returns an error if the parent board is missing or storage fails.
    fn insert_column(&self, column: &Column) -> Result<()>;

    /// # Errors
    /// Returns an error if the column is missing or storage fails.
    fn insert_task(&self, task: &Task) -> Result<()>;

    /// Apply one column's renumbering atomically.
    ///
    /// A listed task that does not exist rejects the whole batch with
    /// [`BatchOutcome::Rejected`] and leaves storage untouched.
    ///
    /// # Errors
    /// Returns an error if storage fails; nothing is committed in that case.
    fn apply_column_order(&self, batch: &ColumnBatch) -> Result<BatchOutcome>;

    /// # Errors
    /// Returns an error if storage fails.
    fn append_activity(&self, record: &ActivityRecord) -> Result<()>;

    /// Activity for one task, newest first.
    ///
    /// # Errors
    /// Returns an error if storage fails.
    fn activity_for_task(&self, task_id: &TaskId) -> Result<Vec<ActivityRecord>>;
}
