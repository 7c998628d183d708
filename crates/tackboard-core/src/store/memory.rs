//! In-memory [`BoardStore`] used by tests, benches, and embedders that keep
//! the board in process.
//!
//! Column batches are applied to a staged copy of the task table and swapped
//! in only when every write succeeded. A failure can be injected after a
//! chosen number of task writes to exercise that path.

use anyhow::{Result, anyhow, bail};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{BatchOutcome, BoardStore, ColumnBatch};
use crate::model::{ActivityRecord, Board, BoardId, Column, ColumnId, Task, TaskId};

#[derive(Debug, Default, Clone)]
struct Tables {
    boards: HashMap<BoardId, Board>,
    columns: HashMap<ColumnId, Column>,
    tasks: HashMap<TaskId, Task>,
    activity: Vec<ActivityRecord>,
}

/// Process-local board storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_after_writes: Mutex<Option<usize>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next column batch fail after `writes` task writes have been
    /// staged. The fault fires once.
    pub fn fail_next_batch_after(&self, writes: usize) {
        *self
            .fail_after_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(writes);
    }

    /// Write a task row directly, bypassing batch semantics. Used to seed
    /// corrupt or legacy data.
    pub fn put_task_raw(&self, task: Task) {
        self.tables().tasks.insert(task.id.clone(), task);
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_fault(&self) -> Option<usize> {
        self.fail_after_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

fn sorted_tasks<'a>(tasks: impl Iterator<Item = &'a Task>, column_id: &ColumnId) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.filter(|t| &t.column_id == column_id).cloned().collect();
    out.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    out
}

impl BoardStore for MemoryStore {
    fn board(&self, id: &BoardId) -> Result<Option<Board>> {
        Ok(self.tables().boards.get(id).cloned())
    }

    fn column(&self, id: &ColumnId) -> Result<Option<Column>> {
        Ok(self.tables().columns.get(id).cloned())
    }

    fn task(&self, id: &TaskId) -> Result<Option<Task>> {
        Ok(self.tables().tasks.get(id).cloned())
    }

    fn columns_for_board(&self, board_id: &BoardId) -> Result<Vec<Column>> {
        let tables = self.tables();
        let mut columns: Vec<Column> = tables
            .columns
            .values()
            .filter(|c| &c.board_id == board_id)
            .cloned()
            .collect();
        columns.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(columns)
    }

    fn tasks_in_column(&self, column_id: &ColumnId) -> Result<Vec<Task>> {
        Ok(sorted_tasks(self.tables().tasks.values(), column_id))
    }

    fn insert_board(&self, board: &Board) -> Result<()> {
        let mut tables = self.tables();
        if tables.boards.contains_key(&board.id) {
            bail!("board {} already exists", board.id);
        }
        tables.boards.insert(board.id.clone(), board.clone());
        Ok(())
    }

    fn insert_column(&self, column: &Column) -> Result<()> {
        let mut tables = self.tables();
        if !tables.boards.contains_key(&column.board_id) {
            bail!("board {} does not exist", column.board_id);
        }
        if tables.columns.contains_key(&column.id) {
            bail!("column {} already exists", column.id);
        }
        tables.columns.insert(column.id.clone(), column.clone());
        Ok(())
    }

    fn insert_task(&self, task: &Task) -> Result<()> {
        let mut tables = self.tables();
        if !tables.columns.contains_key(&task.column_id) {
            bail!("column {} does not exist", task.column_id);
        }
        if tables.tasks.contains_key(&task.id) {
            bail!("task {} already exists", task.id);
        }
        tables.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn apply_column_order(&self, batch: &ColumnBatch) -> Result<BatchOutcome> {
        let fault = self.take_fault();
        let mut tables = self.tables();

        if !tables.columns.contains_key(&batch.column_id) {
            bail!("column {} does not exist", batch.column_id);
        }

        let mut staged = tables.tasks.clone();
        let mut rejected = Vec::new();

        if let Some(task_id) = &batch.delete {
            if staged.remove(task_id).is_none() {
                rejected.push(task_id.clone());
            }
        }

        for (written, update) in batch.updates.iter().enumerate() {
            if fault == Some(written) {
                return Err(anyhow!(
                    "injected write failure at update {written} for column {}",
                    batch.column_id
                ));
            }
            match staged.get_mut(&update.task_id) {
                Some(task) => {
                    task.column_id = batch.column_id.clone();
                    task.order = update.order;
                }
                None => rejected.push(update.task_id.clone()),
            }
        }

        if !rejected.is_empty() {
            return Ok(BatchOutcome::Rejected(rejected));
        }

        tables.tasks = staged;
        Ok(BatchOutcome::Applied)
    }

    fn append_activity(&self, record: &ActivityRecord) -> Result<()> {
        self.tables().activity.push(record.clone());
        Ok(())
    }

    fn activity_for_task(&self, task_id: &TaskId) -> Result<Vec<ActivityRecord>> {
        let tables = self.tables();
        let mut records: Vec<ActivityRecord> = tables
            .activity
            .iter()
            .filter(|r| &r.task_id == task_id)
            .cloned()
            .collect();
        records.reverse();
        Ok(records)
    }
}
