//! [`BoardStore`] over the SQLite board database.
//!
//! Each [`ColumnBatch`] runs in its own `BEGIN IMMEDIATE` transaction. An
//! `UPDATE` that matches no row counts as a failed write: the transaction is
//! rolled back and the batch is reported as rejected, so a column is never
//! left half renumbered.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params, types::Type};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::{
    ActivityKind, ActivityRecord, Actor, Board, BoardId, Column, ColumnId, Priority, Task, TaskId,
};
use crate::store::{BatchOutcome, BoardStore, ColumnBatch};

const TASK_COLUMNS: &str = "task_id, column_id, title, description, priority, status, \
     due_date, assignee, sort_order, created_at_us, updated_at_us";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Board storage in a SQLite database file.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating and migrating if needed) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_connection(super::open_board_db(path)?))
    }

    /// In-memory database with the full schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_connection(super::open_in_memory()?))
    }

    /// Wrap an already migrated connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority: String = row.get(4)?;
    let priority = priority
        .parse::<Priority>()
        .map_err(|e| conversion_error(4, e))?;

    let due_date: Option<String> = row.get(6)?;
    let due_date = due_date
        .map(|raw| NaiveDate::parse_from_str(&raw, DATE_FORMAT))
        .transpose()
        .map_err(|e| conversion_error(6, e))?;

    Ok(Task {
        id: TaskId::from(row.get::<_, String>(0)?),
        column_id: ColumnId::from(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        priority,
        status: row.get(5)?,
        due_date,
        assignee: row.get(7)?,
        order: row.get(8)?,
        created_at_us: row.get(9)?,
        updated_at_us: row.get(10)?,
    })
}

fn column_from_row(row: &Row<'_>) -> rusqlite::Result<Column> {
    Ok(Column {
        id: ColumnId::from(row.get::<_, String>(0)?),
        board_id: BoardId::from(row.get::<_, String>(1)?),
        name: row.get(2)?,
        order: row.get(3)?,
        created_at_us: row.get(4)?,
    })
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<ActivityRecord> {
    let kind: String = row.get(2)?;
    let kind = kind.parse::<ActivityKind>().map_err(|msg| {
        conversion_error(2, std::io::Error::new(std::io::ErrorKind::InvalidData, msg))
    })?;
    Ok(ActivityRecord {
        task_id: TaskId::from(row.get::<_, String>(0)?),
        actor: Actor::new(row.get::<_, String>(1)?),
        kind,
        detail: row.get(3)?,
        created_at_us: row.get(4)?,
    })
}

impl BoardStore for SqliteStore {
    fn board(&self, id: &BoardId) -> Result<Option<Board>> {
        self.conn()
            .query_row(
                "SELECT board_id, name, created_at_us FROM boards WHERE board_id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(Board {
                        id: BoardId::from(row.get::<_, String>(0)?),
                        name: row.get(1)?,
                        created_at_us: row.get(2)?,
                    })
                },
            )
            .optional()
            .with_context(|| format!("load board {id}"))
    }

    fn column(&self, id: &ColumnId) -> Result<Option<Column>> {
        self.conn()
            .query_row(
                "SELECT column_id, board_id, name, sort_order, created_at_us \
                 FROM board_columns WHERE column_id = ?1",
                params![id.as_str()],
                column_from_row,
            )
            .optional()
            .with_context(|| format!("load column {id}"))
    }

    fn task(&self, id: &TaskId) -> Result<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = ?1");
        self.conn()
            .query_row(&sql, params![id.as_str()], task_from_row)
            .optional()
            .with_context(|| format!("load task {id}"))
    }

    fn columns_for_board(&self, board_id: &BoardId) -> Result<Vec<Column>> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(
            "SELECT column_id, board_id, name, sort_order, created_at_us \
             FROM board_columns WHERE board_id = ?1 ORDER BY sort_order ASC, column_id ASC",
        )?;
        let rows = stmt.query_map(params![board_id.as_str()], column_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("list columns of board {board_id}"))
    }

    fn tasks_in_column(&self, column_id: &ColumnId) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE column_id = ?1 \
             ORDER BY sort_order ASC, task_id ASC"
        );
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt.query_map(params![column_id.as_str()], task_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("list tasks of column {column_id}"))
    }

    fn insert_board(&self, board: &Board) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO boards (board_id, name, created_at_us) VALUES (?1, ?2, ?3)",
                params![board.id.as_str(), board.name, board.created_at_us],
            )
            .with_context(|| format!("insert board {}", board.id))?;
        Ok(())
    }

    fn insert_column(&self, column: &Column) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO board_columns (column_id, board_id, name, sort_order, created_at_us) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    column.id.as_str(),
                    column.board_id.as_str(),
                    column.name,
                    column.order,
                    column.created_at_us,
                ],
            )
            .with_context(|| format!("insert column {}", column.id))?;
        Ok(())
    }

    fn insert_task(&self, task: &Task) -> Result<()> {
        let due_date = task.due_date.map(|d| d.format(DATE_FORMAT).to_string());
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO tasks ({TASK_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                params![
                    task.id.as_str(),
                    task.column_id.as_str(),
                    task.title,
                    task.description,
                    task.priority.as_str(),
                    task.status,
                    due_date,
                    task.assignee,
                    task.order,
                    task.created_at_us,
                    task.updated_at_us,
                ],
            )
            .with_context(|| format!("insert task {}", task.id))?;
        Ok(())
    }

    fn apply_column_order(&self, batch: &ColumnBatch) -> Result<BatchOutcome> {
        let mut conn = self.conn();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("begin column order transaction")?;

        let column_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM board_columns WHERE column_id = ?1)",
            params![batch.column_id.as_str()],
            |row| row.get(0),
        )?;
        if !column_exists {
            bail!("column {} does not exist", batch.column_id);
        }

        let mut rejected = Vec::new();

        if let Some(task_id) = &batch.delete {
            let deleted = tx
                .execute("DELETE FROM tasks WHERE task_id = ?1", params![task_id.as_str()])
                .with_context(|| format!("delete task {task_id}"))?;
            if deleted == 0 {
                rejected.push(task_id.clone());
            }
        }

        {
            let mut stmt = tx.prepare_cached(
                "UPDATE tasks SET column_id = ?1, sort_order = ?2 WHERE task_id = ?3",
            )?;
            for update in &batch.updates {
                let changed = stmt
                    .execute(params![
                        batch.column_id.as_str(),
                        update.order,
                        update.task_id.as_str()
                    ])
                    .with_context(|| {
                        format!(
                            "write order {} for task {} in column {}",
                            update.order, update.task_id, batch.column_id
                        )
                    })?;
                if changed == 0 {
                    rejected.push(update.task_id.clone());
                }
            }
        }

        if !rejected.is_empty() {
            tx.rollback().context("roll back rejected column batch")?;
            return Ok(BatchOutcome::Rejected(rejected));
        }

        tx.commit().context("commit column order transaction")?;
        Ok(BatchOutcome::Applied)
    }

    fn append_activity(&self, record: &ActivityRecord) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO task_activity (task_id, actor, kind, detail, created_at_us) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.task_id.as_str(),
                    record.actor.as_str(),
                    record.kind.as_str(),
                    record.detail,
                    record.created_at_us,
                ],
            )
            .with_context(|| format!("append activity for task {}", record.task_id))?;
        Ok(())
    }

    fn activity_for_task(&self, task_id: &TaskId) -> Result<Vec<ActivityRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(
            "SELECT task_id, actor, kind, detail, created_at_us FROM task_activity \
             WHERE task_id = ?1 ORDER BY created_at_us DESC, activity_id DESC",
        )?;
        let rows = stmt.query_map(params![task_id.as_str()], activity_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .with_context(|| format!("list activity of task {task_id}"))
    }
}
