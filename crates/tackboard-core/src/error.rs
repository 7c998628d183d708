use std::fmt;

use crate::model::{BoardId, ColumnId, TaskId};

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    BoardNotFound,
    ColumnNotFound,
    TaskNotFound,
    TaskNotInColumn,
    PermutationMismatch,
    InvalidInput,
    WriteRejected,
    StoreFailure,
    CorruptOrder,
    LockContention,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::BoardNotFound => "E2001",
            Self::ColumnNotFound => "E2002",
            Self::TaskNotFound => "E2003",
            Self::TaskNotInColumn => "E3001",
            Self::PermutationMismatch => "E3002",
            Self::InvalidInput => "E3003",
            Self::WriteRejected => "E5001",
            Self::StoreFailure => "E5002",
            Self::CorruptOrder => "E5003",
            Self::LockContention => "E5004",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Board directory not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::BoardNotFound => "Board not found",
            Self::ColumnNotFound => "Column not found",
            Self::TaskNotFound => "Task not found",
            Self::TaskNotInColumn => "Task is not in the stated column",
            Self::PermutationMismatch => "Task list does not match column contents",
            Self::InvalidInput => "Invalid input",
            Self::WriteRejected => "Order update was rejected",
            Self::StoreFailure => "Board store failure",
            Self::CorruptOrder => "Column order is not dense",
            Self::LockContention => "Lock contention",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `tack init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .tackboard/config.toml and retry."),
            Self::BoardNotFound | Self::ColumnNotFound | Self::TaskNotFound => None,
            Self::TaskNotInColumn | Self::PermutationMismatch => {
                Some("Reload the board; your view is out of date.")
            }
            Self::InvalidInput => None,
            Self::WriteRejected | Self::StoreFailure => {
                Some("The column was left unchanged. Retrying is safe.")
            }
            Self::CorruptOrder => {
                Some("Reorder or move any task in the column to renumber it.")
            }
            Self::LockContention => Some("Retry after the other writer releases the column."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures surfaced by board operations.
///
/// Every variant maps to an [`ErrorCode`]. None of them are fatal: the
/// affected column is always left in its pre-operation state, except for the
/// source side of a cross-column move (see [`crate::board::TaskBoard::move_task`]).
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("task {task_id} is in column {actual}, not {claimed}")]
    TaskNotInColumn {
        task_id: TaskId,
        claimed: ColumnId,
        actual: ColumnId,
    },

    #[error(
        "task list for column {column_id} does not match its contents \
         (missing: {missing:?}, unexpected: {unexpected:?}, duplicated: {duplicated:?})"
    )]
    PermutationMismatch {
        column_id: ColumnId,
        missing: Vec<TaskId>,
        unexpected: Vec<TaskId>,
        duplicated: Vec<TaskId>,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("order update for column {column_id} not applied to: {task_ids:?}")]
    WriteRejected {
        column_id: ColumnId,
        task_ids: Vec<TaskId>,
    },

    #[error("column {column_id} has non-dense order values {orders:?}")]
    CorruptOrder { column_id: ColumnId, orders: Vec<i64> },

    #[error("timed out waiting for lock on column {0}")]
    LockContention(ColumnId),

    #[error("board store failure: {0}")]
    Persistence(#[source] anyhow::Error),
}

impl BoardError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::BoardNotFound(_) => ErrorCode::BoardNotFound,
            Self::ColumnNotFound(_) => ErrorCode::ColumnNotFound,
            Self::TaskNotFound(_) => ErrorCode::TaskNotFound,
            Self::TaskNotInColumn { .. } => ErrorCode::TaskNotInColumn,
            Self::PermutationMismatch { .. } => ErrorCode::PermutationMismatch,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::WriteRejected { .. } => ErrorCode::WriteRejected,
            Self::CorruptOrder { .. } => ErrorCode::CorruptOrder,
            Self::LockContention(_) => ErrorCode::LockContention,
            Self::Persistence(_) => ErrorCode::StoreFailure,
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    /// True when the caller's local view has diverged and must be refreshed.
    #[must_use]
    pub const fn requires_refresh(&self) -> bool {
        matches!(
            self,
            Self::TaskNotInColumn { .. }
                | Self::PermutationMismatch { .. }
                | Self::TaskNotFound(_)
                | Self::ColumnNotFound(_)
        )
    }
}

impl From<crate::lock::LockError> for BoardError {
    fn from(err: crate::lock::LockError) -> Self {
        match err {
            crate::lock::LockError::Timeout { column_id, .. } => Self::LockContention(column_id),
            crate::lock::LockError::IoError(io) => Self::Persistence(io.into()),
        }
    }
}
