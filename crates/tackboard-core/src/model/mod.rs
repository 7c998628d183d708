//! Board, column, task, and activity types.

pub mod activity;
pub mod board;
pub mod ids;
pub mod task;

pub use activity::{ActivityKind, ActivityRecord, Actor};
pub use board::{Board, BoardView, Column, ColumnView};
pub use ids::{BoardId, ColumnId, TaskId};
pub use task::{DEFAULT_STATUS, NewTask, Priority, Task};

/// Current wall-clock time in microseconds since the Unix epoch.
#[must_use]
pub fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
