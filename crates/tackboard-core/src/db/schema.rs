//! Canonical SQLite schema for tackboard.
//!
//! - `boards` / `board_columns` / `tasks` hold the board itself; column and
//!   task order live in `sort_order`
//! - `task_activity` is an advisory log keyed by task id without a foreign
//!   key, so deletion records outlive their task
//! - `board_meta` tracks the schema version alongside `PRAGMA user_version`
//!
//! `(column_id, sort_order)` is indexed but deliberately not UNIQUE: SQLite
//! checks uniqueness per statement, and a renumbering batch passes through
//! transient duplicates between its first and last update.

/// Migration v1: core tables plus metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS boards (
    board_id TEXT PRIMARY KEY CHECK (length(trim(board_id)) > 0),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS board_columns (
    column_id TEXT PRIMARY KEY CHECK (length(trim(column_id)) > 0),
    board_id TEXT NOT NULL REFERENCES boards(board_id) ON DELETE CASCADE,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    sort_order INTEGER NOT NULL CHECK (sort_order >= 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    task_id TEXT PRIMARY KEY CHECK (length(trim(task_id)) > 0),
    column_id TEXT NOT NULL REFERENCES board_columns(column_id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    priority TEXT NOT NULL DEFAULT 'MEDIUM'
        CHECK (priority IN ('LOW', 'MEDIUM', 'HIGH', 'URGENT')),
    status TEXT NOT NULL DEFAULT 'todo',
    due_date TEXT,
    assignee TEXT,
    sort_order INTEGER NOT NULL,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS task_activity (
    activity_id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id TEXT NOT NULL,
    actor TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('created', 'moved', 'deleted')),
    detail TEXT NOT NULL DEFAULT '',
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS board_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO board_meta (id, schema_version) VALUES (1, 1);
";

/// Migration v2: read-path indexes.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_tasks_column_order
    ON tasks(column_id, sort_order, task_id);

CREATE INDEX IF NOT EXISTS idx_columns_board_order
    ON board_columns(board_id, sort_order);

CREATE INDEX IF NOT EXISTS idx_task_activity_task_created
    ON task_activity(task_id, created_at_us DESC);
";

/// Indexes every migrated database must have.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_tasks_column_order",
    "idx_columns_board_order",
    "idx_task_activity_task_created",
];
