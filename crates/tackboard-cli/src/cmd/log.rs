//! `tack log`: activity recorded for one task, newest first.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};

use tackboard_core::model::{ActivityRecord, TaskId};

use super::CmdContext;
use crate::output::{Renderable, render_list};

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Task to inspect. Deleted tasks keep their history.
    pub task: String,

    /// Maximum number of rows to show.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
struct ActivityRow {
    timestamp: String,
    timestamp_us: i64,
    task_id: String,
    actor: String,
    kind: String,
    detail: String,
}

impl From<ActivityRecord> for ActivityRow {
    fn from(record: ActivityRecord) -> Self {
        Self {
            timestamp: micros_to_rfc3339(record.created_at_us),
            timestamp_us: record.created_at_us,
            task_id: record.task_id.to_string(),
            actor: record.actor.to_string(),
            kind: record.kind.to_string(),
            detail: record.detail,
        }
    }
}

impl Renderable for ActivityRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {:<8} {:<16} {}",
            micros_to_local(self.timestamp_us),
            self.kind,
            self.actor,
            self.detail
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            self.timestamp, self.kind, self.actor, self.detail
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["timestamp", "kind", "actor", "detail"]
    }
}

fn micros_to_rfc3339(us: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(us)
        .map_or_else(|| us.to_string(), |ts| ts.to_rfc3339())
}

fn micros_to_local(us: i64) -> String {
    DateTime::<Utc>::from_timestamp_micros(us).map_or_else(
        || us.to_string(),
        |ts| ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Execute `tack log`.
///
/// # Errors
///
/// Returns an error if the id is blank or the database read fails.
pub fn run_log(args: &LogArgs, ctx: &CmdContext) -> Result<()> {
    let task_id = ctx.parse_id(TaskId::parse(&args.task))?;
    let board = ctx.open_board()?;
    let records = ctx.check(board.task_activity(&task_id))?;

    let rows: Vec<ActivityRow> = records
        .into_iter()
        .take(args.limit.unwrap_or(usize::MAX))
        .map(ActivityRow::from)
        .collect();

    if rows.is_empty() && !ctx.output.is_json() {
        println!("No activity recorded for {task_id}.");
        return Ok(());
    }
    render_list(&rows, ctx.output)?;
    Ok(())
}
