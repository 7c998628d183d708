//! `tack show`: print a board, or one column of it, in display order.

use anyhow::Result;
use clap::Args;
use std::io::Write;

use tackboard_core::BoardError;
use tackboard_core::model::{BoardView, ColumnView, DEFAULT_STATUS, Task};

use super::CmdContext;
use super::board::board_id;
use super::column::column_id;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Board to display.
    pub board: String,

    /// Only show this column.
    #[arg(long)]
    pub column: Option<String>,
}

/// Execute `tack show`.
///
/// # Errors
///
/// Returns an error if the board or column does not exist or the database
/// read fails.
pub fn run_show(args: &ShowArgs, ctx: &CmdContext) -> Result<()> {
    let board_id = board_id(ctx, &args.board)?;
    let board = ctx.open_board()?;
    let mut view = ctx.check(board.load_board(&board_id))?;

    if let Some(raw) = &args.column {
        let wanted = column_id(ctx, raw)?;
        view.columns.retain(|c| c.column.id == wanted);
        if view.columns.is_empty() {
            return ctx.fail(BoardError::ColumnNotFound(wanted));
        }
    }

    let mode = ctx.output;
    render(mode, &view, |v, w| match mode {
        OutputMode::Text => render_board_text(v, w),
        OutputMode::Pretty | OutputMode::Json => render_board_human(v, w),
    })
}

fn task_line(task: &Task) -> String {
    let mut parts = vec![format!(
        "{:>3}. {}  {}  [{}]",
        task.order, task.id, task.title, task.priority
    )];
    if task.status != DEFAULT_STATUS {
        parts.push(format!("({})", task.status));
    }
    if let Some(due) = task.due_date {
        parts.push(format!("due {due}"));
    }
    if let Some(assignee) = &task.assignee {
        parts.push(format!("@{assignee}"));
    }
    parts.join("  ")
}

fn render_column_human(column: &ColumnView, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(
        w,
        &format!("{} [{}]  {}", column.column.name, column.tasks.len(), column.column.id),
    )?;
    if column.tasks.is_empty() {
        return writeln!(w, "  (empty)");
    }
    for task in &column.tasks {
        writeln!(w, "{}", task_line(task))?;
    }
    Ok(())
}

fn render_board_human(view: &BoardView, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_kv(w, "Board", format!("{}  {}", view.board.name, view.board.id))?;
    pretty_kv(w, "Tasks", view.task_count().to_string())?;
    pretty_rule(w)?;
    for column in &view.columns {
        writeln!(w)?;
        render_column_human(column, w)?;
    }
    Ok(())
}

fn render_board_text(view: &BoardView, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "column\torder\ttask\tpriority\tstatus\ttitle")?;
    for column in &view.columns {
        for task in &column.tasks {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                column.column.id, task.order, task.id, task.priority, task.status, task.title
            )?;
        }
    }
    Ok(())
}
