use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;

use tackboard_core::model::{NewTask, Priority, TaskId};

use super::CmdContext;
use super::column::column_id;
use crate::output::{pretty_kv, render};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task at the bottom of a column.
    Add(AddTaskArgs),

    /// Delete a task and close the gap it leaves.
    #[command(visible_alias = "delete")]
    Rm(RemoveTaskArgs),
}

#[derive(Args, Debug)]
pub struct AddTaskArgs {
    /// Column that receives the task.
    pub column: String,

    /// Task title.
    #[arg(short, long)]
    pub title: String,

    /// Longer description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Priority: low, medium, high or urgent.
    #[arg(short, long, default_value = "medium")]
    pub priority: Priority,

    /// Workflow status (free-form, defaults to `todo`).
    #[arg(short, long)]
    pub status: Option<String>,

    /// Due date (YYYY-MM-DD).
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Person responsible for the task.
    #[arg(short, long)]
    pub assignee: Option<String>,
}

#[derive(Args, Debug)]
pub struct RemoveTaskArgs {
    /// Task to delete.
    pub task: String,
}

#[derive(Debug, Serialize)]
struct Removed<'a> {
    deleted: &'a TaskId,
}

/// # Errors
///
/// Returns an error if no actor is set, the column or task does not exist,
/// or the database write fails.
pub fn run_task(command: &TaskCommand, ctx: &CmdContext) -> Result<()> {
    match command {
        TaskCommand::Add(args) => run_add(args, ctx),
        TaskCommand::Rm(args) => run_rm(args, ctx),
    }
}

fn run_add(args: &AddTaskArgs, ctx: &CmdContext) -> Result<()> {
    let actor = ctx.require_actor()?;
    let column_id = column_id(ctx, &args.column)?;
    let board = ctx.open_board()?;

    let new_task = NewTask {
        title: args.title.clone(),
        description: args.description.clone(),
        priority: args.priority,
        status: args.status.clone(),
        due_date: args.due,
        assignee: args.assignee.clone(),
    };
    let task = ctx.check(board.create_task(&actor, &column_id, new_task))?;

    render(ctx.output, &task, |t, w| {
        writeln!(w, "✓ Created task {}", t.id)?;
        pretty_kv(w, "Title", &t.title)?;
        pretty_kv(w, "Column", t.column_id.as_str())?;
        pretty_kv(w, "Position", t.order.to_string())?;
        pretty_kv(w, "Priority", t.priority.as_str())
    })
}

fn run_rm(args: &RemoveTaskArgs, ctx: &CmdContext) -> Result<()> {
    let actor = ctx.require_actor()?;
    let task_id = ctx.parse_id(TaskId::parse(&args.task))?;
    let board = ctx.open_board()?;
    ctx.check(board.delete_task(&actor, &task_id))?;

    render(ctx.output, &Removed { deleted: &task_id }, |r, w| {
        writeln!(w, "✓ Deleted task {}", r.deleted)
    })
}
