//! `tack move`: move a task within a column or to another column.

use anyhow::Result;
use clap::Args;

use tackboard_core::MoveRequest;
use tackboard_core::model::TaskId;

use super::CmdContext;
use super::column::column_id;
use crate::output::render_action;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Task to move.
    pub task: String,

    /// Column the task is in now.
    #[arg(long)]
    pub from: String,

    /// Column that receives the task (may equal --from).
    #[arg(long)]
    pub to: String,

    /// Zero-based position in the destination. Out-of-range values clamp to
    /// the nearest end.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub index: i64,
}

/// Execute `tack move`.
///
/// # Errors
///
/// Returns an error if no actor is set, any id is blank, or the board
/// rejects the move. A rejected move prints the `{"error": ..}` shape in
/// JSON mode before returning.
pub fn run_move(args: &MoveArgs, ctx: &CmdContext) -> Result<()> {
    let actor = ctx.require_actor()?;
    let request = MoveRequest {
        task_id: ctx.parse_id(TaskId::parse(&args.task))?,
        source_column_id: column_id(ctx, &args.from)?,
        destination_column_id: column_id(ctx, &args.to)?,
        destination_index: args.index,
    };

    let board = ctx.open_board()?;
    let action = render_action(ctx.output, board.move_task(&actor, &request))?;
    if !action.is_success() {
        anyhow::bail!("move failed: {}", action.message());
    }
    Ok(())
}
