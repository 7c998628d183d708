//! `tack reorder`: rewrite the order of one column.

use anyhow::Result;
use clap::Args;

use tackboard_core::model::TaskId;

use super::CmdContext;
use super::column::column_id;
use crate::output::render_action;

#[derive(Args, Debug)]
pub struct ReorderArgs {
    /// Column to reorder.
    pub column: String,

    /// Every task in the column, in the new top-to-bottom order. An empty
    /// column takes an empty list.
    #[arg(num_args = 0..)]
    pub tasks: Vec<String>,
}

/// Execute `tack reorder`.
///
/// The task list must name exactly the tasks the column currently holds.
/// Anything else is rejected without writing.
///
/// # Errors
///
/// Returns an error if no actor is set, any id is blank, or the board
/// rejects the request.
pub fn run_reorder(args: &ReorderArgs, ctx: &CmdContext) -> Result<()> {
    let actor = ctx.require_actor()?;
    let column_id = column_id(ctx, &args.column)?;
    let ordered = args
        .tasks
        .iter()
        .map(|raw| ctx.parse_id(TaskId::parse(raw)))
        .collect::<Result<Vec<_>>>()?;

    let board = ctx.open_board()?;
    let action = render_action(
        ctx.output,
        board.reorder_within_column(&actor, &column_id, &ordered),
    )?;
    if !action.is_success() {
        anyhow::bail!("reorder failed: {}", action.message());
    }
    Ok(())
}
