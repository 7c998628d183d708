use anyhow::Result;
use clap::{Args, Subcommand};

use tackboard_core::model::ColumnId;

use super::CmdContext;
use super::board::board_id;
use crate::output::{pretty_kv, render};

#[derive(Subcommand, Debug)]
pub enum ColumnCommand {
    /// Append a column to a board.
    Add(AddColumnArgs),
}

#[derive(Args, Debug)]
pub struct AddColumnArgs {
    /// Board the column belongs to.
    pub board: String,

    /// Column name.
    pub name: String,
}

/// # Errors
///
/// Returns an error if the board does not exist, the name is blank, or the
/// database write fails.
pub fn run_column(command: &ColumnCommand, ctx: &CmdContext) -> Result<()> {
    match command {
        ColumnCommand::Add(args) => run_add(args, ctx),
    }
}

fn run_add(args: &AddColumnArgs, ctx: &CmdContext) -> Result<()> {
    let board_id = board_id(ctx, &args.board)?;
    let board = ctx.open_board()?;
    let column = ctx.check(board.add_column(&board_id, &args.name))?;

    render(ctx.output, &column, |c, w| {
        writeln!(w, "✓ Added column {}", c.id)?;
        pretty_kv(w, "Name", &c.name)?;
        pretty_kv(w, "Board", c.board_id.as_str())?;
        pretty_kv(w, "Position", c.order.to_string())
    })
}

/// Parse a column id argument.
pub(crate) fn column_id(ctx: &CmdContext, raw: &str) -> Result<ColumnId> {
    ctx.parse_id(ColumnId::parse(raw))
}
