use anyhow::Result;
use clap::{Args, Subcommand};

use tackboard_core::model::BoardId;

use super::CmdContext;
use crate::output::{pretty_kv, render};

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// Create a new, empty board.
    Create(CreateBoardArgs),
}

#[derive(Args, Debug)]
pub struct CreateBoardArgs {
    /// Board name.
    pub name: String,
}

/// # Errors
///
/// Returns an error if the name is blank or the database write fails.
pub fn run_board(command: &BoardCommand, ctx: &CmdContext) -> Result<()> {
    match command {
        BoardCommand::Create(args) => run_create(args, ctx),
    }
}

fn run_create(args: &CreateBoardArgs, ctx: &CmdContext) -> Result<()> {
    let board = ctx.open_board()?;
    let created = ctx.check(board.create_board(&args.name))?;

    render(ctx.output, &created, |b, w| {
        writeln!(w, "✓ Created board {}", b.id)?;
        pretty_kv(w, "Name", &b.name)
    })
}

/// Parse a board id argument.
pub(crate) fn board_id(ctx: &CmdContext, raw: &str) -> Result<BoardId> {
    ctx.parse_id(BoardId::parse(raw))
}
