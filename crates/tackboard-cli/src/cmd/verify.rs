use anyhow::Result;
use clap::Args;
use serde::Serialize;

use tackboard_core::BoardError;

use super::CmdContext;
use super::board::board_id;
use crate::output::render;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Board to audit.
    pub board: String,
}

#[derive(Debug, Serialize)]
struct ColumnAudit {
    column_id: String,
    name: String,
    tasks: usize,
    dense: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    orders: Option<Vec<i64>>,
}

#[derive(Debug, Serialize)]
struct VerifyReport {
    board_id: String,
    ok: bool,
    columns: Vec<ColumnAudit>,
}

/// Check every column of a board for dense order values.
///
/// # Errors
///
/// Returns an error if the board cannot be read or any column is not dense.
pub fn run_verify(args: &VerifyArgs, ctx: &CmdContext) -> Result<()> {
    let board_id = board_id(ctx, &args.board)?;
    let board = ctx.open_board()?;
    let view = ctx.check(board.load_board(&board_id))?;

    let mut columns = Vec::with_capacity(view.columns.len());
    for column in &view.columns {
        let orders = match board.check_density(&column.column.id) {
            Ok(()) => None,
            Err(BoardError::CorruptOrder { orders, .. }) => Some(orders),
            Err(err) => return ctx.fail(err),
        };
        if orders.is_some() {
            tracing::warn!(column_id = %column.column.id, "column order is not dense");
        }
        columns.push(ColumnAudit {
            column_id: column.column.id.to_string(),
            name: column.column.name.clone(),
            tasks: column.tasks.len(),
            dense: orders.is_none(),
            orders,
        });
    }

    let report = VerifyReport {
        board_id: board_id.to_string(),
        ok: columns.iter().all(|c| c.dense),
        columns,
    };

    render(ctx.output, &report, |r, w| {
        for column in &r.columns {
            match &column.orders {
                None => writeln!(w, "OK   {} ({} tasks)", column.name, column.tasks)?,
                Some(orders) => {
                    writeln!(w, "FAIL {} (orders {orders:?})", column.name)?;
                }
            }
        }
        if r.ok {
            writeln!(w, "verify: success")
        } else {
            writeln!(w, "verify: failed")
        }
    })?;

    if report.ok {
        Ok(())
    } else {
        anyhow::bail!("verify: board {} has non-dense columns", report.board_id);
    }
}
