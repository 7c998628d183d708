use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use tackboard_core::config::{TACKBOARD_DIR, default_config_toml};
use tackboard_core::db::SqliteStore;

use super::CmdContext;
use crate::output::{pretty_kv, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `config.toml` even if `.tackboard/` already exists.
    #[arg(long)]
    pub force: bool,
}

const GITIGNORE: &str = "*.db\n*.db-wal\n*.db-shm\nlocks/\n";

#[derive(Debug, Serialize)]
struct InitReport {
    root: PathBuf,
    config: PathBuf,
    db: PathBuf,
}

/// Execute `tack init`. Creates the project skeleton:
///
/// ```text
/// .tackboard/
///   config.toml   (default project config)
///   .gitignore    (database and lock files)
///   board.db      (migrated, empty)
/// ```
///
/// An existing database is kept; `--force` only rewrites the config.
///
/// # Errors
///
/// Returns an error if `.tackboard/` already exists and `--force` is not set,
/// or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, ctx: &CmdContext) -> Result<()> {
    let dir = ctx.project_root.join(TACKBOARD_DIR);
    if dir.exists() && !args.force {
        anyhow::bail!("{TACKBOARD_DIR}/ already exists. Use `tack init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let config_path = dir.join("config.toml");
    std::fs::write(&config_path, default_config_toml())
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let db = ctx.db_path();
    SqliteStore::open(&db)?;
    tracing::info!(db = %db.display(), "board directory initialized");

    let report = InitReport {
        root: dir,
        config: config_path,
        db,
    };
    render(ctx.output, &report, |r, w| {
        writeln!(w, "✓ Initialized {TACKBOARD_DIR}/")?;
        writeln!(w)?;
        pretty_kv(w, "Config", r.config.display().to_string())?;
        pretty_kv(w, "Database", r.db.display().to_string())?;
        writeln!(w)?;
        writeln!(w, "Next steps:")?;
        writeln!(w, "  export TACK_ACTOR=your-name")?;
        writeln!(w, "  tack board create \"Operations\"")
    })
}
