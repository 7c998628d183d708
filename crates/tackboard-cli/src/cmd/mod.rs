//! Command handlers. Each `run_*` executes one invocation against the board
//! database and renders its result in the resolved [`OutputMode`].

pub mod board;
pub mod column;
pub mod completions;
pub mod init;
pub mod log;
pub mod move_cmd;
pub mod reorder;
pub mod show;
pub mod task;
pub mod verify;

use std::path::{Path, PathBuf};

use tackboard_core::config::{EffectiveConfig, LOCK_SUBDIR, TACKBOARD_DIR};
use tackboard_core::db::SqliteStore;
use tackboard_core::error::ErrorCode;
use tackboard_core::lock::ColumnLocks;
use tackboard_core::model::Actor;
use tackboard_core::{BoardError, TaskBoard};

use crate::actor;
use crate::output::{CliError, OutputMode, render_error};

/// Everything a handler needs besides its own arguments.
#[derive(Debug)]
pub struct CmdContext {
    pub project_root: PathBuf,
    pub db_override: Option<PathBuf>,
    pub actor_flag: Option<String>,
    pub output: OutputMode,
    pub config: EffectiveConfig,
}

impl CmdContext {
    /// Database path: `--db` (relative to the project root) or the config.
    pub fn db_path(&self) -> PathBuf {
        match &self.db_override {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.project_root.join(path),
            None => self.config.project.db_path(&self.project_root),
        }
    }

    /// Lock files sit next to the database so every process opening the same
    /// board shares them.
    pub fn lock_dir(&self) -> PathBuf {
        self.db_path()
            .parent()
            .map_or_else(|| self.project_root.join(TACKBOARD_DIR), Path::to_path_buf)
            .join(LOCK_SUBDIR)
    }

    /// Open the board service over an existing database.
    ///
    /// # Errors
    ///
    /// Fails with `E1001` if the database does not exist yet, or if opening
    /// or migrating it fails.
    pub fn open_board(&self) -> anyhow::Result<TaskBoard<SqliteStore>> {
        let path = self.db_path();
        if !path.exists() {
            let code = ErrorCode::NotInitialized;
            render_error(
                self.output,
                &CliError::with_details(
                    format!("no board database at {}", path.display()),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            anyhow::bail!("{}: no board database at {}", code.message(), path.display());
        }

        let store = SqliteStore::open(&path)?;
        let locks =
            ColumnLocks::with_lock_dir(self.lock_dir(), self.config.project.board.lock_timeout());
        tracing::debug!(db = %path.display(), "board database opened");
        Ok(TaskBoard::with_locks(store, locks))
    }

    /// Resolve the acting identity or render a `missing_actor` error.
    ///
    /// # Errors
    ///
    /// Returns an error if no identity source is set.
    pub fn require_actor(&self) -> anyhow::Result<Actor> {
        match actor::require_actor(self.actor_flag.as_deref(), self.config.user.actor.as_deref()) {
            Ok(actor) => Ok(actor),
            Err(e) => {
                render_error(
                    self.output,
                    &CliError::with_details(&e.message, "Pass --actor or set TACK_ACTOR", e.code),
                )?;
                anyhow::bail!("{}", e.message);
            }
        }
    }

    /// Render a board failure to stderr and turn it into the command's error.
    ///
    /// # Errors
    ///
    /// Always returns an error.
    pub fn fail<T>(&self, err: BoardError) -> anyhow::Result<T> {
        render_error(self.output, &CliError::from(&err))?;
        Err(err.into())
    }

    /// Unwrap a board result, rendering the failure if there is one.
    ///
    /// # Errors
    ///
    /// Returns the rendered failure.
    pub fn check<T>(&self, result: Result<T, BoardError>) -> anyhow::Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => self.fail(err),
        }
    }

    /// Parse a caller-supplied id, rendering a failure as invalid input.
    ///
    /// # Errors
    ///
    /// Returns the rendered failure if `raw` is blank.
    pub fn parse_id<T>(&self, parsed: Result<T, String>) -> anyhow::Result<T> {
        self.check(parsed.map_err(BoardError::InvalidInput))
    }
}
