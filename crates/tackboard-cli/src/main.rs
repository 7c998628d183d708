#![forbid(unsafe_code)]

mod actor;
mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use tackboard_core::config;
use tackboard_core::error::ErrorCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tack: ordered kanban task board",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Override actor identity (skips env resolution).
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Board database to use instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a board directory",
        long_about = "Create .tackboard/ with a default config and an empty board database.",
        after_help = "EXAMPLES:\n    # Initialize in the current directory\n    tack init\n\n    # Rewrite the default config\n    tack init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Structure",
        about = "Manage boards",
        after_help = "EXAMPLES:\n    tack board create \"Maintenance\""
    )]
    Board {
        #[command(subcommand)]
        command: cmd::board::BoardCommand,
    },

    #[command(
        next_help_heading = "Structure",
        about = "Manage columns",
        after_help = "EXAMPLES:\n    tack column add brd-0a1b2c3d4e \"In progress\""
    )]
    Column {
        #[command(subcommand)]
        command: cmd::column::ColumnCommand,
    },

    #[command(
        next_help_heading = "Tasks",
        about = "Create or delete tasks",
        after_help = "EXAMPLES:\n    # Add a task to the bottom of a column\n    tack task add col-0a1b2c3d4e --title \"Replace boiler\" --priority urgent\n\n    # Delete a task\n    tack task rm tsk-0a1b2c3d4e"
    )]
    Task {
        #[command(subcommand)]
        command: cmd::task::TaskCommand,
    },

    #[command(
        next_help_heading = "Ordering",
        about = "Move a task within or across columns",
        long_about = "Move a task to a zero-based position in a column. \
                      The destination and source columns are renumbered densely.",
        after_help = "EXAMPLES:\n    # Move to the top of another column\n    tack move tsk-1 --from col-todo --to col-doing --index 0\n\n    # Send to the bottom of its own column\n    tack move tsk-1 --from col-todo --to col-todo --index 9999"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Ordering",
        about = "Rewrite the order of one column",
        after_help = "EXAMPLES:\n    # List every task in the column in its new order\n    tack reorder col-todo tsk-3 tsk-1 tsk-2"
    )]
    Reorder(cmd::reorder::ReorderArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show a board in display order",
        after_help = "EXAMPLES:\n    tack show brd-0a1b2c3d4e\n    tack show brd-0a1b2c3d4e --column col-todo --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show a task's activity, newest first",
        after_help = "EXAMPLES:\n    tack log tsk-0a1b2c3d4e -n 10"
    )]
    Log(cmd::log::LogArgs),

    #[command(
        next_help_heading = "Read",
        about = "Check that every column's order is dense",
        after_help = "EXAMPLES:\n    tack verify brd-0a1b2c3d4e"
    )]
    Verify(cmd::verify::VerifyArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    tack completions bash > /etc/bash_completion.d/tack"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TACK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tackboard=debug,info"
        } else {
            "tackboard=info,warn"
        })
    });

    let format = env::var("TACK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command, &mut std::io::stdout());
    }

    let project_root = env::current_dir()?;
    let config = match config::resolve_config(&project_root, cli.json) {
        Ok(config) => config,
        Err(e) => {
            let mode = if cli.json { OutputMode::Json } else { OutputMode::Text };
            let code = ErrorCode::ConfigParseError;
            render_error(
                mode,
                &CliError::with_details(format!("{e:#}"), code.hint().unwrap_or_default(), code.code()),
            )?;
            return Err(e);
        }
    };

    let ctx = cmd::CmdContext {
        project_root,
        db_override: cli.db,
        actor_flag: cli.actor,
        output: OutputMode::from_resolved(&config.resolved_output),
        config,
    };

    match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &ctx),
        Commands::Board { command } => cmd::board::run_board(command, &ctx),
        Commands::Column { command } => cmd::column::run_column(command, &ctx),
        Commands::Task { command } => cmd::task::run_task(command, &ctx),
        Commands::Move(args) => cmd::move_cmd::run_move(args, &ctx),
        Commands::Reorder(args) => cmd::reorder::run_reorder(args, &ctx),
        Commands::Show(args) => cmd::show::run_show(args, &ctx),
        Commands::Log(args) => cmd::log::run_log(args, &ctx),
        Commands::Verify(args) => cmd::verify::run_verify(args, &ctx),
        Commands::Completions(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_and_after_subcommand() {
        let cli = Cli::parse_from(["tack", "--json", "show", "brd-1"]);
        assert!(cli.json);
        let cli = Cli::parse_from(["tack", "show", "brd-1", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn actor_and_db_flags_are_global() {
        let cli = Cli::parse_from([
            "tack", "move", "tsk-1", "--from", "a", "--to", "b", "--actor", "dana", "--db",
            "ops.db",
        ]);
        assert_eq!(cli.actor.as_deref(), Some("dana"));
        assert_eq!(cli.db, Some(PathBuf::from("ops.db")));
    }

    #[test]
    fn move_accepts_negative_index() {
        let cli = Cli::parse_from(["tack", "move", "tsk-1", "--from", "a", "--to", "a", "--index", "-3"]);
        let Commands::Move(args) = cli.command else {
            panic!("expected move");
        };
        assert_eq!(args.index, -3);
        assert_eq!(args.from, "a");
    }

    #[test]
    fn move_index_defaults_to_top() {
        let cli = Cli::parse_from(["tack", "move", "tsk-1", "--from", "a", "--to", "b"]);
        let Commands::Move(args) = cli.command else {
            panic!("expected move");
        };
        assert_eq!(args.index, 0);
    }

    #[test]
    fn reorder_accepts_an_empty_task_list() {
        let cli = Cli::parse_from(["tack", "reorder", "col-a"]);
        let Commands::Reorder(args) = cli.command else {
            panic!("expected reorder");
        };
        assert!(args.tasks.is_empty());

        let cli = Cli::parse_from(["tack", "reorder", "col-a", "t3", "t1", "t2"]);
        let Commands::Reorder(args) = cli.command else {
            panic!("expected reorder");
        };
        assert_eq!(args.tasks, ["t3", "t1", "t2"]);
    }

    #[test]
    fn task_add_parses_priority_and_due_date() {
        let cli = Cli::parse_from([
            "tack", "task", "add", "col-a", "--title", "Fix gate", "--priority", "urgent", "--due",
            "2026-11-02",
        ]);
        let Commands::Task {
            command: cmd::task::TaskCommand::Add(args),
        } = cli.command
        else {
            panic!("expected task add");
        };
        assert_eq!(args.priority, tackboard_core::model::Priority::Urgent);
        assert_eq!(args.due.map(|d| d.to_string()).as_deref(), Some("2026-11-02"));
    }

    #[test]
    fn task_add_rejects_unknown_priority() {
        let result = Cli::try_parse_from([
            "tack", "task", "add", "col-a", "--title", "x", "--priority", "critical",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["tack", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["tack", "init"],
            vec!["tack", "board", "create", "Ops"],
            vec!["tack", "column", "add", "brd-1", "Todo"],
            vec!["tack", "task", "add", "col-1", "--title", "x"],
            vec!["tack", "task", "rm", "tsk-1"],
            vec!["tack", "task", "delete", "tsk-1"],
            vec!["tack", "move", "tsk-1", "--from", "a", "--to", "b", "--index", "2"],
            vec!["tack", "reorder", "col-1", "tsk-1"],
            vec!["tack", "show", "brd-1"],
            vec!["tack", "log", "tsk-1"],
            vec!["tack", "verify", "brd-1"],
            vec!["tack", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse: {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
