use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `tack completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Generate a shell completion script for `tack`.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn run_completions(
    shell: Shell,
    command: &mut clap::Command,
    out: &mut dyn std::io::Write,
) -> Result<()> {
    generate(shell, command, "tack", out);
    out.flush()?;
    Ok(())
}
