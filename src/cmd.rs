pub(crate) mod hook;
pub(crate) mod validate;

use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;

#[derive(Debug, Parser)]
#[command(name = "commitgate", version, author, about, long_about = None)]
#[command(bin_name = "commitgate")]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Generate Shell Completions
    #[arg(long = "completions", value_enum)]
    completions: Option<Shell>,

    /// Increase verbosity (-v, -vv, -vvv), 0 = WARN, 1 = INFO, 2 = DEBUG, 3 = TRACE
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate commit messages against the configured policies
    Validate(validate::ValidateArgs),

    /// Install the commit-msg hook into .git/hooks
    #[command(name = "install-hook")]
    InstallHook,

    /// Remove the commit-msg hook installed by commitgate
    #[command(name = "remove-hook")]
    RemoveHook,
}

/// Where the generated script usually lives, per shell. Shells without a
/// conventional drop-in location get no hint.
fn completion_sink(shell: Shell) -> Option<&'static str> {
    match shell {
        Shell::Bash => Some("| sudo tee /etc/bash_completion.d/commitgate.bash"),
        Shell::Zsh => Some("| sudo tee /usr/local/share/zsh/site-functions/_commitgate"),
        Shell::Fish => Some("> ~/.local/share/fish/generated_completions/commitgate.fish"),
        _ => None,
    }
}

impl Cli {
    /// Parse the command line. Returns None when the invocation was fully
    /// handled here (completion generation short-circuits the run).
    pub fn new() -> Option<Self> {
        let opt = Self::parse();
        let Some(shell) = opt.completions else {
            return Some(opt);
        };

        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "commitgate", &mut io::stdout());

        if let Some(sink) = completion_sink(shell) {
            eprintln!(
                "\n{}\n    {}",
                "To install the completions permanently, run:".bright_blue(),
                format!("commitgate --completions={shell} {sink}").yellow()
            );
        }

        None
    }
}
