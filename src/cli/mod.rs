//! Command-line interface.

pub mod edit;
pub mod init;
pub mod output;
pub mod run;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::core::config::Settings;
use crate::core::constants::RESOURCE_ID_ENV;
use crate::core::document::Environment;
use crate::error::Result;

/// envi - KMS-encrypted environment variables.
#[derive(Parser)]
#[command(
    name = "envi",
    about = "KMS-encrypted environment variables for production and developer contexts",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// KMS key selection shared by commands that touch the file.
#[derive(Args, Debug, Clone, Default)]
pub struct KeyArgs {
    /// GCP KMS resource id (projects/*/locations/*/keyRings/*/cryptoKeys/*)
    #[arg(short, long, env = RESOURCE_ID_ENV)]
    pub resource_id: Option<String>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize a new encrypted envi.yaml in the current directory
    #[command(alias = "i")]
    Init {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Edit envi.yaml in $EDITOR and re-encrypt it
    #[command(alias = "e")]
    Edit {
        #[command(flatten)]
        key: KeyArgs,
    },

    /// Run a command with one environment's variables exported
    Run {
        /// Environment to export (production or developer)
        #[arg(short, long)]
        env: Environment,

        #[command(flatten)]
        key: KeyArgs,

        /// Command and arguments to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Print a shell completion script to stdout
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Settings for a command run from the current directory.
fn settings(key: KeyArgs) -> Result<Settings> {
    let cwd: PathBuf = std::env::current_dir()?;
    Ok(Settings::from_env(cwd).with_resource_id(key.resource_id))
}

/// Execute a command.
pub fn execute(command: Command) -> Result<()> {
    use Command::*;

    match command {
        Init { key } => init::execute(settings(key)?),
        Edit { key } => edit::execute(settings(key)?),
        Run { env, key, command } => run::execute(settings(key)?, env, &command),
        Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "envi", &mut std::io::stdout());
            Ok(())
        }
    }
}
