//! Run command.
//!
//! Exports one environment into this process, then runs a command that
//! inherits it.

use tracing::debug;

use crate::core::config::Settings;
use crate::core::document::Environment;
use crate::core::export;
use crate::core::store::Store;
use crate::error::{Error, Result};

/// Run a command with the chosen environment exported.
pub fn execute(settings: Settings, environment: Environment, command: &[String]) -> Result<()> {
    let exit_code = run_with_env(settings, environment, command)?;
    std::process::exit(exit_code);
}

fn run_with_env(settings: Settings, environment: Environment, command: &[String]) -> Result<i32> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| Error::Other("no command specified".to_string()))?;

    let store = Store::open(settings)?;
    let exported = export::export_variables(&store, environment.as_str())?;
    debug!(
        environment = %environment,
        set = exported.set.len(),
        kept = exported.kept.len(),
        "environment exported"
    );

    let status = std::process::Command::new(program).args(args).status()?;
    // Killed by a signal: no code, report failure
    Ok(status.code().unwrap_or(1))
}
