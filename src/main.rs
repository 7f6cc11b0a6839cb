//! envi - KMS-encrypted environment variables.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use envi::cli::output;
use envi::cli::{execute, Cli};
use envi::error::{ConfigError, EditError, Error, StoreError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("ENVI_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("envi=debug")
        } else {
            EnvFilter::new("envi=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    if let Err(e) = execute(cli.command) {
        let suggestion = match &e {
            Error::Config(ConfigError::MissingKeyIdentifier) => {
                Some("set ENVI_RESOURCE_ID or pass --resource-id")
            }
            Error::Store(StoreError::NotFound(_)) => Some("run: envi init"),
            Error::Store(StoreError::AlreadyInitialized(_)) => {
                Some("remove the existing envi.yaml first, or run: envi edit")
            }
            Error::Store(StoreError::MalformedDocument(_)) => {
                Some("envi.yaml was left unchanged; run envi edit again")
            }
            Error::Edit(EditError::EditorNotFound(_)) => Some("set EDITOR to an installed editor"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
