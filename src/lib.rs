//! envi - KMS-encrypted environment variables for production and developer
//! contexts.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Create a new encrypted envi.yaml
//! │   ├── edit          # Decrypt, edit in $EDITOR, re-encrypt
//! │   ├── run           # Run a command with one environment exported
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── config        # Settings threaded into every operation
//!     ├── locate        # Upward search for envi.yaml
//!     ├── document      # Variable sets and their YAML form
//!     ├── cipher/       # KMS client seam and integrity checks
//!     │   ├── gcp       # Google Cloud KMS
//!     │   └── mock      # Test backend
//!     ├── store         # Encrypted file load/save
//!     ├── edit          # Editor round trip
//!     └── export        # Process environment export
//! ```
//!
//! # Loading variables at startup
//!
//! ```no_run
//! envi::set_env(envi::Environment::Developer, std::env::current_dir()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;

use std::path::PathBuf;

pub use crate::core::document::{Document, Environment, Variable, VariableSet};
pub use crate::core::export::Exported;
pub use crate::error::{Error, Result};

/// Export one environment from the nearest `envi.yaml` into this process.
///
/// Reads `ENVI_RESOURCE_ID` for the KMS key and searches upward from
/// `start_dir`. Variables the process already has are left alone.
///
/// # Errors
///
/// Returns any configuration, store or KMS error encountered while loading.
pub fn set_env(environment: Environment, start_dir: impl Into<PathBuf>) -> Result<Exported> {
    let settings = crate::core::config::Settings::from_env(start_dir);
    let store = crate::core::store::Store::open(settings)?;
    crate::core::export::export_variables(&store, environment.as_str())
}
