//! Constants used throughout envi.
//!
//! Centralizes magic strings and configuration values.

/// Encrypted configuration file name.
pub const CONFIG_FILE: &str = "envi.yaml";

/// How many directory levels the locator climbs before giving up.
pub const MAX_DEPTH: usize = 100;

/// Environment variable holding the KMS key identifier.
pub const RESOURCE_ID_ENV: &str = "ENVI_RESOURCE_ID";

/// Environment variable naming the editor used by `envi edit`.
pub const EDITOR_ENV: &str = "EDITOR";

/// Editor used when `EDITOR` is unset.
pub const DEFAULT_EDITOR: &str = "vim";

/// Suffix appended to [`CONFIG_FILE`] for the plaintext edit buffer.
pub const TEMP_SUFFIX: &str = ".tmp";
