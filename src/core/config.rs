//! Runtime settings.
//!
//! Everything an operation needs from the process environment is read once
//! into [`Settings`] and passed down explicitly.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Explicit configuration for store, edit and export operations.
#[derive(Debug, Clone)]
pub struct Settings {
    /// KMS key identifier (`projects/*/locations/*/keyRings/*/cryptoKeys/*`)
    pub resource_id: Option<String>,
    /// Directory the locator starts climbing from
    pub start_dir: PathBuf,
    /// Editor command line, possibly with arguments
    pub editor: String,
    /// Directory holding the plaintext edit buffer
    pub temp_dir: PathBuf,
}

impl Settings {
    /// Settings with no key identifier and the default editor.
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            resource_id: None,
            start_dir: start_dir.into(),
            editor: constants::DEFAULT_EDITOR.to_string(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Read `ENVI_RESOURCE_ID` and `EDITOR` from the process environment.
    pub fn from_env(start_dir: impl Into<PathBuf>) -> Self {
        let resource_id = std::env::var(constants::RESOURCE_ID_ENV).ok();
        let editor = std::env::var(constants::EDITOR_ENV)
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| constants::DEFAULT_EDITOR.to_string());

        let settings = Self {
            resource_id,
            editor,
            ..Self::new(start_dir)
        };
        debug!(
            start_dir = %settings.start_dir.display(),
            has_resource_id = settings.resource_id.is_some(),
            editor = %settings.editor,
            "settings loaded from environment"
        );
        settings
    }

    /// Override the key identifier when one was given explicitly.
    pub fn with_resource_id(mut self, resource_id: Option<String>) -> Self {
        if resource_id.is_some() {
            self.resource_id = resource_id;
        }
        self
    }

    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = editor.into();
        self
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// The key identifier, required by every encrypt/decrypt.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKeyIdentifier` when unset or blank.
    pub fn resource_id(&self) -> Result<&str> {
        match self.resource_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ConfigError::MissingKeyIdentifier.into()),
        }
    }

    pub fn start_dir(&self) -> &Path {
        &self.start_dir
    }

    /// Path of the plaintext edit buffer, derived from the config file name.
    pub fn temp_path(&self) -> PathBuf {
        self.temp_dir
            .join(format!("{}{}", constants::CONFIG_FILE, constants::TEMP_SUFFIX))
    }
}
