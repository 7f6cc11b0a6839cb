//! Error types.
//!
//! One top-level [`Error`] wrapping a focused enum per concern, so callers
//! can match on the failure class without string inspection.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for all envi operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Missing or invalid process configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("KMS key identifier is not set (ENVI_RESOURCE_ID or --resource-id)")]
    MissingKeyIdentifier,
}

/// Failures reading or writing the encrypted file.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("envi file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("envi file already initialized: {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("malformed document: {0}")]
    MalformedDocument(String),
}

/// Which half of a KMS exchange failed its checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Request,
    Response,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Request => f.write_str("request"),
            Stage::Response => f.write_str("response"),
        }
    }
}

/// Key-management failures.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("{operation}: {stage} corrupted in transit")]
    IntegrityCheckFailed {
        operation: &'static str,
        stage: Stage,
    },

    #[error("KMS backend unavailable: {0}")]
    Unavailable(String),
}

/// Editor round-trip failures.
#[derive(Error, Debug)]
pub enum EditError {
    #[error("operating system not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("editor not found: {0}")]
    EditorNotFound(String),

    #[error("editor {program} exited with {status}")]
    EditorFailed { program: String, status: String },
}

pub type Result<T> = std::result::Result<T, Error>;
