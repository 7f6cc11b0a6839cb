//! Interactive edit workflow.
//!
//! `load -> write plaintext buffer -> editor -> reread -> validate -> save`.
//! The buffer lives in the temp directory under a name derived from
//! `envi.yaml` and is removed on every exit path. A buffer that no longer
//! decodes aborts the edit before the encrypted file is touched.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::constants::DEFAULT_EDITOR;
use crate::core::document::Document;
use crate::core::store::{create_new, Store};
use crate::error::{EditError, Result};

/// The user's editor command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    program: String,
    args: Vec<String>,
}

impl Editor {
    /// Parse an `EDITOR`-style command line such as `code --wait`.
    ///
    /// A value that names an executable as a whole is taken as the program,
    /// so paths with spaces (`/Applications/Sublime Text.app/...`) survive.
    /// Anything else is split on whitespace into program and arguments.
    pub fn new(command: &str) -> Self {
        let command = command.trim();
        if command.contains(char::is_whitespace) && which::which(command).is_ok() {
            return Self {
                program: command.to_string(),
                args: Vec::new(),
            };
        }

        let mut parts = command.split_whitespace().map(str::to_string);
        match parts.next() {
            Some(program) => Self {
                program,
                args: parts.collect(),
            },
            None => Self {
                program: DEFAULT_EDITOR.to_string(),
                args: Vec::new(),
            },
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the editor on `path` in the foreground with inherited stdio.
    ///
    /// # Errors
    ///
    /// - `EditError::UnsupportedPlatform` on an unrecognized OS
    /// - `EditError::EditorNotFound` if the program is not on PATH
    /// - `EditError::EditorFailed` on a non-zero exit
    pub fn open(&self, path: &Path) -> Result<()> {
        let mut cmd = self.command_for(std::env::consts::OS, path)?;
        debug!(program = %self.program, path = %path.display(), "launching editor");

        let status = cmd
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if !status.success() {
            return Err(EditError::EditorFailed {
                program: self.program.clone(),
                status: status.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn command_for(&self, os: &str, path: &Path) -> Result<Command> {
        match os {
            "windows" => {
                let root = std::env::var("SYSTEMROOT").unwrap_or_else(|_| r"C:\Windows".into());
                let mut cmd = Command::new(
                    PathBuf::from(root).join("System32").join("rundll32.exe"),
                );
                cmd.arg("url.dll,FileProtocolHandler").arg(path);
                Ok(cmd)
            }
            "linux" | "macos" => {
                let program = which::which(&self.program)
                    .map_err(|_| EditError::EditorNotFound(self.program.clone()))?;
                let mut cmd = Command::new(program);
                cmd.args(&self.args).arg(path);
                Ok(cmd)
            }
            other => Err(EditError::UnsupportedPlatform(other.to_string()).into()),
        }
    }
}

/// Result of a completed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// The encrypted file that was rewritten
    pub path: PathBuf,
    /// Whether the saved variables differ from what was loaded
    pub changed: bool,
}

/// Plaintext edit buffer, deleted on drop.
struct Scratch {
    path: PathBuf,
}

impl Scratch {
    /// Write a fresh owner-only buffer at `path`.
    ///
    /// Whatever sits at `path` (a stale buffer or a symlink) is unlinked and
    /// the file is created exclusively, so a link is never followed.
    fn create(path: PathBuf, contents: &[u8]) -> Result<Self> {
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale edit buffer"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut file = create_new(&path)?;
        // Guard before writing, so a failed write still cleans up.
        let scratch = Self { path };
        file.write_all(contents)?;
        file.flush()?;

        debug!(path = %scratch.path.display(), "wrote edit buffer");
        Ok(scratch)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(fs::read(&self.path)?))
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed edit buffer"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove edit buffer"),
        }
    }
}

/// Run the full edit round trip against the store's file.
///
/// # Errors
///
/// Any load, editor, decode or save error. On error the encrypted file is
/// left as it was, the handle is closed, and the buffer is removed.
pub fn edit(store: &Store, editor: &Editor) -> Result<EditOutcome> {
    let (file, mut current) = store.load()?;
    debug!(state = "loaded", path = %file.path().display());

    let scratch = Scratch::create(store.settings().temp_path(), current.to_yaml()?.as_bytes())?;

    editor.open(scratch.path())?;
    debug!(state = "editor_closed");

    let edited = scratch.read()?;
    debug!(state = "reread", len = edited.len());

    let mut document = Document::from_slice(&edited)?;
    debug!(state = "validated");

    document.env.sort();
    current.env.sort();
    let changed = document != current;

    let path = file.path().to_path_buf();
    store.save(file, document)?;
    info!(path = %path.display(), changed, "edit saved");

    Ok(EditOutcome { path, changed })
}
