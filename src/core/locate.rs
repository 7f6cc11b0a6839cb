//! Config file discovery.
//!
//! Walks from a starting directory toward the filesystem root looking for
//! `envi.yaml`, so nested call sites share one file at the project top.

use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::core::constants::{CONFIG_FILE, MAX_DEPTH};

/// Find `envi.yaml` in `start` or one of its ancestors.
///
/// Checks at most [`MAX_DEPTH`] directories. When nothing is found the bare
/// file name is returned, so a later open reports the missing file.
pub fn find(start: &Path) -> PathBuf {
    find_named(start, CONFIG_FILE)
}

/// Like [`find`], but returns `None` instead of the fallback.
pub fn find_existing(start: &Path) -> Option<PathBuf> {
    search(start, CONFIG_FILE)
}

fn find_named(start: &Path, name: &str) -> PathBuf {
    search(start, name).unwrap_or_else(|| {
        debug!(start = %start.display(), "config file not found, using default path");
        PathBuf::from(name)
    })
}

fn search(start: &Path, name: &str) -> Option<PathBuf> {
    let start = absolute(start);

    for dir in start.ancestors().take(MAX_DEPTH) {
        let candidate = dir.join(name);
        trace!(candidate = %candidate.display(), "checking");
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found config file");
            return Some(candidate);
        }
    }

    None
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
